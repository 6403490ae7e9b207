use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `jamfpro-api` crate.
///
/// Covers token acquisition, transport, and Jamf Pro API failures.
/// `jamfpro-core` classifies these for retry and drift handling and
/// maps them into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token request rejected, or a bearer token was refused (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Jamf Pro API ────────────────────────────────────────────────
    /// HTTP 429. Jamf Cloud may include a `Retry-After` header.
    #[error("Rate limited by Jamf Pro{}", retry_after_secs.map(|s| format!(" -- retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// Non-success response, parsed from the `{httpStatus, errors: [...]}` body when possible.
    #[error("Jamf Pro API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// An object identifier that cannot be placed in a request path.
    #[error("Invalid object id: {id:?}")]
    InvalidId { id: String },
}

/// How a failed call should be treated by callers that retry or reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Worth retrying while a deadline allows (rate limits, gateway errors).
    Transient,
    /// The addressed object does not exist.
    NotFound,
    /// Retrying will not help: bad input, auth failure, permanent rejection.
    Terminal,
}

impl Error {
    /// Classify this error for retry purposes.
    pub fn class(&self) -> ErrorClass {
        if self.is_not_found() {
            ErrorClass::NotFound
        } else if self.is_transient() {
            ErrorClass::Transient
        } else {
            ErrorClass::Terminal
        }
    }

    /// Returns `true` if this error indicates the bearer token was refused
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request provably never reached the backend's
    /// mutation logic: the connection was never established, or the
    /// request was turned away by the rate limiter.
    pub fn is_pre_dispatch(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect(),
            Self::RateLimited { .. } => true,
            _ => false,
        }
    }

    /// Backend-provided delay before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Extract the Jamf Pro error code (e.g. `INVALID_ID`), if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
