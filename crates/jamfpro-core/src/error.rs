// ── Core error types ──
//
// User-facing errors from jamfpro-core. The `From<jamfpro_api::Error>`
// impl translates transport-layer failures into domain variants, and
// provider failure diagnostics use the same rendering as their detail.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Jamf Pro at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Jamf Pro request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Object not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Unknown resource kind: {kind}")]
    UnknownResourceKind { kind: String },

    #[error("Invalid {kind} configuration: {message}")]
    Mapping { kind: String, message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Jamf Pro error code, e.g. `INVALID_FIELD`.
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<jamfpro_api::Error> for CoreError {
    fn from(err: jamfpro_api::Error) -> Self {
        match err {
            jamfpro_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            jamfpro_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound {
                        identifier: e.url().map(|u| u.path().to_string()).unwrap_or_default(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            jamfpro_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            jamfpro_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            jamfpro_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            jamfpro_api::Error::RateLimited { retry_after_secs } => CoreError::Api {
                message: match retry_after_secs {
                    Some(secs) => format!("Rate limited -- retry after {secs}s"),
                    None => "Rate limited".into(),
                },
                code: Some("RATE_LIMITED".into()),
                status: Some(429),
            },
            jamfpro_api::Error::Api {
                status: 404,
                message,
                ..
            } => CoreError::NotFound {
                identifier: message,
            },
            jamfpro_api::Error::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            jamfpro_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response from Jamf Pro: {message}"))
            }
            jamfpro_api::Error::InvalidId { id } => CoreError::Mapping {
                kind: "object".into(),
                message: format!("invalid identifier {id:?}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn api_errors_keep_status_and_code() {
        let err = CoreError::from(jamfpro_api::Error::Api {
            status: 409,
            message: "name: already in use".into(),
            code: Some("DUPLICATE_FIELD".into()),
        });
        let CoreError::Api { status, code, .. } = &err else {
            panic!("expected Api, got {err:?}");
        };
        assert_eq!(*status, Some(409));
        assert_eq!(code.as_deref(), Some("DUPLICATE_FIELD"));
    }

    #[test]
    fn not_found_and_timeouts_are_domain_variants() {
        let not_found = CoreError::from(jamfpro_api::Error::Api {
            status: 404,
            message: "gone".into(),
            code: None,
        });
        assert!(matches!(not_found, CoreError::NotFound { .. }));

        let timeout = CoreError::from(jamfpro_api::Error::Timeout { timeout_secs: 30 });
        assert_eq!(timeout.to_string(), "Jamf Pro request timed out after 30s");
    }
}
