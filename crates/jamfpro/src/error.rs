//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use jamfpro_config::ConfigError;
use jamfpro_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Jamf Pro at {url}")]
    #[diagnostic(
        code(jamfpro::connection_failed),
        help(
            "Check that the server URL is correct and reachable.\n\
             Use --insecure (-k) for on-prem servers with self-signed certificates."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(jamfpro::auth_failed),
        help(
            "Verify the API client ID and secret (Settings > API Roles and Clients),\n\
             or store a fresh secret with: jamfpro config set-secret client-secret"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(jamfpro::no_credentials),
        help(
            "Pass --client-id/--client-secret or --username/--password,\n\
             or set JAMFPRO_CLIENT_ID and JAMFPRO_CLIENT_SECRET."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Unknown resource kind '{kind}'")]
    #[diagnostic(code(jamfpro::unknown_kind), help("Run: jamfpro kinds"))]
    UnknownKind { kind: String },

    #[error("Not found: {identifier}")]
    #[diagnostic(code(jamfpro::not_found))]
    NotFound { identifier: String },

    #[error("{operation} {kind} failed with {errors} error(s)")]
    #[diagnostic(code(jamfpro::operation_failed))]
    OperationFailed {
        kind: String,
        operation: String,
        errors: usize,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(jamfpro::api_error))]
    ApiError {
        message: String,
        code: Option<String>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(jamfpro::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(jamfpro::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: jamfpro --profile {name} --url <URL> config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No Jamf Pro server configured")]
    #[diagnostic(
        code(jamfpro::no_config),
        help(
            "Pass --url, or create a profile with: jamfpro --url <URL> --client-id <ID> config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(code(jamfpro::profile_exists), help("Use --force to replace it."))]
    ProfileExists { name: String },

    #[error(transparent)]
    #[diagnostic(code(jamfpro::config))]
    Config(Box<figment::Error>),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(jamfpro::config))]
    ConfigFile(String),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(jamfpro::timeout),
        help("Increase the request timeout with --timeout, or the retry budget in your profile.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON resource file: {0}")]
    #[diagnostic(code(jamfpro::json), help("Check the file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML resource file: {0}")]
    #[diagnostic(code(jamfpro::toml), help("Check the file contents and try again."))]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(jamfpro::internal))]
    Internal(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::UnknownKind { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::NotFound { identifier } => CliError::NotFound { identifier },
            CoreError::UnknownResourceKind { kind } => CliError::UnknownKind { kind },
            CoreError::Mapping { kind, message } => CliError::Validation {
                field: kind,
                reason: message,
            },
            CoreError::Api { message, code, .. } => CliError::ApiError { message, code },
            CoreError::Config { message } => CliError::ConfigFile(message),
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Io(err) => CliError::Io(err),
            other => CliError::ConfigFile(other.to_string()),
        }
    }
}
