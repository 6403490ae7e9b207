// ── Runtime connection configuration ──
//
// These types describe how to reach a Jamf Pro server and how long each
// kind of operation may keep retrying. They never touch disk: the
// config crate or the CLI builds a `ProviderConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use jamfpro_api::{Credentials, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::provider::Operation;
use crate::retry::RetryPolicy;

/// How to obtain bearer tokens.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// API client (client credentials grant). Preferred.
    OAuth {
        client_id: String,
        client_secret: SecretString,
    },
    /// Jamf Pro user account.
    Basic {
        username: String,
        password: SecretString,
    },
}

impl From<AuthCredentials> for Credentials {
    fn from(auth: AuthCredentials) -> Self {
        match auth {
            AuthCredentials::OAuth {
                client_id,
                client_secret,
            } => Credentials::OAuth {
                client_id,
                client_secret,
            },
            AuthCredentials::Basic { username, password } => {
                Credentials::Basic { username, password }
            }
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store. Jamf Cloud always presents a public certificate.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file (on-prem servers behind a private CA).
    CustomCa(PathBuf),
    /// Skip verification.
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Retry budget per operation kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationTimeouts {
    pub create: RetryPolicy,
    pub read: RetryPolicy,
    pub update: RetryPolicy,
    pub delete: RetryPolicy,
}

impl OperationTimeouts {
    /// Same deadline for every operation, default backoff.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            create: RetryPolicy::with_timeout(timeout),
            read: RetryPolicy::with_timeout(timeout),
            update: RetryPolicy::with_timeout(timeout),
            delete: RetryPolicy::with_timeout(timeout),
        }
    }

    /// Policy governing `operation`. Lookups share the read budget.
    pub fn for_operation(&self, operation: Operation) -> &RetryPolicy {
        match operation {
            Operation::Create => &self.create,
            Operation::Read | Operation::Lookup => &self.read,
            Operation::Update => &self.update,
            Operation::Delete => &self.delete,
        }
    }
}

/// Everything needed to connect to one Jamf Pro server.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Server root, e.g. `https://example.jamfcloud.com`.
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout; retries are bounded separately by `timeouts`.
    pub request_timeout: Duration,
    /// Replay load-balancer cookies so reads follow writes to the same node.
    pub sticky_sessions: bool,
    pub timeouts: OperationTimeouts,
}

impl ProviderConfig {
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            tls: TlsVerification::default(),
            request_timeout: Duration::from_secs(30),
            sticky_sessions: true,
            timeouts: OperationTimeouts::default(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.request_timeout,
            sticky_sessions: self.sticky_sessions,
        }
    }
}
