//! Shared configuration for Jamf Pro tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `jamfpro_core::ProviderConfig`. The CLI layers its
//! flag overrides on top of these helpers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jamfpro_core::{AuthCredentials, OperationTimeouts, ProviderConfig, RetryPolicy, TlsVerification};

/// Keyring service name; entries are keyed `{profile}/{secret}`.
pub const KEYRING_SERVICE: &str = "jamfpro";

/// Prefix for environment overrides (`JAMFPRO_DEFAULTS__TIMEOUT=45`).
pub const ENV_PREFIX: &str = "JAMFPRO_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Retry budget per operation in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            operation_timeout: default_operation_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_operation_timeout() -> u64 {
    60
}

/// A named Jamf Pro server profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Server root (e.g., "https://example.jamfcloud.com").
    #[serde(default)]
    pub url: String,

    /// "oauth2" (API client) or "basic" (user account).
    #[serde(default = "default_auth_method")]
    pub auth_method: String,

    /// API client ID for oauth2.
    pub client_id: Option<String>,

    /// API client secret (plaintext -- prefer keyring or env var).
    pub client_secret: Option<String>,

    /// Environment variable name containing the client secret.
    pub client_secret_env: Option<String>,

    /// Username for basic auth.
    pub username: Option<String>,

    /// Password for basic auth (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override per-request timeout (seconds).
    pub timeout: Option<u64>,

    /// Replay load-balancer cookies (default on).
    pub sticky_sessions: Option<bool>,

    /// Override retry budgets per operation.
    #[serde(default)]
    pub timeouts: OperationTimeoutOverrides,
}

/// Per-operation retry budgets in seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OperationTimeoutOverrides {
    pub create: Option<u64>,
    pub read: Option<u64>,
    pub update: Option<u64>,
    pub delete: Option<u64>,
}

fn default_auth_method() -> String {
    "oauth2".into()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth_method: default_auth_method(),
            client_id: None,
            client_secret: None,
            client_secret_env: None,
            username: None,
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            sticky_sessions: None,
            timeouts: OperationTimeoutOverrides::default(),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "jamfpro", "jamfpro").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("jamfpro");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn from_keyring(profile_name: &str, secret: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{secret}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Store a secret in the system keyring under `{profile_name}/{secret}`.
pub fn store_secret(profile_name: &str, secret: &str, value: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{secret}"))?;
    entry.set_password(value)?;
    Ok(())
}

/// Resolve a secret: named env var → system keyring → plaintext.
fn resolve_secret(
    env_name: Option<&str>,
    profile_name: &str,
    keyring_key: &str,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    env_name
        .and_then(|name| std::env::var(name).ok())
        .map(SecretString::from)
        .or_else(|| from_keyring(profile_name, keyring_key))
        .or_else(|| plaintext.map(|s| SecretString::from(s.to_owned())))
}

/// Resolve the OAuth client secret for a profile.
pub fn resolve_client_secret(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.client_secret_env.as_deref(),
        profile_name,
        "client-secret",
        profile.client_secret.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the basic-auth password for a profile.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.password_env.as_deref(),
        profile_name,
        "password",
        profile.password.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve `AuthCredentials` from a profile's `auth_method` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    match profile.auth_method.as_str() {
        "oauth2" => {
            let client_id = profile.client_id.clone().ok_or_else(|| ConfigError::NoCredentials {
                profile: profile_name.into(),
            })?;
            let client_secret = resolve_client_secret(profile, profile_name)?;
            Ok(AuthCredentials::OAuth {
                client_id,
                client_secret,
            })
        }
        "basic" => {
            let username = profile.username.clone().ok_or_else(|| ConfigError::NoCredentials {
                profile: profile_name.into(),
            })?;
            let password = resolve_password(profile, profile_name)?;
            Ok(AuthCredentials::Basic { username, password })
        }
        other => Err(ConfigError::Validation {
            field: "auth_method".into(),
            reason: format!("expected 'oauth2' or 'basic', got '{other}'"),
        }),
    }
}

// ── Translation to core ─────────────────────────────────────────────

/// Build a `ProviderConfig` from a profile and already-resolved credentials.
pub fn provider_config(
    profile: &Profile,
    defaults: &Defaults,
    auth: AuthCredentials,
) -> Result<ProviderConfig, ConfigError> {
    if profile.url.is_empty() {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: "no server URL configured".into(),
        });
    }
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let budget = |overridden: Option<u64>| {
        RetryPolicy::with_timeout(Duration::from_secs(overridden.unwrap_or(defaults.operation_timeout)))
    };
    let timeouts = OperationTimeouts {
        create: budget(profile.timeouts.create),
        read: budget(profile.timeouts.read),
        update: budget(profile.timeouts.update),
        delete: budget(profile.timeouts.delete),
    };

    Ok(ProviderConfig {
        url,
        auth,
        tls,
        request_timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        sticky_sessions: profile.sticky_sessions.unwrap_or(true),
        timeouts,
    })
}

/// Build a `ProviderConfig` from a profile, resolving credentials from
/// the env/keyring/plaintext chain.
pub fn profile_to_provider_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ProviderConfig, ConfigError> {
    let auth = resolve_auth(profile, profile_name)?;
    provider_config(profile, defaults, auth)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.operation_timeout, 60);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_with_overrides() {
        let file = write_config(
            r#"
default_profile = "prod"

[defaults]
timeout = 15

[profiles.prod]
url = "https://example.jamfcloud.com"
client_id = "abc"
client_secret = "plain"
sticky_sessions = false

[profiles.prod.timeouts]
create = 300
"#,
        );

        let config = load_config_from(file.path()).unwrap();
        let profile = &config.profiles["prod"];
        assert_eq!(config.default_profile.as_deref(), Some("prod"));
        assert_eq!(profile.auth_method, "oauth2");

        let provider = provider_config(
            profile,
            &config.defaults,
            AuthCredentials::OAuth {
                client_id: "abc".into(),
                client_secret: SecretString::from("plain".to_owned()),
            },
        )
        .unwrap();
        assert_eq!(provider.request_timeout, Duration::from_secs(15));
        assert!(!provider.sticky_sessions);
        assert_eq!(provider.timeouts.create.timeout, Duration::from_secs(300));
        assert_eq!(provider.timeouts.read.timeout, Duration::from_secs(60));
        assert_eq!(provider.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn plaintext_is_the_last_resort() {
        let profile = Profile {
            url: "https://example.jamfcloud.com".into(),
            auth_method: "basic".into(),
            username: Some("admin".into()),
            password: Some("hunter2".into()),
            ..Profile::default()
        };

        let AuthCredentials::Basic { username, password } =
            resolve_auth(&profile, "jamfpro-config-test-nokeyring").unwrap()
        else {
            panic!("expected basic credentials");
        };
        assert_eq!(username, "admin");
        assert_eq!(password.expose_secret(), "hunter2");
    }

    #[test]
    fn missing_credentials_are_reported() {
        let profile = Profile {
            url: "https://example.jamfcloud.com".into(),
            ..Profile::default()
        };
        assert!(matches!(
            resolve_auth(&profile, "empty"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn unknown_auth_method_is_a_validation_error() {
        let profile = Profile {
            auth_method: "kerberos".into(),
            ..Profile::default()
        };
        let err = resolve_auth(&profile, "x").err().map(|e| e.to_string()).unwrap_or_default();
        assert!(err.contains("kerberos"));
    }

    #[test]
    fn insecure_and_ca_cert_select_tls_mode() {
        let auth = || AuthCredentials::Basic {
            username: "u".into(),
            password: SecretString::from("p".to_owned()),
        };
        let mut profile = Profile {
            url: "https://jamf.internal:8443".into(),
            ca_cert: Some(PathBuf::from("/etc/ssl/jamf-ca.pem")),
            ..Profile::default()
        };
        let defaults = Defaults::default();

        let tls = provider_config(&profile, &defaults, auth()).unwrap().tls;
        assert_eq!(tls, TlsVerification::CustomCa(PathBuf::from("/etc/ssl/jamf-ca.pem")));

        profile.insecure = Some(true);
        let tls = provider_config(&profile, &defaults, auth()).unwrap().tls;
        assert_eq!(tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_missing_and_malformed_urls() {
        let auth = || AuthCredentials::Basic {
            username: "u".into(),
            password: SecretString::from("p".to_owned()),
        };
        let defaults = Defaults::default();
        assert!(provider_config(&Profile::default(), &defaults, auth()).is_err());

        let bad = Profile {
            url: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            provider_config(&bad, &defaults, auth()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.profiles.insert(
            "default".into(),
            Profile {
                url: "https://example.jamfcloud.com".into(),
                auth_method: "oauth2".into(),
                client_id: Some("id".into()),
                client_secret_env: Some("JAMF_SECRET".into()),
                ..Profile::default()
            },
        );

        save_config(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        let profile = &loaded.profiles["default"];
        assert_eq!(profile.client_id.as_deref(), Some("id"));
        assert_eq!(profile.client_secret_env.as_deref(), Some("JAMF_SECRET"));
    }
}
