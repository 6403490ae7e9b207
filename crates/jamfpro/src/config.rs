//! Flag-aware profile resolution.
//!
//! The TOML model and credential chain live in `jamfpro-config`; this
//! module layers command-line overrides on top and produces the
//! `ProviderConfig` handed to core.

use std::path::PathBuf;

use secrecy::SecretString;

use jamfpro_config::{Config, Profile};
use jamfpro_core::{AuthCredentials, ProviderConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` / `JAMFPRO_CONFIG`, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(jamfpro_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(jamfpro_config::load_config_from(&config_path(global))?)
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the `ProviderConfig` for this invocation.
///
/// Precedence: flag (or its `JAMFPRO_*` env var) > profile > defaults.
/// A bare `--url` works without any config file.
pub fn resolve_provider_config(global: &GlobalOpts) -> Result<ProviderConfig, CliError> {
    let config = load_config(global)?;
    let profile_name = active_profile_name(global, &config);

    let mut profile = match config.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.url.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&config),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path(global).display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);

    let auth = match flag_credentials(&profile, global) {
        Some(auth) => auth,
        None => jamfpro_config::resolve_auth(&profile, &profile_name)?,
    };

    Ok(jamfpro_config::provider_config(&profile, &config.defaults, auth)?)
}

fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref url) = global.url {
        profile.url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(ref client_id) = global.client_id {
        profile.auth_method = "oauth2".into();
        profile.client_id = Some(client_id.clone());
    } else if let Some(ref username) = global.username {
        profile.auth_method = "basic".into();
        profile.username = Some(username.clone());
    }
}

/// Secrets passed as flags win over the env/keyring/plaintext chain.
fn flag_credentials(profile: &Profile, global: &GlobalOpts) -> Option<AuthCredentials> {
    match profile.auth_method.as_str() {
        "oauth2" => Some(AuthCredentials::OAuth {
            client_id: profile.client_id.clone()?,
            client_secret: SecretString::from(global.client_secret.clone()?),
        }),
        "basic" => Some(AuthCredentials::Basic {
            username: profile.username.clone()?,
            password: SecretString::from(global.password.clone()?),
        }),
        _ => None,
    }
}
