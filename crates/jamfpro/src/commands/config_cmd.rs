//! Config subcommand handlers.

use std::io::Read;

use jamfpro_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, InitArgs, SecretKind, SetSecretArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }
        ConfigCommand::Show => show(global),
        ConfigCommand::Init(args) => init(&args, global),
        ConfigCommand::Profiles => profiles(global),
        ConfigCommand::SetSecret(args) => set_secret(&args, global),
    }
}

// ── Show ────────────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = redacted(config::load_config(global)?);
    let out = output::render_single(
        &global.output,
        &cfg,
        |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("<unrenderable config: {e}>")),
        |c| c.profiles.keys().cloned().collect::<Vec<_>>().join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.client_secret.is_some() {
            profile.client_secret = Some(REDACTED.into());
        }
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

// ── Init ────────────────────────────────────────────────────────────

fn init(args: &InitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);
    let mut cfg = config::load_config(global)?;
    let profile_name = global.profile.clone().unwrap_or_else(|| "default".into());

    if cfg.profiles.contains_key(&profile_name) && !args.force {
        return Err(CliError::ProfileExists { name: profile_name });
    }

    let url = global.url.clone().ok_or_else(|| CliError::Validation {
        field: "url".into(),
        reason: "pass --url (or set JAMFPRO_URL) to create a profile".into(),
    })?;
    url::Url::parse(&url).map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url}"),
    })?;

    let mut profile = Profile {
        url,
        insecure: global.insecure.then_some(true),
        timeout: global.timeout,
        ..Profile::default()
    };
    if let Some(ref username) = global.username {
        profile.auth_method = "basic".into();
        profile.username = Some(username.clone());
        profile.password_env.clone_from(&args.secret_env);
    } else {
        profile.client_id.clone_from(&global.client_id);
        profile.client_secret_env.clone_from(&args.secret_env);
    }

    cfg.profiles.insert(profile_name.clone(), profile);
    if args.make_default || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }
    jamfpro_config::save_config(&cfg, &path)?;

    if !global.quiet {
        eprintln!("✓ Profile '{profile_name}' written to {}", path.display());
        if args.secret_env.is_none() {
            let secret = if global.username.is_some() { "password" } else { "client-secret" };
            eprintln!("  Store its secret with: jamfpro --profile {profile_name} config set-secret {secret}");
        }
    }
    Ok(())
}

// ── Profiles ────────────────────────────────────────────────────────

fn profiles(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config(global)?;
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    if cfg.profiles.is_empty() {
        eprintln!("No profiles configured. Run: jamfpro --url <URL> config init");
        return Ok(());
    }
    let lines: Vec<String> = cfg
        .profiles
        .keys()
        .map(|name| {
            if name == default {
                format!("{name} *")
            } else {
                name.clone()
            }
        })
        .collect();
    output::print_output(&lines.join("\n"), global.quiet);
    Ok(())
}

// ── SetSecret ───────────────────────────────────────────────────────

fn set_secret(args: &SetSecretArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config(global)?;
    let profile_name = config::active_profile_name(global, &cfg);

    let value = match &args.value {
        Some(value) => value.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf.trim_end_matches(['\r', '\n']).to_owned()
        }
    };
    if value.is_empty() {
        return Err(CliError::Validation {
            field: "secret".into(),
            reason: "secret cannot be empty".into(),
        });
    }

    let key = match args.secret {
        SecretKind::ClientSecret => "client-secret",
        SecretKind::Password => "password",
    };
    jamfpro_config::store_secret(&profile_name, key, &value)?;

    if !global.quiet {
        eprintln!("✓ Stored {key} for profile '{profile_name}' in the system keyring");
    }
    Ok(())
}
