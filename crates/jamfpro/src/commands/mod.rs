//! Command dispatch: bridges CLI args -> provider operations -> output formatting.

pub mod config_cmd;
pub mod resource;
pub mod schema;

use clap::CommandFactory;
use clap_complete::generate;

use jamfpro_core::Provider;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::resolve_provider_config;
use crate::error::CliError;

/// Run one command. Only resource operations open a server connection.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Kinds => schema::kinds(global),
        Command::Schema(args) => schema::show(&args, global),
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "jamfpro", &mut std::io::stdout());
            Ok(())
        }
        cmd => {
            let provider_config = resolve_provider_config(global)?;
            let provider = Provider::connect(provider_config)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            resource::handle(cmd, &provider, global).await
        }
    }
}
