//! Clap derive structures for the `jamfpro` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// jamfpro -- declarative CRUD for Jamf Pro resources
#[derive(Debug, Parser)]
#[command(
    name = "jamfpro",
    version,
    about = "Reconcile Jamf Pro resources from the command line",
    long_about = "Create, read, update and delete Jamf Pro objects from TOML or JSON\n\
        resource files. Failed calls are retried within per-operation\n\
        deadlines, and objects deleted outside this tool are reported as drift.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "JAMFPRO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Jamf Pro URL (overrides profile)
    #[arg(long, short = 'u', env = "JAMFPRO_URL", global = true)]
    pub url: Option<String>,

    /// API client ID (selects oauth2 auth)
    #[arg(long, env = "JAMFPRO_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(long, env = "JAMFPRO_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Jamf Pro username (selects basic auth)
    #[arg(long, env = "JAMFPRO_USERNAME", global = true)]
    pub username: Option<String>,

    /// Jamf Pro password
    #[arg(long, env = "JAMFPRO_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "JAMFPRO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "JAMFPRO_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-request timeout in seconds (overrides profile)
    #[arg(long, env = "JAMFPRO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "JAMFPRO_CONFIG", global = true)]
    pub config: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an object from a resource file
    #[command(alias = "c")]
    Create(CreateArgs),

    /// Refresh an object's state from the server
    #[command(alias = "get")]
    Read(IdArgs),

    /// Replace an object with the contents of a resource file
    Update(UpdateArgs),

    /// Delete an object
    #[command(alias = "rm")]
    Delete(IdArgs),

    /// Find an existing object by ID or name
    Lookup(LookupArgs),

    /// List supported resource kinds
    Kinds,

    /// Show the attributes of a resource kind
    Schema(SchemaArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Resource commands ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Resource kind (e.g. `building` or `jamfpro_building`)
    pub kind: String,

    /// Resource file (TOML or JSON; `-` reads JSON from stdin)
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Resource kind
    pub kind: String,

    /// Object ID
    pub id: String,

    /// Resource file (TOML or JSON; `-` reads JSON from stdin)
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    /// Resource kind
    pub kind: String,

    /// Object ID
    pub id: String,
}

#[derive(Debug, Args)]
#[command(group(clap::ArgGroup::new("query").required(true).args(["id", "name"])))]
pub struct LookupArgs {
    /// Resource kind
    pub kind: String,

    /// Match by object ID
    #[arg(long)]
    pub id: Option<String>,

    /// Match by name (display name for API roles and clients)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Resource kind
    pub kind: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display the loaded configuration (secrets redacted)
    Show,

    /// Write a profile to the config file
    Init(InitArgs),

    /// List configured profiles
    Profiles,

    /// Store a secret for the active profile in the system keyring
    SetSecret(SetSecretArgs),
}

/// Connection details come from the global `--url`, `--client-id` and
/// `--username` flags; secrets are never written to the file.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Environment variable holding the client secret or password
    #[arg(long)]
    pub secret_env: Option<String>,

    /// Make this the default profile
    #[arg(long)]
    pub make_default: bool,

    /// Replace an existing profile of the same name
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct SetSecretArgs {
    /// Which secret to store
    pub secret: SecretKind,

    /// Secret value (read from stdin when omitted)
    #[arg(long)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum SecretKind {
    ClientSecret,
    Password,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
