//! Clap derive structures for the `cilia` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.
//! Also compiled by `build.rs` for man pages, so it may only depend on
//! clap and clap_complete.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cilia -- drive Cilia scent, fan, and lighting devices
#[derive(Debug, Parser)]
#[command(
    name = "cilia",
    version,
    about = "Control Cilia scent, fan, and light devices from the command line",
    long_about = "Talks to the Cilia SDK service over WebSocket.\n\n\
        Every device command opens a session, loads the configured profile\n\
        (scent library, groups, initial lights), sends the command, and\n\
        closes the session. Use `cilia run` to hold a supervised session open.",
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
    /// Device profile to use
    #[arg(long, short = 'p', env = "CILIA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Host running the Cilia SDK service (overrides profile)
    #[arg(long, env = "CILIA_HOST", global = true)]
    pub host: Option<String>,

    /// Port of the Cilia SDK service (overrides profile)
    #[arg(long, env = "CILIA_PORT", global = true)]
    pub port: Option<u16>,

    /// Connect timeout in seconds, 0 for none (overrides profile)
    #[arg(long, env = "CILIA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Do not send the profile after connecting
    #[arg(long, global = true)]
    pub no_profile: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CILIA_OUTPUT",
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
    /// Set a light to an RGB color
    #[command(alias = "l")]
    Light(LightArgs),

    /// Spin a fan by slot index or scent name
    #[command(alias = "f")]
    Fan(FanArgs),

    /// Spin every fan loaded with a scent
    #[command(alias = "s")]
    Scent(ScentArgs),

    /// Inspect or send the session profile
    Profile(ProfileArgs),

    /// Hold a supervised connection open until interrupted
    Run(RunArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Group addressing shared by every device command.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Target group by ID or name (repeatable; omit for all groups)
    #[arg(long = "group", short = 'g', value_name = "GROUP")]
    pub groups: Vec<String>,
}

// ── Device Commands ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Light fixture (1-6)
    #[arg(value_parser = clap::value_parser!(u8).range(1..=6))]
    pub light: u8,

    /// Red channel (0-255)
    pub red: u8,

    /// Green channel (0-255)
    pub green: u8,

    /// Blue channel (0-255)
    pub blue: u8,
}

#[derive(Debug, Args)]
pub struct FanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Fan slot index, or the name of the scent it holds
    pub fan: String,

    /// Fan speed (0-255)
    pub speed: u8,
}

#[derive(Debug, Args)]
pub struct ScentArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Scent name from the profile's library
    pub scent: String,

    /// Fan speed (0-255)
    pub speed: u8,
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the profile that is sent on connect (no device needed)
    Show,

    /// Connect and send the profile
    Send,
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Retry at a fixed interval (seconds) instead of backing off
    #[arg(long, value_name = "SECS", conflicts_with = "max_retries")]
    pub interval: Option<u64>,

    /// Give up after this many failed reconnects (default: never)
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with a default profile
    Init {
        /// Name of the profile to create
        #[arg(long, default_value = "default")]
        name: String,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    List,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
