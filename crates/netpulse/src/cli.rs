//! Clap derive structures for the `netpulse` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netpulse -- health dashboard for hybrid networks
#[derive(Debug, Parser)]
#[command(
    name = "netpulse",
    version,
    about = "Check the health of a controller-managed network and its site-to-site tunnel",
    long_about = "Aggregates device inventory and health scores from a network controller\n\
        with IPsec tunnel state probed from the routers at each site, and classifies\n\
        the result as active, degraded or inactive.",
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
    /// Config file (default: $XDG_CONFIG_HOME/netpulse/config.toml)
    #[arg(long, env = "NETPULSE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Dotenv file with connection settings
    #[arg(long, global = true, value_name = "PATH", default_value = "config.env")]
    pub env_file: PathBuf,

    /// Controller backend
    #[arg(long, short = 'b', global = true)]
    pub backend: Option<BackendArg>,

    /// Controller URL (overrides config)
    #[arg(long, short = 'c', global = true)]
    pub controller: Option<String>,

    /// Controller username (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Directory for saved snapshots and exports
    #[arg(long, global = true, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETPULSE_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Value Enums ──────────────────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// Controller REST API
    Live,
    /// Built-in sandbox data, no network access
    Simulated,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full health snapshot with overall status
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Device inventory from the controller
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Network and client health scores
    Health(HealthArgs),

    /// Tunnel state per endpoint and the connectivity test
    #[command(alias = "vpn")]
    Tunnel,

    /// Saved snapshots and exports
    History(HistoryArgs),

    /// Inspect the resolved configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Persist the snapshot to the results directory
    #[arg(long, short = 's')]
    pub save: bool,

    /// Exit with a non-zero code unless the status is active
    #[arg(long)]
    pub fail_on_degraded: bool,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List every device the controller manages
    #[command(alias = "ls")]
    List {
        /// Also save the list to the results directory
        #[arg(long)]
        export: bool,
    },

    /// Show one device by id
    Get {
        /// Device id
        device: String,
    },
}

// ── Health ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HealthArgs {
    /// Also save the scores to the results directory
    #[arg(long)]
    pub export: bool,
}

// ── History ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Namespace to list (snapshot, network_devices, network_health, client_health)
    #[arg(long, short = 'n', default_value = "snapshot")]
    pub namespace: String,

    /// Most recent N entries
    #[arg(long, short = 'l', default_value = "10")]
    pub limit: usize,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the merged configuration (password redacted)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }
}
