use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "flotilla")]
#[command(version)]
#[command(
    about = "Faceted deployment and configuration management for multi-host fleets",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// View deployment history
    #[command(after_help = HISTORY_NOTES)]
    History(HistoryArgs),

    /// Display status for running/stopped services
    Status(StatusArgs),

    /// List environments found in the deploy directory
    List,

    /// Print an environment's compiled configuration as JSON
    Show {
        /// Environment name
        environment: String,
    },

    /// Compile an environment's configuration and report problems
    Lint {
        /// Environment name
        environment: String,
    },

    /// Create a starter configuration for an environment
    Init(InitArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

const HISTORY_NOTES: &str = "\
Notes:
  History can vary per-host in multi-host environments. Use --all to limit
  output to releases that are eligible for rollback on all hosts.

  --current and --previous imply --all unless used together with --host.";

#[derive(Args)]
pub struct HistoryArgs {
    /// Environment name
    pub environment: String,

    /// Limit history lookup to a single host
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,

    /// Only list releases available on all hosts
    #[arg(long)]
    pub all: bool,

    /// Print only the name of the current release
    #[arg(long, conflicts_with = "previous")]
    pub current: bool,

    /// Print only the name of the release prior to current
    #[arg(long)]
    pub previous: bool,

    /// Number of hosts to query at once
    #[arg(short, long, default_value = "1")]
    pub jobs: usize,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Environment name
    pub environment: String,

    /// Number of hosts to query at once
    #[arg(short, long, default_value = "1")]
    pub jobs: usize,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct InitArgs {
    /// Environment name
    pub environment: String,

    /// Application name (defaults to the current directory's name)
    #[arg(long)]
    pub app_name: Option<String>,

    /// Application source path, relative to the deploy directory
    #[arg(long, default_value = "..")]
    pub app_path: String,
}
