use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::CONFIG_ENV;

#[derive(Parser)]
#[command(name = "provision")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative, idempotent macOS provisioning", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Declaration file [default: ~/.config/provision/provision.toml]
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Converge the machine to the declaration
    Apply(ApplyArgs),

    /// Show what apply would change, without changing anything
    Plan(PlanArgs),

    /// List declared resources in order
    List,

    /// Check the declaration without probing the machine
    Validate,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Which resources to process
#[derive(Args, Debug, Clone, Default)]
pub struct Filter {
    /// Only process the resource with this name (repeatable)
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// Only process resources with this tag (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub filter: Filter,

    /// Skip confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Exit 0 when nothing changed, 2 when something did, 1 on failure
    #[arg(long)]
    pub detailed_exitcode: bool,

    /// Count best-effort failures as failures
    #[arg(long)]
    pub strict: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub filter: Filter,

    /// Exit 2 when changes are pending
    #[arg(long)]
    pub detailed_exitcode: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
