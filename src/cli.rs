use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::report::Shell;

#[derive(Parser)]
#[command(name = "envsnap")]
#[command(about = "Save and restore development environment snapshots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding snapshots (defaults to ~/.envsnap)
    #[arg(long, global = true, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.config/envsnap/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Capture the current environment under a name
    Save(SaveArgs),

    /// Show every detail of a snapshot
    View(NameArgs),

    /// Summarize a snapshot
    Report(NameArgs),

    /// Print shell commands that restore a snapshot
    Restore(RestoreArgs),

    /// List stored snapshots
    List(ListArgs),

    /// Print a bash completion script
    Completion,
}

#[derive(Parser)]
pub struct SaveArgs {
    /// Snapshot name
    pub name: String,

    /// Fail if pip freeze fails instead of saving an empty package list
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(Parser)]
pub struct NameArgs {
    /// Snapshot name
    pub name: String,
}

#[derive(Parser)]
pub struct RestoreArgs {
    /// Snapshot name
    pub name: String,

    /// Emit export lines for the captured environment variables
    #[arg(long, default_value_t = false)]
    pub env_vars: bool,

    /// Syntax of the emitted lines
    #[arg(long, value_enum, default_value_t = Shell::Posix)]
    pub shell: Shell,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Show capture time and package count
    #[arg(long, short = 'l', default_value_t = false)]
    pub long: bool,
}
