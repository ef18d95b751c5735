//! CLI argument definitions

use clap::Parser;
use dirwatch_core::DEFAULT_LOGS_DIR;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dirwatch")]
#[command(version, about = "Filesystem watcher with per-folder rotating logs")]
#[command(after_help = "Examples:
  dirwatch /path/to/watch
  dirwatch /path1 /path2 /path3
  dirwatch /path1 /path2 --logs /custom/logs")]
pub struct Cli {
    /// One or more directories to watch
    #[arg(required = true, num_args = 1..)]
    pub watch_dirs: Vec<PathBuf>,

    /// Directory to store logs
    #[arg(long, env = "DIRWATCH_LOGS", default_value = DEFAULT_LOGS_DIR)]
    pub logs: PathBuf,

    /// TOML file tuning log rotation and retention
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,
}
