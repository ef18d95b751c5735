//! dirwatch CLI - Watch directories and log every change

use anyhow::Result;
use clap::Parser;
use dirwatch_core::{FileConfig, MonitorConfig, SinkPolicy};

mod cli;
mod monitor;
mod output;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        output::print_startup_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let policy = match &cli.config {
        Some(path) => FileConfig::load(path)?.sinks,
        None => SinkPolicy::default(),
    };

    // Validation happens before anything is written under the log directory.
    let config = MonitorConfig::new(&cli.watch_dirs, cli.logs, policy)?;

    monitor::execute(config, cli.verbose, !cli.no_color).await
}
