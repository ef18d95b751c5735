//! Top-level orchestration: sinks, sessions, and shutdown

use anyhow::{Context, Result};
use dirwatch_core::{MonitorConfig, SYSTEM_ROOT_TAG};
use dirwatch_logs::{LogSinks, SinkSettings};
use dirwatch_watch::WatchSession;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the process-wide subscriber feeding `sinks`
fn init_tracing(sinks: &LogSinks, verbose: u8) -> Result<()> {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(sinks.layer())
        .try_init()
        .context("Failed to install logger")
}

fn start_sessions(config: &MonitorConfig, sinks: &LogSinks) -> Result<Vec<WatchSession>> {
    let mut sessions = Vec::with_capacity(config.watch_dirs.len());
    for dir in &config.watch_dirs {
        let mut session = WatchSession::new(dir.clone(), config.log_dir.clone(), sinks.clone());
        session.start()?;
        sessions.push(session);
    }
    Ok(sessions)
}

/// Watch every configured directory until interrupted
pub async fn execute(config: MonitorConfig, verbose: u8, color: bool) -> Result<()> {
    let sinks = LogSinks::configure(
        SinkSettings::new(&config.log_dir)
            .with_policy(config.sinks.clone())
            .with_color(color),
    )?;
    init_tracing(&sinks, verbose)?;

    let count = config.watch_dirs.len();
    info!(
        root = SYSTEM_ROOT_TAG,
        "Starting filesystem watcher for {} {}",
        count,
        if count == 1 { "directory" } else { "directories" }
    );

    let mut sessions = match start_sessions(&config, &sinks) {
        Ok(sessions) => sessions,
        Err(e) => {
            error!(root = SYSTEM_ROOT_TAG, "{:#}", e);
            sinks.shutdown();
            return Err(e);
        }
    };

    let outcome = match sessions.first_mut() {
        Some(first) => first.run().await,
        None => Ok(()),
    };

    info!(root = SYSTEM_ROOT_TAG, "Stopping all watchers...");
    for session in &mut sessions {
        if let Err(e) = session.stop() {
            error!(
                root = SYSTEM_ROOT_TAG,
                "Failed to stop watcher for {}: {}",
                session.root().display(),
                e
            );
        }
    }
    sinks.shutdown();

    outcome.map_err(Into::into)
}
