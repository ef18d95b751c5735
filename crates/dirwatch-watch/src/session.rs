//! Watch session: one watched root bound to a notify watcher and a worker thread

use crossbeam_channel::{Receiver, Sender};
use dirwatch_core::{bare_name, Error, Result, RENAME_PAIR_TIMEOUT_MS, SYSTEM_ROOT_TAG};
use dirwatch_logs::LogSinks;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::event::FsEvent;
use crate::handler::EventHandler;
use crate::rename::RenamePairer;

struct Worker {
    watcher: RecommendedWatcher,
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Recursively watches one root directory and logs its changes
pub struct WatchSession {
    root: PathBuf,
    root_name: String,
    log_dir: PathBuf,
    sinks: LogSinks,
    worker: Option<Worker>,
}

impl WatchSession {
    pub fn new(root: PathBuf, log_dir: PathBuf, sinks: LogSinks) -> Self {
        Self {
            root_name: bare_name(&root),
            root,
            log_dir,
            sinks,
            worker: None,
        }
    }

    /// Subscribe to the root and start the worker thread.
    ///
    /// The worker logs through the tracing dispatcher that is current on the
    /// calling thread.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = event_tx.send(res);
        })
        .map_err(|e| Error::watch(format!("Failed to create watcher: {}", e)))?;

        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| {
                Error::watch(format!("Failed to watch {}: {}", self.root.display(), e))
            })?;

        let handler =
            EventHandler::new(self.root.clone(), self.log_dir.clone(), self.sinks.clone());
        let dispatch = tracing::dispatcher::get_default(|d| d.clone());
        let handle = thread::Builder::new()
            .name(format!("dirwatch-{}", self.root_name))
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    run_worker(handler, event_rx, stop_rx)
                })
            })?;

        self.worker = Some(Worker {
            watcher,
            stop_tx,
            handle,
        });

        info!(root = %self.root_name, "Watching directory: {}", self.root.display());
        info!(root = SYSTEM_ROOT_TAG, "Press Ctrl+C to quit");
        Ok(())
    }

    /// Halt event delivery and wait for the worker to finish.
    ///
    /// Events already queued are handled before the worker exits. Calling
    /// `stop` on a session that is not running does nothing.
    pub fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        drop(worker.watcher);
        let _ = worker.stop_tx.send(());
        worker
            .handle
            .join()
            .map_err(|_| Error::watch(format!("Worker for {} panicked", self.root.display())))?;

        let open = self.sinks.folder_sinks_for_root(&self.root_name);
        if !open.is_empty() {
            debug!(root = %self.root_name, "{} folder logs remain open until shutdown", open.len());
        }
        info!(root = %self.root_name, success = true, "Watcher stopped");
        Ok(())
    }

    /// Block until the process is interrupted, then stop
    pub async fn run(&mut self) -> Result<()> {
        shutdown_signal().await?;
        info!(root = %self.root_name, "Stopping watcher...");
        self.stop()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            error!(root = %self.root_name, "Failed to stop watcher: {}", e);
        }
    }
}

fn run_worker(
    mut handler: EventHandler,
    events: Receiver<notify::Result<Event>>,
    stop: Receiver<()>,
) {
    let mut renames = RenamePairer::new(Duration::from_millis(RENAME_PAIR_TIMEOUT_MS));
    loop {
        let expiry = match renames.next_deadline() {
            Some(deadline) => crossbeam_channel::at(deadline),
            None => crossbeam_channel::never(),
        };

        crossbeam_channel::select! {
            recv(events) -> msg => match msg {
                Ok(res) => process(&mut handler, &mut renames, res),
                Err(_) => break,
            },
            recv(stop) -> _ => {
                for res in events.try_iter() {
                    process(&mut handler, &mut renames, res);
                }
                break;
            }
            recv(expiry) -> _ => {
                let expired = renames.expire(Instant::now());
                deliver(&mut handler, expired);
            }
        }
    }

    // Halves still waiting for a partner never get one once delivery stops.
    let leftover = renames.flush();
    deliver(&mut handler, leftover);
}

fn process(handler: &mut EventHandler, renames: &mut RenamePairer, res: notify::Result<Event>) {
    match res {
        Ok(event) => {
            let now = Instant::now();
            let mut fs_events = renames.expire(now);
            fs_events.extend(renames.translate(event, now));
            deliver(handler, fs_events);
        }
        Err(e) => error!(root = %handler.root_name(), "Watch error: {}", e),
    }
}

fn deliver(handler: &mut EventHandler, fs_events: Vec<FsEvent>) {
    for fs_event in &fs_events {
        handler.handle(fs_event);
    }
}

/// Resolve on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => debug!("Received SIGTERM"),
            _ = sigint.recv() => debug!("Received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        debug!("Received Ctrl+C");
    }

    Ok(())
}
