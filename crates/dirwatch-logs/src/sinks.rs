//! Sink manager: the always-on sinks plus the dynamic per-folder registry

use dirwatch_core::{bare_name, constants, Error, Result, SinkPolicy};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::layer::SinkLayer;
use crate::record::{LogLevel, LogRecord};
use crate::rotation::RotationConfig;
use crate::writer::LogWriter;

/// Opaque handle of a registered folder sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FolderSinkId(u64);

/// Settings used to build a [`LogSinks`]
#[derive(Debug, Clone)]
pub struct SinkSettings {
    pub log_dir: PathBuf,
    pub policy: SinkPolicy,
    /// Mirror records to stderr
    pub console: bool,
    /// Colorize the console output
    pub color: bool,
}

impl SinkSettings {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            policy: SinkPolicy::default(),
            console: true,
            color: true,
        }
    }

    pub fn with_policy(mut self, policy: SinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// A log file dedicated to one subdirectory of a watched root.
///
/// Only records whose message mentions the folder's bare name are written.
/// The substring match is deliberately loose: a folder named `a` also
/// receives any record containing the letter `a`.
struct FolderSink {
    id: FolderSinkId,
    root_name: String,
    folder_name: String,
    writer: LogWriter,
}

impl FolderSink {
    fn accepts(&self, record: &LogRecord) -> bool {
        record.message.contains(&self.folder_name)
    }
}

struct Inner {
    log_dir: PathBuf,
    policy: SinkPolicy,
    console: Option<bool>,
    master: Mutex<LogWriter>,
    error: Mutex<LogWriter>,
    folders: Mutex<HashMap<String, FolderSink>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

/// Process-wide set of log sinks.
///
/// Cloning yields another handle to the same sinks. Build one with
/// [`LogSinks::configure`], install [`LogSinks::layer`] into the tracing
/// subscriber, and call [`LogSinks::shutdown`] once every watcher has stopped.
#[derive(Clone)]
pub struct LogSinks {
    inner: Arc<Inner>,
}

impl LogSinks {
    /// Create the log directory and open the console, master and error sinks
    pub fn configure(settings: SinkSettings) -> Result<Self> {
        std::fs::create_dir_all(&settings.log_dir)?;

        let master = LogWriter::new(
            constants::master_log_path(&settings.log_dir),
            RotationConfig::master(&settings.policy),
        )?;
        let error = LogWriter::new(
            constants::error_log_path(&settings.log_dir),
            RotationConfig::error(&settings.policy),
        )?;

        Ok(Self {
            inner: Arc::new(Inner {
                log_dir: settings.log_dir,
                policy: settings.policy,
                console: settings.console.then_some(settings.color),
                master: Mutex::new(master),
                error: Mutex::new(error),
                folders: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Tracing layer that feeds records into these sinks
    pub fn layer(&self) -> SinkLayer {
        SinkLayer::new(self.clone())
    }

    pub fn log_dir(&self) -> &Path {
        &self.inner.log_dir
    }

    /// Register a log file for `folder`, discovered under `root`.
    ///
    /// Any sink already registered for the same folder is closed and replaced.
    pub fn add_folder_sink(
        &self,
        folder: &Path,
        root: &Path,
        log_dir: &Path,
    ) -> Result<FolderSinkId> {
        if self.is_closed() {
            return Err(Error::sink("log sinks are shut down"));
        }

        let folder_name = bare_name(folder);
        let root_name = bare_name(root);
        let path = constants::folder_log_path(log_dir, &root_name, &folder_name);

        let writer = LogWriter::new(path, RotationConfig::folder(&self.inner.policy))?;
        let id = FolderSinkId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let sink = FolderSink {
            id,
            root_name,
            folder_name,
            writer,
        };

        let previous = self.inner.folders.lock().insert(folder_key(folder), sink);
        if let Some(old) = previous {
            close_writer(old.writer);
        }

        Ok(id)
    }

    /// Deregister the sink for `folder`; returns false when none was registered
    pub fn remove_folder_sink(&self, folder: &Path) -> bool {
        let removed = self.inner.folders.lock().remove(&folder_key(folder));
        match removed {
            Some(sink) => {
                close_writer(sink.writer);
                true
            }
            None => false,
        }
    }

    pub fn has_folder_sink(&self, folder: &Path) -> bool {
        self.inner.folders.lock().contains_key(&folder_key(folder))
    }

    pub fn folder_sink_id(&self, folder: &Path) -> Option<FolderSinkId> {
        self.inner.folders.lock().get(&folder_key(folder)).map(|s| s.id)
    }

    pub fn folder_sink_path(&self, folder: &Path) -> Option<PathBuf> {
        self.inner
            .folders
            .lock()
            .get(&folder_key(folder))
            .map(|s| s.writer.path().to_path_buf())
    }

    pub fn folder_sink_count(&self) -> usize {
        self.inner.folders.lock().len()
    }

    /// Folder sinks registered under a given watched root name
    pub fn folder_sinks_for_root(&self, root_name: &str) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .inner
            .folders
            .lock()
            .iter()
            .filter(|(_, s)| s.root_name == root_name)
            .map(|(key, _)| PathBuf::from(key))
            .collect();
        paths.sort();
        paths
    }

    /// Route a record to every sink that accepts it
    pub fn dispatch(&self, record: &LogRecord) {
        if self.is_closed() {
            return;
        }

        if let Some(color) = self.inner.console {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", record.console_line(color));
        }

        {
            let mut master = self.inner.master.lock();
            if let Err(e) = master.write_line(&record.file_line()) {
                report_write_failure(master.path(), &e);
            }
        }

        if record.level >= LogLevel::Error {
            let mut error = self.inner.error.lock();
            if let Err(e) = error.write_line(&record.file_line()) {
                report_write_failure(error.path(), &e);
            }
        }

        let mut folders = self.inner.folders.lock();
        for sink in folders.values_mut().filter(|s| s.accepts(record)) {
            if let Err(e) = sink.writer.write_line(&record.folder_line()) {
                report_write_failure(sink.writer.path(), &e);
            }
        }
    }

    /// Flush every open sink
    pub fn flush(&self) {
        for writer in [&self.inner.master, &self.inner.error] {
            let mut writer = writer.lock();
            if let Err(e) = writer.flush() {
                report_write_failure(writer.path(), &e);
            }
        }
        for sink in self.inner.folders.lock().values_mut() {
            if let Err(e) = sink.writer.flush() {
                report_write_failure(sink.writer.path(), &e);
            }
        }
    }

    /// Flush and close all sinks; later records are dropped
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.flush();
        let folders: Vec<FolderSink> = self.inner.folders.lock().drain().map(|(_, s)| s).collect();
        for sink in folders {
            close_writer(sink.writer);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

fn folder_key(folder: &Path) -> String {
    folder.to_string_lossy().into_owned()
}

fn close_writer(writer: LogWriter) {
    let path = writer.path().to_path_buf();
    if let Err(e) = writer.close() {
        report_write_failure(&path, &e);
    }
}

// Sinks sit underneath the tracing subscriber, so failures go straight to stderr.
fn report_write_failure(path: &Path, err: &Error) {
    eprintln!("dirwatch: failed to write {}: {}", path.display(), err);
}
