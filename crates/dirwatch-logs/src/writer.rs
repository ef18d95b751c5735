//! Log writer with size rotation, gzip compression and age retention
//!
//! Writers run inside the tracing subscriber, so nothing in this module may
//! emit tracing events of its own.

use chrono::Local;
use dirwatch_core::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::rotation::RotationConfig;

/// Append-only log file that rotates once it outgrows its size limit
pub struct LogWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    config: RotationConfig,
    current_size: u64,
}

impl LogWriter {
    /// Open (or create) a log file, creating parent directories as needed
    pub fn new(path: PathBuf, config: RotationConfig) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let current_size = file.metadata()?.len();

        let writer = Self {
            path,
            writer: BufWriter::new(file),
            config,
            current_size,
        };
        writer.prune_expired()?;
        Ok(writer)
    }

    /// Write one line, rotating afterwards if the size limit was reached
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.current_size += line.len() as u64 + 1;

        if self.current_size >= self.config.max_size_bytes {
            self.rotate()?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and release the file
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }

    /// Move the current file aside, compress it if configured, and start fresh
    fn rotate(&mut self) -> Result<()> {
        self.writer.flush()?;

        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S_%6f").to_string();
        let rotated = unique_path(rotated_path(&self.path, &stamp));
        fs::rename(&self.path, &rotated)?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.writer = BufWriter::new(file);
        self.current_size = 0;

        if self.config.compress {
            compress_file(&rotated)?;
        }

        self.prune_expired()
    }

    /// Delete rotated siblings older than the retention window
    fn prune_expired(&self) -> Result<()> {
        let Some(retention) = self.config.retention else {
            return Ok(());
        };
        let Some(dir) = self.path.parent() else {
            return Ok(());
        };

        let now = SystemTime::now();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !self.is_rotated_sibling(&path) {
                continue;
            }

            let modified = entry.metadata()?.modified()?;
            let age = now.duration_since(modified).unwrap_or_default();
            if age >= retention {
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(())
    }

    fn is_rotated_sibling(&self, candidate: &Path) -> bool {
        if candidate == self.path {
            return false;
        }
        let (Some(name), Some(stem)) = (candidate.file_name(), self.path.file_stem()) else {
            return false;
        };
        name.to_string_lossy()
            .starts_with(&format!("{}.", stem.to_string_lossy()))
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get current file size
    pub fn current_size(&self) -> u64 {
        self.current_size
    }
}

/// `monitor.log` rotated at `stamp` becomes `monitor.<stamp>.log`
fn rotated_path(base: &Path, stamp: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}.{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}.{}", stem, stamp),
    };
    base.with_file_name(name)
}

fn unique_path(candidate: PathBuf) -> PathBuf {
    if !candidate.exists() && !gz_path(&candidate).exists() {
        return candidate;
    }
    let name = candidate
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    (1..)
        .map(|n| candidate.with_file_name(format!("{}.{}", name, n)))
        .find(|p| !p.exists() && !gz_path(p).exists())
        .unwrap_or(candidate)
}

fn gz_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

/// Gzip `path` into `path.gz` and remove the original
fn compress_file(path: &Path) -> Result<PathBuf> {
    let target = gz_path(path);
    {
        let mut input = File::open(path)?;
        let output = File::create(&target)?;
        let mut encoder = GzEncoder::new(output, Compression::default());
        io::copy(&mut input, &mut encoder)?;
        encoder.finish()?;
    }
    fs::remove_file(path)?;
    Ok(target)
}
