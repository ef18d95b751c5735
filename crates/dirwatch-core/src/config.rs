//! Runtime configuration for dirwatch
//!
//! Settings come from the command line, optionally tuned by a TOML file:
//!
//! ```toml
//! [sinks]
//! master_max_size = 104857600
//! error_max_size = 10485760
//! folder_max_size = 5242880
//! retention_days = 30
//! compress = true
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::error::{Error, InvalidDirectory, Result};

/// Rotation, retention and compression policy for the file sinks
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SinkPolicy {
    /// Size in bytes at which `monitor.log` rotates
    pub master_max_size: u64,
    /// Size in bytes at which `monitor-error.log` rotates
    pub error_max_size: u64,
    /// Size in bytes at which each folder log rotates
    pub folder_max_size: u64,
    /// Age in days after which rotated master/error logs are removed
    pub retention_days: u64,
    /// Gzip rotated files
    pub compress: bool,
}

impl Default for SinkPolicy {
    fn default() -> Self {
        Self {
            master_max_size: DEFAULT_MASTER_MAX_SIZE,
            error_max_size: DEFAULT_ERROR_MAX_SIZE,
            folder_max_size: DEFAULT_FOLDER_MAX_SIZE,
            retention_days: DEFAULT_RETENTION_DAYS,
            compress: true,
        }
    }
}

/// Contents of an optional `--config` file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub sinks: SinkPolicy,
}

impl FileConfig {
    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(content)?;
        if config.sinks.master_max_size == 0
            || config.sinks.error_max_size == 0
            || config.sinks.folder_max_size == 0
        {
            return Err(Error::config("rotation sizes must be greater than zero"));
        }
        Ok(config)
    }
}

/// Fully resolved settings for one dirwatch process
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Validated, canonical watch roots
    pub watch_dirs: Vec<PathBuf>,
    /// Base directory for every log file
    pub log_dir: PathBuf,
    pub sinks: SinkPolicy,
}

impl MonitorConfig {
    /// Validate the requested directories and assemble the configuration
    pub fn new(requested: &[PathBuf], log_dir: PathBuf, sinks: SinkPolicy) -> Result<Self> {
        Ok(Self {
            watch_dirs: validate_directories(requested)?,
            log_dir,
            sinks,
        })
    }
}

/// Check that every requested path exists and is a directory.
///
/// All failures are collected into a single error so the operator sees the
/// complete list at once. Valid paths are canonicalized when possible.
pub fn validate_directories(requested: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut invalid = Vec::new();
    let mut valid = Vec::with_capacity(requested.len());

    for path in requested {
        let shown = path.display().to_string();
        if !path.exists() {
            invalid.push(InvalidDirectory::Missing(shown));
        } else if !path.is_dir() {
            invalid.push(InvalidDirectory::NotADirectory(shown));
        } else {
            valid.push(path.canonicalize().unwrap_or_else(|_| path.clone()));
        }
    }

    if !invalid.is_empty() {
        return Err(Error::InvalidDirectories(invalid));
    }

    Ok(valid)
}
