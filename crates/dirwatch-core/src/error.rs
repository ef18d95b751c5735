//! Error types for dirwatch

use std::fmt;
use std::path::PathBuf;

/// A watch directory rejected during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidDirectory {
    Missing(String),
    NotADirectory(String),
}

impl InvalidDirectory {
    /// The path as the operator supplied it
    pub fn path(&self) -> &str {
        match self {
            InvalidDirectory::Missing(p) | InvalidDirectory::NotADirectory(p) => p,
        }
    }
}

impl fmt::Display for InvalidDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// dirwatch error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid directories: {}", join_paths(.0))]
    InvalidDirectories(Vec<InvalidDirectory>),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error("Log sink error: {0}")]
    SinkError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for dirwatch
pub type Result<T> = std::result::Result<T, Error>;

fn join_paths(dirs: &[InvalidDirectory]) -> String {
    dirs.iter()
        .map(InvalidDirectory::path)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn watch<S: Into<String>>(msg: S) -> Self {
        Error::WatchError(msg.into())
    }

    pub fn sink<S: Into<String>>(msg: S) -> Self {
        Error::SinkError(msg.into())
    }
}
