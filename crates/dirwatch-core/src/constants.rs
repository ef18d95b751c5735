//! Constants and default values for dirwatch

use std::path::{Path, PathBuf};

/// Default base log directory (relative to the working directory)
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Master log file name
pub const MASTER_LOG_FILE: &str = "monitor.log";

/// Error-only log file name
pub const ERROR_LOG_FILE: &str = "monitor-error.log";

/// Subdirectory of the log directory holding per-folder logs
pub const FOLDERS_DIR: &str = "folders";

/// Tag used when a record carries no watched-root context
pub const UNKNOWN_ROOT_TAG: &str = "UNKNOWN";

/// Tag used for process-level messages
pub const SYSTEM_ROOT_TAG: &str = "SYSTEM";

const MB: u64 = 1024 * 1024;

/// Master log rotation size (100MB)
pub const DEFAULT_MASTER_MAX_SIZE: u64 = 100 * MB;

/// Error log rotation size (10MB)
pub const DEFAULT_ERROR_MAX_SIZE: u64 = 10 * MB;

/// Folder log rotation size (5MB)
pub const DEFAULT_FOLDER_MAX_SIZE: u64 = 5 * MB;

/// Retention window for rotated master and error logs
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// How long the first half of a rename waits for its second half (ms)
pub const RENAME_PAIR_TIMEOUT_MS: u64 = 200;

/// Get the master log path
pub fn master_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(MASTER_LOG_FILE)
}

/// Get the error log path
pub fn error_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(ERROR_LOG_FILE)
}

/// Get the log file path for a folder discovered under a watched root
pub fn folder_log_path(log_dir: &Path, root_name: &str, folder_name: &str) -> PathBuf {
    log_dir
        .join(FOLDERS_DIR)
        .join(format!("{}_{}.log", root_name, folder_name))
}

/// Bare name of a path, falling back to the full display form for roots like `/`
pub fn bare_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
