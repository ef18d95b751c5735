//! Log records as seen by the sinks

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use dirwatch_core::UNKNOWN_ROOT_TAG;
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level};

/// Field carrying the watched-root tag
pub const ROOT_FIELD: &str = "root";

/// Boolean field promoting an INFO record to SUCCESS
pub const SUCCESS_FIELD: &str = "success";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn from_tracing(level: &Level, success: bool) -> Self {
        match *level {
            Level::TRACE => LogLevel::Trace,
            Level::DEBUG => LogLevel::Debug,
            Level::INFO if success => LogLevel::Success,
            Level::INFO => LogLevel::Info,
            Level::WARN => LogLevel::Warning,
            Level::ERROR => LogLevel::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    fn paint(&self, text: &str) -> ColoredString {
        match self {
            LogLevel::Trace => text.cyan().bold(),
            LogLevel::Debug => text.blue().bold(),
            LogLevel::Info => text.bold(),
            LogLevel::Success => text.green().bold(),
            LogLevel::Warning => text.yellow().bold(),
            LogLevel::Error => text.red().bold(),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One formatted log entry, shared by every sink it is routed to
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub root: String,
    pub message: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, root: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            root: root.into(),
            message: message.into(),
        }
    }

    /// Build a record from a tracing event, reading the `root` and `success` fields
    pub fn from_event(event: &Event<'_>) -> Self {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let mut message = visitor.message;
        if !visitor.extra.is_empty() {
            if !message.is_empty() {
                message.push(' ');
            }
            message.push_str(&visitor.extra.join(" "));
        }

        Self {
            timestamp: Local::now(),
            level: LogLevel::from_tracing(event.metadata().level(), visitor.success),
            root: visitor.root.unwrap_or_else(|| UNKNOWN_ROOT_TAG.to_string()),
            message,
        }
    }

    /// `time | LEVEL    | root | message`, used by the master and error logs
    pub fn file_line(&self) -> String {
        format!(
            "{} | {:<8} | {} | {}",
            self.timestamp.format(TIME_FORMAT),
            self.level,
            self.root,
            self.message
        )
    }

    /// `time | LEVEL    | message`, used by folder logs
    pub fn folder_line(&self) -> String {
        format!(
            "{} | {:<8} | {}",
            self.timestamp.format(TIME_FORMAT),
            self.level,
            self.message
        )
    }

    pub fn console_line(&self, color: bool) -> String {
        if !color {
            return self.file_line();
        }
        let level = format!("{:<8}", self.level);
        format!(
            "{} | {} | {} | {}",
            self.timestamp.format(TIME_FORMAT).to_string().green(),
            self.level.paint(&level),
            self.root.cyan(),
            self.level.paint(&self.message)
        )
    }
}

#[derive(Default)]
struct RecordVisitor {
    message: String,
    root: Option<String>,
    success: bool,
    extra: Vec<String>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            ROOT_FIELD => self.root = Some(value.to_string()),
            name => self.extra.push(format!("{}={}", name, value)),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            SUCCESS_FIELD => self.success = value,
            name => self.extra.push(format!("{}={}", name, value)),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            ROOT_FIELD => self.root = Some(format!("{:?}", value)),
            name => self.extra.push(format!("{}={:?}", name, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::from_tracing(&Level::INFO, true), LogLevel::Success);
        assert_eq!(LogLevel::from_tracing(&Level::INFO, false), LogLevel::Info);
        assert_eq!(LogLevel::from_tracing(&Level::WARN, false), LogLevel::Warning);
        assert_eq!(LogLevel::from_tracing(&Level::ERROR, true), LogLevel::Error);
    }

    #[test]
    fn test_file_line_layout() {
        let record = LogRecord::new(LogLevel::Info, "projects", "Modified: /p/a.txt");
        let line = record.file_line();
        let parts: Vec<&str> = line.split(" | ").collect();

        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].len(), "2026-01-01 00:00:00".len());
        assert_eq!(parts[1], "INFO    ");
        assert_eq!(parts[2], "projects");
        assert_eq!(parts[3], "Modified: /p/a.txt");
    }

    #[test]
    fn test_folder_line_omits_root() {
        let record = LogRecord::new(LogLevel::Warning, "projects", "Deleted: /p/sub/a.txt");
        assert!(record.folder_line().ends_with("| WARNING  | Deleted: /p/sub/a.txt"));
        assert!(!record.folder_line().contains("projects"));
    }

    #[test]
    fn test_plain_console_matches_file_line() {
        let record = LogRecord::new(LogLevel::Success, "SYSTEM", "Watcher stopped");
        assert_eq!(record.console_line(false), record.file_line());
    }
}
