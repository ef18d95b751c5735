//! Operator-facing messages printed before logging is configured

use colored::Colorize;
use dirwatch_core::{Error, InvalidDirectory};

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Report every rejected watch directory, then the summary line
pub fn print_startup_error(err: &anyhow::Error) {
    if let Some(Error::InvalidDirectories(invalid)) = err.downcast_ref::<Error>() {
        for dir in invalid {
            if let InvalidDirectory::NotADirectory(path) = dir {
                print_error(&format!("Not a directory: {}", path));
            }
        }
    }
    print_error(&format!("Error: {}", err));
}
