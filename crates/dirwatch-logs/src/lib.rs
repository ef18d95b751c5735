//! dirwatch logs - Console, master, error and per-folder log sinks
//!
//! Records enter through [`SinkLayer`], a `tracing_subscriber` layer, and are
//! routed by [`LogSinks`] to the console, `monitor.log`, `monitor-error.log`
//! and any folder sinks whose name filter matches the message.

mod layer;
mod record;
mod rotation;
mod sinks;
mod writer;

pub use layer::SinkLayer;
pub use record::{LogLevel, LogRecord, ROOT_FIELD, SUCCESS_FIELD};
pub use rotation::RotationConfig;
pub use sinks::{FolderSinkId, LogSinks, SinkSettings};
pub use writer::LogWriter;
