//! dirwatch watch - Recursive directory watching and event logging

mod event;
mod handler;
mod rename;
mod session;

pub use event::{FsEvent, FsEventKind};
pub use handler::{Disposition, EventHandler};
pub use rename::RenamePairer;
pub use session::{shutdown_signal, WatchSession};
