//! Per-root event handling: dedup, routing, and folder sink lifecycle

use dirwatch_core::bare_name;
use dirwatch_logs::LogSinks;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::event::{FsEvent, FsEventKind};

/// Outcome of handling one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Logged,
    Suppressed,
}

/// Turns the filesystem events of one watched root into log records.
///
/// A path that received a creation event stays in the recently-created set
/// until it is deleted, and every modification seen while it is there is
/// suppressed. Nothing expires entries, so the set grows with every file
/// created and never deleted during the session.
pub struct EventHandler {
    root: PathBuf,
    root_name: String,
    log_dir: PathBuf,
    sinks: LogSinks,
    recently_created: HashSet<PathBuf>,
}

impl EventHandler {
    pub fn new(root: PathBuf, log_dir: PathBuf, sinks: LogSinks) -> Self {
        Self {
            root_name: bare_name(&root),
            root,
            log_dir,
            sinks,
            recently_created: HashSet::new(),
        }
    }

    pub fn handle(&mut self, event: &FsEvent) -> Disposition {
        match event.kind {
            FsEventKind::Created => self.on_created(&event.src_path, event.is_directory),
            FsEventKind::Modified => self.on_modified(&event.src_path),
            FsEventKind::Deleted => self.on_deleted(&event.src_path, event.is_directory),
            FsEventKind::Moved => {
                let dest = event.dest_path.as_deref().unwrap_or(&event.src_path);
                self.on_moved(&event.src_path, dest)
            }
        }
    }

    fn on_created(&mut self, path: &Path, is_directory: bool) -> Disposition {
        self.recently_created.insert(path.to_path_buf());
        info!(root = %self.root_name, success = true, "Created: {}", path.display());

        if is_directory {
            if let Err(e) = self.sinks.add_folder_sink(path, &self.root, &self.log_dir) {
                error!(
                    root = %self.root_name,
                    "Failed to open folder log for {}: {}",
                    path.display(),
                    e
                );
            }
        }
        Disposition::Logged
    }

    fn on_modified(&mut self, path: &Path) -> Disposition {
        if self.recently_created.contains(path) {
            return Disposition::Suppressed;
        }
        info!(root = %self.root_name, "Modified: {}", path.display());
        Disposition::Logged
    }

    fn on_deleted(&mut self, path: &Path, is_directory: bool) -> Disposition {
        self.recently_created.remove(path);
        warn!(root = %self.root_name, "Deleted: {}", path.display());

        // Some backends cannot tell whether a removed path was a directory.
        if is_directory || self.sinks.has_folder_sink(path) {
            self.sinks.remove_folder_sink(path);
        }
        Disposition::Logged
    }

    fn on_moved(&mut self, src: &Path, dest: &Path) -> Disposition {
        info!(root = %self.root_name, "Moved: {} -> {}", src.display(), dest.display());
        Disposition::Logged
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn is_recently_created(&self, path: &Path) -> bool {
        self.recently_created.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirwatch_logs::SinkSettings;
    use std::fs;
    use tempfile::TempDir;
    use tracing_subscriber::layer::SubscriberExt;

    fn handler(dir: &TempDir) -> (EventHandler, LogSinks) {
        let log_dir = dir.path().join("logs");
        let sinks = LogSinks::configure(SinkSettings::new(&log_dir).with_console(false)).unwrap();
        let handler = EventHandler::new(PathBuf::from("/watched/photos"), log_dir, sinks.clone());
        (handler, sinks)
    }

    #[test]
    fn test_modify_after_create_is_suppressed() {
        let dir = TempDir::new().unwrap();
        let (mut handler, _sinks) = handler(&dir);
        let path = "/watched/photos/a.jpg";

        assert_eq!(handler.handle(&FsEvent::created(path, false)), Disposition::Logged);
        assert_eq!(handler.handle(&FsEvent::modified(path, false)), Disposition::Suppressed);
        assert_eq!(handler.handle(&FsEvent::modified(path, false)), Disposition::Suppressed);
        assert!(handler.is_recently_created(Path::new(path)));
    }

    #[test]
    fn test_modify_without_create_is_logged() {
        let dir = TempDir::new().unwrap();
        let (mut handler, _sinks) = handler(&dir);

        assert_eq!(
            handler.handle(&FsEvent::modified("/watched/photos/old.jpg", false)),
            Disposition::Logged
        );
    }

    #[test]
    fn test_delete_clears_recently_created() {
        let dir = TempDir::new().unwrap();
        let (mut handler, _sinks) = handler(&dir);
        let path = "/watched/photos/a.jpg";

        handler.handle(&FsEvent::created(path, false));
        handler.handle(&FsEvent::deleted(path, false));
        assert!(!handler.is_recently_created(Path::new(path)));

        // Deleting an unknown path is fine too
        handler.handle(&FsEvent::deleted("/watched/photos/never.jpg", false));

        handler.handle(&FsEvent::created(path, false));
        handler.handle(&FsEvent::deleted(path, false));
        assert_eq!(handler.handle(&FsEvent::modified(path, false)), Disposition::Logged);
    }

    #[test]
    fn test_move_leaves_set_untouched() {
        let dir = TempDir::new().unwrap();
        let (mut handler, _sinks) = handler(&dir);

        handler.handle(&FsEvent::created("/watched/photos/a.jpg", false));
        handler.handle(&FsEvent::moved("/watched/photos/a.jpg", "/watched/photos/b.jpg", false));

        assert!(handler.is_recently_created(Path::new("/watched/photos/a.jpg")));
        assert!(!handler.is_recently_created(Path::new("/watched/photos/b.jpg")));
        assert_eq!(
            handler.handle(&FsEvent::modified("/watched/photos/b.jpg", false)),
            Disposition::Logged
        );
    }

    #[test]
    fn test_directory_lifecycle_registers_one_sink() {
        let dir = TempDir::new().unwrap();
        let (mut handler, sinks) = handler(&dir);
        let sub = Path::new("/watched/photos/2024");

        handler.handle(&FsEvent::created(sub, true));
        assert_eq!(sinks.folder_sink_count(), 1);
        assert_eq!(
            sinks.folder_sink_path(sub),
            Some(dir.path().join("logs/folders/photos_2024.log"))
        );

        handler.handle(&FsEvent::deleted(sub, true));
        assert_eq!(sinks.folder_sink_count(), 0);

        // Second delete of the same directory is a no-op
        handler.handle(&FsEvent::deleted(sub, true));
        assert_eq!(sinks.folder_sink_count(), 0);
    }

    #[test]
    fn test_delete_with_unknown_kind_still_releases_sink() {
        let dir = TempDir::new().unwrap();
        let (mut handler, sinks) = handler(&dir);
        let sub = Path::new("/watched/photos/raw");

        handler.handle(&FsEvent::created(sub, true));
        handler.handle(&FsEvent::deleted(sub, false));
        assert!(!sinks.has_folder_sink(sub));
    }

    #[test]
    fn test_messages_and_levels() {
        let dir = TempDir::new().unwrap();
        let (mut handler, sinks) = handler(&dir);
        let subscriber = tracing_subscriber::registry().with(sinks.layer());

        tracing::subscriber::with_default(subscriber, || {
            handler.handle(&FsEvent::created("/watched/photos/a.jpg", false));
            handler.handle(&FsEvent::modified("/watched/photos/a.jpg", false));
            handler.handle(&FsEvent::modified("/watched/photos/b.jpg", false));
            handler.handle(&FsEvent::moved(
                "/watched/photos/b.jpg",
                "/watched/photos/c.jpg",
                false,
            ));
            handler.handle(&FsEvent::deleted("/watched/photos/a.jpg", false));
        });
        sinks.shutdown();

        let master = fs::read_to_string(dir.path().join("logs/monitor.log")).unwrap();
        let lines: Vec<&str> = master.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("| SUCCESS  | photos | Created: /watched/photos/a.jpg"));
        assert!(lines[1].ends_with("| INFO     | photos | Modified: /watched/photos/b.jpg"));
        assert!(lines[2].ends_with(
            "| INFO     | photos | Moved: /watched/photos/b.jpg -> /watched/photos/c.jpg"
        ));
        assert!(lines[3].ends_with("| WARNING  | photos | Deleted: /watched/photos/a.jpg"));
    }
}
