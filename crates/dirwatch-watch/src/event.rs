//! Translation of notify events into the four kinds dirwatch logs

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsEventKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

/// A filesystem change under a watched root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub src_path: PathBuf,
    /// Destination of a move; `None` for every other kind
    pub dest_path: Option<PathBuf>,
    pub is_directory: bool,
}

impl FsEvent {
    pub fn created(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self::single(FsEventKind::Created, path.into(), is_directory)
    }

    pub fn modified(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self::single(FsEventKind::Modified, path.into(), is_directory)
    }

    pub fn deleted(path: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self::single(FsEventKind::Deleted, path.into(), is_directory)
    }

    pub fn moved(src: impl Into<PathBuf>, dest: impl Into<PathBuf>, is_directory: bool) -> Self {
        Self {
            kind: FsEventKind::Moved,
            src_path: src.into(),
            dest_path: Some(dest.into()),
            is_directory,
        }
    }

    fn single(kind: FsEventKind, src_path: PathBuf, is_directory: bool) -> Self {
        Self {
            kind,
            src_path,
            dest_path: None,
            is_directory,
        }
    }

    /// Translate one notify event; a single notify event may name several paths
    pub fn from_notify(event: Event) -> Vec<FsEvent> {
        match event.kind {
            EventKind::Create(kind) => event
                .paths
                .into_iter()
                .map(|path| {
                    let is_dir = match kind {
                        CreateKind::Folder => true,
                        CreateKind::File => false,
                        _ => path.is_dir(),
                    };
                    FsEvent::created(path, is_dir)
                })
                .collect(),

            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                let mut paths = event.paths.into_iter();
                match (paths.next(), paths.next()) {
                    (Some(src), Some(dest)) => {
                        let is_dir = dest.is_dir();
                        vec![FsEvent::moved(src, dest, is_dir)]
                    }
                    _ => Vec::new(),
                }
            }

            // Backends without paired renames report each side on its own.
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event
                .paths
                .into_iter()
                .map(|path| {
                    if path.exists() {
                        let is_dir = path.is_dir();
                        FsEvent::created(path, is_dir)
                    } else {
                        FsEvent::deleted(path, false)
                    }
                })
                .collect(),

            // A half seen on its own crossed the root boundary. `RenamePairer`
            // only lets halves through here once no partner has arrived.
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
                .paths
                .into_iter()
                .map(|path| FsEvent::deleted(path, false))
                .collect(),

            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
                .paths
                .into_iter()
                .map(|path| {
                    let is_dir = path.is_dir();
                    FsEvent::created(path, is_dir)
                })
                .collect(),

            EventKind::Modify(ModifyKind::Name(RenameMode::Other)) => Vec::new(),

            EventKind::Modify(_) => event
                .paths
                .into_iter()
                .map(|path| {
                    let is_dir = path.is_dir();
                    FsEvent::modified(path, is_dir)
                })
                .collect(),

            EventKind::Remove(kind) => {
                let is_dir = matches!(kind, RemoveKind::Folder);
                event
                    .paths
                    .into_iter()
                    .map(|path| FsEvent::deleted(path, is_dir))
                    .collect()
            }

            EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
        }
    }
}
