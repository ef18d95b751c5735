//! Pairing of rename halves that notify reports as separate events

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::event::FsEvent;

struct PendingFrom {
    tracker: Option<usize>,
    path: PathBuf,
    deadline: Instant,
}

/// Stitches `From`/`To` rename halves back into moves.
///
/// A `From` is held until a `To` or `Both` with the same tracker shows up.
/// If none arrives before the timeout, the path left the watched tree and is
/// reported as deleted. A `To` with nothing pending came from outside the
/// tree and is reported as created. Every other event passes straight
/// through [`FsEvent::from_notify`].
pub struct RenamePairer {
    timeout: Duration,
    pending: Vec<PendingFrom>,
    /// Sources of completed moves; a directory's own untracked `From`
    /// trails its pair on inotify
    recent_sources: Vec<(PathBuf, Instant)>,
    /// Tracker of the last `From`/`To` pair, whose `Both` is redundant
    last_paired: Option<usize>,
}

impl RenamePairer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: Vec::new(),
            recent_sources: Vec::new(),
            last_paired: None,
        }
    }

    /// Translate one notify event, holding back unpaired `From` halves
    pub fn translate(&mut self, event: Event, now: Instant) -> Vec<FsEvent> {
        let tracker = event.tracker();
        match event.kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
                for path in event.paths {
                    self.hold(tracker, path, now);
                }
                Vec::new()
            }

            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
                let Some(dest) = event.paths.first().cloned() else {
                    return Vec::new();
                };
                match self.take_pending(tracker) {
                    Some(src) => {
                        self.last_paired = tracker;
                        self.recent_sources.push((src.clone(), now));
                        let is_dir = dest.is_dir();
                        vec![FsEvent::moved(src, dest, is_dir)]
                    }
                    None => FsEvent::from_notify(event),
                }
            }

            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                if tracker.is_some() && tracker == self.last_paired {
                    self.last_paired = None;
                    return Vec::new();
                }
                let moves = FsEvent::from_notify(event);
                for moved in &moves {
                    self.pending.retain(|p| p.path != moved.src_path);
                    self.recent_sources.push((moved.src_path.clone(), now));
                }
                moves
            }

            _ => FsEvent::from_notify(event),
        }
    }

    /// Report every held `From` whose deadline has passed as deleted
    pub fn expire(&mut self, now: Instant) -> Vec<FsEvent> {
        let timeout = self.timeout;
        self.recent_sources
            .retain(|(_, at)| now.saturating_duration_since(*at) < timeout);

        let mut expired = Vec::new();
        self.pending.retain(|p| {
            if p.deadline <= now {
                expired.push(FsEvent::deleted(p.path.clone(), false));
                false
            } else {
                true
            }
        });
        expired
    }

    /// Report everything still held as deleted, regardless of deadline
    pub fn flush(&mut self) -> Vec<FsEvent> {
        self.recent_sources.clear();
        self.last_paired = None;
        self.pending
            .drain(..)
            .map(|p| FsEvent::deleted(p.path, false))
            .collect()
    }

    /// Earliest moment a held `From` expires
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    fn hold(&mut self, tracker: Option<usize>, path: PathBuf, now: Instant) {
        if self.pending.iter().any(|p| p.path == path) {
            return;
        }
        if tracker.is_none() && self.recent_sources.iter().any(|(p, _)| *p == path) {
            return;
        }
        self.pending.push(PendingFrom {
            tracker,
            path,
            deadline: now + self.timeout,
        });
    }

    fn take_pending(&mut self, tracker: Option<usize>) -> Option<PathBuf> {
        let index = self.pending.iter().position(|p| p.tracker == tracker)?;
        Some(self.pending.remove(index).path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::CreateKind;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn rename(mode: RenameMode, paths: &[&str], tracker: Option<usize>) -> Event {
        let mut event = Event::new(EventKind::Modify(ModifyKind::Name(mode)));
        for p in paths {
            event = event.add_path(PathBuf::from(p));
        }
        match tracker {
            Some(t) => event.set_tracker(t),
            None => event,
        }
    }

    #[test]
    fn test_paired_halves_become_one_move() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let now = Instant::now();

        let from = rename(RenameMode::From, &["/w/a.txt"], Some(7));
        assert!(pairer.translate(from, now).is_empty());

        let to = rename(RenameMode::To, &["/w/b.txt"], Some(7));
        assert_eq!(
            pairer.translate(to, now),
            vec![FsEvent::moved("/w/a.txt", "/w/b.txt", false)]
        );

        let both = rename(RenameMode::Both, &["/w/a.txt", "/w/b.txt"], Some(7));
        assert!(pairer.translate(both, now).is_empty());

        assert!(pairer.expire(now + TIMEOUT * 2).is_empty());
        assert!(pairer.next_deadline().is_none());
    }

    #[test]
    fn test_both_alone_is_a_move() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let both = rename(RenameMode::Both, &["/w/a", "/w/b"], Some(1));
        assert_eq!(
            pairer.translate(both, Instant::now()),
            vec![FsEvent::moved("/w/a", "/w/b", false)]
        );
    }

    #[test]
    fn test_unmatched_from_expires_as_delete() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let now = Instant::now();

        let from = rename(RenameMode::From, &["/w/leaving.txt"], Some(3));
        assert!(pairer.translate(from, now).is_empty());
        assert_eq!(pairer.next_deadline(), Some(now + TIMEOUT));

        assert!(pairer.expire(now + TIMEOUT / 2).is_empty());
        assert_eq!(
            pairer.expire(now + TIMEOUT),
            vec![FsEvent::deleted("/w/leaving.txt", false)]
        );
        assert!(pairer.next_deadline().is_none());
    }

    #[test]
    fn test_unmatched_to_is_create() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let to = rename(RenameMode::To, &["/nowhere/incoming.txt"], Some(9));
        assert_eq!(
            pairer.translate(to, Instant::now()),
            vec![FsEvent::created("/nowhere/incoming.txt", false)]
        );
    }

    #[test]
    fn test_to_with_other_tracker_does_not_pair() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let now = Instant::now();

        pairer.translate(rename(RenameMode::From, &["/w/out.txt"], Some(1)), now);
        let to = rename(RenameMode::To, &["/nowhere/in.txt"], Some(2));
        assert_eq!(
            pairer.translate(to, now),
            vec![FsEvent::created("/nowhere/in.txt", false)]
        );
        assert_eq!(
            pairer.expire(now + TIMEOUT),
            vec![FsEvent::deleted("/w/out.txt", false)]
        );
    }

    #[test]
    fn test_directory_self_report_after_move_is_dropped() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let now = Instant::now();

        pairer.translate(rename(RenameMode::From, &["/w/old"], Some(5)), now);
        pairer.translate(rename(RenameMode::To, &["/w/new"], Some(5)), now);
        pairer.translate(rename(RenameMode::Both, &["/w/old", "/w/new"], Some(5)), now);
        assert!(pairer
            .translate(rename(RenameMode::From, &["/w/old"], None), now)
            .is_empty());

        assert!(pairer.expire(now + TIMEOUT).is_empty());
    }

    #[test]
    fn test_directory_moved_out_is_deleted_once() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let now = Instant::now();

        pairer.translate(rename(RenameMode::From, &["/w/sub"], Some(4)), now);
        pairer.translate(rename(RenameMode::From, &["/w/sub"], None), now);

        assert_eq!(pairer.expire(now + TIMEOUT), vec![FsEvent::deleted("/w/sub", false)]);
    }

    #[test]
    fn test_untracked_halves_pair_in_order() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let now = Instant::now();

        pairer.translate(rename(RenameMode::From, &["/w/a"], None), now);
        assert_eq!(
            pairer.translate(rename(RenameMode::To, &["/w/b"], None), now),
            vec![FsEvent::moved("/w/a", "/w/b", false)]
        );
    }

    #[test]
    fn test_flush_reports_everything_pending() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let now = Instant::now();

        pairer.translate(rename(RenameMode::From, &["/w/a"], Some(1)), now);
        pairer.translate(rename(RenameMode::From, &["/w/b"], Some(2)), now);

        assert_eq!(
            pairer.flush(),
            vec![FsEvent::deleted("/w/a", false), FsEvent::deleted("/w/b", false)]
        );
        assert!(pairer.next_deadline().is_none());
    }

    #[test]
    fn test_other_events_pass_through() {
        let mut pairer = RenamePairer::new(TIMEOUT);
        let event = Event::new(EventKind::Create(CreateKind::File)).add_path("/w/x.txt".into());
        assert_eq!(
            pairer.translate(event, Instant::now()),
            vec![FsEvent::created("/w/x.txt", false)]
        );
    }
}
