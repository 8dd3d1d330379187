//! Change debouncing for the dev server.
//!
//! Editors emit several filesystem events per save. Events are coalesced per
//! path and released together once no new event arrived for the quiet
//! period, so one save triggers one rebuild.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Kind of filesystem event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FsEventKind {
    Created,
    Modified,
    Removed,
}

/// A coalesced filesystem change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FsEvent {
    pub path: PathBuf,
    pub kind: FsEventKind,
}

/// Collects events until the watched tree goes quiet.
pub(crate) struct ChangeDebouncer {
    pending: BTreeMap<PathBuf, FsEventKind>,
    deadline: Option<Instant>,
    quiet_period: Duration,
}

impl ChangeDebouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            pending: BTreeMap::new(),
            deadline: None,
            quiet_period,
        }
    }

    /// Record an event observed at `now`, pushing the deadline back.
    pub fn record(&mut self, path: PathBuf, kind: FsEventKind, now: Instant) {
        use std::collections::btree_map::Entry;

        match self.pending.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(kind);
            }
            Entry::Occupied(mut entry) => match coalesce(*entry.get(), kind) {
                Some(kind) => *entry.get_mut() = kind,
                None => {
                    entry.remove();
                }
            },
        }
        self.deadline = Some(now + self.quiet_period);
    }

    /// When pending changes become ready, or `None` when nothing is pending.
    pub fn deadline(&self) -> Option<Instant> {
        if self.pending.is_empty() {
            None
        } else {
            self.deadline
        }
    }

    /// Take every pending change once the deadline has passed.
    pub fn take_ready(&mut self, now: Instant) -> Option<Vec<FsEvent>> {
        let deadline = self.deadline()?;
        if deadline > now {
            return None;
        }
        self.deadline = None;
        let events = std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(path, kind)| FsEvent { path, kind })
            .collect();
        Some(events)
    }
}

/// Merge a new event into a pending one.
///
/// Returns `None` when the pair cancels out (created then removed).
#[allow(clippy::match_same_arms)]
fn coalesce(existing: FsEventKind, new: FsEventKind) -> Option<FsEventKind> {
    use FsEventKind::{Created, Modified, Removed};

    match (existing, new) {
        (Created, Created | Modified) => Some(Created),
        (Created, Removed) => None,

        (Modified, Created) => Some(Created),
        (Modified, Modified) => Some(Modified),
        (Modified, Removed) => Some(Removed),

        // write-to-temp then rename shows up as remove + create
        (Removed, Created) => Some(Modified),
        (Removed, Modified | Removed) => Some(Removed),
    }
}
