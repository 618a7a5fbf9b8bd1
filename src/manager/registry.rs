//! Registry of active downloads.
//!
//! Every mutation (`start`, `cancel`, a task settling its terminal state and
//! finally leaving) goes through one mutex, so a cancellation can never race
//! a task that completes on its own.

use crate::download::{DownloadState, TaskSnapshot};
use crate::error::{Error, Result};

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Live view of one task, written by the task and read by diagnostics.
pub(crate) type SharedSnapshot = Arc<RwLock<TaskSnapshot>>;

struct Entry {
    token: CancellationToken,
    snapshot: SharedSnapshot,
    destination: PathBuf,
}

#[derive(Default)]
struct Entries {
    by_id: HashMap<String, Entry>,
    closed: bool,
}

#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<Entries>,
}

impl Registry {
    /// Bind `id` to a new pending task writing `destination`.
    ///
    /// A destination stays claimed until its task leaves the registry, so two
    /// active tasks never share a file.
    pub(crate) fn insert(
        &self,
        id: &str,
        destination: &Path,
    ) -> Result<(CancellationToken, SharedSnapshot)> {
        let mut entries = self.entries.lock();
        if entries.closed {
            return Err(Error::ManagerClosed);
        }
        if entries.by_id.contains_key(id) {
            return Err(Error::DuplicateActiveDownload(id.to_string()));
        }
        if let Some((holder, _)) = entries
            .by_id
            .iter()
            .find(|(_, entry)| entry.destination == destination)
        {
            return Err(Error::DestinationInUse {
                path: destination.to_path_buf(),
                id: holder.clone(),
            });
        }

        let token = CancellationToken::new();
        let snapshot = Arc::new(RwLock::new(TaskSnapshot::pending(id)));
        entries.by_id.insert(
            id.to_string(),
            Entry {
                token: token.clone(),
                snapshot: Arc::clone(&snapshot),
                destination: destination.to_path_buf(),
            },
        );
        Ok((token, snapshot))
    }

    /// Signal the task bound to `id` to stop.
    ///
    /// A task whose terminal state is already settled counts as gone.
    pub(crate) fn cancel(&self, id: &str) -> Result<()> {
        let entries = self.entries.lock();
        match entries.by_id.get(id) {
            Some(entry) if !entry.snapshot.read().state.is_terminal() => {
                entry.token.cancel();
                Ok(())
            }
            _ => Err(Error::NotFound(id.to_string())),
        }
    }

    /// Fix the terminal state of `id`.
    ///
    /// An acknowledged cancellation always wins over the outcome the task
    /// reached on its own. Returns the state actually recorded.
    pub(crate) fn settle(&self, id: &str, proposed: DownloadState) -> DownloadState {
        let entries = self.entries.lock();
        let Some(entry) = entries.by_id.get(id) else {
            return proposed;
        };

        let state = if entry.token.is_cancelled() {
            DownloadState::Cancelled
        } else {
            proposed
        };
        entry.snapshot.write().advance(state);
        state
    }

    /// Drop the entry of a task that delivered its terminal event.
    pub(crate) fn remove(&self, id: &str) {
        self.entries.lock().by_id.remove(id);
    }

    pub(crate) fn snapshot(&self, id: &str) -> Option<TaskSnapshot> {
        self.entries
            .lock()
            .by_id
            .get(id)
            .map(|entry| entry.snapshot.read().clone())
    }

    pub(crate) fn snapshots(&self) -> HashMap<String, TaskSnapshot> {
        self.entries
            .lock()
            .by_id
            .iter()
            .map(|(id, entry)| (id.clone(), entry.snapshot.read().clone()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().by_id.len()
    }

    /// Refuse new tasks and cancel every running one. Returns how many were
    /// signalled.
    pub(crate) fn close(&self) -> usize {
        let mut entries = self.entries.lock();
        entries.closed = true;
        let mut cancelled = 0;
        for entry in entries.by_id.values() {
            if !entry.snapshot.read().state.is_terminal() {
                entry.token.cancel();
                cancelled += 1;
            }
        }
        cancelled
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.entries.lock().closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(id: &str) -> PathBuf {
        PathBuf::from(format!("/downloads/{}.bin", id))
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let registry = Registry::default();
        registry.insert("a", &dest("a")).unwrap();
        let err = registry.insert("a", &dest("a")).unwrap_err();
        assert!(matches!(err, Error::DuplicateActiveDownload(id) if id == "a"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_cancel_unknown_id() {
        let registry = Registry::default();
        assert!(matches!(registry.cancel("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_cancel_signals_token() {
        let registry = Registry::default();
        let (token, _) = registry.insert("a", &dest("a")).unwrap();
        registry.cancel("a").unwrap();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_acknowledged_cancel_wins_settlement() {
        let registry = Registry::default();
        let (_, snapshot) = registry.insert("a", &dest("a")).unwrap();
        snapshot.write().advance(DownloadState::Downloading);

        registry.cancel("a").unwrap();
        assert_eq!(registry.settle("a", DownloadState::Completed), DownloadState::Cancelled);
        assert_eq!(snapshot.read().state, DownloadState::Cancelled);
    }

    #[test]
    fn test_settled_task_cannot_be_cancelled_and_id_stays_taken() {
        let registry = Registry::default();
        let (token, snapshot) = registry.insert("a", &dest("a")).unwrap();
        snapshot.write().advance(DownloadState::Downloading);

        assert_eq!(registry.settle("a", DownloadState::Completed), DownloadState::Completed);
        assert!(matches!(registry.cancel("a"), Err(Error::NotFound(_))));
        assert!(!token.is_cancelled());
        assert!(matches!(
            registry.insert("a", &dest("a")),
            Err(Error::DuplicateActiveDownload(_))
        ));

        registry.remove("a");
        assert!(registry.insert("a", &dest("a")).is_ok());
    }

    #[test]
    fn test_close_cancels_and_refuses() {
        let registry = Registry::default();
        let (first, _) = registry.insert("a", &dest("a")).unwrap();
        let (second, _) = registry.insert("b", &dest("b")).unwrap();

        assert_eq!(registry.close(), 2);
        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
        assert!(registry.is_closed());
        assert!(matches!(registry.insert("c", &dest("c")), Err(Error::ManagerClosed)));
    }

    #[test]
    fn test_snapshots() {
        let registry = Registry::default();
        registry.insert("a", &dest("a")).unwrap();
        registry.insert("b", &dest("b")).unwrap();

        let snapshots = registry.snapshots();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots["a"].state, DownloadState::Pending);
        assert_eq!(registry.snapshot("b").unwrap().id, "b");
        assert!(registry.snapshot("c").is_none());
    }

    #[test]
    fn test_insert_rejects_destination_in_use() {
        let registry = Registry::default();
        let shared = Path::new("/downloads/same.bin");
        registry.insert("a", shared).unwrap();

        let err = registry.insert("b", shared).unwrap_err();
        assert!(matches!(err, Error::DestinationInUse { ref id, ref path } if id == "a" && path == shared));
        assert_eq!(registry.len(), 1);

        registry.remove("a");
        assert!(registry.insert("b", shared).is_ok());
    }

    #[test]
    fn test_close_skips_settled_tasks() {
        let registry = Registry::default();
        let (running, _) = registry.insert("a", &dest("a")).unwrap();
        let (settled, snapshot) = registry.insert("b", &dest("b")).unwrap();
        snapshot.write().advance(DownloadState::Failed);

        assert_eq!(registry.close(), 1);
        assert!(running.is_cancelled());
        assert!(!settled.is_cancelled());
    }
}
