use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;

use crate::models::Snapshot;

/// Holds the current [`Snapshot`].
///
/// Snapshots are swapped in whole behind an `Arc`; the lock is only held for
/// the pointer clone or assignment, so readers never wait on a refresh cycle
/// and never see a snapshot under construction.
pub struct StatusPublisher {
    current: RwLock<Arc<Snapshot>>,
}

impl StatusPublisher {
    /// Starts out serving an empty snapshot stamped with the current time.
    pub fn new() -> Self {
        Self::with_snapshot(Snapshot::empty(Utc::now()))
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn current_snapshot(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Installs `snapshot` as current; the previous one is dropped once its
    /// last reader lets go of it.
    pub fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}
