//! Viewer presence for one event session
//!
//! The roster reflects the membership snapshot the channel reports: joins and
//! leaves arrive as channel events and the session announces its own
//! presence on attach. Eviction of viewers that vanish without an explicit
//! leave is the channel's concern; the roster does no timeout bookkeeping.

use std::collections::HashSet;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Set of currently-announced viewer sessions for one event
///
/// Lives only as long as the session; the count resets to zero on remount.
pub struct PresenceRoster {
    viewers: RwLock<HashSet<Uuid>>,
}

impl PresenceRoster {
    pub fn new() -> Self {
        Self {
            viewers: RwLock::new(HashSet::new()),
        }
    }

    /// Record a viewer joining; duplicate joins are a no-op
    pub async fn apply_join(&self, viewer_id: Uuid) -> bool {
        let inserted = self.viewers.write().await.insert(viewer_id);
        if inserted {
            debug!(%viewer_id, "Viewer joined");
        }
        inserted
    }

    /// Record a viewer leaving; unknown viewers are a no-op
    pub async fn apply_leave(&self, viewer_id: Uuid) -> bool {
        let removed = self.viewers.write().await.remove(&viewer_id);
        if removed {
            debug!(%viewer_id, "Viewer left");
        }
        removed
    }

    /// Number of currently-connected viewers
    pub async fn active_viewers(&self) -> usize {
        self.viewers.read().await.len()
    }
}

impl Default for PresenceRoster {
    fn default() -> Self {
        Self::new()
    }
}
