//! Optimistic mutation store for one event's photo collection
//!
//! The store is the single writer of photo state for an active session. The
//! upload pipeline and the realtime reconciler both mutate it through the
//! same `add`/`remove`/`replace` entry points, so deduplication lives in one
//! place: an uploader's own broadcast echo, a delete racing ahead of an add,
//! or any re-delivery converges to the same final membership.
//!
//! Removed ids are remembered for the lifetime of the session. A late
//! `add` for an id that was already removed is suppressed, which is what
//! makes add/remove commutative per id.

use std::collections::HashSet;

use snapwall_common::models::{PhotoId, PhotoRecord};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Change notification emitted after every effective mutation
///
/// Derived-view consumers subscribe to recompute their projections.
#[derive(Debug, Clone)]
pub enum StoreChange {
    Added(PhotoId),
    Removed(PhotoId),
    Replaced {
        temporary: PhotoId,
        permanent: PhotoId,
    },
}

#[derive(Default)]
struct StoreState {
    /// Newest-first, as the gallery UI lists them
    photos: Vec<PhotoRecord>,
    /// Ids removed during this session; late adds for them are suppressed
    removed: HashSet<PhotoId>,
}

impl StoreState {
    fn position(&self, id: &PhotoId) -> Option<usize> {
        self.photos.iter().position(|p| &p.id == id)
    }
}

/// Shared in-memory photo collection for one event session
pub struct GalleryStore {
    state: RwLock<StoreState>,
    change_tx: broadcast::Sender<StoreChange>,
}

impl GalleryStore {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(64);
        Self {
            state: RwLock::new(StoreState::default()),
            change_tx,
        }
    }

    /// Subscribe to mutation notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.change_tx.subscribe()
    }

    /// Insert a record unless its id is already present or already removed
    ///
    /// Idempotent: the second add of the same id is a no-op. New records go
    /// to the front (newest-first). Returns whether an insert occurred.
    pub async fn add(&self, record: PhotoRecord) -> bool {
        let mut state = self.state.write().await;

        if state.removed.contains(&record.id) {
            debug!(id = %record.id, "Add suppressed: id was removed earlier this session");
            return false;
        }
        if state.position(&record.id).is_some() {
            debug!(id = %record.id, "Add suppressed: id already present");
            return false;
        }

        let id = record.id.clone();
        state.photos.insert(0, record);
        drop(state);

        self.notify(StoreChange::Added(id));
        true
    }

    /// Delete by id; a no-op (not an error) when absent
    ///
    /// The id is remembered as removed either way, so a delete observed
    /// before the matching add still wins. Returns whether a record was
    /// actually removed.
    pub async fn remove(&self, id: &PhotoId) -> bool {
        let mut state = self.state.write().await;

        let position = state.position(id);
        if let Some(i) = position {
            state.photos.remove(i);
        }
        state.removed.insert(id.clone());
        drop(state);

        if position.is_some() {
            self.notify(StoreChange::Removed(id.clone()));
            true
        } else {
            debug!(%id, "Remove of absent id recorded");
            false
        }
    }

    /// Atomically swap a temporary entry for its confirmed counterpart
    ///
    /// The permanent record takes the temporary entry's list position. If the
    /// permanent id already arrived via the channel the temp entry is simply
    /// dropped; if the permanent id was already removed (a delete raced ahead
    /// of confirmation) nothing is inserted.
    pub async fn replace(&self, temp_id: &PhotoId, permanent: PhotoRecord) {
        let mut state = self.state.write().await;

        let temp_position = state.position(temp_id);
        if state.removed.contains(&permanent.id) || state.position(&permanent.id).is_some() {
            if let Some(i) = temp_position {
                state.photos.remove(i);
                drop(state);
                self.notify(StoreChange::Removed(temp_id.clone()));
            }
            return;
        }

        let permanent_id = permanent.id.clone();
        match temp_position {
            Some(i) => state.photos[i] = permanent,
            None => state.photos.insert(0, permanent),
        }
        drop(state);

        self.notify(StoreChange::Replaced {
            temporary: temp_id.clone(),
            permanent: permanent_id,
        });
    }

    /// Rollback entry point for a failed backend delete
    ///
    /// Forgets the removed-id memory for the record and re-inserts it.
    /// Returns whether an insert occurred.
    pub async fn restore(&self, record: PhotoRecord) -> bool {
        let mut state = self.state.write().await;

        state.removed.remove(&record.id);
        if state.position(&record.id).is_some() {
            return false;
        }

        let id = record.id.clone();
        state.photos.insert(0, record);
        drop(state);

        self.notify(StoreChange::Added(id));
        true
    }

    /// Current collection, newest-first
    pub async fn snapshot(&self) -> Vec<PhotoRecord> {
        self.state.read().await.photos.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.photos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.photos.is_empty()
    }

    pub async fn contains(&self, id: &PhotoId) -> bool {
        self.state.read().await.position(id).is_some()
    }

    pub async fn find(&self, id: &PhotoId) -> Option<PhotoRecord> {
        let state = self.state.read().await;
        state.position(id).map(|i| state.photos[i].clone())
    }

    fn notify(&self, change: StoreChange) {
        // No subscribers is fine; views read snapshots on demand
        let _ = self.change_tx.send(change);
    }
}

impl Default for GalleryStore {
    fn default() -> Self {
        Self::new()
    }
}
