//! Per-event gallery session wiring
//!
//! A session is constructed at page attach and torn down when the viewer
//! leaves: it seeds the store with the page-load collection, announces
//! presence on the channel, and runs the reconciler. There is no ambient
//! singleton; everything the pipeline and views need is handed out from
//! here.

use std::sync::Arc;

use snapwall_common::config::UploadConfig;
use snapwall_common::events::{EventChannel, GalleryEvent};
use snapwall_common::models::{PhotoId, PhotoRecord};
use snapwall_common::{Error, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{ObjectStorage, PersistenceService};
use crate::presence::PresenceRoster;
use crate::reconciler::spawn_reconciler;
use crate::store::GalleryStore;
use crate::upload::UploadPipeline;

/// Identities of one attached viewer session
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub event_id: Uuid,
    pub event_slug: String,
    /// This session's presence identity on the channel
    pub viewer_id: Uuid,
    /// The authenticated uploader behind the session
    pub uploader_id: Uuid,
}

/// One viewer's live connection to an event gallery
pub struct GallerySession {
    context: SessionContext,
    channel: EventChannel,
    store: Arc<GalleryStore>,
    presence: Arc<PresenceRoster>,
    backend: Arc<dyn PersistenceService>,
    reconciler: JoinHandle<()>,
}

impl GallerySession {
    /// Attach to an event: seed the store, announce presence, start the
    /// reconciler
    ///
    /// `initial_photos` is the full collection delivered once at page load;
    /// later deltas arrive through the channel only.
    pub async fn start(
        context: SessionContext,
        channel: EventChannel,
        backend: Arc<dyn PersistenceService>,
        initial_photos: Vec<PhotoRecord>,
    ) -> Self {
        let store = Arc::new(GalleryStore::new());
        let presence = Arc::new(PresenceRoster::new());

        // Page-load collection arrives newest-first; seed in reverse so the
        // store's front stays the newest record
        for record in initial_photos.into_iter().rev() {
            store.add(record).await;
        }

        // Subscribe before reading the membership snapshot: a join or leave
        // racing the snapshot is re-delivered through the receiver and
        // applies idempotently
        let rx = channel.subscribe();
        for viewer_id in channel.current_viewers() {
            presence.apply_join(viewer_id).await;
        }
        let reconciler = spawn_reconciler(rx, Arc::clone(&store), Arc::clone(&presence));

        channel.emit_lossy(GalleryEvent::ViewerJoined {
            viewer_id: context.viewer_id,
        });

        info!(
            event_id = %context.event_id,
            viewer_id = %context.viewer_id,
            photos = store.len().await,
            "Gallery session started"
        );

        Self {
            context,
            channel,
            store,
            presence,
            backend,
            reconciler,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// The session's shared photo collection
    pub fn store(&self) -> Arc<GalleryStore> {
        Arc::clone(&self.store)
    }

    /// Number of currently-connected viewers (including this session)
    pub async fn active_viewers(&self) -> usize {
        self.presence.active_viewers().await
    }

    /// Build an upload pipeline sharing this session's store
    pub fn upload_pipeline(
        &self,
        config: UploadConfig,
        storage: Arc<dyn ObjectStorage>,
        remaining_quota: usize,
    ) -> UploadPipeline {
        UploadPipeline::new(
            self.context.clone(),
            config,
            Arc::clone(&self.backend),
            storage,
            Arc::clone(&self.store),
            remaining_quota,
        )
    }

    /// Delete a photo: optimistic removal, rolled back if the backend fails
    ///
    /// On failure the record is re-inserted and the error is returned for a
    /// user-visible message; the gallery stays usable either way.
    pub async fn delete_photo(&self, id: &PhotoId) -> Result<()> {
        let record = self
            .store
            .find(id)
            .await
            .ok_or_else(|| Error::NotFound(format!("photo {}", id)))?;

        self.store.remove(id).await;

        match self.backend.delete_photo_record(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(%id, error = %e, "Delete failed, rolling back removal");
                self.store.restore(record).await;
                Err(e)
            }
        }
    }
}

impl Drop for GallerySession {
    fn drop(&mut self) {
        self.channel.emit_lossy(GalleryEvent::ViewerLeft {
            viewer_id: self.context.viewer_id,
        });
        self.reconciler.abort();
    }
}
