//! Realtime reconciler: applies channel deltas to the local store
//!
//! One reconciler task runs per active session. It subscribes to the event's
//! notification topic and folds inbound deltas into the store through the
//! same entry points the upload pipeline uses, so an uploader's own broadcast
//! echo deduplicates instead of duplicating. Presence deltas are routed to
//! the roster, never the store.
//!
//! No message order is assumed: the store's idempotent add/remove make
//! delete-before-add and add-after-remove converge to the same membership.

use std::sync::Arc;

use snapwall_common::events::GalleryEvent;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::presence::PresenceRoster;
use crate::store::GalleryStore;

/// Apply channel events to the store and roster until the channel closes
///
/// `RecvError::Lagged` opens a staleness window: the reconciler does not
/// replay missed history (the page-load collection delivery covers session
/// start) and simply resumes with new deltas.
pub async fn run_reconciler(
    mut rx: broadcast::Receiver<GalleryEvent>,
    store: Arc<GalleryStore>,
    presence: Arc<PresenceRoster>,
) {
    debug!("Reconciler started");

    loop {
        match rx.recv().await {
            Ok(event) => apply_event(event, &store, &presence).await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(
                    skipped,
                    "Reconciler lagged channel; continuing with new deltas"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("Channel sender dropped, reconciler shutting down");
                break;
            }
        }
    }

    debug!("Reconciler stopped");
}

/// Spawn the reconciler as a background task
pub fn spawn_reconciler(
    rx: broadcast::Receiver<GalleryEvent>,
    store: Arc<GalleryStore>,
    presence: Arc<PresenceRoster>,
) -> JoinHandle<()> {
    tokio::spawn(run_reconciler(rx, store, presence))
}

async fn apply_event(event: GalleryEvent, store: &GalleryStore, presence: &PresenceRoster) {
    match event {
        GalleryEvent::ImageUploaded { image } => {
            let id = image.id.clone();
            if store.add(image).await {
                debug!(%id, "Applied image_uploaded");
            } else {
                debug!(%id, "image_uploaded already applied");
            }
        }
        GalleryEvent::ImageDeleted { image_id } => {
            store.remove(&image_id).await;
            debug!(%image_id, "Applied image_deleted");
        }
        GalleryEvent::ViewerJoined { viewer_id } => {
            presence.apply_join(viewer_id).await;
        }
        GalleryEvent::ViewerLeft { viewer_id } => {
            presence.apply_leave(viewer_id).await;
        }
    }
}
