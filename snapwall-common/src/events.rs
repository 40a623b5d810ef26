//! Event types and the per-event notification channel
//!
//! Every active event has one `EventChannel` topic. The channel is a
//! notification bus, not a source of truth: subscribers reconcile the deltas
//! it carries into their own store, and convergence comes from the store's
//! idempotent operations rather than from message ordering.

use std::collections::HashSet;
use std::sync::{Arc, RwLock as StdRwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{PhotoId, PhotoRecord};

/// Gallery event types
///
/// Events are broadcast via `EventChannel` and serialized for SSE
/// transmission with the wire shapes the viewers expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GalleryEvent {
    /// A photo was persisted and is now part of the event's collection
    ///
    /// Also delivered to the uploader that created the photo (broadcast
    /// echo); receivers must apply it idempotently.
    ImageUploaded { image: PhotoRecord },

    /// A photo was removed from the event's collection
    ImageDeleted {
        #[serde(rename = "imageId")]
        image_id: PhotoId,
    },

    /// A viewer session attached to the event's channel
    ViewerJoined {
        #[serde(rename = "viewerId")]
        viewer_id: Uuid,
    },

    /// A viewer session left the event's channel
    ViewerLeft {
        #[serde(rename = "viewerId")]
        viewer_id: Uuid,
    },
}

impl GalleryEvent {
    /// Get event type as string for filtering and SSE event names
    pub fn event_type(&self) -> &str {
        match self {
            GalleryEvent::ImageUploaded { .. } => "image_uploaded",
            GalleryEvent::ImageDeleted { .. } => "image_deleted",
            GalleryEvent::ViewerJoined { .. } => "viewer_joined",
            GalleryEvent::ViewerLeft { .. } => "viewer_left",
        }
    }
}

/// Broadcast hub for one event's notification topic
///
/// Uses tokio::broadcast internally: subscribers receive events emitted
/// after subscription; a slow subscriber that overflows the buffer observes
/// a lag (staleness window) rather than blocking the publisher.
///
/// The hub also keeps the topic's current presence membership so a session
/// attaching late can seed its roster with the viewers announced before it
/// subscribed. Evicting viewers that vanish without an explicit leave is
/// likewise the hub's concern, not the subscribers'.
#[derive(Debug, Clone)]
pub struct EventChannel {
    event_id: Uuid,
    tx: broadcast::Sender<GalleryEvent>,
    viewers: Arc<StdRwLock<HashSet<Uuid>>>,
    capacity: usize,
}

impl EventChannel {
    /// Create a new channel topic for one event
    pub fn new(event_id: Uuid, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            event_id,
            tx,
            viewers: Arc::new(StdRwLock::new(HashSet::new())),
            capacity,
        }
    }

    /// The event this topic belongs to
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if no subscribers are
    /// listening.
    pub fn emit(
        &self,
        event: GalleryEvent,
    ) -> Result<usize, broadcast::error::SendError<GalleryEvent>> {
        self.track_presence(&event);
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: GalleryEvent) {
        self.track_presence(&event);
        let _ = self.tx.send(event);
    }

    /// Subscribe to all future events on this topic
    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.tx.subscribe()
    }

    /// Viewers announced on this topic so far
    ///
    /// The membership snapshot a late subscriber seeds its roster from.
    pub fn current_viewers(&self) -> Vec<Uuid> {
        self.viewers
            .read()
            .expect("presence lock poisoned")
            .iter()
            .copied()
            .collect()
    }

    fn track_presence(&self, event: &GalleryEvent) {
        match event {
            GalleryEvent::ViewerJoined { viewer_id } => {
                self.viewers
                    .write()
                    .expect("presence lock poisoned")
                    .insert(*viewer_id);
            }
            GalleryEvent::ViewerLeft { viewer_id } => {
                self.viewers
                    .write()
                    .expect("presence lock poisoned")
                    .remove(viewer_id);
            }
            _ => {}
        }
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
