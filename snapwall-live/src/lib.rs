//! # Snapwall Live
//!
//! Live event photo gallery synchronization engine:
//! - Optimistic mutation store with centralized dedup (`store`)
//! - Realtime reconciler folding channel deltas into the store
//!   (`reconciler`)
//! - Viewer presence roster (`presence`)
//! - Multi-file compression-and-upload pipeline with partial-failure
//!   recovery (`upload`)
//! - Pure derived views: feed, date buckets, contributor count, slideshow
//!   cursor (`views`)
//! - Per-event session wiring (`session`) and backend collaborator
//!   boundaries (`backend`)

pub mod backend;
pub mod presence;
pub mod reconciler;
pub mod session;
pub mod store;
pub mod upload;
pub mod views;

pub use backend::{HttpObjectStorage, ObjectStorage, PersistenceService};
pub use presence::PresenceRoster;
pub use session::{GallerySession, SessionContext};
pub use store::{GalleryStore, StoreChange};
pub use upload::{UploadError, UploadPipeline, UploadStatus, UploadSummary};
pub use views::{chronological_feed, contributor_count, date_buckets, SlideshowCursor};
