//! # Snapwall Common Library
//!
//! Shared code for the Snapwall gallery crates including:
//! - Photo data model (PhotoRecord, PhotoId lifecycle)
//! - Event types (GalleryEvent enum) and the per-event EventChannel
//! - SSE bridge for channel subscriptions
//! - Configuration loading and logging initialization

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;

pub use error::{Error, Result};
pub use events::{EventChannel, GalleryEvent};
pub use models::{PhotoId, PhotoRecord, SelectedFile, UploadDestination};
