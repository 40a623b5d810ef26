//! Core data model for the live gallery
//!
//! A `PhotoRecord` is one uploaded image attached to one event. Records carry
//! either a temporary client-generated id (before the backend has confirmed
//! the upload) or a permanent backend-issued id. The `temp-` prefix is the
//! discriminator between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix that marks a client-generated placeholder id
const TEMP_ID_PREFIX: &str = "temp-";

/// Photo identifier: temporary (`temp-<uuid>`) or permanent (backend-issued)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(String);

impl PhotoId {
    /// Generate a fresh temporary id for an optimistic insert
    pub fn temporary() -> Self {
        Self(format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4()))
    }

    /// True if this id is a client-generated placeholder awaiting confirmation
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PhotoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PhotoId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One uploaded image attached to one event
///
/// Field names serialize camelCase to match the realtime channel payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub event_id: Uuid,
    pub uploader_id: Uuid,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PhotoRecord {
    /// Create an optimistic record with a temporary id, stamped now
    pub fn temporary(
        event_id: Uuid,
        uploader_id: Uuid,
        image_url: String,
        caption: Option<String>,
    ) -> Self {
        Self {
            id: PhotoId::temporary(),
            event_id,
            uploader_id,
            image_url,
            caption,
            created_at: Utc::now(),
        }
    }
}

/// Upload destination issued by the persistence service
///
/// `upload_target` is the (typically signed) URL the raw bytes are PUT to;
/// `path` is the stable storage path the public reference is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDestination {
    pub upload_target: String,
    pub path: String,
}

/// A file picked by the uploader, before validation
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}
