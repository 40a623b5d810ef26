//! Backend collaborator boundaries
//!
//! The persistent relational store and the object-storage service are
//! external to this engine; they are consumed through these traits only.
//! Tests substitute scriptable mocks.

use async_trait::async_trait;
use snapwall_common::models::{PhotoId, PhotoRecord, UploadDestination};
use snapwall_common::{Error, Result};
use tracing::debug;

/// Persistence service behind the gallery
///
/// Assumed idempotent enough that a retried create does not silently
/// double-count; that guarantee is the service's, not this engine's.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Request an upload destination for one file of an event
    async fn generate_upload_destination(
        &self,
        event_slug: &str,
        filename: &str,
    ) -> Result<UploadDestination>;

    /// Persist a photo record; returns the confirmed record with its
    /// permanent id
    async fn create_photo_record(
        &self,
        event_slug: &str,
        reference: &str,
        caption: Option<&str>,
    ) -> Result<PhotoRecord>;

    /// Delete a photo record by permanent id
    async fn delete_photo_record(&self, id: &PhotoId) -> Result<()>;
}

/// Object storage holding the image bytes
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Transfer bytes to the destination and return the publicly resolvable
    /// reference for the stored object
    async fn store(
        &self,
        destination: &UploadDestination,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}

/// HTTP-backed object storage: PUT to the signed upload target
///
/// The public reference is composed from a public base URL and the
/// destination's storage path.
pub struct HttpObjectStorage {
    client: reqwest::Client,
    public_base_url: String,
}

impl HttpObjectStorage {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, public_base_url: impl Into<String>) -> Self {
        Self {
            client,
            public_base_url: public_base_url.into(),
        }
    }

    fn public_reference(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn store(
        &self,
        destination: &UploadDestination,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        debug!(
            target_url = %destination.upload_target,
            size = bytes.len(),
            "Transferring object"
        );

        let response = self
            .client
            .put(&destination.upload_target)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| Error::Backend(format!("Object transfer failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Backend(format!(
                "Object transfer rejected with status {}",
                response.status()
            )));
        }

        Ok(self.public_reference(&destination.path))
    }
}
