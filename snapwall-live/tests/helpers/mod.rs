//! Shared test doubles and utilities for integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use image::{ImageFormat, RgbImage};
use snapwall_common::models::{PhotoId, PhotoRecord, SelectedFile, UploadDestination};
use snapwall_common::{Error, Result};
use snapwall_live::{ObjectStorage, PersistenceService};
use uuid::Uuid;

/// Scriptable persistence service double
///
/// Issues sequential permanent ids (`perm-1`, `perm-2`, ...) and records
/// every confirmed photo so tests can replay the channel broadcast the real
/// backend would produce.
pub struct MockBackend {
    event_id: Uuid,
    uploader_id: Uuid,
    next_id: AtomicUsize,
    /// References whose `create_photo_record` call must fail
    pub fail_create_containing: Mutex<HashSet<String>>,
    /// Whether `delete_photo_record` fails
    pub fail_delete: AtomicBool,
    /// Confirmed records, in confirmation order
    pub created: Mutex<Vec<PhotoRecord>>,
    /// Ids handed to `delete_photo_record`
    pub deleted: Mutex<Vec<PhotoId>>,
}

impl MockBackend {
    pub fn new(event_id: Uuid, uploader_id: Uuid) -> Self {
        Self {
            event_id,
            uploader_id,
            next_id: AtomicUsize::new(1),
            fail_create_containing: Mutex::new(HashSet::new()),
            fail_delete: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_create_for(&self, reference_fragment: &str) {
        self.fail_create_containing
            .lock()
            .unwrap()
            .insert(reference_fragment.to_string());
    }

    pub fn created_records(&self) -> Vec<PhotoRecord> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl PersistenceService for MockBackend {
    async fn generate_upload_destination(
        &self,
        event_slug: &str,
        filename: &str,
    ) -> Result<UploadDestination> {
        Ok(UploadDestination {
            upload_target: format!("https://bucket.test/signed/{}/{}", event_slug, filename),
            path: format!("{}/{}", event_slug, filename),
        })
    }

    async fn create_photo_record(
        &self,
        _event_slug: &str,
        reference: &str,
        caption: Option<&str>,
    ) -> Result<PhotoRecord> {
        let should_fail = self
            .fail_create_containing
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| reference.contains(fragment));
        if should_fail {
            return Err(Error::Backend("create_photo_record failed".to_string()));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = PhotoRecord {
            id: PhotoId::from(format!("perm-{}", n)),
            event_id: self.event_id,
            uploader_id: self.uploader_id,
            image_url: reference.to_string(),
            caption: caption.map(|c| c.to_string()),
            created_at: Utc::now(),
        };
        self.created.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete_photo_record(&self, id: &PhotoId) -> Result<()> {
        self.deleted.lock().unwrap().push(id.clone());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::Backend("delete_photo_record failed".to_string()));
        }
        Ok(())
    }
}

/// Scriptable object storage double
pub struct MockStorage {
    /// File paths whose transfer must fail
    pub fail_paths_containing: Mutex<HashSet<String>>,
    /// Every transfer attempted, in order
    pub transfers: Mutex<Vec<String>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            fail_paths_containing: Mutex::new(HashSet::new()),
            transfers: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_transfer_for(&self, path_fragment: &str) {
        self.fail_paths_containing
            .lock()
            .unwrap()
            .insert(path_fragment.to_string());
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStorage for MockStorage {
    async fn store(
        &self,
        destination: &UploadDestination,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String> {
        self.transfers
            .lock()
            .unwrap()
            .push(destination.path.clone());

        let should_fail = self
            .fail_paths_containing
            .lock()
            .unwrap()
            .iter()
            .any(|fragment| destination.path.contains(fragment));
        if should_fail {
            return Err(Error::Backend("transfer failed".to_string()));
        }

        Ok(format!("https://cdn.test/{}", destination.path))
    }
}

/// A small real PNG so the compression path exercises an actual decode
pub fn png_file(name: &str) -> SelectedFile {
    let img = RgbImage::from_fn(16, 16, |x, y| image::Rgb([x as u8 * 16, y as u8 * 16, 64]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    SelectedFile::new(name, bytes)
}

/// Poll an async condition until it holds or the deadline passes
pub async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
