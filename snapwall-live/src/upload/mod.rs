//! Multi-file upload pipeline
//!
//! Selection → validation → compression → sequential upload, with per-file
//! success/failure accounting. One upload is in flight at a time; a file's
//! failure never aborts the batch.

mod compress;
mod pipeline;
mod validate;

pub use compress::compress_image;
pub use pipeline::UploadPipeline;
pub use validate::validate_file;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use snapwall_common::models::{PhotoId, SelectedFile};
use thiserror::Error;
use uuid::Uuid;

/// Upload errors surfaced per file or per selection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Magic-byte sniff says the file is not an image
    #[error("File is not a supported image type")]
    InvalidType,

    /// File exceeds the per-file size ceiling
    #[error("File of {size} bytes exceeds the {limit} byte ceiling")]
    TooLarge { size: u64, limit: u64 },

    /// Selection would exceed the remaining photo quota; nothing is queued
    #[error("Selecting {selected} files exceeds the remaining quota of {remaining}")]
    TooManyFiles { selected: usize, remaining: usize },

    /// Byte transfer to object storage failed
    #[error("Upload transfer failed: {0}")]
    Transfer(String),

    /// Persistence confirmation failed after a successful transfer
    #[error("Photo record could not be persisted: {0}")]
    Persistence(String),
}

/// Per-file state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Compressing,
    Uploading,
    Done,
    Failed,
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStatus::Pending => write!(f, "pending"),
            UploadStatus::Compressing => write!(f, "compressing"),
            UploadStatus::Uploading => write!(f, "uploading"),
            UploadStatus::Done => write!(f, "done"),
            UploadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One file in a multi-file upload batch
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub file: SelectedFile,
    pub preview_url: String,
    pub caption: Option<String>,
    pub status: UploadStatus,
    pub error: Option<String>,
}

impl UploadJob {
    fn new(file: SelectedFile, preview_url: String) -> Self {
        Self {
            file,
            preview_url,
            caption: None,
            status: UploadStatus::Pending,
            error: None,
        }
    }
}

/// A file rejected during selection, with the reason
#[derive(Debug, Clone)]
pub struct FileRejection {
    pub name: String,
    pub reason: UploadError,
}

/// Batch outcome reported when processing finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub success_count: usize,
    pub error_count: usize,
}

/// Progress events emitted over the batch, `(current, total)` granularity
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum UploadEvent {
    BatchStarted {
        total: usize,
    },
    FileStarted {
        index: usize,
        total: usize,
        file_name: String,
    },
    FileCompleted {
        index: usize,
        photo_id: PhotoId,
    },
    FileFailed {
        index: usize,
        error: String,
    },
    BatchCompleted {
        success_count: usize,
        error_count: usize,
    },
}

/// Session-scoped registry of live preview resources
///
/// Stands in for the UI's object-URL table: selecting a file registers a
/// preview, removing the file (or finishing the batch) revokes it.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    urls: HashSet<String>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh preview URL
    pub fn create(&mut self) -> String {
        let url = format!("preview://{}", Uuid::new_v4());
        self.urls.insert(url.clone());
        url
    }

    /// Release a preview resource; unknown URLs are a no-op
    pub fn revoke(&mut self, url: &str) {
        self.urls.remove(url);
    }

    pub fn is_registered(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
