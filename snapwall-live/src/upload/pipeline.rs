//! Sequential batch upload driver
//!
//! Files are uploaded one at a time, in selection order: a deliberate
//! backpressure choice that bounds bandwidth and keeps `(current, total)`
//! progress reporting simple. A single file's failure is counted and the
//! batch continues with the next file.

use std::sync::Arc;

use snapwall_common::config::UploadConfig;
use snapwall_common::models::{PhotoId, PhotoRecord, SelectedFile};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::backend::{ObjectStorage, PersistenceService};
use crate::session::SessionContext;
use crate::store::GalleryStore;

use super::compress::compress_or_original;
use super::validate::{sniff_content_type, validate_file};
use super::{
    FileRejection, PreviewRegistry, UploadError, UploadEvent, UploadJob, UploadStatus,
    UploadSummary,
};

/// Multi-file upload pipeline for one uploader session
///
/// Holds the pending selection (files, previews, captions) and drives the
/// batch through validate → compress → upload. The shared store is mutated
/// only through its `add`/`remove`/`replace` entry points, so the realtime
/// reconciler and this pipeline never observe each other's partial writes.
pub struct UploadPipeline {
    context: SessionContext,
    config: UploadConfig,
    backend: Arc<dyn PersistenceService>,
    storage: Arc<dyn ObjectStorage>,
    store: Arc<GalleryStore>,
    event_tx: Option<mpsc::Sender<UploadEvent>>,
    jobs: Vec<UploadJob>,
    previews: PreviewRegistry,
    remaining_quota: usize,
}

impl UploadPipeline {
    /// Create a new pipeline
    ///
    /// `remaining_quota` is the number of uploads the page-load collaborator
    /// still allows this uploader; it is decremented by successful uploads
    /// and never recomputed here.
    pub fn new(
        context: SessionContext,
        config: UploadConfig,
        backend: Arc<dyn PersistenceService>,
        storage: Arc<dyn ObjectStorage>,
        store: Arc<GalleryStore>,
        remaining_quota: usize,
    ) -> Self {
        Self {
            context,
            config,
            backend,
            storage,
            store,
            event_tx: None,
            jobs: Vec::new(),
            previews: PreviewRegistry::new(),
            remaining_quota,
        }
    }

    /// Create a pipeline with a progress event channel
    pub fn with_events(
        context: SessionContext,
        config: UploadConfig,
        backend: Arc<dyn PersistenceService>,
        storage: Arc<dyn ObjectStorage>,
        store: Arc<GalleryStore>,
        remaining_quota: usize,
        event_tx: mpsc::Sender<UploadEvent>,
    ) -> Self {
        let mut pipeline = Self::new(context, config, backend, storage, store, remaining_quota);
        pipeline.event_tx = Some(event_tx);
        pipeline
    }

    /// Add files to the pending selection
    ///
    /// The quota check comes first and is all-or-nothing: a selection that
    /// would exceed the remaining quota queues nothing. Surviving files are
    /// validated individually; rejected ones are reported while the valid
    /// remainder is queued with registered previews.
    pub fn select_files(
        &mut self,
        files: Vec<SelectedFile>,
    ) -> Result<Vec<FileRejection>, UploadError> {
        let available = self.remaining_quota.saturating_sub(self.jobs.len());
        if files.len() > available {
            return Err(UploadError::TooManyFiles {
                selected: files.len(),
                remaining: available,
            });
        }

        let mut rejections = Vec::new();
        for file in files {
            match validate_file(&file, &self.config) {
                Ok(()) => {
                    let preview_url = self.previews.create();
                    self.jobs.push(UploadJob::new(file, preview_url));
                }
                Err(reason) => {
                    debug!(file = %file.name, %reason, "File rejected during selection");
                    rejections.push(FileRejection {
                        name: file.name,
                        reason,
                    });
                }
            }
        }
        Ok(rejections)
    }

    /// Remove one not-yet-started file, revoking its preview
    pub fn remove_file(&mut self, index: usize) -> bool {
        match self.jobs.get(index) {
            Some(job) if job.status == UploadStatus::Pending => {
                let job = self.jobs.remove(index);
                self.previews.revoke(&job.preview_url);
                true
            }
            _ => false,
        }
    }

    /// Drop the whole pending selection, revoking every preview
    pub fn clear(&mut self) {
        for job in self.jobs.drain(..) {
            self.previews.revoke(&job.preview_url);
        }
    }

    /// Attach a caption to a pending file
    pub fn set_caption(&mut self, index: usize, caption: Option<String>) -> bool {
        match self.jobs.get_mut(index) {
            Some(job) => {
                job.caption = caption;
                true
            }
            None => false,
        }
    }

    /// Current selection state
    pub fn jobs(&self) -> &[UploadJob] {
        &self.jobs
    }

    /// Uploads the quota source still allows
    pub fn remaining_quota(&self) -> usize {
        self.remaining_quota
    }

    pub(crate) fn preview_count(&self) -> usize {
        self.previews.len()
    }

    /// Upload the selected batch, strictly sequentially
    ///
    /// Reports the aggregate outcome and resets the selection state whether
    /// or not every file succeeded.
    pub async fn process_batch(&mut self) -> UploadSummary {
        let total = self.jobs.len();
        let mut summary = UploadSummary {
            success_count: 0,
            error_count: 0,
        };
        if total == 0 {
            return summary;
        }

        info!(total, event_slug = %self.context.event_slug, "Upload batch started");
        self.emit_event(UploadEvent::BatchStarted { total }).await;

        for index in 0..total {
            let file_name = self.jobs[index].file.name.clone();
            self.emit_event(UploadEvent::FileStarted {
                index,
                total,
                file_name: file_name.clone(),
            })
            .await;

            let bytes = std::mem::take(&mut self.jobs[index].file.bytes);
            let caption = self.jobs[index].caption.clone();

            self.jobs[index].status = UploadStatus::Compressing;
            let original_content_type = sniff_content_type(&bytes);
            let compressed =
                compress_or_original(&file_name, bytes, original_content_type, &self.config);

            self.jobs[index].status = UploadStatus::Uploading;
            match self
                .upload_one(&file_name, compressed.bytes, compressed.content_type, caption)
                .await
            {
                Ok(photo_id) => {
                    self.jobs[index].status = UploadStatus::Done;
                    summary.success_count += 1;
                    self.emit_event(UploadEvent::FileCompleted { index, photo_id })
                        .await;
                }
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Upload failed, continuing batch");
                    self.jobs[index].status = UploadStatus::Failed;
                    self.jobs[index].error = Some(e.to_string());
                    summary.error_count += 1;
                    self.emit_event(UploadEvent::FileFailed {
                        index,
                        error: e.to_string(),
                    })
                    .await;
                }
            }
        }

        info!(
            success = summary.success_count,
            errors = summary.error_count,
            "Upload batch finished"
        );
        self.emit_event(UploadEvent::BatchCompleted {
            success_count: summary.success_count,
            error_count: summary.error_count,
        })
        .await;

        self.remaining_quota = self.remaining_quota.saturating_sub(summary.success_count);
        self.clear();
        summary
    }

    /// Upload one file: destination → transfer → optimistic add → persist
    ///
    /// A persistence failure after a successful transfer removes the
    /// optimistic entry again: an orphaned storage blob is preferred over a
    /// phantom gallery entry.
    async fn upload_one(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        content_type: &str,
        caption: Option<String>,
    ) -> Result<PhotoId, UploadError> {
        let destination = self
            .backend
            .generate_upload_destination(&self.context.event_slug, filename)
            .await
            .map_err(|e| UploadError::Transfer(e.to_string()))?;

        let reference = self
            .storage
            .store(&destination, bytes, content_type)
            .await
            .map_err(|e| UploadError::Transfer(e.to_string()))?;

        let temp = PhotoRecord::temporary(
            self.context.event_id,
            self.context.uploader_id,
            reference.clone(),
            caption.clone(),
        );
        let temp_id = temp.id.clone();
        self.store.add(temp).await;

        match self
            .backend
            .create_photo_record(&self.context.event_slug, &reference, caption.as_deref())
            .await
        {
            Ok(permanent) => {
                let photo_id = permanent.id.clone();
                self.store.replace(&temp_id, permanent).await;
                debug!(%photo_id, "Upload confirmed");
                Ok(photo_id)
            }
            Err(e) => {
                self.store.remove(&temp_id).await;
                Err(UploadError::Persistence(e.to_string()))
            }
        }
    }

    async fn emit_event(&self, event: UploadEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }
}
