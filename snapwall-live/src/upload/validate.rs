//! Per-file validation: type sniff and size ceiling
//!
//! Validation happens before any network call. The file's declared name or
//! extension is not trusted; the content is sniffed by magic bytes.

use snapwall_common::config::UploadConfig;
use snapwall_common::models::SelectedFile;

use super::UploadError;

/// Validate one selected file against the upload limits
///
/// Quota enforcement is a batch-level concern and lives in the pipeline's
/// selection step; this checks the per-file rules only.
pub fn validate_file(file: &SelectedFile, config: &UploadConfig) -> Result<(), UploadError> {
    if !infer::is_image(&file.bytes) {
        return Err(UploadError::InvalidType);
    }

    let size = file.bytes.len() as u64;
    if size > config.max_file_bytes {
        return Err(UploadError::TooLarge {
            size,
            limit: config.max_file_bytes,
        });
    }

    Ok(())
}

/// Sniffed MIME type for upload transfer, defaulting when unrecognized
pub(crate) fn sniff_content_type(bytes: &[u8]) -> &'static str {
    infer::get(bytes)
        .map(|t| t.mime_type())
        .unwrap_or("application/octet-stream")
}
