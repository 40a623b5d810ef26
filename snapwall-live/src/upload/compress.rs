//! Best-effort image compression
//!
//! Compression is an optimization, not a correctness requirement: any decode
//! or encode failure falls back to the original bytes, and a "compressed"
//! result that is not actually smaller is discarded.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use snapwall_common::config::UploadConfig;
use tracing::debug;

/// Outcome of the compression step: the bytes to upload and their MIME type
pub struct CompressedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Compress image bytes: decode, bound the longest edge, re-encode as JPEG
pub fn compress_image(bytes: &[u8], config: &UploadConfig) -> image::ImageResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?;

    let max = config.max_dimension_px;
    let resized = if decoded.width() > max || decoded.height() > max {
        decoded.resize(max, max, FilterType::Lanczos3)
    } else {
        decoded
    };

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), config.jpeg_quality);
    rgb.write_with_encoder(encoder)?;
    Ok(out)
}

/// Compress with fallback to the original bytes
///
/// Returns the original when compression fails or does not shrink the file.
pub(crate) fn compress_or_original(
    name: &str,
    bytes: Vec<u8>,
    original_content_type: &'static str,
    config: &UploadConfig,
) -> CompressedFile {
    match compress_image(&bytes, config) {
        Ok(compressed) if compressed.len() < bytes.len() => {
            debug!(
                file = name,
                from = bytes.len(),
                to = compressed.len(),
                "Compressed image"
            );
            CompressedFile {
                bytes: compressed,
                content_type: "image/jpeg",
            }
        }
        Ok(_) => {
            debug!(file = name, "Compression did not shrink file, keeping original");
            CompressedFile {
                bytes,
                content_type: original_content_type,
            }
        }
        Err(e) => {
            debug!(file = name, error = %e, "Compression failed, keeping original");
            CompressedFile {
                bytes,
                content_type: original_content_type,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_compress_resizes_large_image() {
        let config = UploadConfig {
            max_dimension_px: 64,
            ..UploadConfig::default()
        };
        let original = sample_png(256, 128);

        let compressed = compress_image(&original, &config).unwrap();
        let reloaded = image::load_from_memory(&compressed).unwrap();
        assert!(reloaded.width() <= 64);
        assert!(reloaded.height() <= 64);
    }

    #[test]
    fn test_compress_rejects_garbage() {
        assert!(compress_image(b"definitely not an image", &UploadConfig::default()).is_err());
    }

    #[test]
    fn test_fallback_keeps_original_on_failure() {
        let bytes = b"garbage".to_vec();
        let result =
            compress_or_original("g.bin", bytes.clone(), "application/octet-stream", &UploadConfig::default());
        assert_eq!(result.bytes, bytes);
        assert_eq!(result.content_type, "application/octet-stream");
    }

    #[test]
    fn test_compressed_result_is_jpeg() {
        let config = UploadConfig {
            max_dimension_px: 32,
            jpeg_quality: 60,
            ..UploadConfig::default()
        };
        let original = sample_png(300, 300);
        let result = compress_or_original("p.png", original.clone(), "image/png", &config);

        if result.content_type == "image/jpeg" {
            assert!(result.bytes.len() < original.len());
            assert!(image::load_from_memory(&result.bytes).is_ok());
        } else {
            // Fallback path: original preserved untouched
            assert_eq!(result.bytes, original);
        }
    }
}
