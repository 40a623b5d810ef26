//! Configuration loading and logging initialization
//!
//! Configuration is resolved in priority order:
//! 1. Explicit path (highest priority)
//! 2. `SNAPWALL_CONFIG` environment variable
//! 3. `<config_dir>/snapwall/config.toml`
//! 4. Compiled defaults (fallback)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SNAPWALL_CONFIG";

/// Top-level configuration for the gallery engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GalleryConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub slideshow: SlideshowConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter directive (overridden by RUST_LOG)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Realtime channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Number of events buffered per subscriber before lag sets in
    pub capacity: usize,
    /// SSE keep-alive interval in seconds
    pub keep_alive_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            keep_alive_secs: 15,
        }
    }
}

/// Upload pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Per-file size ceiling in bytes
    pub max_file_bytes: u64,
    /// Longest edge after compression, in pixels
    pub max_dimension_px: u32,
    /// JPEG re-encode quality (1-100)
    pub jpeg_quality: u8,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            max_dimension_px: 1920,
            jpeg_quality: 80,
        }
    }
}

/// Slideshow configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideshowConfig {
    /// Seconds between automatic cursor advances
    pub advance_interval_secs: u64,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            advance_interval_secs: 5,
        }
    }
}

/// Load configuration following the resolution priority order
///
/// Missing files fall through to the next priority; a file that exists but
/// fails to parse is an error.
pub fn load_config(explicit_path: Option<&Path>) -> Result<GalleryConfig> {
    if let Some(path) = explicit_path {
        return read_config_file(path);
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return read_config_file(Path::new(&path));
    }

    if let Some(path) = default_config_path() {
        if path.exists() {
            return read_config_file(&path);
        }
    }

    info!("No config file found, using compiled defaults");
    Ok(GalleryConfig::default())
}

/// Read and parse one TOML config file
pub fn read_config_file(path: &Path) -> Result<GalleryConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write a config file, creating parent directories as needed
pub fn write_config_file(config: &GalleryConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Platform config file location: `<config_dir>/snapwall/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("snapwall").join("config.toml"))
}

/// Initialize tracing with the configured default level
///
/// RUST_LOG takes precedence over the config file. Safe to call more than
/// once; later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
