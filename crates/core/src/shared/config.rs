use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_CHANNEL_CAPACITY, DEFAULT_GALLERY_CAPACITY,
    DEFAULT_SIMILARITY_THRESHOLD,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("similarity threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("gallery capacity must be at least 1")]
    InvalidCapacity,
    #[error("channel capacity must be at least 1")]
    InvalidChannelCapacity,
}

/// Tunables for identity fusion.
///
/// Every field has a default so a config file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub similarity_threshold: f64,
    pub gallery_capacity: usize,
    /// Feed embeddings of already-bound tracks back into their identity's
    /// gallery.
    pub reinforce_bound_tracks: bool,
    pub channel_capacity: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            gallery_capacity: DEFAULT_GALLERY_CAPACITY,
            reinforce_bound_tracks: true,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl FusionConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the per-user config file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config: {e}");
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.similarity_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        if self.gallery_capacity == 0 {
            return Err(ConfigError::InvalidCapacity);
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidChannelCapacity);
        }
        Ok(())
    }
}
