//! Configuration settings for vidseek.

use crate::chunking::ChunkingConfig;
use crate::error::{Result, VidseekError};
use crate::reference::DEFAULT_EMBED_BASE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub store: StoreSettings,
    pub index: IndexSettings,
    pub reference: ReferenceSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.vidseek".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
///
/// The same model must serve both indexes and every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions, fixed when the indexes are created.
    pub dimensions: u32,
    /// Base URL of an OpenAI-compatible endpoint (default: OpenAI).
    pub api_base: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            api_base: None,
        }
    }
}

/// Transcript windowing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Tokens per chunk.
    pub chunk_size: usize,
    /// Tokens shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        let config = ChunkingConfig::default();
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

/// Relational store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite database.
    pub sqlite_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.vidseek/videos.db".to_string(),
        }
    }
}

/// Vector index file locations, one per key space.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub chunk_index_path: String,
    pub chapter_index_path: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            chunk_index_path: "~/.vidseek/indexes/chunks.idx".to_string(),
            chapter_index_path: "~/.vidseek/indexes/chapters.idx".to_string(),
        }
    }
}

/// Playable reference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Base of the embeddable player URL.
    pub embed_base: String,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            embed_base: DEFAULT_EMBED_BASE.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| VidseekError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings that would break indexing.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.dimensions == 0 {
            return Err(VidseekError::Config(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }
        self.chunking_config().validate()
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vidseek")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }

    pub fn chunk_index_path(&self) -> PathBuf {
        Self::expand_path(&self.index.chunk_index_path)
    }

    pub fn chapter_index_path(&self) -> PathBuf {
        Self::expand_path(&self.index.chapter_index_path)
    }

    pub fn chunking_config(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.chunking.chunk_size,
            chunk_overlap: self.chunking.chunk_overlap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.chunk_size, 200);
        assert_eq!(settings.chunking.chunk_overlap, 20);
        assert_eq!(settings.embedding.dimensions, 1536);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[embedding]\nmodel = \"mistral-embed\"\ndimensions = 1024\napi_base = \"https://api.mistral.ai/v1\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.embedding.model, "mistral-embed");
        assert_eq!(settings.embedding.dimensions, 1024);
        assert_eq!(settings.chunking.chunk_size, 200);
        assert_eq!(settings.reference.embed_base, DEFAULT_EMBED_BASE);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.chunking.chunk_size = 120;
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.chunking.chunk_size, 120);
    }

    #[test]
    fn test_invalid_overlap_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chunking]\nchunk_size = 10\nchunk_overlap = 10\n").unwrap();

        assert!(matches!(
            Settings::load_from(Some(&path)),
            Err(VidseekError::Config(_))
        ));
    }

    #[test]
    fn test_expand_path() {
        let path = Settings::expand_path("/tmp/vidseek/videos.db");
        assert_eq!(path, PathBuf::from("/tmp/vidseek/videos.db"));
    }
}
