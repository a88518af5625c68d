//! Configuration module for vidseek.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, IndexSettings, ReferenceSettings,
    Settings, StoreSettings,
};
