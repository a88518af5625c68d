//! Transcript chunking into overlapping token windows.
//!
//! Transcripts are normalized (lowercased, whitespace collapsed), split
//! into word tokens, and cut into fixed-size windows that overlap so a
//! concept straddling a boundary is fully present in at least one chunk.

mod window;

pub use window::TextChunker;

use crate::error::{Result, VidseekError};
use serde::{Deserialize, Serialize};

/// Configuration for token windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Tokens per window.
    pub chunk_size: usize,
    /// Tokens shared between consecutive windows.
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Create a validated configuration.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that windows always advance.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(VidseekError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(VidseekError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    /// Number of tokens a window advances by.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            chunk_overlap: 20,
        }
    }
}

/// One window of transcript tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenWindow {
    /// 1-based position in emission order; becomes the chunk ordinal.
    pub ordinal: u32,
    /// Index of the first token in the normalized token stream.
    pub start: usize,
    /// Tokens in this window.
    pub tokens: Vec<String>,
}

impl TokenWindow {
    /// Chunk text: tokens joined with single spaces.
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
