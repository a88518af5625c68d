//! Error types for vidseek.

use thiserror::Error;

/// Errors raised by the composite identifier codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("{space} ordinal {ordinal} does not fit in {digits} digits")]
    OrdinalOverflow {
        space: &'static str,
        ordinal: u32,
        digits: u32,
    },

    #[error("{space} id {raw} is outside the encodable range")]
    InvalidId { space: &'static str, raw: i64 },
}

/// Library-level error type for vidseek operations.
#[derive(Error, Debug)]
pub enum VidseekError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Video {0} has no transcript yet")]
    NoTranscript(u32),

    #[error("Chunk {0} is in the vector index but missing from the store; rebuild both together")]
    ChunkNotFound(i64),

    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("The {0} index is empty")]
    IndexEmpty(&'static str),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("{url} is already imported as video {video_id}")]
    DuplicateVideo { url: String, video_id: u32 },

    #[error("Video not found: {0}")]
    VideoNotFound(u32),

    #[error("Chapter not found: {0}")]
    ChapterNotFound(u32),

    #[error("Invalid chapter timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl VidseekError {
    /// Whether the caller may reasonably retry the operation later.
    pub fn is_transient(&self) -> bool {
        matches!(self, VidseekError::EmbeddingUnavailable(_))
    }
}

/// Result type alias for vidseek operations.
pub type Result<T> = std::result::Result<T, VidseekError>;
