//! Relational storage for videos, chapters and transcript chunks.
//!
//! [`Catalog`] is the narrow surface the indexer and the search engine
//! consume. Ingestion-side operations (registering videos, transcripts,
//! the indexed flag) live on [`SqliteStore`] directly.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::codec::ChunkKey;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A transcribed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Store-assigned id, root of every composite id derived from this video.
    pub id: u32,
    pub url: String,
    pub title: String,
    /// Upload date as reported by the platform (e.g. `20240131`).
    pub upload_date: Option<String>,
    /// Description with chapter lines removed.
    pub description: Option<String>,
    pub duration_seconds: Option<u32>,
    pub transcription: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// Whether the video has been written to the vector indexes.
    pub indexed: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a video.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewVideo {
    pub url: String,
    pub title: String,
    pub upload_date: Option<String>,
    pub description: Option<String>,
    pub duration_seconds: Option<u32>,
    pub transcription: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// `(timestamp, title)` pairs in order of appearance.
    pub chapters: Vec<(String, String)>,
}

/// An author-declared chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Ordinal within the video, starting at 1.
    pub id: u32,
    pub video_id: u32,
    /// Start time as `MM:SS` (or `HH:MM:SS`).
    pub timestamp: String,
    pub title: String,
}

/// One stored transcript window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub id: ChunkKey,
    pub video_id: u32,
    pub text: String,
}

/// Listing row for a stored video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSummary {
    pub id: u32,
    pub title: String,
    pub url: String,
    pub has_transcript: bool,
    pub indexed: bool,
    pub chunk_count: u32,
}

/// A video together with the chapter a search result points into.
#[derive(Debug, Clone)]
pub struct VideoDetails {
    pub video: Video,
    pub chapter: Option<Chapter>,
}

/// Store operations used by indexing and search.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Transcript text, `None` if the video is unknown or not transcribed yet.
    async fn get_transcription(&self, video_id: u32) -> Result<Option<String>>;

    /// Chapters of a video in order of appearance.
    async fn get_chapters(&self, video_id: u32) -> Result<Vec<Chapter>>;

    /// Store a single chunk.
    async fn insert_chunk(&self, chunk: &ChunkRecord) -> Result<()>;

    /// Store chunks atomically.
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize>;

    /// Remove chunks by id. Only used to undo a build whose index write failed.
    async fn remove_chunks(&self, ids: &[ChunkKey]) -> Result<usize>;

    async fn get_chunk_text(&self, id: ChunkKey) -> Result<Option<String>>;

    async fn get_video_url(&self, video_id: u32) -> Result<Option<String>>;

    /// Chapter ids are scoped per video, so the lookup needs both.
    async fn get_chapter_timestamp(&self, video_id: u32, chapter_id: u32) -> Result<Option<String>>;
}
