//! Query path: best transcript chunk, its chapter, and a playable reference.

use crate::chapters::parse_timestamp;
use crate::codec::{ChapterSpace, ChunkKey, ChunkSpace};
use crate::embedding::Embedder;
use crate::error::{Result, VidseekError};
use crate::reference::{embed_url, platform_video_id};
use crate::store::Catalog;
use crate::vector_index::KeyedIndex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// The single best match for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(serialize_with = "serialize_key")]
    pub chunk_id: ChunkKey,
    pub chunk_text: String,
    pub video_id: u32,
    /// Chapter of the same video, when the chapter search agrees on the video.
    pub chapter_id: Option<u32>,
    pub start_seconds: u32,
    pub video_reference_url: String,
}

fn serialize_key<S: serde::Serializer>(key: &ChunkKey, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_i64(key.as_i64())
}

/// Read-only search over the chunk and chapter indexes.
///
/// Searches take shared locks only. A search that overlaps a build may
/// not see the video being built yet.
pub struct SearchEngine {
    catalog: Arc<dyn Catalog>,
    embedder: Arc<dyn Embedder>,
    chunk_index: Arc<KeyedIndex<ChunkSpace>>,
    chapter_index: Arc<KeyedIndex<ChapterSpace>>,
    embed_base: String,
}

impl SearchEngine {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        embedder: Arc<dyn Embedder>,
        chunk_index: Arc<KeyedIndex<ChunkSpace>>,
        chapter_index: Arc<KeyedIndex<ChapterSpace>>,
        embed_base: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            embedder,
            chunk_index,
            chapter_index,
            embed_base: embed_base.into(),
        }
    }

    /// Find the closest transcript chunk and resolve where to play it from.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<QueryResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(VidseekError::InvalidInput("query is empty".to_string()));
        }

        let qvec = self.embedder.embed(query).await?;

        let chunk_hit = self.chunk_index.nearest(&qvec)?;
        let chunk_id = chunk_hit.id;
        let video_id = chunk_id.video_id();

        let chunk_text = self
            .catalog
            .get_chunk_text(chunk_id)
            .await?
            .ok_or(VidseekError::ChunkNotFound(chunk_id.as_i64()))?;

        let chapter_id = match self.chapter_index.nearest(&qvec) {
            Ok(hit) if hit.id.video_id() == video_id => Some(hit.id.ordinal()),
            Ok(hit) => {
                debug!(
                    "Nearest chapter {:?} belongs to another video than chunk {:?}, dropping it",
                    hit.id, chunk_id
                );
                None
            }
            Err(VidseekError::IndexEmpty(_)) => None,
            Err(e) => return Err(e),
        };

        let url = self
            .catalog
            .get_video_url(video_id)
            .await?
            .ok_or(VidseekError::VideoNotFound(video_id))?;
        let platform_id = platform_video_id(&url)?;

        let start_seconds = match chapter_id {
            Some(chapter_id) => {
                let timestamp = self
                    .catalog
                    .get_chapter_timestamp(video_id, chapter_id)
                    .await?
                    .ok_or(VidseekError::ChapterNotFound(chapter_id))?;
                parse_timestamp(&timestamp)?
            }
            None => 0,
        };

        info!(
            "Query matched chunk {:?} (distance {:.4}), chapter {:?}",
            chunk_id, chunk_hit.distance, chapter_id
        );

        Ok(QueryResult {
            chunk_id,
            chunk_text,
            video_id,
            chapter_id,
            start_seconds,
            video_reference_url: embed_url(&self.embed_base, &platform_id, start_seconds),
        })
    }
}
