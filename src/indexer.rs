//! Writes a video's transcript chunks and chapter titles into the indexes.
//!
//! A build runs once per newly transcribed video:
//!
//! 1. read the transcript (no transcript is a `NoTranscript` error the
//!    caller can treat as "nothing to do yet"),
//! 2. cut it into token windows and key each window as a [`ChunkKey`],
//! 3. key each chapter as a [`ChapterKey`],
//! 4. embed everything,
//! 5. store chunk rows, then append and persist each index.
//!
//! All keys and embeddings are computed before anything is written, so an
//! ordinal overflow or an embedding outage leaves the store and both
//! indexes untouched. If the chunk index cannot be persisted the chunk
//! rows are removed again.
//!
//! Builds are not idempotent: chunk ids are unique, so running the same
//! video twice fails on insert. Callers must run at most one build per
//! video, and never two builds for the same video concurrently.

use crate::chunking::TextChunker;
use crate::codec::{ChapterKey, ChapterSpace, ChunkKey, ChunkSpace};
use crate::embedding::Embedder;
use crate::error::{Result, VidseekError};
use crate::store::{Catalog, ChunkRecord};
use crate::vector_index::KeyedIndex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub video_id: u32,
    pub chunks_indexed: usize,
    pub chapters_indexed: usize,
}

/// Builds index entries for one video at a time.
pub struct IndexBuilder {
    catalog: Arc<dyn Catalog>,
    embedder: Arc<dyn Embedder>,
    chunk_index: Arc<KeyedIndex<ChunkSpace>>,
    chapter_index: Arc<KeyedIndex<ChapterSpace>>,
    chunker: TextChunker,
}

impl IndexBuilder {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        embedder: Arc<dyn Embedder>,
        chunk_index: Arc<KeyedIndex<ChunkSpace>>,
        chapter_index: Arc<KeyedIndex<ChapterSpace>>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            catalog,
            embedder,
            chunk_index,
            chapter_index,
            chunker,
        }
    }

    /// Chunk, embed and index one video.
    #[instrument(skip(self))]
    pub async fn run(&self, video_id: u32) -> Result<BuildReport> {
        let transcription = self
            .catalog
            .get_transcription(video_id)
            .await?
            .ok_or(VidseekError::NoTranscript(video_id))?;

        let windows = self.chunker.process(&transcription);
        let mut chunks = Vec::with_capacity(windows.len());
        for window in &windows {
            chunks.push(ChunkRecord {
                id: ChunkKey::encode(video_id, window.ordinal)?,
                video_id,
                text: window.text(),
            });
        }
        if chunks.is_empty() {
            warn!("Transcript of video {} has no words", video_id);
        }
        debug!("Video {} split into {} chunks", video_id, chunks.len());

        let chapters = self.catalog.get_chapters(video_id).await?;
        let chapter_keys = chapters
            .iter()
            .map(|chapter| ChapterKey::encode(video_id, chapter.id))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let chunk_texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let chunk_vectors = self.embedder.embed_batch(&chunk_texts).await?;

        let chapter_titles: Vec<String> = chapters.iter().map(|c| c.title.clone()).collect();
        let chapter_vectors = self.embedder.embed_batch(&chapter_titles).await?;

        if chunk_vectors.len() != chunks.len() || chapter_vectors.len() != chapters.len() {
            return Err(VidseekError::EmbeddingUnavailable(format!(
                "expected {} chunk and {} chapter embeddings, got {} and {}",
                chunks.len(),
                chapters.len(),
                chunk_vectors.len(),
                chapter_vectors.len()
            )));
        }

        let chunks_indexed = self.write_chunks(chunks, chunk_vectors).await?;

        let chapters_indexed = if chapter_keys.is_empty() {
            debug!("Video {} has no chapters", video_id);
            0
        } else {
            self.chapter_index
                .append(chapter_keys.into_iter().zip(chapter_vectors).collect())?
        };

        info!(
            "Indexed video {}: {} chunks, {} chapters",
            video_id, chunks_indexed, chapters_indexed
        );

        Ok(BuildReport {
            video_id,
            chunks_indexed,
            chapters_indexed,
        })
    }

    /// Store chunk rows, then append their vectors; undo the rows if the index write fails.
    async fn write_chunks(&self, chunks: Vec<ChunkRecord>, vectors: Vec<Vec<f32>>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        self.catalog.insert_chunks(&chunks).await?;

        let keys: Vec<ChunkKey> = chunks.iter().map(|c| c.id).collect();
        let batch = keys.iter().copied().zip(vectors).collect();

        match self.chunk_index.append(batch) {
            Ok(count) => Ok(count),
            Err(e) => {
                warn!("Chunk index write failed, removing {} stored chunks: {}", keys.len(), e);
                if let Err(undo) = self.catalog.remove_chunks(&keys).await {
                    warn!("Failed to remove chunks after index failure: {}", undo);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkingConfig;
    use crate::store::Chapter;
    use crate::testing::{HashEmbedder, MemoryCatalog, UnavailableEmbedder};
    use crate::vector_index::MemoryVectorIndex;

    const DIMS: usize = 64;

    struct Fixture {
        catalog: Arc<MemoryCatalog>,
        chunk_index: Arc<KeyedIndex<ChunkSpace>>,
        chapter_index: Arc<KeyedIndex<ChapterSpace>>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                catalog: Arc::new(MemoryCatalog::default()),
                chunk_index: Arc::new(KeyedIndex::new(MemoryVectorIndex::new(DIMS))),
                chapter_index: Arc::new(KeyedIndex::new(MemoryVectorIndex::new(DIMS))),
            }
        }

        fn builder(&self, embedder: Arc<dyn Embedder>, config: ChunkingConfig) -> IndexBuilder {
            IndexBuilder::new(
                self.catalog.clone(),
                embedder,
                self.chunk_index.clone(),
                self.chapter_index.clone(),
                TextChunker::new(config),
            )
        }
    }

    fn chapter(video_id: u32, id: u32, title: &str) -> Chapter {
        Chapter {
            id,
            video_id,
            timestamp: "00:00".to_string(),
            title: title.to_string(),
        }
    }

    #[tokio::test]
    async fn test_build_writes_chunks_and_chapters() {
        let fixture = Fixture::new();
        fixture.catalog.add_video(
            3,
            "https://www.youtube.com/watch?v=abc",
            Some("machine learning models require data"),
        );
        fixture.catalog.add_chapter(chapter(3, 2, "Introduction to ML"));

        let builder = fixture.builder(Arc::new(HashEmbedder::new(DIMS)), ChunkingConfig::default());
        let report = builder.run(3).await.unwrap();

        assert_eq!(
            report,
            BuildReport {
                video_id: 3,
                chunks_indexed: 1,
                chapters_indexed: 1
            }
        );

        let key = ChunkKey::encode(3, 1).unwrap();
        assert_eq!(
            fixture.catalog.get_chunk_text(key).await.unwrap().as_deref(),
            Some("machine learning models require data")
        );
        assert_eq!(fixture.chunk_index.len().unwrap(), 1);
        assert_eq!(fixture.chapter_index.len().unwrap(), 1);

        let embedder = HashEmbedder::new(DIMS);
        let hit = fixture
            .chapter_index
            .nearest(&embedder.embed("Introduction to ML").await.unwrap())
            .unwrap();
        assert_eq!(hit.id.decode(), (3, 2));
    }

    #[tokio::test]
    async fn test_chunk_ordinals_follow_windows() {
        let fixture = Fixture::new();
        let transcript = (0..25).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ");
        fixture.catalog.add_video(12, "https://youtu.be/xyz", Some(&transcript));

        let builder = fixture.builder(
            Arc::new(HashEmbedder::new(DIMS)),
            ChunkingConfig::new(10, 2).unwrap(),
        );
        let report = builder.run(12).await.unwrap();

        // Windows start at 0, 8, 16 and the last one reaches the end.
        assert_eq!(report.chunks_indexed, 3);
        assert_eq!(report.chapters_indexed, 0);
        for ordinal in 1..=3 {
            let key = ChunkKey::encode(12, ordinal).unwrap();
            assert!(fixture.catalog.get_chunk_text(key).await.unwrap().is_some());
        }
        assert_eq!(
            fixture
                .catalog
                .get_chunk_text(ChunkKey::encode(12, 3).unwrap())
                .await
                .unwrap()
                .as_deref(),
            Some("word16 word17 word18 word19 word20 word21 word22 word23 word24")
        );
        assert!(fixture.chapter_index.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_missing_transcript_is_no_transcript() {
        let fixture = Fixture::new();
        fixture.catalog.add_video(4, "https://youtu.be/none", None);

        let builder = fixture.builder(Arc::new(HashEmbedder::new(DIMS)), ChunkingConfig::default());

        assert!(matches!(builder.run(4).await, Err(VidseekError::NoTranscript(4))));
        assert!(matches!(builder.run(99).await, Err(VidseekError::NoTranscript(99))));
        assert!(fixture.chunk_index.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_embedding_outage_leaves_no_trace() {
        let fixture = Fixture::new();
        fixture.catalog.add_video(5, "https://youtu.be/out", Some("some words here"));
        fixture.catalog.add_chapter(chapter(5, 1, "Intro"));

        let builder = fixture.builder(Arc::new(UnavailableEmbedder), ChunkingConfig::default());

        assert!(matches!(
            builder.run(5).await,
            Err(VidseekError::EmbeddingUnavailable(_))
        ));
        assert_eq!(fixture.catalog.chunk_count(), 0);
        assert!(fixture.chunk_index.is_empty().unwrap());
        assert!(fixture.chapter_index.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_chunk_ordinal_overflow_is_rejected_before_writing() {
        let fixture = Fixture::new();
        let transcript = vec!["w"; 10_001].join(" ");
        fixture.catalog.add_video(6, "https://youtu.be/long", Some(&transcript));

        let builder = fixture.builder(
            Arc::new(HashEmbedder::new(DIMS)),
            ChunkingConfig::new(1, 0).unwrap(),
        );

        assert!(matches!(builder.run(6).await, Err(VidseekError::Codec(_))));
        assert_eq!(fixture.catalog.chunk_count(), 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_removes_stored_chunks() {
        let fixture = Fixture::new();
        fixture.catalog.add_video(8, "https://youtu.be/dims", Some("short transcript"));

        // Embedder produces 8-dimensional vectors for a 64-dimensional index.
        let builder = fixture.builder(Arc::new(HashEmbedder::new(8)), ChunkingConfig::default());

        assert!(matches!(
            builder.run(8).await,
            Err(VidseekError::DimensionMismatch { expected: 64, actual: 8 })
        ));
        assert_eq!(fixture.catalog.chunk_count(), 0);
        assert!(fixture.chunk_index.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_second_build_of_same_video_fails() {
        let fixture = Fixture::new();
        fixture.catalog.add_video(9, "https://youtu.be/twice", Some("index me once"));

        let builder = fixture.builder(Arc::new(HashEmbedder::new(DIMS)), ChunkingConfig::default());
        builder.run(9).await.unwrap();

        assert!(builder.run(9).await.is_err());
        assert_eq!(fixture.chunk_index.len().unwrap(), 1);
        assert_eq!(fixture.catalog.chunk_count(), 1);
    }
}
