//! Pipeline orchestrator for vidseek.
//!
//! Wires the store, the embedder and both vector indexes together and
//! guards the index builder with the store's indexed flag, so each video is
//! built at most once.

use crate::chapters::{clean_description, extract_chapters};
use crate::chunking::TextChunker;
use crate::codec::{ChapterSpace, ChunkSpace};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, VidseekError};
use crate::indexer::IndexBuilder;
use crate::reference::platform_video_id;
use crate::search::{QueryResult, SearchEngine};
use crate::store::{Catalog, Chapter, NewVideo, SqliteStore, VideoDetails, VideoSummary};
use crate::vector_index::{FileVectorIndex, KeyedIndex};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// A video to register.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    pub url: String,
    pub title: String,
    pub upload_date: Option<String>,
    /// Raw description; chapter lines are parsed out of it.
    pub description: Option<String>,
    pub duration_seconds: Option<u32>,
    pub transcription: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

/// Why an index request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyIndexed,
    NoTranscript,
}

/// Result of indexing one video.
#[derive(Debug)]
pub struct ProcessResult {
    pub video_id: u32,
    pub title: String,
    pub chunks_indexed: usize,
    pub chapters_indexed: usize,
    /// Set when the video was left untouched.
    pub skipped: Option<SkipReason>,
}

/// The main orchestrator for the vidseek pipeline.
pub struct Orchestrator {
    settings: Settings,
    store: Arc<SqliteStore>,
    builder: IndexBuilder,
    engine: SearchEngine,
    // Serializes builds so two requests for the same video cannot both pass the indexed check.
    build_lock: Mutex<()>,
}

impl Orchestrator {
    /// Open the store and both index files named in `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let dimensions = settings.embedding.dimensions as usize;
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            dimensions,
            settings.embedding.api_base.as_deref(),
        )?);

        let store = Arc::new(SqliteStore::new(&settings.sqlite_path())?);
        let chunk_index = Arc::new(KeyedIndex::new(FileVectorIndex::open(
            &settings.chunk_index_path(),
            dimensions,
        )?));
        let chapter_index = Arc::new(KeyedIndex::new(FileVectorIndex::open(
            &settings.chapter_index_path(),
            dimensions,
        )?));

        Ok(Self::with_components(settings, store, embedder, chunk_index, chapter_index))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        store: Arc<SqliteStore>,
        embedder: Arc<dyn Embedder>,
        chunk_index: Arc<KeyedIndex<ChunkSpace>>,
        chapter_index: Arc<KeyedIndex<ChapterSpace>>,
    ) -> Self {
        let builder = IndexBuilder::new(
            store.clone(),
            embedder.clone(),
            chunk_index.clone(),
            chapter_index.clone(),
            TextChunker::new(settings.chunking_config()),
        );
        let engine = SearchEngine::new(
            store.clone(),
            embedder,
            chunk_index,
            chapter_index,
            settings.reference.embed_base.clone(),
        );

        Self {
            settings,
            store,
            builder,
            engine,
            build_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> Arc<SqliteStore> {
        self.store.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register a video, parsing chapters out of its description.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub fn import_video(&self, request: ImportRequest) -> Result<u32> {
        platform_video_id(&request.url)?;
        if request.title.trim().is_empty() {
            return Err(VidseekError::InvalidInput("title must not be empty".to_string()));
        }
        if let Some(video_id) = self.store.find_video_by_url(&request.url)? {
            return Err(VidseekError::DuplicateVideo {
                url: request.url,
                video_id,
            });
        }

        let (description, chapters) = match request.description.as_deref() {
            Some(raw) => (Some(clean_description(raw)), extract_chapters(raw)),
            None => (None, Vec::new()),
        };

        let video_id = self.store.insert_video(&NewVideo {
            url: request.url,
            title: request.title,
            upload_date: request.upload_date,
            description,
            duration_seconds: request.duration_seconds,
            transcription: request.transcription,
            summary: request.summary,
            tags: request.tags,
            chapters,
        })?;

        info!("Imported video {}", video_id);
        Ok(video_id)
    }

    /// Attach or replace the transcript of a video that has not been indexed yet.
    pub fn set_transcription(&self, video_id: u32, transcription: &str) -> Result<()> {
        if self.store.is_indexed(video_id)? {
            return Err(VidseekError::InvalidInput(format!(
                "video {} is already indexed; its transcript can no longer change",
                video_id
            )));
        }
        self.store.set_transcription(video_id, transcription)
    }

    /// Build index entries for one video, unless it is already indexed.
    #[instrument(skip(self))]
    pub async fn index_video(&self, video_id: u32) -> Result<ProcessResult> {
        let _guard = self.build_lock.lock().await;

        let video = self
            .store
            .get_video(video_id)?
            .ok_or(VidseekError::VideoNotFound(video_id))?;

        let skipped = |reason: SkipReason| ProcessResult {
            video_id,
            title: video.title.clone(),
            chunks_indexed: 0,
            chapters_indexed: 0,
            skipped: Some(reason),
        };

        if video.indexed {
            info!("Video {} is already indexed, skipping", video_id);
            return Ok(skipped(SkipReason::AlreadyIndexed));
        }

        let report = match self.builder.run(video_id).await {
            Ok(report) => report,
            Err(VidseekError::NoTranscript(_)) => {
                info!("Video {} has no transcript yet, skipping", video_id);
                return Ok(skipped(SkipReason::NoTranscript));
            }
            Err(e) => return Err(e),
        };

        self.store.mark_indexed(video_id)?;

        Ok(ProcessResult {
            video_id,
            title: video.title.clone(),
            chunks_indexed: report.chunks_indexed,
            chapters_indexed: report.chapters_indexed,
            skipped: None,
        })
    }

    /// Index every transcribed video that is not indexed yet, in id order.
    ///
    /// Stops at the first failure; videos indexed before it stay indexed.
    pub async fn index_pending(&self) -> Result<Vec<ProcessResult>> {
        let pending = self.store.pending_videos()?;
        info!("{} videos pending", pending.len());

        let mut results = Vec::with_capacity(pending.len());
        for video_id in pending {
            match self.index_video(video_id).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Indexing video {} failed: {}", video_id, e);
                    return Err(e);
                }
            }
        }
        Ok(results)
    }

    pub async fn search(&self, query: &str) -> Result<QueryResult> {
        self.engine.search(query).await
    }

    /// Chapters of a video in order of appearance.
    pub async fn chapters(&self, video_id: u32) -> Result<Vec<Chapter>> {
        self.store.get_chapters(video_id).await
    }

    pub fn video_details(&self, video_id: u32, chapter_id: Option<u32>) -> Result<VideoDetails> {
        self.store.video_details(video_id, chapter_id)
    }

    pub fn list_videos(&self) -> Result<Vec<VideoSummary>> {
        self.store.list_videos()
    }
}
