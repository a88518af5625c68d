//! SQLite-backed store.

use super::{Catalog, Chapter, ChunkRecord, NewVideo, Video, VideoDetails, VideoSummary};
use crate::codec::{ChapterKey, ChunkKey};
use crate::error::{Result, VidseekError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    upload_date TEXT,
    description TEXT,
    duration INTEGER,
    transcription TEXT,
    summary TEXT,
    indexed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    video_id INTEGER NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
    tag_name TEXT NOT NULL,
    UNIQUE(video_id, tag_name)
);

CREATE TABLE IF NOT EXISTS video_chapters (
    video_id INTEGER NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
    chapter_id INTEGER NOT NULL,
    timestamp TEXT NOT NULL,
    title TEXT NOT NULL,
    PRIMARY KEY (video_id, chapter_id)
);

CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY,
    video_id INTEGER NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
    text TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tags_video_id ON tags(video_id);
CREATE INDEX IF NOT EXISTS idx_chunks_video_id ON chunks(video_id);
"#;

const VIDEO_COLUMNS: &str = "id, url, title, upload_date, description, duration, \
                             transcription, summary, indexed, created_at";

/// SQLite-based store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn, Some(path))
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<&Path>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        if let Some(path) = path {
            info!("Initialized SQLite store at {:?}", path);
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VidseekError::Store(format!("Failed to acquire store lock: {}", e)))
    }

    fn video_from_row(row: &Row<'_>) -> rusqlite::Result<Video> {
        let created_at: String = row.get(9)?;
        Ok(Video {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            upload_date: row.get(3)?,
            description: row.get(4)?,
            duration_seconds: row.get(5)?,
            transcription: row.get(6)?,
            summary: row.get(7)?,
            indexed: row.get(8)?,
            tags: Vec::new(),
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }

    fn chapter_from_row(row: &Row<'_>) -> rusqlite::Result<Chapter> {
        Ok(Chapter {
            video_id: row.get(0)?,
            id: row.get(1)?,
            timestamp: row.get(2)?,
            title: row.get(3)?,
        })
    }
}

// Ingestion-side operations (not part of the Catalog trait)
impl SqliteStore {
    /// Register a video with its tags and chapters. Returns the new id.
    ///
    /// Chapters are numbered 1..N in the given order.
    #[instrument(skip(self, video), fields(url = %video.url))]
    pub fn insert_video(&self, video: &NewVideo) -> Result<u32> {
        if video.chapters.len() > ChapterKey::max_ordinal() as usize {
            return Err(VidseekError::InvalidInput(format!(
                "{} chapters exceed the limit of {}",
                video.chapters.len(),
                ChapterKey::max_ordinal()
            )));
        }

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let exists: Option<u32> = tx
            .query_row("SELECT id FROM videos WHERE url = ?1", params![video.url], |row| row.get(0))
            .optional()?;
        if let Some(video_id) = exists {
            return Err(VidseekError::DuplicateVideo {
                url: video.url.clone(),
                video_id,
            });
        }

        tx.execute(
            r#"
            INSERT INTO videos (url, title, upload_date, description, duration,
                                transcription, summary, indexed, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
            "#,
            params![
                video.url,
                video.title,
                video.upload_date,
                video.description,
                video.duration_seconds,
                video.transcription,
                video.summary,
                Utc::now().to_rfc3339(),
            ],
        )?;
        let video_id = u32::try_from(tx.last_insert_rowid())
            .map_err(|_| VidseekError::InvalidInput("video id out of range".to_string()))?;

        for tag in &video.tags {
            tx.execute(
                "INSERT OR IGNORE INTO tags (video_id, tag_name) VALUES (?1, ?2)",
                params![video_id, tag],
            )?;
        }

        for (ordinal, (timestamp, title)) in video.chapters.iter().enumerate() {
            tx.execute(
                "INSERT INTO video_chapters (video_id, chapter_id, timestamp, title) VALUES (?1, ?2, ?3, ?4)",
                params![video_id, ordinal as u32 + 1, timestamp, title],
            )?;
        }

        tx.commit()?;
        info!(
            "Registered video {} with {} tags and {} chapters",
            video_id,
            video.tags.len(),
            video.chapters.len()
        );
        Ok(video_id)
    }

    pub fn find_video_by_url(&self, url: &str) -> Result<Option<u32>> {
        let conn = self.lock()?;
        let id = conn
            .query_row("SELECT id FROM videos WHERE url = ?1", params![url], |row| row.get(0))
            .optional()?;
        Ok(id)
    }

    /// Fetch a video with its tags.
    pub fn get_video(&self, video_id: u32) -> Result<Option<Video>> {
        let conn = self.lock()?;

        let video = conn
            .query_row(
                &format!("SELECT {} FROM videos WHERE id = ?1", VIDEO_COLUMNS),
                params![video_id],
                Self::video_from_row,
            )
            .optional()?;

        let Some(mut video) = video else {
            return Ok(None);
        };

        let mut stmt = conn.prepare("SELECT tag_name FROM tags WHERE video_id = ?1 ORDER BY id")?;
        video.tags = stmt
            .query_map(params![video_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(Some(video))
    }

    pub fn set_transcription(&self, video_id: u32, transcription: &str) -> Result<()> {
        self.update_video_column(video_id, "transcription", transcription)
    }

    fn update_video_column(&self, video_id: u32, column: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            &format!("UPDATE videos SET {} = ?1 WHERE id = ?2", column),
            params![value, video_id],
        )?;
        if updated == 0 {
            return Err(VidseekError::VideoNotFound(video_id));
        }
        debug!("Updated {} for video {}", column, video_id);
        Ok(())
    }

    /// Record that a video's chunks and chapters are in the indexes.
    pub fn mark_indexed(&self, video_id: u32) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute("UPDATE videos SET indexed = 1 WHERE id = ?1", params![video_id])?;
        if updated == 0 {
            return Err(VidseekError::VideoNotFound(video_id));
        }
        Ok(())
    }

    pub fn is_indexed(&self, video_id: u32) -> Result<bool> {
        let conn = self.lock()?;
        let indexed: Option<bool> = conn
            .query_row("SELECT indexed FROM videos WHERE id = ?1", params![video_id], |row| row.get(0))
            .optional()?;
        indexed.ok_or(VidseekError::VideoNotFound(video_id))
    }

    /// Videos with a transcript that have not been indexed yet.
    pub fn pending_videos(&self) -> Result<Vec<u32>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM videos WHERE transcription IS NOT NULL AND indexed = 0 ORDER BY id",
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<u32>>>()?;
        Ok(ids)
    }

    pub fn list_videos(&self) -> Result<Vec<VideoSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT v.id, v.title, v.url, v.transcription IS NOT NULL, v.indexed,
                   (SELECT COUNT(*) FROM chunks c WHERE c.video_id = v.id)
            FROM videos v
            ORDER BY v.id
            "#,
        )?;

        let videos = stmt
            .query_map([], |row| {
                Ok(VideoSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    url: row.get(2)?,
                    has_transcript: row.get(3)?,
                    indexed: row.get(4)?,
                    chunk_count: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(videos)
    }

    /// A video and, optionally, one of its chapters.
    pub fn video_details(&self, video_id: u32, chapter_id: Option<u32>) -> Result<VideoDetails> {
        let video = self
            .get_video(video_id)?
            .ok_or(VidseekError::VideoNotFound(video_id))?;

        let chapter = match chapter_id {
            Some(chapter_id) => {
                let conn = self.lock()?;
                let chapter = conn
                    .query_row(
                        "SELECT video_id, chapter_id, timestamp, title FROM video_chapters \
                         WHERE video_id = ?1 AND chapter_id = ?2",
                        params![video_id, chapter_id],
                        Self::chapter_from_row,
                    )
                    .optional()?;
                Some(chapter.ok_or(VidseekError::ChapterNotFound(chapter_id))?)
            }
            None => None,
        };

        Ok(VideoDetails { video, chapter })
    }

    pub fn chunk_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl Catalog for SqliteStore {
    async fn get_transcription(&self, video_id: u32) -> Result<Option<String>> {
        let conn = self.lock()?;
        let transcription: Option<Option<String>> = conn
            .query_row(
                "SELECT transcription FROM videos WHERE id = ?1",
                params![video_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(transcription.flatten())
    }

    async fn get_chapters(&self, video_id: u32) -> Result<Vec<Chapter>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT video_id, chapter_id, timestamp, title FROM video_chapters \
             WHERE video_id = ?1 ORDER BY chapter_id",
        )?;
        let chapters = stmt
            .query_map(params![video_id], Self::chapter_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(chapters)
    }

    async fn insert_chunk(&self, chunk: &ChunkRecord) -> Result<()> {
        self.insert_chunks(std::slice::from_ref(chunk)).await?;
        Ok(())
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            tx.execute(
                "INSERT INTO chunks (id, video_id, text) VALUES (?1, ?2, ?3)",
                params![chunk.id.as_i64(), chunk.video_id, chunk.text],
            )?;
        }

        tx.commit()?;
        debug!("Inserted {} chunks", chunks.len());
        Ok(chunks.len())
    }

    async fn remove_chunks(&self, ids: &[ChunkKey]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        let mut removed = 0;
        for id in ids {
            removed += tx.execute("DELETE FROM chunks WHERE id = ?1", params![id.as_i64()])?;
        }

        tx.commit()?;
        info!("Removed {} chunks", removed);
        Ok(removed)
    }

    async fn get_chunk_text(&self, id: ChunkKey) -> Result<Option<String>> {
        let conn = self.lock()?;
        let text = conn
            .query_row("SELECT text FROM chunks WHERE id = ?1", params![id.as_i64()], |row| row.get(0))
            .optional()?;
        Ok(text)
    }

    async fn get_video_url(&self, video_id: u32) -> Result<Option<String>> {
        let conn = self.lock()?;
        let url = conn
            .query_row("SELECT url FROM videos WHERE id = ?1", params![video_id], |row| row.get(0))
            .optional()?;
        Ok(url)
    }

    async fn get_chapter_timestamp(&self, video_id: u32, chapter_id: u32) -> Result<Option<String>> {
        let conn = self.lock()?;
        let timestamp = conn
            .query_row(
                "SELECT timestamp FROM video_chapters WHERE video_id = ?1 AND chapter_id = ?2",
                params![video_id, chapter_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(timestamp)
    }
}
