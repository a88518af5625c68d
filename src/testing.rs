//! Test doubles for the embedding service and the store.

use crate::codec::ChunkKey;
use crate::embedding::Embedder;
use crate::error::{Result, VidseekError};
use crate::store::{Catalog, Chapter, ChunkRecord};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

/// Deterministic bag-of-words embedder.
///
/// Each lowercase word is hashed into a bucket and the counts are
/// L2-normalized, so texts sharing words land close together.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % self.dimensions as u64) as usize] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder that maps known texts to fixed vectors.
pub struct FixedEmbedder {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl FixedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: HashMap::new(),
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| VidseekError::EmbeddingUnavailable(format!("no vector for {:?}", text)))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder whose provider is always down.
pub struct UnavailableEmbedder;

#[async_trait]
impl Embedder for UnavailableEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(VidseekError::EmbeddingUnavailable("connection refused".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(VidseekError::EmbeddingUnavailable("connection refused".to_string()))
    }

    fn dimensions(&self) -> usize {
        0
    }
}

#[derive(Default)]
struct CatalogState {
    videos: HashMap<u32, (String, Option<String>)>,
    chapters: Vec<Chapter>,
    chunks: BTreeMap<i64, (u32, String)>,
}

/// In-memory catalog with caller-chosen ids.
#[derive(Default)]
pub struct MemoryCatalog {
    state: Mutex<CatalogState>,
}

impl MemoryCatalog {
    pub fn add_video(&self, video_id: u32, url: &str, transcription: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .videos
            .insert(video_id, (url.to_string(), transcription.map(str::to_string)));
    }

    pub fn add_chapter(&self, chapter: Chapter) {
        self.state.lock().unwrap().chapters.push(chapter);
    }

    pub fn chunk_count(&self) -> usize {
        self.state.lock().unwrap().chunks.len()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn get_transcription(&self, video_id: u32) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.videos.get(&video_id).and_then(|(_, t)| t.clone()))
    }

    async fn get_chapters(&self, video_id: u32) -> Result<Vec<Chapter>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .chapters
            .iter()
            .filter(|c| c.video_id == video_id)
            .cloned()
            .collect())
    }

    async fn insert_chunk(&self, chunk: &ChunkRecord) -> Result<()> {
        self.insert_chunks(std::slice::from_ref(chunk)).await?;
        Ok(())
    }

    async fn insert_chunks(&self, chunks: &[ChunkRecord]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        if let Some(dup) = chunks.iter().find(|c| state.chunks.contains_key(&c.id.as_i64())) {
            return Err(VidseekError::Store(format!("duplicate chunk id {}", dup.id)));
        }
        for chunk in chunks {
            state
                .chunks
                .insert(chunk.id.as_i64(), (chunk.video_id, chunk.text.clone()));
        }
        Ok(chunks.len())
    }

    async fn remove_chunks(&self, ids: &[ChunkKey]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter(|id| state.chunks.remove(&id.as_i64()).is_some())
            .count())
    }

    async fn get_chunk_text(&self, id: ChunkKey) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.chunks.get(&id.as_i64()).map(|(_, text)| text.clone()))
    }

    async fn get_video_url(&self, video_id: u32) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.videos.get(&video_id).map(|(url, _)| url.clone()))
    }

    async fn get_chapter_timestamp(&self, video_id: u32, chapter_id: u32) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .chapters
            .iter()
            .find(|c| c.video_id == video_id && c.id == chapter_id)
            .map(|c| c.timestamp.clone()))
    }
}
