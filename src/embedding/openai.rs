//! OpenAI-compatible embeddings implementation.

use super::Embedder;
use crate::error::{Result, VidseekError};
use crate::openai::{create_client_with, default_timeout};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Embedder backed by any OpenAI-compatible embeddings endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config("text-embedding-3-small", 1536, None)
    }

    /// Create an embedder with a custom model, dimensions and endpoint.
    pub fn with_config(model: &str, dimensions: usize, api_base: Option<&str>) -> Result<Self> {
        Ok(Self {
            client: create_client_with(api_base, default_timeout())?,
            model: model.to_string(),
            dimensions,
        })
    }

    /// Only the text-embedding-3 family accepts a requested dimensionality.
    fn supports_dimensions(&self) -> bool {
        self.model.starts_with("text-embedding-3")
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| VidseekError::EmbeddingUnavailable("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // Providers cap the batch size, process in chunks
        const BATCH_SIZE: usize = 100;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let mut args = CreateEmbeddingRequestArgs::default();
            args.model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()));
            if self.supports_dimensions() {
                args.dimensions(self.dimensions as u32);
            }

            let request = args
                .build()
                .map_err(|e| VidseekError::EmbeddingUnavailable(format!("Failed to build request: {}", e)))?;

            let response = self.client.embeddings().create(request).await.map_err(|e| {
                VidseekError::EmbeddingUnavailable(format!("Embedding API error: {}", e))
            })?;

            if response.data.len() != chunk.len() {
                return Err(VidseekError::EmbeddingUnavailable(format!(
                    "Expected {} embeddings, got {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                if embedding_data.embedding.len() != self.dimensions {
                    return Err(VidseekError::DimensionMismatch {
                        expected: self.dimensions,
                        actual: embedding_data.embedding.len(),
                    });
                }
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
