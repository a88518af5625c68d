//! vidseek - semantic search over video transcripts
//!
//! Transcripts are cut into overlapping token windows and chapter titles
//! are taken from video descriptions. Both are embedded into two vector
//! indexes, and a query is answered with the best matching window plus a
//! player URL that starts at the matching chapter.
//!
//! # Architecture
//!
//! - `codec` - composite ids joining a video id and a per-video ordinal
//! - `chunking` - transcript normalization and token windows
//! - `chapters` - chapter lines in descriptions and their timestamps
//! - `embedding` - embedding generation
//! - `vector_index` - exact nearest-neighbor indexes, in memory or on disk
//! - `store` - SQLite storage for videos, chapters and chunks
//! - `indexer` - writes one video into the store and both indexes
//! - `search` - resolves a query to a chunk, chapter and reference URL
//! - `orchestrator` - pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vidseek::config::Settings;
//! use vidseek::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     orchestrator.index_pending().await?;
//!     let hit = orchestrator.search("how does backpropagation work").await?;
//!     println!("{} -> {}", hit.chunk_text, hit.video_reference_url);
//!
//!     Ok(())
//! }
//! ```

pub mod chapters;
pub mod chunking;
pub mod cli;
pub mod codec;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod openai;
pub mod orchestrator;
pub mod reference;
pub mod search;
pub mod store;
pub mod vector_index;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, VidseekError};
