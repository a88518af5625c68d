//! In-memory vector index.
//!
//! Useful for testing and throwaway sessions; `persist` is a no-op.

use super::{FlatVectors, RawNeighbor, VectorIndex};
use crate::error::Result;

/// In-memory flat index.
#[derive(Debug, Clone)]
pub struct MemoryVectorIndex {
    vectors: FlatVectors,
}

impl MemoryVectorIndex {
    /// Create an empty index for vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            vectors: FlatVectors::new(dimensions),
        }
    }
}

impl VectorIndex for MemoryVectorIndex {
    fn dimensions(&self) -> usize {
        self.vectors.dimensions()
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn add(&mut self, entries: &[(i64, Vec<f32>)]) -> Result<()> {
        self.vectors.add(entries)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<RawNeighbor>> {
        self.vectors.search(query, k)
    }

    fn persist(&self) -> Result<()> {
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        self.vectors.truncate(len);
    }
}
