//! Nearest-neighbor indexes keyed by composite ids.
//!
//! A [`VectorIndex`] is an append-only exact (flat) index over fixed-size
//! `f32` vectors keyed by raw `i64` ids. [`KeyedIndex`] wraps one for a
//! single key space so callers only ever see typed ids.
//!
//! The builder is the only writer. Appends go through
//! [`KeyedIndex::append`], which adds and persists under one write lock and
//! rolls the in-memory state back if persisting fails, so a successful
//! append is always durable before it becomes visible.

mod file;
mod keyed;
mod memory;

pub use file::FileVectorIndex;
pub use keyed::{KeyedIndex, Neighbor};
pub use memory::MemoryVectorIndex;

use crate::error::{Result, VidseekError};

/// A raw search hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawNeighbor {
    /// Stored id.
    pub id: i64,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Dimensionality every stored vector must have.
    fn dimensions(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors. All vectors are validated before any is stored.
    fn add(&mut self, entries: &[(i64, Vec<f32>)]) -> Result<()>;

    /// Return up to `k` nearest ids, closest first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<RawNeighbor>>;

    /// Flush the current contents to durable storage.
    fn persist(&self) -> Result<()>;

    /// Drop everything after the first `len` vectors.
    fn truncate(&mut self, len: usize);
}

/// Contiguous id + vector storage shared by the backends.
#[derive(Debug, Clone, Default)]
pub(crate) struct FlatVectors {
    dimensions: usize,
    ids: Vec<i64>,
    data: Vec<f32>,
}

impl FlatVectors {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            ids: Vec::new(),
            data: Vec::new(),
        }
    }

    pub(crate) fn from_parts(dimensions: usize, ids: Vec<i64>, data: Vec<f32>) -> Result<Self> {
        if data.len() != ids.len() * dimensions {
            return Err(VidseekError::VectorIndex(format!(
                "{} ids do not match {} floats at dimension {}",
                ids.len(),
                data.len(),
                dimensions
            )));
        }
        Ok(Self {
            dimensions,
            ids,
            data,
        })
    }

    pub(crate) fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = (i64, &[f32])> {
        self.ids
            .iter()
            .copied()
            .zip(self.data.chunks_exact(self.dimensions.max(1)))
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(VidseekError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn add(&mut self, entries: &[(i64, Vec<f32>)]) -> Result<()> {
        for (_, vector) in entries {
            self.check_dimensions(vector)?;
        }

        self.ids.reserve(entries.len());
        self.data.reserve(entries.len() * self.dimensions);
        for (id, vector) in entries {
            self.ids.push(*id);
            self.data.extend_from_slice(vector);
        }
        Ok(())
    }

    pub(crate) fn search(&self, query: &[f32], k: usize) -> Result<Vec<RawNeighbor>> {
        self.check_dimensions(query)?;

        let mut hits: Vec<RawNeighbor> = self
            .rows()
            .map(|(id, vector)| RawNeighbor {
                id,
                distance: squared_l2(query, vector),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        hits.truncate(k);
        Ok(hits)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.ids.truncate(len);
        self.data.truncate(len * self.dimensions);
    }
}

/// Squared Euclidean distance between two equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert!((squared_l2(&[0.0, 0.0], &[3.0, 4.0]) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_flat_search_orders_by_distance_then_id() {
        let mut flat = FlatVectors::new(2);
        flat.add(&[
            (30, vec![5.0, 5.0]),
            (20, vec![1.0, 0.0]),
            (10, vec![1.0, 0.0]),
        ])
        .unwrap();

        let hits = flat.search(&[1.0, 0.1], 3).unwrap();
        assert_eq!(hits.iter().map(|h| h.id).collect::<Vec<_>>(), vec![10, 20, 30]);

        let hits = flat.search(&[1.0, 0.1], 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_flat_add_is_all_or_nothing() {
        let mut flat = FlatVectors::new(3);
        let err = flat
            .add(&[(1, vec![0.0, 0.0, 0.0]), (2, vec![0.0, 0.0])])
            .unwrap_err();

        assert!(matches!(
            err,
            VidseekError::DimensionMismatch { expected: 3, actual: 2 }
        ));
        assert_eq!(flat.len(), 0);
    }

    #[test]
    fn test_flat_truncate() {
        let mut flat = FlatVectors::new(1);
        flat.add(&[(1, vec![1.0]), (2, vec![2.0]), (3, vec![3.0])]).unwrap();
        flat.truncate(1);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat.rows().map(|(id, _)| id).collect::<Vec<_>>(), vec![1]);
    }
}
