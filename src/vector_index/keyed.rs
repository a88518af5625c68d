//! Typed wrapper binding a vector index to one key space.

use super::VectorIndex;
use crate::codec::{CompositeId, KeySpace};
use crate::error::{Result, VidseekError};
use std::marker::PhantomData;
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// A search hit carrying a typed id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<S: KeySpace> {
    pub id: CompositeId<S>,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// A vector index that only accepts and returns ids of key space `S`.
pub struct KeyedIndex<S: KeySpace> {
    inner: RwLock<Box<dyn VectorIndex>>,
    space: PhantomData<S>,
}

impl<S: KeySpace> KeyedIndex<S> {
    pub fn new(index: impl VectorIndex + 'static) -> Self {
        Self {
            inner: RwLock::new(Box::new(index)),
            space: PhantomData,
        }
    }

    fn lock_error<E: std::fmt::Display>(e: E) -> VidseekError {
        VidseekError::VectorIndex(format!("Failed to acquire {} index lock: {}", S::NAME, e))
    }

    pub fn len(&self) -> Result<usize> {
        let index = self.inner.read().map_err(Self::lock_error)?;
        Ok(index.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Add a batch and persist it under a single write lock.
    ///
    /// If persisting fails the batch is removed again, so the in-memory
    /// index never runs ahead of what is on disk.
    pub fn append(&self, batch: Vec<(CompositeId<S>, Vec<f32>)>) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let entries: Vec<(i64, Vec<f32>)> = batch
            .into_iter()
            .map(|(id, vector)| (id.as_i64(), vector))
            .collect();

        let mut index = self.inner.write().map_err(Self::lock_error)?;
        let before = index.len();
        index.add(&entries)?;

        if let Err(e) = index.persist() {
            warn!("Persisting {} index failed, rolling back {} vectors", S::NAME, entries.len());
            index.truncate(before);
            return Err(e);
        }

        info!("Appended {} vectors to the {} index", entries.len(), S::NAME);
        Ok(entries.len())
    }

    /// Up to `k` nearest ids, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<S>>> {
        let index = self.inner.read().map_err(Self::lock_error)?;
        let hits = index.search(query, k)?;
        drop(index);

        hits.into_iter()
            .map(|hit| -> Result<Neighbor<S>> {
                Ok(Neighbor {
                    id: CompositeId::from_raw(hit.id)?,
                    distance: hit.distance,
                })
            })
            .collect()
    }

    /// The single nearest id; fails with `IndexEmpty` when nothing is stored.
    pub fn nearest(&self, query: &[f32]) -> Result<Neighbor<S>> {
        let hit = self
            .search(query, 1)?
            .into_iter()
            .next()
            .ok_or(VidseekError::IndexEmpty(S::NAME))?;
        debug!("Nearest {} is {:?} at {:.4}", S::NAME, hit.id, hit.distance);
        Ok(hit)
    }
}
