//! Composite identifiers shared by the vector indexes and the store.
//!
//! A composite id packs a parent video id and a local ordinal into one
//! non-negative `i64`: `video_id * 10^W + ordinal`, where `W` is a fixed
//! number of decimal digits declared by the key space. Because the suffix
//! width never depends on the magnitude of the video id, decoding is
//! always the exact inverse of encoding.
//!
//! Each key space is its own type, so a chunk key can never be decoded as
//! a chapter key:
//!
//! ```
//! use vidseek::codec::{ChapterKey, ChunkKey};
//!
//! let chunk = ChunkKey::encode(12, 7).unwrap();
//! assert_eq!(chunk.as_i64(), 120007);
//! assert_eq!(chunk.decode(), (12, 7));
//!
//! let chapter = ChapterKey::encode(12, 3).unwrap();
//! assert_eq!(chapter.decode(), (12, 3));
//! ```

use crate::error::CodecError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A domain of composite identifiers backed by its own vector index.
pub trait KeySpace: Send + Sync + 'static {
    /// Human-readable name used in logs and errors.
    const NAME: &'static str;
    /// Decimal digits reserved for the local ordinal.
    const ORDINAL_DIGITS: u32;

    /// `10^ORDINAL_DIGITS`, the exclusive upper bound on ordinals.
    fn modulus() -> i64 {
        10_i64.pow(Self::ORDINAL_DIGITS)
    }
}

/// Key space for transcript chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpace;

impl KeySpace for ChunkSpace {
    const NAME: &'static str = "chunk";
    const ORDINAL_DIGITS: u32 = 4;
}

/// Key space for chapter titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterSpace;

impl KeySpace for ChapterSpace {
    const NAME: &'static str = "chapter";
    const ORDINAL_DIGITS: u32 = 4;
}

/// Id of a transcript chunk (chunk index key and `chunks.id` in the store).
pub type ChunkKey = CompositeId<ChunkSpace>;

/// Id of a chapter title in the chapter index.
pub type ChapterKey = CompositeId<ChapterSpace>;

/// A `(video_id, ordinal)` pair packed into a single integer key.
pub struct CompositeId<S: KeySpace> {
    raw: i64,
    space: PhantomData<S>,
}

impl<S: KeySpace> CompositeId<S> {
    /// Pack a video id and a local ordinal.
    ///
    /// Fails when the ordinal needs more than `S::ORDINAL_DIGITS` digits;
    /// it never wraps into the video id.
    pub fn encode(video_id: u32, ordinal: u32) -> Result<Self, CodecError> {
        let modulus = S::modulus();
        if i64::from(ordinal) >= modulus {
            return Err(CodecError::OrdinalOverflow {
                space: S::NAME,
                ordinal,
                digits: S::ORDINAL_DIGITS,
            });
        }

        // u32::MAX * 10^4 + 9999 is far below i64::MAX for any sane width.
        let raw = i64::from(video_id) * modulus + i64::from(ordinal);
        Ok(Self {
            raw,
            space: PhantomData,
        })
    }

    /// Wrap a raw key coming back from a vector index or the store.
    pub fn from_raw(raw: i64) -> Result<Self, CodecError> {
        if raw < 0 || raw / S::modulus() > i64::from(u32::MAX) {
            return Err(CodecError::InvalidId { space: S::NAME, raw });
        }
        Ok(Self {
            raw,
            space: PhantomData,
        })
    }

    /// Split back into `(video_id, ordinal)`.
    pub fn decode(self) -> (u32, u32) {
        let modulus = S::modulus();
        // Both casts are in range: construction bounds raw to [0, (u32::MAX + 1) * modulus).
        ((self.raw / modulus) as u32, (self.raw % modulus) as u32)
    }

    pub fn video_id(self) -> u32 {
        self.decode().0
    }

    pub fn ordinal(self) -> u32 {
        self.decode().1
    }

    /// The raw integer key.
    pub fn as_i64(self) -> i64 {
        self.raw
    }

    /// Largest ordinal this key space can hold.
    pub fn max_ordinal() -> u32 {
        (S::modulus() - 1) as u32
    }
}

impl<S: KeySpace> Clone for CompositeId<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: KeySpace> Copy for CompositeId<S> {}

impl<S: KeySpace> PartialEq for CompositeId<S> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<S: KeySpace> Eq for CompositeId<S> {}

impl<S: KeySpace> Hash for CompositeId<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<S: KeySpace> PartialOrd for CompositeId<S> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: KeySpace> Ord for CompositeId<S> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<S: KeySpace> fmt::Debug for CompositeId<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (video_id, ordinal) = self.decode();
        write!(f, "{}({}, {})", S::NAME, video_id, ordinal)
    }
}

impl<S: KeySpace> fmt::Display for CompositeId<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl<S: KeySpace> TryFrom<i64> for CompositeId<S> {
    type Error = CodecError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}

impl<S: KeySpace> From<CompositeId<S>> for i64 {
    fn from(id: CompositeId<S>) -> Self {
        id.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_round_trip_across_digit_boundaries() {
        let video_ids = [1, 9, 10, 99, 100, 999, 1000, 99_999, 100_000, 999_999, u32::MAX];
        let ordinals = [0, 1, 9, 10, 999, 1000, 9999];

        for &v in &video_ids {
            for &o in &ordinals {
                let chunk = ChunkKey::encode(v, o).unwrap();
                assert_eq!(chunk.decode(), (v, o), "chunk {} -> {}", v, o);

                let chapter = ChapterKey::encode(v, o).unwrap();
                assert_eq!(chapter.decode(), (v, o), "chapter {} -> {}", v, o);
            }
        }
    }

    #[test]
    fn test_round_trip_through_raw() {
        for v in [1_u32, 42, 999_999] {
            for o in [0_u32, 1, 5000, 9999] {
                let raw = ChunkKey::encode(v, o).unwrap().as_i64();
                assert_eq!(ChunkKey::from_raw(raw).unwrap().decode(), (v, o));
            }
        }
    }

    #[test]
    fn test_fixed_width_layout() {
        assert_eq!(ChunkKey::encode(3, 1).unwrap().as_i64(), 30001);
        assert_eq!(ChunkKey::encode(10, 1).unwrap().as_i64(), 100001);
        assert_eq!(ChapterKey::encode(123, 45).unwrap().as_i64(), 1230045);
        assert_eq!(ChunkKey::encode(0, 9999).unwrap().as_i64(), 9999);
    }

    #[test]
    fn test_video_digit_count_does_not_shift_split() {
        // 110001 could be (1, 10001) or (11, 1) if the split were guessed.
        let key = ChunkKey::from_raw(110001).unwrap();
        assert_eq!(key.decode(), (11, 1));

        let key = ChunkKey::encode(1, 1).unwrap();
        assert_eq!(key.as_i64(), 10001);
        assert_ne!(key, ChunkKey::encode(10, 1).unwrap());
    }

    #[test]
    fn test_collision_freedom() {
        let mut seen = HashSet::new();
        for v in [1_u32, 2, 9, 10, 11, 99, 100, 101, 999] {
            for o in (0..ChunkKey::max_ordinal()).step_by(37).chain([9999]) {
                let key = ChunkKey::encode(v, o).unwrap();
                assert!(seen.insert(key.as_i64()), "collision for ({}, {})", v, o);
            }
        }
    }

    #[test]
    fn test_overflow_rejected() {
        let err = ChunkKey::encode(5, 10_000).unwrap_err();
        assert_eq!(
            err,
            CodecError::OrdinalOverflow {
                space: "chunk",
                ordinal: 10_000,
                digits: 4
            }
        );

        assert!(ChapterKey::encode(5, 10_000).is_err());
        assert!(ChapterKey::encode(5, u32::MAX).is_err());
        assert_eq!(ChunkKey::max_ordinal(), 9999);
    }

    #[test]
    fn test_invalid_raw_ids() {
        assert!(ChunkKey::from_raw(-1).is_err());
        assert!(ChapterKey::from_raw(i64::MAX).is_err());
        assert!(ChunkKey::from_raw(0).is_ok());
    }

    #[test]
    fn test_debug_and_display() {
        let key = ChapterKey::encode(7, 2).unwrap();
        assert_eq!(key.to_string(), "70002");
        assert_eq!(format!("{:?}", key), "chapter(7, 2)");
    }
}
