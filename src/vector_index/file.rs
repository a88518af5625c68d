//! File-backed vector index.
//!
//! One binary file per key space, little-endian:
//!
//! ```text
//! magic    "VSKX"     4 bytes
//! version  u16
//! dims     u32
//! count    u64
//! rows     count x (id: i64, vector: dims x f32)
//! ```
//!
//! The whole file is rewritten on every persist through a temporary file in
//! the same directory followed by an atomic rename, so readers never see a
//! half-written index.

use super::{FlatVectors, RawNeighbor, VectorIndex};
use crate::error::{Result, VidseekError};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

const MAGIC: [u8; 4] = *b"VSKX";
const VERSION: u16 = 1;
const HEADER_LEN: u64 = 4 + 2 + 4 + 8;

/// Flat index persisted to a single file.
#[derive(Debug)]
pub struct FileVectorIndex {
    path: PathBuf,
    vectors: FlatVectors,
}

impl FileVectorIndex {
    /// Open the index at `path`, or start an empty one if the file does not exist.
    ///
    /// Fails if an existing file was written with a different dimensionality.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(VidseekError::Config(
                "vector dimensions must be greater than zero".to_string(),
            ));
        }

        let vectors = if path.exists() {
            let vectors = Self::read_file(path)?;
            if vectors.dimensions() != dimensions {
                return Err(VidseekError::DimensionMismatch {
                    expected: dimensions,
                    actual: vectors.dimensions(),
                });
            }
            info!("Loaded {} vectors from {:?}", vectors.len(), path);
            vectors
        } else {
            debug!("No index at {:?}, starting empty", path);
            FlatVectors::new(dimensions)
        };

        Ok(Self {
            path: path.to_path_buf(),
            vectors,
        })
    }

    fn read_file(path: &Path) -> Result<FlatVectors> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(VidseekError::VectorIndex(format!(
                "{:?} is not a vector index file",
                path
            )));
        }

        let version = u16::from_le_bytes(read_array(&mut reader)?);
        if version != VERSION {
            return Err(VidseekError::VectorIndex(format!(
                "unsupported index version {} in {:?}",
                version, path
            )));
        }

        let dimensions = u32::from_le_bytes(read_array(&mut reader)?) as usize;
        let count = u64::from_le_bytes(read_array(&mut reader)?);

        let row_len = 8 + 4 * dimensions as u64;
        let expected_len = count
            .checked_mul(row_len)
            .and_then(|rows| rows.checked_add(HEADER_LEN));
        if dimensions == 0 || expected_len != Some(file_len) {
            return Err(VidseekError::VectorIndex(format!(
                "{:?} is truncated or corrupt ({} bytes for {} rows of dimension {})",
                path, file_len, count, dimensions
            )));
        }

        let count = count as usize;
        let mut ids = Vec::with_capacity(count);
        let mut data = Vec::with_capacity(count * dimensions);
        for _ in 0..count {
            ids.push(i64::from_le_bytes(read_array(&mut reader)?));
            for _ in 0..dimensions {
                data.push(f32::from_le_bytes(read_array(&mut reader)?));
            }
        }

        FlatVectors::from_parts(dimensions, ids, data)
    }

    fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&(self.vectors.dimensions() as u32).to_le_bytes())?;
        writer.write_all(&(self.vectors.len() as u64).to_le_bytes())?;

        for (id, vector) in self.vectors.rows() {
            writer.write_all(&id.to_le_bytes())?;
            for value in vector {
                writer.write_all(&value.to_le_bytes())?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

impl VectorIndex for FileVectorIndex {
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

    #[instrument(skip(self), fields(path = %self.path.display(), count = self.vectors.len()))]
    fn persist(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        self.write_to(BufWriter::new(temp.as_file_mut()))?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| VidseekError::Io(e.error))?;

        debug!("Persisted {} vectors", self.vectors.len());
        Ok(())
    }

    fn truncate(&mut self, len: usize) {
        self.vectors.truncate(len);
    }
}
