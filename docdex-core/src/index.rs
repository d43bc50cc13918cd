//! Flat vector index with single-file persistence.
//!
//! Vectors are held row-major in one contiguous buffer and searched
//! exhaustively under the squared Euclidean metric. The persisted
//! artifact is a single file carrying a fixed header, the raw vector
//! block as little-endian `f32`s, and a JSON metadata block, so an index
//! can never be split from its metadata on disk.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::document::ChunkMeta;
use crate::error::{Error, Result};

const MAGIC: &[u8] = b"docdex";
const FORMAT_VERSION: u16 = 1;

/// One search result at the store level: a row number and its distance
/// from the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    /// Zero-based row in insertion order.
    pub row: usize,
    /// Squared Euclidean distance from the query vector.
    pub distance: f32,
}

/// An exhaustive-scan vector store over fixed-dimension rows.
///
/// Rows keep insertion order, and row `i` always lines up with the
/// metadata record at position `i`. Mutation requires `&mut self`, so a
/// store is either being written or being searched, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dimension: usize,
    data: Vec<f32>,
    metadata: Vec<ChunkMeta>,
}

impl VectorIndex {
    /// Creates an empty index for vectors of `dimension` values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidArgument(
                "dimension must be greater than zero".into(),
            ));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
            metadata: Vec::new(),
        })
    }

    /// Vector length every row must have.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Whether the index holds no rows.
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Metadata record for `row`, if it exists.
    pub fn metadata(&self, row: usize) -> Option<&ChunkMeta> {
        self.metadata.get(row)
    }

    /// Vector stored at `row`, if it exists.
    pub fn vector(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.dimension)?;
        let end = start.checked_add(self.dimension)?;
        self.data.get(start..end)
    }

    /// Appends vectors and their metadata records in order.
    ///
    /// Validation happens before anything is written: on error the index
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the two slices differ in
    /// length or any vector's length differs from the index dimension.
    pub fn add(&mut self, vectors: Vec<Vec<f32>>, metadata: Vec<ChunkMeta>) -> Result<()> {
        if vectors.len() != metadata.len() {
            return Err(Error::DimensionMismatch {
                expected: vectors.len(),
                actual: metadata.len(),
            });
        }
        for vector in &vectors {
            if vector.len() != self.dimension {
                return Err(Error::DimensionMismatch {
                    expected: self.dimension,
                    actual: vector.len(),
                });
            }
        }
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(&vector);
        }
        self.metadata.extend(metadata);
        Ok(())
    }

    /// Scans every row and returns the `k` nearest to `query`, closest
    /// first.
    ///
    /// If fewer than `k` rows exist, all rows are returned; the result
    /// length is always `min(k, len)`. Ties break toward the lower row
    /// number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `query` has the wrong
    /// length and [`Error::IndexEmpty`] if the index has no rows.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if self.is_empty() {
            return Err(Error::IndexEmpty);
        }

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, vector)| SearchHit {
                row,
                distance: squared_distance(vector, query),
            })
            .collect();
        hits.sort_unstable_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.row.cmp(&b.row))
        });
        hits.truncate(k.min(hits.len()));
        Ok(hits)
    }

    /// Writes the index to a single artifact file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let meta = serde_json::to_vec(&self.metadata).map_err(|err| {
            Error::IndexCorrupt(format!("cannot encode metadata block: {err}"))
        })?;

        let mut buf = Vec::with_capacity(28 + self.data.len() * 4 + meta.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        buf.extend_from_slice(&(self.metadata.len() as u64).to_le_bytes());
        buf.extend_from_slice(&(meta.len() as u64).to_le_bytes());
        for value in &self.data {
            buf.extend_from_slice(&value.to_le_bytes());
        }
        buf.extend_from_slice(&meta);
        fs::write(path, buf)?;

        info!(
            path = %path.display(),
            rows = self.len(),
            dimension = self.dimension,
            "saved index"
        );
        Ok(())
    }

    /// Reads an index artifact back into memory, validating its
    /// structure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::IndexCorrupt`] if the magic, version, block sizes, or
    /// metadata fail validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let buf = fs::read(path)?;
        let mut offset = 0usize;

        let magic = take(&buf, &mut offset, MAGIC.len(), "magic")?;
        if magic != MAGIC {
            return Err(Error::IndexCorrupt("not an index artifact (bad magic)".into()));
        }
        let version = read_u16(&buf, &mut offset, "format version")?;
        if version != FORMAT_VERSION {
            return Err(Error::IndexCorrupt(format!(
                "unsupported format version {version}"
            )));
        }

        let dimension = read_u32(&buf, &mut offset, "dimension")? as usize;
        if dimension == 0 {
            return Err(Error::IndexCorrupt("zero dimension".into()));
        }
        let rows = read_usize(&buf, &mut offset, "row count")?;
        let meta_len = read_usize(&buf, &mut offset, "metadata length")?;

        let vector_bytes_len = rows
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::IndexCorrupt("vector block size overflows".into()))?;
        let vector_bytes = take(&buf, &mut offset, vector_bytes_len, "vector block")?;
        let data: Vec<f32> = vector_bytes
            .chunks_exact(4)
            .map(|bytes| {
                let mut arr = [0u8; 4];
                arr.copy_from_slice(bytes);
                f32::from_le_bytes(arr)
            })
            .collect();

        let meta_bytes = take(&buf, &mut offset, meta_len, "metadata block")?;
        if offset != buf.len() {
            return Err(Error::IndexCorrupt(format!(
                "{} trailing bytes after metadata block",
                buf.len() - offset
            )));
        }
        let metadata: Vec<ChunkMeta> = serde_json::from_slice(meta_bytes)
            .map_err(|err| Error::IndexCorrupt(format!("metadata block is not valid JSON: {err}")))?;
        if metadata.len() != rows {
            return Err(Error::IndexCorrupt(format!(
                "metadata holds {} records but header declares {} rows",
                metadata.len(),
                rows
            )));
        }

        info!(path = %path.display(), rows, dimension, "loaded index");
        Ok(Self {
            dimension,
            data,
            metadata,
        })
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn take<'a>(buf: &'a [u8], offset: &mut usize, len: usize, what: &str) -> Result<&'a [u8]> {
    let end = offset
        .checked_add(len)
        .ok_or_else(|| Error::IndexCorrupt(format!("{what} extends past addressable range")))?;
    let slice = buf
        .get(*offset..end)
        .ok_or_else(|| Error::IndexCorrupt(format!("artifact truncated reading {what}")))?;
    *offset = end;
    Ok(slice)
}

fn read_u16(buf: &[u8], offset: &mut usize, what: &str) -> Result<u16> {
    let bytes = take(buf, offset, 2, what)?;
    let mut arr = [0u8; 2];
    arr.copy_from_slice(bytes);
    Ok(u16::from_le_bytes(arr))
}

fn read_u32(buf: &[u8], offset: &mut usize, what: &str) -> Result<u32> {
    let bytes = take(buf, offset, 4, what)?;
    let mut arr = [0u8; 4];
    arr.copy_from_slice(bytes);
    Ok(u32::from_le_bytes(arr))
}

fn read_usize(buf: &[u8], offset: &mut usize, what: &str) -> Result<usize> {
    let bytes = take(buf, offset, 8, what)?;
    let mut arr = [0u8; 8];
    arr.copy_from_slice(bytes);
    usize::try_from(u64::from_le_bytes(arr))
        .map_err(|_| Error::IndexCorrupt(format!("{what} exceeds addressable range")))
}
