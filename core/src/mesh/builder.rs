//! Deduplicating mesh builder.
//!
//! Turns a stream of face corners into a compact [`PackedVertex`] array and a
//! 16-bit index array with one entry per input corner.

use super::dedup::DedupCache;
use super::error::{AttributeChannel, MeshBuildError};
use super::vertex::{PackedVertex, make_key};

/// Most unique vertices a mesh may have.
pub const MAX_UNIQUE_VERTICES: usize = u16::MAX as usize;

/// Index arrays must be strictly shorter than this.
pub const MAX_INDEX_COUNT: usize = u16::MAX as usize + 1;

/// Attributes of one face corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceCorner {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub normal: [f32; 3],
}

impl FaceCorner {
    pub fn new(position: [f32; 3], texcoord: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            texcoord,
            normal,
        }
    }
}

/// Per-corner attribute indices as produced by OBJ-style loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CornerIndices {
    pub position: Option<u32>,
    pub texcoord: Option<u32>,
    pub normal: Option<u32>,
}

impl CornerIndices {
    pub fn new(position: u32, texcoord: u32, normal: u32) -> Self {
        Self {
            position: Some(position),
            texcoord: Some(texcoord),
            normal: Some(normal),
        }
    }
}

/// Indexed attribute pools plus the corner stream referencing them.
#[derive(Debug, Clone, Default)]
pub struct IndexedAttributes {
    pub positions: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub corners: Vec<CornerIndices>,
}

impl IndexedAttributes {
    /// Resolve every corner into its attribute values.
    ///
    /// # Errors
    ///
    /// Fails on the first corner with a missing or out-of-range index.
    pub fn resolve(&self) -> Result<Vec<FaceCorner>, MeshBuildError> {
        self.corners
            .iter()
            .enumerate()
            .map(|(corner, indices)| {
                Ok(FaceCorner {
                    position: fetch(
                        &self.positions,
                        indices.position,
                        corner,
                        AttributeChannel::Position,
                    )?,
                    texcoord: fetch(
                        &self.texcoords,
                        indices.texcoord,
                        corner,
                        AttributeChannel::Texcoord,
                    )?,
                    normal: fetch(
                        &self.normals,
                        indices.normal,
                        corner,
                        AttributeChannel::Normal,
                    )?,
                })
            })
            .collect()
    }
}

fn fetch<T: Copy>(
    pool: &[T],
    index: Option<u32>,
    corner: usize,
    channel: AttributeChannel,
) -> Result<T, MeshBuildError> {
    let index = index.ok_or(MeshBuildError::MissingAttribute { corner, channel })?;
    pool.get(index as usize)
        .copied()
        .ok_or(MeshBuildError::AttributeOutOfRange {
            corner,
            channel,
            index,
        })
}

/// Output of a successful build.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Unique vertices in first-seen order.
    pub vertices: Vec<PackedVertex>,
    /// One index per input corner.
    pub indices: Vec<u16>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Incremental mesh builder.
///
/// ```ignore
/// let mut builder = MeshBuilder::new();
/// for corner in &corners {
///     builder.push_corner(corner)?;
/// }
/// let mesh = builder.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct MeshBuilder {
    cache: DedupCache,
    indices: Vec<u32>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(corners: usize) -> Self {
        Self {
            cache: DedupCache::with_capacity(corners),
            indices: Vec::with_capacity(corners),
        }
    }

    /// Append one face corner, resolving it through the dedup cache.
    ///
    /// Only the U texture coordinate takes part in identity.
    pub fn push_corner(&mut self, corner: &FaceCorner) -> Result<(), MeshBuildError> {
        let key = make_key(corner.position, corner.texcoord[0], corner.normal).ok_or(
            MeshBuildError::InvalidNormal {
                corner: self.indices.len(),
            },
        )?;
        let index = self.cache.lookup_or_insert(key);
        self.indices.push(index);
        Ok(())
    }

    /// Number of corners pushed so far.
    pub fn corner_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of unique vertices so far.
    pub fn unique_count(&self) -> usize {
        self.cache.len()
    }

    /// Validate the counts and produce the final arrays.
    pub fn finish(self) -> Result<MeshData, MeshBuildError> {
        if self.indices.is_empty() {
            return Err(MeshBuildError::Empty);
        }
        if self.cache.len() > MAX_UNIQUE_VERTICES {
            return Err(MeshBuildError::TooManyVertices {
                count: self.cache.len(),
            });
        }
        if self.indices.len() >= MAX_INDEX_COUNT {
            return Err(MeshBuildError::TooManyIndices {
                count: self.indices.len(),
            });
        }

        let indices: Vec<u16> = self.indices.into_iter().map(|i| i as u16).collect();
        let vertices = self.cache.into_vertices();
        log::debug!(
            "Built mesh: {} unique vertices, {} indices",
            vertices.len(),
            indices.len()
        );

        Ok(MeshData { vertices, indices })
    }
}

/// Build a mesh from a face-corner stream.
///
/// # Errors
///
/// See [`MeshBuildError`]. No partial output is produced.
pub fn build_mesh(corners: &[FaceCorner]) -> Result<MeshData, MeshBuildError> {
    let mut builder = MeshBuilder::with_capacity(corners.len());
    for corner in corners {
        builder.push_corner(corner)?;
    }
    builder.finish()
}
