//! CPU-side mesh packing and deduplication.
//!
//! This module provides GPU-agnostic mesh data structures:
//!
//! - [`PackedVertex`] - 8-byte quantized vertex, also the dedup key
//! - [`DedupCache`] - Per-build map from vertex to output index
//! - [`MeshBuilder`] / [`build_mesh`] - Face-corner stream to [`MeshData`]
//! - [`IndexedAttributes`] - Indexed attribute pools as handed over by loaders
//! - Generators for block meshes
//!
//! These types are re-exported by `voxtile-graphics` for convenience.

mod builder;
mod dedup;
mod error;
pub mod generators;
mod vertex;

pub use builder::{
    CornerIndices, FaceCorner, IndexedAttributes, MAX_INDEX_COUNT, MAX_UNIQUE_VERTICES,
    MeshBuilder, MeshData, build_mesh,
};
pub use dedup::DedupCache;
pub use error::{AttributeChannel, MeshBuildError};
pub use vertex::{
    FaceDirection, MAX_QUANTIZED, POSITION_SCALE, PackedVertex, make_key, quantize_position,
};
