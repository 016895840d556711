//! GPU-resident mesh geometry.
//!
//! - [`MeshAsset`] - Exact-size vertex/index buffers plus palette texture
//! - [`layout`] - Vertex buffer slots used by instanced mesh draws
//!
//! Mesh geometry is built once by [`voxtile_core::mesh::build_mesh`] and
//! uploaded directly; it never goes through a growable buffer.

mod asset;
pub mod layout;

pub use asset::MeshAsset;
pub use layout::{
    VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexBufferLayout,
    VertexStepMode, instanced_mesh_layouts,
};
