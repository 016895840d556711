//! Vertex input layout of instanced mesh draws.
//!
//! Every mesh draw binds two vertex buffers:
//!
//! - slot 0: the mesh's [`PackedVertex`] array, advanced per vertex
//! - slot 1: the category's [`InstanceTransform`] stream, advanced per instance
//!
//! Pipeline builders read this description to declare shader inputs.

use voxtile_core::mesh::PackedVertex;
use voxtile_core::scene::InstanceTransform;

/// Semantic meaning of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSemantic {
    /// Packed position, sign bits and face direction.
    PackedPosition,
    /// Palette texcoord U.
    TexCoord,
    /// Instance position (xyz) and yaw (w).
    InstanceTransform,
}

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Single 32-bit float.
    Float,
    /// Four 32-bit floats.
    Float4,
    /// Single 32-bit unsigned integer.
    Uint,
}

impl VertexAttributeFormat {
    /// Get the size in bytes of this format.
    pub fn size(&self) -> u32 {
        match self {
            Self::Float | Self::Uint => 4,
            Self::Float4 => 16,
        }
    }
}

/// How the vertex buffer advances: per-vertex or per-instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    /// Buffer advances once per vertex (default).
    #[default]
    Vertex,
    /// Buffer advances once per instance.
    Instance,
}

/// A single vertex attribute description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub semantic: VertexAttributeSemantic,
    pub format: VertexAttributeFormat,
    /// Byte offset within the element.
    pub offset: u32,
    /// Shader input location.
    pub location: u32,
}

/// One vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexBufferLayout {
    /// Stride in bytes between consecutive elements.
    pub stride: u32,
    pub step_mode: VertexStepMode,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferLayout {
    /// Sum of attribute sizes. Equals the stride for tightly packed elements.
    pub fn packed_size(&self) -> u32 {
        self.attributes.iter().map(|a| a.format.size()).sum()
    }
}

/// Slot 0: one packed mesh vertex.
pub fn mesh_vertex_layout() -> VertexBufferLayout {
    VertexBufferLayout {
        stride: PackedVertex::SIZE as u32,
        step_mode: VertexStepMode::Vertex,
        attributes: vec![
            VertexAttribute {
                semantic: VertexAttributeSemantic::PackedPosition,
                format: VertexAttributeFormat::Uint,
                offset: 0,
                location: 0,
            },
            VertexAttribute {
                semantic: VertexAttributeSemantic::TexCoord,
                format: VertexAttributeFormat::Float,
                offset: 4,
                location: 1,
            },
        ],
    }
}

/// Slot 1: one instance transform.
pub fn instance_layout() -> VertexBufferLayout {
    VertexBufferLayout {
        stride: InstanceTransform::SIZE as u32,
        step_mode: VertexStepMode::Instance,
        attributes: vec![VertexAttribute {
            semantic: VertexAttributeSemantic::InstanceTransform,
            format: VertexAttributeFormat::Float4,
            offset: 0,
            location: 2,
        }],
    }
}

/// Both slots, in binding order.
pub fn instanced_mesh_layouts() -> [VertexBufferLayout; 2] {
    [mesh_vertex_layout(), instance_layout()]
}

#[cfg(feature = "wgpu-backend")]
impl VertexBufferLayout {
    /// wgpu attributes for this slot.
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|attribute| wgpu::VertexAttribute {
                format: match attribute.format {
                    VertexAttributeFormat::Float => wgpu::VertexFormat::Float32,
                    VertexAttributeFormat::Float4 => wgpu::VertexFormat::Float32x4,
                    VertexAttributeFormat::Uint => wgpu::VertexFormat::Uint32,
                },
                offset: u64::from(attribute.offset),
                shader_location: attribute.location,
            })
            .collect()
    }

    /// wgpu step mode for this slot.
    pub fn wgpu_step_mode(&self) -> wgpu::VertexStepMode {
        match self.step_mode {
            VertexStepMode::Vertex => wgpu::VertexStepMode::Vertex,
            VertexStepMode::Instance => wgpu::VertexStepMode::Instance,
        }
    }
}
