//! Per-instance transform record.

use bytemuck::{Pod, Zeroable};

/// Per-instance transform streamed to the GPU every frame.
///
/// `#[repr(C)]`, 16 bytes: position followed by yaw in radians.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct InstanceTransform {
    /// World position [x, y, z].
    pub position: [f32; 3],
    /// Rotation around +Y, in radians.
    pub rotation: f32,
}

static_assertions::assert_eq_size!(InstanceTransform, [u8; 16]);

impl InstanceTransform {
    /// Size of the record in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub const fn new(position: [f32; 3], rotation: f32) -> Self {
        Self { position, rotation }
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}
