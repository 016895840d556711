//! # Voxtile Graphics
//!
//! GPU side of the voxtile client: static mesh upload, per-frame instance
//! streaming through growable staging buffers, and the instanced draw loop.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsInstance`] / [`GraphicsDevice`] - Backend selection and resource creation
//! - [`GrowableBuffer`] - Host-visible staging with a device-resident mirror
//! - [`CopyPass`] - Batched staging-to-device uploads
//! - [`MeshAsset`] - Deduplicated mesh geometry plus palette
//! - [`RenderContext`] - Per-category registries and the draw loop
//! - Backends: wgpu and Dummy (for testing)
//!
//! ## Example
//!
//! ```ignore
//! use voxtile_graphics::{GraphicsInstance, RecordingEncoder, RenderContext};
//!
//! let instance = GraphicsInstance::new()?;
//! let device = instance.create_device()?;
//! let mut context = RenderContext::new(&device);
//! context.register_mesh(category, MeshAsset::build(&device, &corners, &palette, "grass")?);
//!
//! context.push_instance(category, transform);
//! let mut pass = device.begin_copy_pass();
//! context.upload_instances(&mut pass);
//! pass.submit()?;
//! context.draw(&mut RecordingEncoder::new());
//! ```

pub mod backend;
pub mod device;
pub mod draw;
pub mod error;
pub mod instance;
pub mod mesh;
pub mod renderer;
pub mod resources;
pub mod transfer;
pub mod types;

// Re-export main types for convenience
pub use device::{DeviceCapabilities, GraphicsDevice};
pub use draw::{DrawCommand, DrawEncoder, RecordingEncoder};
#[cfg(feature = "wgpu-backend")]
pub use draw::{PaletteBindings, WgpuDrawEncoder};
pub use error::{GraphicsError, MeshLoadError};
pub use instance::{BackendType, GraphicsInstance, InstanceParameters};
pub use mesh::MeshAsset;
pub use renderer::{InstanceStream, RenderContext};
pub use resources::{Buffer, GrowableBuffer, StagingBuffer, Texture};
pub use transfer::{BufferCopyRegion, CopyOperation, CopyPass};
pub use types::{
    BufferDescriptor, BufferUsage, Extent2d, IndexFormat, TextureDescriptor, TextureFormat,
    TextureUsage,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// This should be called before using any graphics functionality.
pub fn init() {
    log::info!("Voxtile Graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dummy_instance() {
        let instance =
            GraphicsInstance::with_params(InstanceParameters::new().with_backend(BackendType::Dummy))
                .unwrap();
        assert_eq!(instance.backend_name(), "Dummy Backend");
    }
}
