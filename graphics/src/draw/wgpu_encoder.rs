//! [`DrawEncoder`] backed by a `wgpu::RenderPass`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::{GpuBuffer, GpuTexture};
use crate::error::GraphicsError;
use crate::resources::{Buffer, Texture};
use crate::types::IndexFormat;

use super::DrawEncoder;

/// Palette bind groups keyed by texture id.
///
/// Bind groups depend on the pipeline layout, so the pipeline owner creates
/// them (see [`PaletteBindings::texture_view`]) and registers them here.
#[derive(Debug, Default)]
pub struct PaletteBindings {
    groups: HashMap<u64, wgpu::BindGroup>,
}

impl PaletteBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bind group for `texture`, replacing any previous one.
    pub fn insert(&mut self, texture: &Texture, bind_group: wgpu::BindGroup) {
        self.groups.insert(texture.id(), bind_group);
    }

    /// Bind group registered for `texture_id`.
    pub fn get(&self, texture_id: u64) -> Option<&wgpu::BindGroup> {
        self.groups.get(&texture_id)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The wgpu view of a texture created on the wgpu backend.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] for textures of other backends.
    #[allow(unreachable_patterns)]
    pub fn texture_view(texture: &Texture) -> Result<&wgpu::TextureView, GraphicsError> {
        match texture.gpu_handle() {
            GpuTexture::Wgpu { view, .. } => Ok(&**view),
            _ => Err(GraphicsError::InvalidParameter(format!(
                "texture {:?} is not a wgpu texture",
                texture.label()
            ))),
        }
    }
}

#[allow(unreachable_patterns)]
fn wgpu_buffer(buffer: &Buffer) -> Result<&wgpu::Buffer, GraphicsError> {
    match buffer.gpu_handle() {
        GpuBuffer::Wgpu(buffer) => Ok(&**buffer),
        _ => Err(GraphicsError::InvalidParameter(format!(
            "buffer {:?} is not a wgpu buffer",
            buffer.label()
        ))),
    }
}

/// Forwards draw-loop operations to a render pass with a pipeline already set.
pub struct WgpuDrawEncoder<'a, 'pass> {
    pass: &'a mut wgpu::RenderPass<'pass>,
    palettes: &'a PaletteBindings,
    palette_group: u32,
}

impl<'a, 'pass> WgpuDrawEncoder<'a, 'pass> {
    /// Wrap `pass`. Palette bind groups are set at `palette_group`.
    pub fn new(
        pass: &'a mut wgpu::RenderPass<'pass>,
        palettes: &'a PaletteBindings,
        palette_group: u32,
    ) -> Self {
        Self {
            pass,
            palettes,
            palette_group,
        }
    }
}

impl DrawEncoder for WgpuDrawEncoder<'_, '_> {
    fn bind_vertex_buffers(
        &mut self,
        mesh: &Arc<Buffer>,
        instances: &Arc<Buffer>,
    ) -> Result<(), GraphicsError> {
        let mesh = wgpu_buffer(mesh)?;
        let instances = wgpu_buffer(instances)?;
        self.pass.set_vertex_buffer(0, mesh.slice(..));
        self.pass.set_vertex_buffer(1, instances.slice(..));
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<Buffer>,
        format: IndexFormat,
    ) -> Result<(), GraphicsError> {
        let buffer = wgpu_buffer(buffer)?;
        let wgpu_format = match format {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        };
        self.pass.set_index_buffer(buffer.slice(..), wgpu_format);
        Ok(())
    }

    fn bind_palette(&mut self, palette: &Arc<Texture>) -> Result<(), GraphicsError> {
        let group = self.palettes.get(palette.id()).ok_or_else(|| {
            GraphicsError::InvalidState(format!(
                "no bind group registered for palette {:?}",
                palette.label()
            ))
        })?;
        self.pass.set_bind_group(self.palette_group, group, &[]);
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.pass.draw_indexed(0..index_count, 0, 0..instance_count);
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::wgpu_backend::WgpuBackend;
    use crate::device::GraphicsDevice;
    use crate::instance::{BackendType, GraphicsInstance, InstanceParameters};
    use crate::types::{BufferDescriptor, BufferUsage, TextureDescriptor, TextureFormat, TextureUsage};

    fn dummy_device() -> Arc<GraphicsDevice> {
        GraphicsInstance::with_params(InstanceParameters::new().with_backend(BackendType::Dummy))
            .unwrap()
            .create_device()
            .unwrap()
    }

    fn palette(device: &Arc<GraphicsDevice>) -> Arc<Texture> {
        device
            .create_texture(&TextureDescriptor::new_2d(
                2,
                1,
                TextureFormat::Rgba8UnormSrgb,
                TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
            ))
            .unwrap()
    }

    fn try_wgpu() -> Option<WgpuBackend> {
        match WgpuBackend::new() {
            Ok(backend) => Some(backend),
            Err(e) => {
                eprintln!("wgpu not available, skipping: {e}");
                None
            }
        }
    }

    fn empty_bind_group(device: &wgpu::Device) -> wgpu::BindGroup {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: None,
            entries: &[],
        });
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &layout,
            entries: &[],
        })
    }

    /// Runs `f` inside a render pass on a small offscreen target.
    fn with_render_pass(device: &wgpu::Device, f: impl FnOnce(&mut wgpu::RenderPass<'_>)) {
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("target"),
            size: wgpu::Extent3d {
                width: 4,
                height: 4,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            f(&mut pass);
        }
        drop(encoder);
    }

    #[test]
    fn test_bindings_keyed_by_texture_id() {
        let Some(backend) = try_wgpu() else {
            return;
        };
        let device = dummy_device();
        let grass = palette(&device);
        let water = palette(&device);

        let mut bindings = PaletteBindings::new();
        assert!(bindings.is_empty());
        bindings.insert(&grass, empty_bind_group(backend.device()));
        assert_eq!(bindings.len(), 1);
        assert!(bindings.get(grass.id()).is_some());
        assert!(bindings.get(water.id()).is_none());

        // Re-registering replaces the previous group.
        bindings.insert(&grass, empty_bind_group(backend.device()));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_texture_view_rejects_other_backends() {
        let device = dummy_device();
        assert!(matches!(
            PaletteBindings::texture_view(&palette(&device)),
            Err(GraphicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unregistered_palette_is_invalid_state() {
        let Some(backend) = try_wgpu() else {
            return;
        };
        let device = dummy_device();
        let texture = palette(&device);
        let bindings = PaletteBindings::new();

        with_render_pass(backend.device(), |pass| {
            let mut encoder = WgpuDrawEncoder::new(pass, &bindings, 0);
            assert!(matches!(
                encoder.bind_palette(&texture),
                Err(GraphicsError::InvalidState(_))
            ));
        });
    }

    #[test]
    fn test_foreign_buffers_are_rejected() {
        let Some(backend) = try_wgpu() else {
            return;
        };
        let device = dummy_device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(16, BufferUsage::VERTEX | BufferUsage::COPY_DST))
            .unwrap();
        let bindings = PaletteBindings::new();

        with_render_pass(backend.device(), |pass| {
            let mut encoder = WgpuDrawEncoder::new(pass, &bindings, 0);
            assert!(matches!(
                encoder.bind_vertex_buffers(&buffer, &buffer),
                Err(GraphicsError::InvalidParameter(_))
            ));
            assert!(matches!(
                encoder.bind_index_buffer(&buffer, IndexFormat::Uint16),
                Err(GraphicsError::InvalidParameter(_))
            ));
        });
    }
}
