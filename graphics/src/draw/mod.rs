//! Draw submission.
//!
//! The frame draw loop talks to a [`DrawEncoder`], the render-pass context
//! handed out by whoever owns the surface and pipelines. Two encoders exist:
//!
//! - [`RecordingEncoder`] - Buffers [`DrawCommand`]s for inspection and headless runs
//! - `WgpuDrawEncoder` - Forwards to a `wgpu::RenderPass` (feature `wgpu-backend`)

#[cfg(feature = "wgpu-backend")]
mod wgpu_encoder;

#[cfg(feature = "wgpu-backend")]
pub use wgpu_encoder::{PaletteBindings, WgpuDrawEncoder};

use std::sync::Arc;

use crate::error::GraphicsError;
use crate::resources::{Buffer, Texture};
use crate::types::IndexFormat;

/// Render-pass operations needed by the instanced mesh draw loop.
pub trait DrawEncoder {
    /// Bind the mesh vertices at slot 0 and the instance stream at slot 1.
    fn bind_vertex_buffers(
        &mut self,
        mesh: &Arc<Buffer>,
        instances: &Arc<Buffer>,
    ) -> Result<(), GraphicsError>;

    /// Bind the index buffer.
    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<Buffer>,
        format: IndexFormat,
    ) -> Result<(), GraphicsError>;

    /// Bind the palette texture and its sampler.
    fn bind_palette(&mut self, palette: &Arc<Texture>) -> Result<(), GraphicsError>;

    /// Issue one indexed, instanced draw.
    fn draw_indexed(&mut self, index_count: u32, instance_count: u32);
}

/// A recorded draw-loop operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    BindVertexBuffers {
        mesh: Arc<Buffer>,
        instances: Arc<Buffer>,
    },
    BindIndexBuffer {
        buffer: Arc<Buffer>,
        format: IndexFormat,
    },
    BindPalette {
        texture_id: u64,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
    },
}

/// Encoder that records commands instead of executing them.
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    commands: Vec<DrawCommand>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded commands in issue order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// `(index_count, instance_count)` of every recorded draw.
    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::DrawIndexed {
                    index_count,
                    instance_count,
                } => Some((*index_count, *instance_count)),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl DrawEncoder for RecordingEncoder {
    fn bind_vertex_buffers(
        &mut self,
        mesh: &Arc<Buffer>,
        instances: &Arc<Buffer>,
    ) -> Result<(), GraphicsError> {
        self.commands.push(DrawCommand::BindVertexBuffers {
            mesh: Arc::clone(mesh),
            instances: Arc::clone(instances),
        });
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<Buffer>,
        format: IndexFormat,
    ) -> Result<(), GraphicsError> {
        self.commands.push(DrawCommand::BindIndexBuffer {
            buffer: Arc::clone(buffer),
            format,
        });
        Ok(())
    }

    fn bind_palette(&mut self, palette: &Arc<Texture>) -> Result<(), GraphicsError> {
        self.commands.push(DrawCommand::BindPalette {
            texture_id: palette.id(),
        });
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.commands.push(DrawCommand::DrawIndexed {
            index_count,
            instance_count,
        });
    }
}
