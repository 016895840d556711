//! wgpu GPU backend implementation.
//!
//! This backend uses wgpu for cross-platform GPU access, supporting
//! Vulkan, Metal, DX12, and WebGPU.
//!
//! Staging buffers are `MAP_WRITE | COPY_SRC` buffers created mapped. Every
//! copy batch is submitted and waited on, so re-mapping a staging buffer
//! for the next frame never blocks on in-flight copies.

use std::sync::Arc;

use crate::error::GraphicsError;
use crate::types::{
    BufferDescriptor, BufferUsage, TextureDescriptor, TextureFormat, TextureUsage, align_up,
};

use super::{GpuBackend, GpuBuffer, GpuCopy, GpuStagingBuffer, GpuTexture};

/// wgpu-based GPU backend.
pub struct WgpuBackend {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl std::fmt::Debug for WgpuBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuBackend")
            .field("adapter", &self.adapter.get_info().name)
            .finish()
    }
}

impl WgpuBackend {
    /// Create a new wgpu backend on the default high-performance adapter.
    pub fn new() -> Result<Self, GraphicsError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            backend_options: wgpu::BackendOptions::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| {
            GraphicsError::InitializationFailed(format!("No compatible GPU adapter: {e}"))
        })?;

        log::info!("wgpu adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Voxtile Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| GraphicsError::InitializationFailed(format!("Device creation failed: {e}")))?;

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Get the wgpu device.
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// Get the wgpu queue.
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}

fn convert_buffer_usage(usage: BufferUsage) -> wgpu::BufferUsages {
    let mut result = wgpu::BufferUsages::empty();

    if usage.contains(BufferUsage::VERTEX) {
        result |= wgpu::BufferUsages::VERTEX;
    }
    if usage.contains(BufferUsage::INDEX) {
        result |= wgpu::BufferUsages::INDEX;
    }
    if usage.contains(BufferUsage::COPY_SRC) {
        result |= wgpu::BufferUsages::COPY_SRC;
    }
    if usage.contains(BufferUsage::COPY_DST) {
        result |= wgpu::BufferUsages::COPY_DST;
    }
    if usage.contains(BufferUsage::MAP_WRITE) {
        result |= wgpu::BufferUsages::MAP_WRITE;
    }

    result
}

fn device_buffer_usage(usage: BufferUsage) -> wgpu::BufferUsages {
    convert_buffer_usage(usage) | wgpu::BufferUsages::COPY_SRC
}

fn convert_texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

fn convert_texture_usage(usage: TextureUsage) -> wgpu::TextureUsages {
    let mut result = wgpu::TextureUsages::empty();

    if usage.contains(TextureUsage::COPY_DST) {
        result |= wgpu::TextureUsages::COPY_DST;
    }
    if usage.contains(TextureUsage::TEXTURE_BINDING) {
        result |= wgpu::TextureUsages::TEXTURE_BINDING;
    }

    result
}

#[allow(unreachable_patterns)]
fn wgpu_staging(staging: &GpuStagingBuffer) -> Result<&Arc<wgpu::Buffer>, GraphicsError> {
    match staging {
        GpuStagingBuffer::Wgpu(buffer) => Ok(buffer),
        _ => Err(GraphicsError::InvalidParameter(
            "staging buffer belongs to another backend".to_string(),
        )),
    }
}

fn mapped_range(
    buffer: &wgpu::Buffer,
    offset: u64,
    size: u64,
) -> Result<std::ops::Range<usize>, GraphicsError> {
    let end = offset
        .checked_add(size)
        .filter(|&end| end <= buffer.size())
        .ok_or_else(|| {
            GraphicsError::InvalidParameter(format!(
                "range {offset}+{size} exceeds staging buffer of {} bytes",
                buffer.size()
            ))
        })?;
    Ok(offset as usize..end as usize)
}

impl GpuBackend for WgpuBackend {
    fn name(&self) -> &'static str {
        "wgpu Backend"
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError> {
        // COPY_SRC backs `read_buffer`.
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: descriptor.label.as_deref(),
            size: align_up(descriptor.size, wgpu::COPY_BUFFER_ALIGNMENT),
            usage: device_buffer_usage(descriptor.usage),
            mapped_at_creation: false,
        });

        Ok(GpuBuffer::Wgpu(Arc::new(buffer)))
    }

    fn create_staging_buffer(
        &self,
        size: u64,
        label: Option<&str>,
    ) -> Result<GpuStagingBuffer, GraphicsError> {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size: align_up(size, wgpu::COPY_BUFFER_ALIGNMENT),
            usage: wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: true,
        });

        Ok(GpuStagingBuffer::Wgpu(Arc::new(buffer)))
    }

    fn map_staging(&self, staging: &GpuStagingBuffer) -> Result<(), GraphicsError> {
        let buffer = wgpu_staging(staging)?;
        log::trace!("WgpuBackend: mapping staging buffer");

        let slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Write, move |result| {
            let _ = tx.send(result);
        });

        let _ = self.device.poll(wgpu::PollType::wait_indefinitely());

        match rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(GraphicsError::MapFailed(e.to_string())),
            Err(_) => Err(GraphicsError::MapFailed(
                "map callback was never invoked".to_string(),
            )),
        }
    }

    fn write_staging(
        &self,
        staging: &GpuStagingBuffer,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        let buffer = wgpu_staging(staging)?;
        let range = mapped_range(buffer, offset, data.len() as u64)?;
        let mut view = buffer.slice(..).get_mapped_range_mut();
        view[range].copy_from_slice(data);
        Ok(())
    }

    fn read_staging(
        &self,
        staging: &GpuStagingBuffer,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>, GraphicsError> {
        let buffer = wgpu_staging(staging)?;
        let range = mapped_range(buffer, offset, size)?;
        let view = buffer.slice(..).get_mapped_range();
        Ok(view[range].to_vec())
    }

    fn unmap_staging(&self, staging: &GpuStagingBuffer) {
        if let Ok(buffer) = wgpu_staging(staging) {
            buffer.unmap();
        }
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, GraphicsError> {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: descriptor.label.as_deref(),
            size: wgpu::Extent3d {
                width: descriptor.size.width,
                height: descriptor.size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: convert_texture_format(descriptor.format),
            usage: convert_texture_usage(descriptor.usage),
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(GpuTexture::Wgpu {
            texture: Arc::new(texture),
            view: Arc::new(view),
        })
    }

    #[allow(unreachable_patterns)]
    fn execute_copies(&self, copies: &[GpuCopy<'_>]) -> Result<(), GraphicsError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Copy Pass Encoder"),
            });

        for copy in copies {
            match copy {
                GpuCopy::Buffer {
                    src: GpuStagingBuffer::Wgpu(src),
                    dst: GpuBuffer::Wgpu(dst),
                    region,
                } => {
                    // Both ends are allocated with 4-byte aligned sizes.
                    let size = align_up(region.size, wgpu::COPY_BUFFER_ALIGNMENT);
                    encoder.copy_buffer_to_buffer(
                        src,
                        region.src_offset,
                        dst,
                        region.dst_offset,
                        size,
                    );
                }
                GpuCopy::Texture {
                    data,
                    dst: GpuTexture::Wgpu { texture, .. },
                    size,
                    bytes_per_row,
                } => {
                    self.queue.write_texture(
                        wgpu::TexelCopyTextureInfo {
                            texture,
                            mip_level: 0,
                            origin: wgpu::Origin3d::ZERO,
                            aspect: wgpu::TextureAspect::All,
                        },
                        data,
                        wgpu::TexelCopyBufferLayout {
                            offset: 0,
                            bytes_per_row: Some(*bytes_per_row),
                            rows_per_image: Some(size.height),
                        },
                        wgpu::Extent3d {
                            width: size.width,
                            height: size.height,
                            depth_or_array_layers: 1,
                        },
                    );
                }
                _ => {
                    return Err(GraphicsError::InvalidParameter(
                        "copy references resources from another backend".to_string(),
                    ));
                }
            }
        }

        let submission_index = self.queue.submit(std::iter::once(encoder.finish()));

        // Wait so staging buffers can be re-mapped next frame.
        let _ = self.device.poll(wgpu::PollType::Wait {
            submission_index: Some(submission_index),
            timeout: Some(std::time::Duration::from_secs(10)),
        });

        Ok(())
    }

    fn read_buffer(
        &self,
        buffer: &GpuBuffer,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>, GraphicsError> {
        #[allow(unreachable_patterns)]
        let wgpu_buffer = match buffer {
            GpuBuffer::Wgpu(buffer) => buffer,
            _ => {
                return Err(GraphicsError::InvalidParameter(
                    "buffer belongs to another backend".to_string(),
                ));
            }
        };

        // Copies must start and end on COPY_BUFFER_ALIGNMENT.
        let copy_offset = offset - offset % wgpu::COPY_BUFFER_ALIGNMENT;
        let copy_size = align_up(offset + size, wgpu::COPY_BUFFER_ALIGNMENT) - copy_offset;
        if copy_offset + copy_size > wgpu_buffer.size() {
            return Err(GraphicsError::InvalidParameter(format!(
                "read of {size} bytes at {offset} exceeds buffer of {} bytes",
                wgpu_buffer.size()
            )));
        }
        if copy_size == 0 {
            return Ok(Vec::new());
        }

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Read Staging Buffer"),
            size: copy_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Read Buffer Encoder"),
            });
        encoder.copy_buffer_to_buffer(wgpu_buffer, copy_offset, &readback, 0, copy_size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| GraphicsError::MapFailed(e.to_string()))?;

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(GraphicsError::MapFailed(e.to_string())),
            Err(_) => return Err(GraphicsError::DeviceLost),
        }

        let start = (offset - copy_offset) as usize;
        let data = slice.get_mapped_range()[start..start + size as usize].to_vec();
        readback.unmap();
        Ok(data)
    }
}
