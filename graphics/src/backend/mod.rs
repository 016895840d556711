//! GPU backend abstraction layer.
//!
//! This module provides a trait-based abstraction for GPU backends,
//! allowing the graphics crate to work with different GPU APIs.
//!
//! # Available Backends
//!
//! - `dummy` (default): In-memory backend for testing and headless runs
//! - `wgpu-backend`: Cross-platform backend using wgpu
//!
//! # Architecture
//!
//! Each backend implements the [`GpuBackend`] trait, which provides:
//! - Device buffer, staging buffer and texture creation
//! - Staging buffer mapping for CPU writes
//! - Batched staging-to-device copies

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

#[cfg(feature = "dummy")]
pub mod dummy;

use std::sync::Arc;

use crate::error::GraphicsError;
use crate::instance::{BackendType, InstanceParameters};
use crate::transfer::BufferCopyRegion;
use crate::types::{BufferDescriptor, Extent2d, TextureDescriptor};

/// Handle to a device-resident GPU buffer.
#[derive(Clone)]
pub enum GpuBuffer {
    /// Dummy backend shadow memory
    #[cfg(feature = "dummy")]
    Dummy(Arc<dummy::DummyAllocation>),
    /// wgpu backend buffer
    #[cfg(feature = "wgpu-backend")]
    Wgpu(Arc<wgpu::Buffer>),
}

impl std::fmt::Debug for GpuBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "dummy")]
            Self::Dummy(allocation) => f
                .debug_tuple("GpuBuffer::Dummy")
                .field(&allocation.len())
                .finish(),
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu(buffer) => f.debug_tuple("GpuBuffer::Wgpu").field(buffer).finish(),
        }
    }
}

/// Handle to a host-visible staging buffer.
#[derive(Clone)]
pub enum GpuStagingBuffer {
    /// Dummy backend shadow memory
    #[cfg(feature = "dummy")]
    Dummy(Arc<dummy::DummyAllocation>),
    /// wgpu `MAP_WRITE | COPY_SRC` buffer
    #[cfg(feature = "wgpu-backend")]
    Wgpu(Arc<wgpu::Buffer>),
}

impl std::fmt::Debug for GpuStagingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "dummy")]
            Self::Dummy(allocation) => f
                .debug_tuple("GpuStagingBuffer::Dummy")
                .field(&allocation.len())
                .finish(),
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu(buffer) => f
                .debug_tuple("GpuStagingBuffer::Wgpu")
                .field(buffer)
                .finish(),
        }
    }
}

/// Handle to a GPU texture resource.
#[derive(Clone)]
pub enum GpuTexture {
    /// Dummy backend shadow memory
    #[cfg(feature = "dummy")]
    Dummy(Arc<dummy::DummyAllocation>),
    /// wgpu backend texture
    #[cfg(feature = "wgpu-backend")]
    Wgpu {
        texture: Arc<wgpu::Texture>,
        view: Arc<wgpu::TextureView>,
    },
}

impl std::fmt::Debug for GpuTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "dummy")]
            Self::Dummy(allocation) => f
                .debug_tuple("GpuTexture::Dummy")
                .field(&allocation.len())
                .finish(),
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu { texture, view } => f
                .debug_struct("GpuTexture::Wgpu")
                .field("texture", texture)
                .field("view", view)
                .finish(),
        }
    }
}

/// One copy inside a batch handed to [`GpuBackend::execute_copies`].
#[derive(Debug)]
pub enum GpuCopy<'a> {
    /// Staging buffer to device buffer.
    Buffer {
        src: &'a GpuStagingBuffer,
        dst: &'a GpuBuffer,
        region: BufferCopyRegion,
    },
    /// Tightly packed texel data to a whole texture.
    Texture {
        data: &'a [u8],
        dst: &'a GpuTexture,
        size: Extent2d,
        bytes_per_row: u32,
    },
}

/// GPU backend trait for abstracting different GPU APIs.
///
/// Staging buffers are created mapped. Callers validate mapping state and
/// ranges before calling the staging methods.
pub trait GpuBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create a device-resident buffer.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError>;

    /// Create a host-visible staging buffer, already mapped for writing.
    fn create_staging_buffer(
        &self,
        size: u64,
        label: Option<&str>,
    ) -> Result<GpuStagingBuffer, GraphicsError>;

    /// Map a staging buffer for CPU writes.
    ///
    /// Blocks until copies reading the buffer have finished.
    fn map_staging(&self, staging: &GpuStagingBuffer) -> Result<(), GraphicsError>;

    /// Write bytes into a mapped staging buffer.
    fn write_staging(
        &self,
        staging: &GpuStagingBuffer,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GraphicsError>;

    /// Read bytes back from a mapped staging buffer.
    fn read_staging(
        &self,
        staging: &GpuStagingBuffer,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>, GraphicsError>;

    /// End CPU access to a staging buffer.
    fn unmap_staging(&self, staging: &GpuStagingBuffer);

    /// Create a texture resource.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, GraphicsError>;

    /// Record and submit a batch of copies.
    fn execute_copies(&self, copies: &[GpuCopy<'_>]) -> Result<(), GraphicsError>;

    /// Read data from a device buffer.
    ///
    /// This is a blocking operation that waits for the GPU to finish.
    fn read_buffer(
        &self,
        buffer: &GpuBuffer,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>, GraphicsError>;
}

/// Selects and creates the backend requested by `params`.
///
/// [`BackendType::Auto`] tries wgpu first and falls back to the dummy backend.
pub fn create_backend(params: &InstanceParameters) -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    match params.backend {
        BackendType::Wgpu => create_wgpu(),
        BackendType::Dummy => create_dummy(params),
        BackendType::Auto => {
            #[cfg(feature = "wgpu-backend")]
            {
                match create_wgpu() {
                    Ok(backend) => return Ok(backend),
                    Err(e) => log::warn!("Failed to create wgpu backend: {}", e),
                }
            }
            create_dummy(params)
        }
    }
}

#[cfg(feature = "wgpu-backend")]
fn create_wgpu() -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    let backend = wgpu_backend::WgpuBackend::new()?;
    log::info!("Using wgpu backend");
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "wgpu-backend"))]
fn create_wgpu() -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    Err(GraphicsError::InitializationFailed(
        "wgpu backend not compiled in".to_string(),
    ))
}

#[cfg(feature = "dummy")]
fn create_dummy(params: &InstanceParameters) -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    let backend = match params.device_memory_budget {
        Some(budget) => dummy::DummyBackend::with_memory_budget(budget),
        None => dummy::DummyBackend::new(),
    };
    log::info!("Using dummy backend");
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "dummy"))]
fn create_dummy(_params: &InstanceParameters) -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    Err(GraphicsError::InitializationFailed(
        "dummy backend not compiled in".to_string(),
    ))
}
