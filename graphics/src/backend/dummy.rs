//! Dummy GPU backend for testing and development.
//!
//! Resources are plain byte vectors in host memory, so uploads and copies can
//! be verified without GPU hardware. An optional device-memory budget makes
//! device buffer and texture creation fail once it is exhausted.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::GraphicsError;
use crate::types::{BufferDescriptor, TextureDescriptor};

use super::{GpuBackend, GpuBuffer, GpuCopy, GpuStagingBuffer, GpuTexture};

/// Emulated device-local heap.
#[derive(Debug)]
pub struct DummyHeap {
    budget: u64,
    used: AtomicU64,
}

impl DummyHeap {
    fn reserve(&self, size: u64) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(size).filter(|&total| total <= self.budget)
            })
            .is_ok()
    }

    fn release(&self, size: u64) {
        self.used.fetch_sub(size, Ordering::AcqRel);
    }

    /// Bytes currently allocated from the heap.
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }
}

/// Host memory standing in for one GPU allocation.
#[derive(Debug)]
pub struct DummyAllocation {
    data: Mutex<Vec<u8>>,
    heap: Option<Arc<DummyHeap>>,
}

impl DummyAllocation {
    fn new(size: u64, heap: Option<Arc<DummyHeap>>) -> Self {
        Self {
            data: Mutex::new(vec![0; size as usize]),
            heap,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// Whether the allocation is zero-sized.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the whole allocation.
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl Drop for DummyAllocation {
    fn drop(&mut self) {
        if let Some(heap) = &self.heap {
            heap.release(self.data.get_mut().len() as u64);
        }
    }
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    heap: Option<Arc<DummyHeap>>,
}

impl DummyBackend {
    /// Create a new dummy backend with unlimited device memory.
    pub fn new() -> Self {
        Self { heap: None }
    }

    /// Create a dummy backend whose device buffers and textures share
    /// `budget` bytes. Staging buffers are not counted.
    pub fn with_memory_budget(budget: u64) -> Self {
        Self {
            heap: Some(Arc::new(DummyHeap {
                budget,
                used: AtomicU64::new(0),
            })),
        }
    }

    fn allocate_device(&self, size: u64) -> Result<Arc<DummyAllocation>, GraphicsError> {
        if let Some(heap) = &self.heap
            && !heap.reserve(size)
        {
            return Err(GraphicsError::OutOfMemory);
        }
        Ok(Arc::new(DummyAllocation::new(size, self.heap.clone())))
    }
}

fn staging_memory(staging: &GpuStagingBuffer) -> Result<&Arc<DummyAllocation>, GraphicsError> {
    #[allow(unreachable_patterns)]
    match staging {
        GpuStagingBuffer::Dummy(allocation) => Ok(allocation),
        _ => Err(GraphicsError::InvalidParameter(
            "staging buffer belongs to another backend".to_string(),
        )),
    }
}

fn checked_range(
    offset: u64,
    size: u64,
    len: usize,
) -> Result<std::ops::Range<usize>, GraphicsError> {
    let end = offset
        .checked_add(size)
        .filter(|&end| end <= len as u64)
        .ok_or_else(|| {
            GraphicsError::InvalidParameter(format!(
                "range {offset}+{size} exceeds allocation of {len} bytes"
            ))
        })?;
    Ok(offset as usize..end as usize)
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError> {
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            descriptor.label,
            descriptor.size
        );
        Ok(GpuBuffer::Dummy(self.allocate_device(descriptor.size)?))
    }

    fn create_staging_buffer(
        &self,
        size: u64,
        label: Option<&str>,
    ) -> Result<GpuStagingBuffer, GraphicsError> {
        log::trace!("DummyBackend: creating staging buffer {label:?} (size: {size})");
        Ok(GpuStagingBuffer::Dummy(Arc::new(DummyAllocation::new(
            size, None,
        ))))
    }

    fn map_staging(&self, staging: &GpuStagingBuffer) -> Result<(), GraphicsError> {
        staging_memory(staging)?;
        log::trace!("DummyBackend: mapping staging buffer");
        Ok(())
    }

    fn write_staging(
        &self,
        staging: &GpuStagingBuffer,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        let memory = staging_memory(staging)?;
        let mut bytes = memory.data.lock();
        let range = checked_range(offset, data.len() as u64, bytes.len())?;
        bytes[range].copy_from_slice(data);
        Ok(())
    }

    fn read_staging(
        &self,
        staging: &GpuStagingBuffer,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>, GraphicsError> {
        let memory = staging_memory(staging)?;
        let bytes = memory.data.lock();
        let range = checked_range(offset, size, bytes.len())?;
        Ok(bytes[range].to_vec())
    }

    fn unmap_staging(&self, _staging: &GpuStagingBuffer) {
        log::trace!("DummyBackend: unmapping staging buffer");
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, GraphicsError> {
        log::trace!(
            "DummyBackend: creating texture {:?} ({}x{})",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height
        );
        Ok(GpuTexture::Dummy(
            self.allocate_device(descriptor.byte_size())?,
        ))
    }

    #[allow(unreachable_patterns)]
    fn execute_copies(&self, copies: &[GpuCopy<'_>]) -> Result<(), GraphicsError> {
        log::trace!("DummyBackend: executing {} copies", copies.len());
        for copy in copies {
            match copy {
                GpuCopy::Buffer {
                    src: GpuStagingBuffer::Dummy(src),
                    dst: GpuBuffer::Dummy(dst),
                    region,
                } => {
                    let src = src.data.lock();
                    let mut dst = dst.data.lock();
                    let src_range = checked_range(region.src_offset, region.size, src.len())?;
                    let dst_range = checked_range(region.dst_offset, region.size, dst.len())?;
                    dst[dst_range].copy_from_slice(&src[src_range]);
                }
                GpuCopy::Texture {
                    data,
                    dst: GpuTexture::Dummy(dst),
                    ..
                } => {
                    let mut dst = dst.data.lock();
                    let range = checked_range(0, data.len() as u64, dst.len())?;
                    dst[range].copy_from_slice(data);
                }
                _ => {
                    return Err(GraphicsError::InvalidParameter(
                        "copy references resources from another backend".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    #[allow(unreachable_patterns)]
    fn read_buffer(
        &self,
        buffer: &GpuBuffer,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>, GraphicsError> {
        #[allow(unreachable_patterns)]
        let memory = match buffer {
            GpuBuffer::Dummy(memory) => memory,
            _ => {
                return Err(GraphicsError::InvalidParameter(
                    "buffer belongs to another backend".to_string(),
                ));
            }
        };
        let bytes = memory.data.lock();
        let range = checked_range(offset, size, bytes.len())?;
        Ok(bytes[range].to_vec())
    }
}
