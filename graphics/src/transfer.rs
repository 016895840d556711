//! Staging-to-device copy passes.
//!
//! A [`CopyPass`] collects upload operations for one frame and hands them to
//! the backend as a single batch on [`CopyPass::submit`]:
//!
//! - Staging buffer to device buffer
//! - Host texel data to texture

use std::sync::Arc;

use crate::backend::GpuCopy;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::resources::{Buffer, StagingBuffer, Texture};
use crate::types::BufferUsage;

/// A region within a buffer for copy operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferCopyRegion {
    /// Offset in bytes from the start of the source buffer.
    pub src_offset: u64,
    /// Offset in bytes from the start of the destination buffer.
    pub dst_offset: u64,
    /// Number of bytes to copy.
    pub size: u64,
}

impl BufferCopyRegion {
    /// Create a new buffer copy region.
    pub fn new(src_offset: u64, dst_offset: u64, size: u64) -> Self {
        Self {
            src_offset,
            dst_offset,
            size,
        }
    }

    /// Create a region that copies `size` bytes from the start of both buffers.
    pub fn whole(size: u64) -> Self {
        Self {
            src_offset: 0,
            dst_offset: 0,
            size,
        }
    }
}

/// One recorded upload.
///
/// Holding the resources here keeps them alive until the copy has executed,
/// even if their owner replaces them in the meantime.
#[derive(Debug, Clone)]
pub enum CopyOperation {
    /// Copy from a staging buffer into a device buffer.
    BufferUpload {
        /// Unmapped staging source.
        src: Arc<StagingBuffer>,
        /// Device destination.
        dst: Arc<Buffer>,
        /// Byte region.
        region: BufferCopyRegion,
    },
    /// Write tightly packed texels into a whole texture.
    TextureUpload {
        /// Texel bytes.
        data: Vec<u8>,
        /// Destination texture.
        dst: Arc<Texture>,
    },
}

/// A batch of uploads recorded for one submission.
///
/// # Example
///
/// ```ignore
/// let mut pass = device.begin_copy_pass();
/// pass.record_buffer_upload(&staging, &buffer, BufferCopyRegion::whole(64))?;
/// pass.submit()?;
/// ```
pub struct CopyPass {
    device: Arc<GraphicsDevice>,
    operations: Vec<CopyOperation>,
}

impl CopyPass {
    pub(crate) fn new(device: Arc<GraphicsDevice>) -> Self {
        Self {
            device,
            operations: Vec::new(),
        }
    }

    /// Get the device this pass submits to.
    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    /// Recorded operations, in submission order.
    pub fn operations(&self) -> &[CopyOperation] {
        &self.operations
    }

    /// Number of recorded operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Record a staging-to-device buffer copy.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::InvalidState`] if `src` is still mapped
    /// - [`GraphicsError::InvalidParameter`] if `dst` lacks `COPY_DST` or the
    ///   region does not fit either buffer
    pub fn record_buffer_upload(
        &mut self,
        src: &Arc<StagingBuffer>,
        dst: &Arc<Buffer>,
        region: BufferCopyRegion,
    ) -> Result<(), GraphicsError> {
        if src.is_mapped() {
            return Err(GraphicsError::InvalidState(
                "staging buffer must be unmapped before upload".to_string(),
            ));
        }
        if !dst.descriptor().usage.contains(BufferUsage::COPY_DST) {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer {:?} is not a copy destination",
                dst.label()
            )));
        }
        let fits = |offset: u64, len: u64| {
            offset
                .checked_add(region.size)
                .is_some_and(|end| end <= len)
        };
        if !fits(region.src_offset, src.size()) || !fits(region.dst_offset, dst.size()) {
            return Err(GraphicsError::InvalidParameter(format!(
                "copy region {region:?} out of bounds (src {}, dst {})",
                src.size(),
                dst.size()
            )));
        }

        self.operations.push(CopyOperation::BufferUpload {
            src: Arc::clone(src),
            dst: Arc::clone(dst),
            region,
        });
        Ok(())
    }

    /// Record a full texture upload from tightly packed texels.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidParameter`] if `data` does not match
    /// the texture size.
    pub fn record_texture_upload(
        &mut self,
        data: Vec<u8>,
        dst: &Arc<Texture>,
    ) -> Result<(), GraphicsError> {
        let expected = dst.descriptor().byte_size();
        if data.len() as u64 != expected {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture upload of {} bytes, texture holds {expected}",
                data.len()
            )));
        }
        self.operations.push(CopyOperation::TextureUpload {
            data,
            dst: Arc::clone(dst),
        });
        Ok(())
    }

    /// Execute every recorded operation.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the batch fails.
    pub fn submit(self) -> Result<(), GraphicsError> {
        if self.operations.is_empty() {
            return Ok(());
        }

        let copies: Vec<GpuCopy<'_>> = self
            .operations
            .iter()
            .map(|op| match op {
                CopyOperation::BufferUpload { src, dst, region } => GpuCopy::Buffer {
                    src: src.gpu_handle(),
                    dst: dst.gpu_handle(),
                    region: *region,
                },
                CopyOperation::TextureUpload { data, dst } => GpuCopy::Texture {
                    data,
                    dst: dst.gpu_handle(),
                    size: dst.size(),
                    bytes_per_row: dst.width() * dst.format().block_size(),
                },
            })
            .collect();

        log::trace!("CopyPass: submitting {} operations", copies.len());
        self.device.backend().execute_copies(&copies)
    }
}

impl std::fmt::Debug for CopyPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyPass")
            .field("operations", &self.operations.len())
            .finish()
    }
}
