//! Host-visible staging buffer.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::backend::GpuStagingBuffer;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;

/// Host-writable memory that feeds copies into device buffers.
///
/// A staging buffer is created mapped. CPU writes are only valid while it is
/// mapped, and it must be unmapped before a copy pass may read from it.
pub struct StagingBuffer {
    device: Weak<GraphicsDevice>,
    size: u64,
    label: Option<String>,
    gpu: GpuStagingBuffer,
    mapped: Mutex<bool>,
}

impl StagingBuffer {
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        size: u64,
        label: Option<String>,
        gpu: GpuStagingBuffer,
    ) -> Self {
        Self {
            device,
            size,
            label,
            gpu,
            mapped: Mutex::new(true),
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Debug label, if set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the backend handle.
    pub fn gpu_handle(&self) -> &GpuStagingBuffer {
        &self.gpu
    }

    /// Whether CPU access is currently open.
    pub fn is_mapped(&self) -> bool {
        *self.mapped.lock()
    }

    fn device(&self) -> Result<Arc<GraphicsDevice>, GraphicsError> {
        self.device.upgrade().ok_or(GraphicsError::DeviceLost)
    }

    fn check_range(&self, offset: u64, size: u64) -> Result<(), GraphicsError> {
        match offset.checked_add(size) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(GraphicsError::InvalidParameter(format!(
                "range {offset}+{size} exceeds staging buffer of {} bytes",
                self.size
            ))),
        }
    }

    /// Open CPU access, waiting for pending copies out of this buffer.
    ///
    /// Mapping an already mapped buffer does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::MapFailed`] if the backend cannot map the memory.
    pub fn map(&self) -> Result<(), GraphicsError> {
        let mut mapped = self.mapped.lock();
        if *mapped {
            return Ok(());
        }
        self.device()?.backend().map_staging(&self.gpu)?;
        *mapped = true;
        Ok(())
    }

    /// End CPU access.
    pub fn unmap(&self) {
        let mut mapped = self.mapped.lock();
        if !*mapped {
            return;
        }
        if let Some(device) = self.device.upgrade() {
            device.backend().unmap_staging(&self.gpu);
        }
        *mapped = false;
    }

    /// Write `data` at byte `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidState`] if the buffer is not mapped and
    /// [`GraphicsError::InvalidParameter`] if the write does not fit.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<(), GraphicsError> {
        let mapped = self.mapped.lock();
        if !*mapped {
            return Err(GraphicsError::InvalidState(
                "write to unmapped staging buffer".to_string(),
            ));
        }
        self.check_range(offset, data.len() as u64)?;
        self.device()?.backend().write_staging(&self.gpu, offset, data)
    }

    /// Read `size` bytes at byte `offset`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`StagingBuffer::write`].
    pub fn read(&self, offset: u64, size: u64) -> Result<Vec<u8>, GraphicsError> {
        let mapped = self.mapped.lock();
        if !*mapped {
            return Err(GraphicsError::InvalidState(
                "read from unmapped staging buffer".to_string(),
            ));
        }
        self.check_range(offset, size)?;
        self.device()?.backend().read_staging(&self.gpu, offset, size)
    }
}

impl std::fmt::Debug for StagingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingBuffer")
            .field("size", &self.size)
            .field("label", &self.label)
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

static_assertions::assert_impl_all!(StagingBuffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{BackendType, GraphicsInstance, InstanceParameters};

    fn create_test_device() -> Arc<GraphicsDevice> {
        let instance =
            GraphicsInstance::with_params(InstanceParameters::new().with_backend(BackendType::Dummy))
                .unwrap();
        instance.create_device().unwrap()
    }

    #[test]
    fn test_write_then_read() {
        let device = create_test_device();
        let staging = device.create_staging_buffer(8, None).unwrap();
        staging.write(2, &[7, 8, 9]).unwrap();
        assert_eq!(staging.read(0, 6).unwrap(), vec![0, 0, 7, 8, 9, 0]);
    }

    #[test]
    fn test_write_requires_mapping() {
        let device = create_test_device();
        let staging = device.create_staging_buffer(8, None).unwrap();
        staging.unmap();
        assert!(!staging.is_mapped());
        assert!(matches!(
            staging.write(0, &[1]),
            Err(GraphicsError::InvalidState(_))
        ));

        staging.map().unwrap();
        assert!(staging.write(0, &[1]).is_ok());
    }

    #[test]
    fn test_write_out_of_range() {
        let device = create_test_device();
        let staging = device.create_staging_buffer(4, None).unwrap();
        assert!(matches!(
            staging.write(3, &[1, 2]),
            Err(GraphicsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_map_is_idempotent() {
        let device = create_test_device();
        let staging = device.create_staging_buffer(4, None).unwrap();
        staging.write(0, &[5]).unwrap();
        staging.map().unwrap();
        assert_eq!(staging.read(0, 1).unwrap(), vec![5]);
    }
}
