//! GPU buffer resource.

use std::sync::{Arc, Weak};

use crate::backend::GpuBuffer;
use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::types::BufferDescriptor;

/// A device-resident GPU buffer.
///
/// Buffers are created by [`GraphicsDevice::create_buffer`] and are reference-counted.
/// They hold a weak reference back to their parent device.
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))?;
/// println!("Buffer size: {}", buffer.size());
/// ```
pub struct Buffer {
    device: Weak<GraphicsDevice>,
    descriptor: BufferDescriptor,
    gpu: GpuBuffer,
}

impl Buffer {
    /// Create a new buffer (called by GraphicsDevice).
    pub(crate) fn new(
        device: Weak<GraphicsDevice>,
        descriptor: BufferDescriptor,
        gpu: GpuBuffer,
    ) -> Self {
        Self {
            device,
            descriptor,
            gpu,
        }
    }

    /// Get the parent device, if it still exists.
    pub fn device(&self) -> Option<Arc<GraphicsDevice>> {
        self.device.upgrade()
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Get the backend handle.
    pub fn gpu_handle(&self) -> &GpuBuffer {
        &self.gpu
    }

    /// Read `size` bytes starting at `offset` back to the host.
    ///
    /// Blocks until the device is idle. Intended for tests and tooling.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is outside the buffer, the device is
    /// gone, or the backend cannot map the read-back memory.
    pub fn read_back(&self, offset: u64, size: u64) -> Result<Vec<u8>, GraphicsError> {
        if offset.checked_add(size).is_none_or(|end| end > self.size()) {
            return Err(GraphicsError::InvalidParameter(format!(
                "read of {size} bytes at {offset} exceeds buffer of {} bytes",
                self.size()
            )));
        }
        let device = self.device().ok_or(GraphicsError::DeviceLost)?;
        device.backend().read_buffer(&self.gpu, offset, size)
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("size", &self.descriptor.size)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{BackendType, GraphicsInstance, InstanceParameters};
    use crate::types::BufferUsage;

    fn create_test_device() -> Arc<GraphicsDevice> {
        let instance =
            GraphicsInstance::with_params(InstanceParameters::new().with_backend(BackendType::Dummy))
                .unwrap();
        instance.create_device().unwrap()
    }

    #[test]
    fn test_buffer_debug() {
        let device = create_test_device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))
            .unwrap();
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("Buffer"));
        assert!(debug.contains("1024"));
    }

    #[test]
    fn test_read_back_new_buffer_is_zeroed() {
        let device = create_test_device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(16, BufferUsage::VERTEX).with_label("vb"))
            .unwrap();
        assert_eq!(buffer.label(), Some("vb"));
        assert_eq!(buffer.read_back(0, 16).unwrap(), vec![0u8; 16]);
    }

    #[test]
    fn test_read_back_out_of_range() {
        let device = create_test_device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(16, BufferUsage::VERTEX))
            .unwrap();
        assert!(matches!(
            buffer.read_back(8, 16),
            Err(GraphicsError::InvalidParameter(_))
        ));
    }
}
