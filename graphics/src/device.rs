//! Graphics device.
//!
//! The [`GraphicsDevice`] is the main interface for creating GPU resources.
//! It is created by [`GraphicsInstance::create_device`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::backend::GpuBackend;
use crate::error::GraphicsError;
use crate::instance::GraphicsInstance;
use crate::resources::{Buffer, StagingBuffer, Texture};
use crate::transfer::CopyPass;
use crate::types::{BufferDescriptor, TextureDescriptor};

/// Capabilities of a graphics device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceCapabilities {
    /// Maximum texture dimension.
    pub max_texture_dimension: u32,
    /// Maximum size of a device or staging buffer.
    pub max_buffer_size: u64,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_texture_dimension: 16384,
            max_buffer_size: 1 << 30, // 1 GB
        }
    }
}

impl DeviceCapabilities {
    /// Override the buffer size limit.
    pub fn with_max_buffer_size(mut self, size: u64) -> Self {
        self.max_buffer_size = size;
        self
    }
}

/// A graphics device for creating GPU resources.
///
/// The device is created by [`GraphicsInstance::create_device`] and provides
/// methods for creating buffers, staging buffers and textures, and for
/// recording copy passes between them.
///
/// # Thread Safety
///
/// `GraphicsDevice` is `Send + Sync` and can be safely shared across threads.
///
/// # Example
///
/// ```ignore
/// let device = instance.create_device()?;
///
/// let staging = device.create_staging_buffer(64, Some("upload"))?;
/// staging.write(0, &bytes)?;
/// staging.unmap();
///
/// let buffer = device.create_buffer(&BufferDescriptor::new(64, BufferUsage::VERTEX | BufferUsage::COPY_DST))?;
/// let mut pass = device.begin_copy_pass();
/// pass.record_buffer_upload(&staging, &buffer, BufferCopyRegion::whole(64))?;
/// pass.submit()?;
/// ```
pub struct GraphicsDevice {
    instance: Arc<GraphicsInstance>,
    name: String,
    capabilities: DeviceCapabilities,
    next_texture_id: AtomicU64,
    // Track allocated resources (weak references for cleanup/debugging)
    buffers: RwLock<Vec<Weak<Buffer>>>,
    staging_buffers: RwLock<Vec<Weak<StagingBuffer>>>,
    textures: RwLock<Vec<Weak<Texture>>>,
}

impl GraphicsDevice {
    /// Create a new graphics device (called by GraphicsInstance).
    pub(crate) fn new(
        instance: Arc<GraphicsInstance>,
        name: String,
        capabilities: DeviceCapabilities,
    ) -> Self {
        Self {
            instance,
            name,
            capabilities,
            next_texture_id: AtomicU64::new(1),
            buffers: RwLock::new(Vec::new()),
            staging_buffers: RwLock::new(Vec::new()),
            textures: RwLock::new(Vec::new()),
        }
    }

    /// Get the parent instance.
    pub fn instance(&self) -> &Arc<GraphicsInstance> {
        &self.instance
    }

    /// Get the GPU backend (internal use only).
    pub(crate) fn backend(&self) -> &Arc<dyn GpuBackend> {
        self.instance.backend()
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device capabilities.
    pub fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn validate_buffer_size(&self, size: u64) -> Result<(), GraphicsError> {
        if size > self.capabilities.max_buffer_size {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer size {} exceeds maximum {}",
                size, self.capabilities.max_buffer_size
            )));
        }

        if size == 0 {
            return Err(GraphicsError::InvalidParameter(
                "buffer size cannot be zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a device-resident GPU buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer size exceeds device limits or allocation fails.
    pub fn create_buffer(
        self: &Arc<Self>,
        descriptor: &BufferDescriptor,
    ) -> Result<Arc<Buffer>, GraphicsError> {
        self.validate_buffer_size(descriptor.size)?;

        let gpu = self.backend().create_buffer(descriptor)?;
        let buffer = Arc::new(Buffer::new(
            Arc::downgrade(self),
            descriptor.clone(),
            gpu,
        ));

        // Track it
        if let Ok(mut buffers) = self.buffers.write() {
            buffers.push(Arc::downgrade(&buffer));
        }

        log::trace!(
            "GraphicsDevice: created buffer {:?}, size={}",
            descriptor.label,
            descriptor.size
        );

        Ok(buffer)
    }

    /// Create a host-visible staging buffer. It starts out mapped.
    ///
    /// # Errors
    ///
    /// Returns an error if the size exceeds device limits or allocation fails.
    pub fn create_staging_buffer(
        self: &Arc<Self>,
        size: u64,
        label: Option<&str>,
    ) -> Result<Arc<StagingBuffer>, GraphicsError> {
        self.validate_buffer_size(size)?;

        let gpu = self.backend().create_staging_buffer(size, label)?;
        let staging = Arc::new(StagingBuffer::new(
            Arc::downgrade(self),
            size,
            label.map(str::to_string),
            gpu,
        ));

        if let Ok(mut staging_buffers) = self.staging_buffers.write() {
            staging_buffers.push(Arc::downgrade(&staging));
        }

        log::trace!("GraphicsDevice: created staging buffer {label:?}, size={size}");

        Ok(staging)
    }

    /// Create a GPU texture.
    ///
    /// # Errors
    ///
    /// Returns an error if the texture dimensions exceed device limits or allocation fails.
    pub fn create_texture(
        self: &Arc<Self>,
        descriptor: &TextureDescriptor,
    ) -> Result<Arc<Texture>, GraphicsError> {
        // Validate
        let max_dim = self.capabilities.max_texture_dimension;
        if descriptor.size.width > max_dim || descriptor.size.height > max_dim {
            return Err(GraphicsError::InvalidParameter(format!(
                "texture dimension exceeds maximum {max_dim}"
            )));
        }

        if descriptor.size.width == 0 || descriptor.size.height == 0 {
            return Err(GraphicsError::InvalidParameter(
                "texture dimensions cannot be zero".to_string(),
            ));
        }

        let gpu = self.backend().create_texture(descriptor)?;
        let id = self.next_texture_id.fetch_add(1, Ordering::Relaxed);
        let texture = Arc::new(Texture::new(
            id,
            Arc::downgrade(self),
            descriptor.clone(),
            gpu,
        ));

        // Track it
        if let Ok(mut textures) = self.textures.write() {
            textures.push(Arc::downgrade(&texture));
        }

        log::trace!(
            "GraphicsDevice: created texture {:?}, size={}x{}",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height
        );

        Ok(texture)
    }

    /// Start recording a batch of staging-to-device copies.
    pub fn begin_copy_pass(self: &Arc<Self>) -> CopyPass {
        CopyPass::new(Arc::clone(self))
    }

    /// Get the number of live buffers created by this device.
    pub fn buffer_count(&self) -> usize {
        self.buffers
            .read()
            .map(|b| b.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Get the number of live staging buffers created by this device.
    pub fn staging_buffer_count(&self) -> usize {
        self.staging_buffers
            .read()
            .map(|s| s.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Get the number of live textures created by this device.
    pub fn texture_count(&self) -> usize {
        self.textures
            .read()
            .map(|t| t.iter().filter(|w| w.strong_count() > 0).count())
            .unwrap_or(0)
    }

    /// Clean up dead weak references to released resources.
    pub fn cleanup_dead_resources(&self) {
        if let Ok(mut buffers) = self.buffers.write() {
            buffers.retain(|w| w.strong_count() > 0);
        }
        if let Ok(mut staging_buffers) = self.staging_buffers.write() {
            staging_buffers.retain(|w| w.strong_count() > 0);
        }
        if let Ok(mut textures) = self.textures.write() {
            textures.retain(|w| w.strong_count() > 0);
        }
    }
}

impl std::fmt::Debug for GraphicsDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsDevice")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

// Ensure GraphicsDevice is Send + Sync
static_assertions::assert_impl_all!(GraphicsDevice: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{BackendType, InstanceParameters};
    use crate::types::{BufferUsage, TextureFormat, TextureUsage};

    fn create_test_device() -> Arc<GraphicsDevice> {
        let instance =
            GraphicsInstance::with_params(InstanceParameters::new().with_backend(BackendType::Dummy))
                .unwrap();
        instance.create_device().unwrap()
    }

    #[test]
    fn test_device_name() {
        let device = create_test_device();
        assert_eq!(device.name(), "Dummy Backend");
    }

    #[test]
    fn test_create_buffer() {
        let device = create_test_device();
        let buffer = device
            .create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))
            .unwrap();
        assert_eq!(buffer.size(), 1024);
        assert_eq!(device.buffer_count(), 1);
    }

    #[test]
    fn test_create_buffer_zero_size() {
        let device = create_test_device();
        let result = device.create_buffer(&BufferDescriptor::new(0, BufferUsage::VERTEX));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_buffer_over_limit() {
        let instance =
            GraphicsInstance::with_params(InstanceParameters::new().with_backend(BackendType::Dummy))
                .unwrap();
        let device = instance
            .create_device_with_capabilities(DeviceCapabilities::default().with_max_buffer_size(64))
            .unwrap();
        assert!(matches!(
            device.create_buffer(&BufferDescriptor::new(65, BufferUsage::VERTEX)),
            Err(GraphicsError::InvalidParameter(_))
        ));
        assert!(device.create_staging_buffer(65, None).is_err());
        assert!(device.create_staging_buffer(64, None).is_ok());
    }

    #[test]
    fn test_create_staging_buffer_starts_mapped() {
        let device = create_test_device();
        let staging = device.create_staging_buffer(16, Some("staging")).unwrap();
        assert!(staging.is_mapped());
        assert_eq!(staging.label(), Some("staging"));
        assert_eq!(device.staging_buffer_count(), 1);
    }

    #[test]
    fn test_create_texture() {
        let device = create_test_device();
        let texture = device
            .create_texture(&TextureDescriptor::new_2d(
                512,
                512,
                TextureFormat::Rgba8Unorm,
                TextureUsage::TEXTURE_BINDING,
            ))
            .unwrap();
        assert_eq!(texture.width(), 512);
        assert_eq!(texture.height(), 512);
        assert_eq!(device.texture_count(), 1);
    }

    #[test]
    fn test_texture_ids_are_unique() {
        let device = create_test_device();
        let desc = TextureDescriptor::new_2d(
            4,
            1,
            TextureFormat::Rgba8Unorm,
            TextureUsage::TEXTURE_BINDING,
        );
        let a = device.create_texture(&desc).unwrap();
        let b = device.create_texture(&desc).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_create_texture_zero_size() {
        let device = create_test_device();
        let result = device.create_texture(&TextureDescriptor::new_2d(
            0,
            512,
            TextureFormat::Rgba8Unorm,
            TextureUsage::TEXTURE_BINDING,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_resource_cleanup() {
        let device = create_test_device();
        {
            let _buffer = device
                .create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))
                .unwrap();
            let _staging = device.create_staging_buffer(1024, None).unwrap();
            assert_eq!(device.buffer_count(), 1);
            assert_eq!(device.staging_buffer_count(), 1);
        }
        // Resources dropped
        device.cleanup_dead_resources();
        assert_eq!(device.buffer_count(), 0);
        assert_eq!(device.staging_buffer_count(), 0);
    }
}
