//! Graphics instance.
//!
//! The [`GraphicsInstance`] is the top-level entry point for the graphics system.
//! It owns the GPU backend and the [`GraphicsDevice`]s created from it.

use std::sync::{Arc, RwLock, Weak};

use crate::backend::{self, GpuBackend};
use crate::device::{DeviceCapabilities, GraphicsDevice};
use crate::error::GraphicsError;

/// Which GPU backend to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendType {
    /// wgpu if an adapter is available, otherwise dummy.
    #[default]
    Auto,
    /// wgpu only; instance creation fails without an adapter.
    Wgpu,
    /// In-memory dummy backend.
    Dummy,
}

/// Parameters for creating a [`GraphicsInstance`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstanceParameters {
    /// Requested backend.
    pub backend: BackendType,
    /// Device-local memory budget in bytes. Only the dummy backend honors it.
    pub device_memory_budget: Option<u64>,
}

impl InstanceParameters {
    /// Create default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the backend.
    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backend = backend;
        self
    }

    /// Limit device-local memory (dummy backend).
    pub fn with_device_memory_budget(mut self, bytes: u64) -> Self {
        self.device_memory_budget = Some(bytes);
        self
    }
}

/// The graphics instance owns the backend and tracks its devices.
///
/// # Thread Safety
///
/// `GraphicsInstance` is `Send + Sync` and can be safely shared across threads.
///
/// # Example
///
/// ```ignore
/// let instance = GraphicsInstance::with_params(
///     InstanceParameters::new().with_backend(BackendType::Dummy),
/// )?;
/// let device = instance.create_device()?;
/// ```
pub struct GraphicsInstance {
    /// Weak self-reference for creating devices.
    self_ref: RwLock<Weak<GraphicsInstance>>,
    /// Devices created by this instance.
    devices: RwLock<Vec<Arc<GraphicsDevice>>>,
    /// GPU backend for this instance.
    backend: Arc<dyn GpuBackend>,
}

impl GraphicsInstance {
    /// Create a new graphics instance with default parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the graphics system cannot be initialized.
    pub fn new() -> Result<Arc<Self>, GraphicsError> {
        Self::with_params(InstanceParameters::default())
    }

    /// Create a new graphics instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested backend cannot be created.
    pub fn with_params(params: InstanceParameters) -> Result<Arc<Self>, GraphicsError> {
        log::info!("Creating GraphicsInstance ({:?})", params.backend);

        let backend = backend::create_backend(&params)?;
        log::info!("Using GPU backend: {}", backend.name());

        let instance = Arc::new(Self {
            self_ref: RwLock::new(Weak::new()),
            devices: RwLock::new(Vec::new()),
            backend,
        });

        // Store self-reference
        if let Ok(mut self_ref) = instance.self_ref.write() {
            *self_ref = Arc::downgrade(&instance);
        }

        Ok(instance)
    }

    /// Get the GPU backend (internal use only).
    pub(crate) fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Get the strong self-reference.
    fn arc_self(&self) -> Option<Arc<GraphicsInstance>> {
        self.self_ref.read().ok().and_then(|r| r.upgrade())
    }

    /// Create a graphics device with default capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if device creation fails.
    pub fn create_device(&self) -> Result<Arc<GraphicsDevice>, GraphicsError> {
        self.create_device_with_capabilities(DeviceCapabilities::default())
    }

    /// Create a graphics device with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance has been dropped.
    pub fn create_device_with_capabilities(
        &self,
        capabilities: DeviceCapabilities,
    ) -> Result<Arc<GraphicsDevice>, GraphicsError> {
        log::info!("Creating device on backend: {}", self.backend.name());

        let instance = self.arc_self().ok_or_else(|| {
            GraphicsError::ResourceCreationFailed("instance has been dropped".to_string())
        })?;
        let device = Arc::new(GraphicsDevice::new(
            instance,
            self.backend.name().to_string(),
            capabilities,
        ));

        // Track the device
        if let Ok(mut devices) = self.devices.write() {
            devices.push(device.clone());
        }

        Ok(device)
    }

    /// Get the number of devices created by this instance.
    pub fn device_count(&self) -> usize {
        self.devices.read().map(|d| d.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for GraphicsInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphicsInstance")
            .field("backend", &self.backend.name())
            .field("device_count", &self.device_count())
            .finish()
    }
}

// Ensure GraphicsInstance is Send + Sync
static_assertions::assert_impl_all!(GraphicsInstance: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_instance() {
        let instance =
            GraphicsInstance::with_params(InstanceParameters::new().with_backend(BackendType::Dummy))
                .unwrap();
        assert_eq!(instance.backend_name(), "Dummy Backend");
        let _device = instance.create_device().unwrap();
        assert_eq!(instance.device_count(), 1);
    }

    #[test]
    fn test_parameters_builder() {
        let params = InstanceParameters::new()
            .with_backend(BackendType::Wgpu)
            .with_device_memory_budget(1024);
        assert_eq!(params.backend, BackendType::Wgpu);
        assert_eq!(params.device_memory_budget, Some(1024));
    }
}
