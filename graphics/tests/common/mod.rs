//! Common utilities for GPU integration tests.
//!
//! This module provides shared test infrastructure that can be reused
//! across different backend implementations.

use std::sync::Arc;

use voxtile_core::mesh::generators::generate_block_corners;
use voxtile_core::scene::InstanceTransform;
use voxtile_core::texture::CpuTexture;
use voxtile_graphics::{
    BackendType, Buffer, GraphicsDevice, GraphicsInstance, InstanceParameters, MeshAsset,
};

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Available GPU backends for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Dummy backend (host memory).
    Dummy,
    /// WebGPU backend (via wgpu).
    WebGpu,
}

impl Backend {
    /// Check if this backend is compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            Backend::Dummy => cfg!(feature = "dummy"),
            Backend::WebGpu => cfg!(feature = "wgpu-backend"),
        }
    }

    /// Convert to InstanceParameters for creating a GraphicsInstance.
    pub fn to_instance_parameters(self) -> InstanceParameters {
        match self {
            Backend::Dummy => InstanceParameters::new().with_backend(BackendType::Dummy),
            Backend::WebGpu => InstanceParameters::new().with_backend(BackendType::Wgpu),
        }
    }
}

// ============================================================================
// Test Context
// ============================================================================

/// Test context providing access to graphics resources.
pub struct TestContext {
    /// The backend being tested.
    #[allow(dead_code)]
    pub backend: Backend,
    /// Graphics instance (Arc-wrapped).
    #[allow(dead_code)]
    instance: Arc<GraphicsInstance>,
    /// Graphics device for creating resources.
    pub device: Arc<GraphicsDevice>,
}

impl TestContext {
    /// Create a new test context for the given backend.
    ///
    /// Returns `None` if the backend is not available, e.g. no GPU adapter.
    pub fn new(backend: Backend) -> Option<Self> {
        Self::with_parameters(backend, backend.to_instance_parameters())
    }

    /// Create a context with explicit instance parameters.
    pub fn with_parameters(backend: Backend, params: InstanceParameters) -> Option<Self> {
        if !backend.is_available() {
            return None;
        }

        let _ = env_logger::builder().is_test(true).try_init();
        let instance = GraphicsInstance::with_params(params).ok()?;
        let device = instance.create_device().ok()?;

        Some(Self {
            backend,
            instance,
            device,
        })
    }

    /// Build a block mesh with a one-texel palette.
    #[allow(dead_code)]
    pub fn create_block_mesh(&self, label: &str) -> MeshAsset {
        let palette = CpuTexture::from_colors(&[[120, 200, 80, 255]]).expect("palette");
        MeshAsset::build(&self.device, &generate_block_corners(0.8, 0.5), &palette, label)
            .expect("Failed to build block mesh")
    }
}

/// Read `count` instance transforms from the start of `buffer`.
#[allow(dead_code)]
pub fn read_transforms(buffer: &Buffer, count: u32) -> Vec<InstanceTransform> {
    let bytes = buffer
        .read_back(0, u64::from(count) * InstanceTransform::SIZE)
        .expect("Failed to read back buffer");
    bytemuck::pod_collect_to_vec(&bytes)
}

/// Deterministic transform for instance `i`.
#[allow(dead_code)]
pub fn transform(i: u32) -> InstanceTransform {
    InstanceTransform::new([i as f32 * 16.0, 0.0, -(i as f32) * 16.0], i as f32 * 0.1)
}
