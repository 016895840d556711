//! Graphics error types.

use std::fmt;

use voxtile_core::mesh::MeshBuildError;
use voxtile_core::texture::PaletteError;

/// Errors that can occur in the graphics system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// Failed to initialize the graphics system.
    InitializationFailed(String),
    /// Failed to create a resource.
    ResourceCreationFailed(String),
    /// Failed to map host-visible memory for CPU access.
    MapFailed(String),
    /// Out of GPU memory.
    OutOfMemory,
    /// The GPU device was lost.
    DeviceLost,
    /// An invalid parameter was provided.
    InvalidParameter(String),
    /// An operation was issued in the wrong resource state.
    InvalidState(String),
    /// An internal error occurred.
    Internal(String),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed(msg) => write!(f, "initialization failed: {msg}"),
            Self::ResourceCreationFailed(msg) => write!(f, "resource creation failed: {msg}"),
            Self::MapFailed(msg) => write!(f, "buffer map failed: {msg}"),
            Self::OutOfMemory => write!(f, "out of GPU memory"),
            Self::DeviceLost => write!(f, "GPU device lost"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for GraphicsError {}

/// Errors that abort loading a mesh asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshLoadError {
    /// The attribute data could not be built into a mesh.
    Build(MeshBuildError),
    /// The palette texture could not be loaded.
    Palette(PaletteError),
    /// GPU resources for the mesh could not be created or filled.
    Graphics(GraphicsError),
}

impl fmt::Display for MeshLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(e) => write!(f, "mesh build failed: {e}"),
            Self::Palette(e) => write!(f, "mesh palette failed: {e}"),
            Self::Graphics(e) => write!(f, "mesh upload failed: {e}"),
        }
    }
}

impl std::error::Error for MeshLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Build(e) => Some(e),
            Self::Palette(e) => Some(e),
            Self::Graphics(e) => Some(e),
        }
    }
}

impl From<MeshBuildError> for MeshLoadError {
    fn from(e: MeshBuildError) -> Self {
        Self::Build(e)
    }
}

impl From<PaletteError> for MeshLoadError {
    fn from(e: PaletteError) -> Self {
        Self::Palette(e)
    }
}

impl From<GraphicsError> for MeshLoadError {
    fn from(e: GraphicsError) -> Self {
        Self::Graphics(e)
    }
}
