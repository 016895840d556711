//! Static mesh geometry resident on the GPU.

use std::path::Path;
use std::sync::Arc;

use voxtile_core::mesh::{FaceCorner, IndexedAttributes, MeshData, PackedVertex, build_mesh};
use voxtile_core::scene::MeshCategory;
use voxtile_core::texture::{CpuTexture, load_palette};

use crate::device::GraphicsDevice;
use crate::error::{GraphicsError, MeshLoadError};
use crate::resources::{Buffer, Texture};
use crate::transfer::BufferCopyRegion;
use crate::types::{
    BufferDescriptor, BufferUsage, IndexFormat, TextureDescriptor, TextureFormat, TextureUsage,
};

/// A built mesh: exact-size vertex and index buffers plus its palette.
///
/// Immutable after construction. The vertex buffer holds one
/// [`PackedVertex`] per unique vertex; the index buffer holds one 16-bit
/// index per face corner.
pub struct MeshAsset {
    label: String,
    vertex_buffer: Arc<Buffer>,
    index_buffer: Arc<Buffer>,
    palette: Arc<Texture>,
    vertex_count: u32,
    index_count: u32,
}

impl MeshAsset {
    /// Upload built mesh data and its palette in one copy pass.
    ///
    /// # Errors
    ///
    /// Returns an error if any GPU resource cannot be created or the copy fails.
    pub fn upload(
        device: &Arc<GraphicsDevice>,
        mesh: &MeshData,
        palette: &CpuTexture,
        label: &str,
    ) -> Result<Self, GraphicsError> {
        let vertex_count = mesh.vertex_count() as u32;
        let index_count = mesh.index_count() as u32;
        let vertex_bytes = u64::from(vertex_count) * PackedVertex::SIZE;
        let index_bytes = u64::from(index_count) * IndexFormat::Uint16.size();

        let staging =
            device.create_staging_buffer(vertex_bytes + index_bytes, Some(&format!("{label} (upload)")))?;
        staging.write(0, mesh.vertex_bytes())?;
        staging.write(vertex_bytes, mesh.index_bytes())?;
        staging.unmap();

        let vertex_buffer = device.create_buffer(
            &BufferDescriptor::new(vertex_bytes, BufferUsage::VERTEX | BufferUsage::COPY_DST)
                .with_label(format!("{label} vertices")),
        )?;
        let index_buffer = device.create_buffer(
            &BufferDescriptor::new(index_bytes, BufferUsage::INDEX | BufferUsage::COPY_DST)
                .with_label(format!("{label} indices")),
        )?;
        let palette_texture = device.create_texture(
            &TextureDescriptor::new_2d(
                palette.width,
                palette.height,
                TextureFormat::Rgba8UnormSrgb,
                TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
            )
            .with_label(format!("{label} palette")),
        )?;

        let mut pass = device.begin_copy_pass();
        pass.record_buffer_upload(
            &staging,
            &vertex_buffer,
            BufferCopyRegion::whole(vertex_bytes),
        )?;
        pass.record_buffer_upload(
            &staging,
            &index_buffer,
            BufferCopyRegion::new(vertex_bytes, 0, index_bytes),
        )?;
        pass.record_texture_upload(palette.data.clone(), &palette_texture)?;
        pass.submit()?;

        log::debug!(
            "MeshAsset '{}': {} vertices, {} indices",
            label,
            vertex_count,
            index_count
        );

        Ok(Self {
            label: label.to_string(),
            vertex_buffer,
            index_buffer,
            palette: palette_texture,
            vertex_count,
            index_count,
        })
    }

    /// Deduplicate a face-corner stream and upload the result.
    ///
    /// # Errors
    ///
    /// Returns [`MeshLoadError::Build`] for invalid geometry; no GPU
    /// resources are created in that case.
    pub fn build(
        device: &Arc<GraphicsDevice>,
        corners: &[FaceCorner],
        palette: &CpuTexture,
        label: &str,
    ) -> Result<Self, MeshLoadError> {
        let mesh = build_mesh(corners)?;
        Ok(Self::upload(device, &mesh, palette, label)?)
    }

    /// Build from indexed attribute pools, as produced by model loaders.
    ///
    /// # Errors
    ///
    /// Same as [`MeshAsset::build`], plus missing or out-of-range attributes.
    pub fn from_attributes(
        device: &Arc<GraphicsDevice>,
        attributes: &IndexedAttributes,
        palette: &CpuTexture,
        label: &str,
    ) -> Result<Self, MeshLoadError> {
        let corners = attributes.resolve()?;
        Self::build(device, &corners, palette, label)
    }

    /// Load the palette `<assets_dir>/<category>.png` and build the mesh for
    /// `category` from `attributes`.
    ///
    /// # Errors
    ///
    /// Returns [`MeshLoadError::Palette`] if the palette cannot be read.
    pub fn load(
        device: &Arc<GraphicsDevice>,
        assets_dir: &Path,
        category: MeshCategory,
        attributes: &IndexedAttributes,
    ) -> Result<Self, MeshLoadError> {
        let palette_path = assets_dir.join(format!("{}.png", category.asset_name()));
        let palette = load_palette(&palette_path)?;
        Self::from_attributes(device, attributes, &palette, category.asset_name())
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Vertex buffer bound at slot 0.
    pub fn vertex_buffer(&self) -> &Arc<Buffer> {
        &self.vertex_buffer
    }

    /// Index buffer.
    pub fn index_buffer(&self) -> &Arc<Buffer> {
        &self.index_buffer
    }

    /// Index element format. Always 16-bit.
    pub fn index_format(&self) -> IndexFormat {
        IndexFormat::Uint16
    }

    /// Palette texture sampled by the mesh.
    pub fn palette(&self) -> &Arc<Texture> {
        &self.palette
    }

    /// Unique vertex count.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Index count (one per face corner).
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

impl std::fmt::Debug for MeshAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshAsset")
            .field("label", &self.label)
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .finish()
    }
}
