//! Per-category mesh registry, instance streams and the frame draw loop.

use std::collections::BTreeMap;
use std::sync::Arc;

use voxtile_core::scene::{InstanceTransform, MeshCategory};

use crate::device::GraphicsDevice;
use crate::draw::DrawEncoder;
use crate::mesh::MeshAsset;
use crate::resources::GrowableBuffer;
use crate::transfer::CopyPass;
use crate::types::BufferUsage;

/// Instance stream of one mesh category.
pub type InstanceStream = GrowableBuffer<InstanceTransform>;

/// Owns everything the draw loop needs, keyed by [`MeshCategory`].
///
/// # Frame cycle
///
/// ```ignore
/// for (category, transform) in visible {
///     context.push_instance(category, transform);
/// }
/// let mut pass = device.begin_copy_pass();
/// context.upload_instances(&mut pass);
/// pass.submit()?;
/// let draws = context.draw(&mut encoder);
/// ```
pub struct RenderContext {
    device: Arc<GraphicsDevice>,
    meshes: BTreeMap<MeshCategory, MeshAsset>,
    instances: BTreeMap<MeshCategory, InstanceStream>,
}

impl RenderContext {
    /// Create a context with an empty instance stream per category.
    pub fn new(device: &Arc<GraphicsDevice>) -> Self {
        let instances = MeshCategory::ALL
            .into_iter()
            .map(|category| {
                let label = format!("{} instances", category.asset_name());
                (category, InstanceStream::new(device, BufferUsage::VERTEX, label))
            })
            .collect();
        Self {
            device: Arc::clone(device),
            meshes: BTreeMap::new(),
            instances,
        }
    }

    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    /// Register the mesh drawn for `category`. Returns the replaced mesh.
    pub fn register_mesh(&mut self, category: MeshCategory, mesh: MeshAsset) -> Option<MeshAsset> {
        self.meshes.insert(category, mesh)
    }

    pub fn mesh(&self, category: MeshCategory) -> Option<&MeshAsset> {
        self.meshes.get(&category)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn instances(&self, category: MeshCategory) -> Option<&InstanceStream> {
        self.instances.get(&category)
    }

    /// Instances queued or uploaded this frame for `category`.
    pub fn instance_count(&self, category: MeshCategory) -> u32 {
        self.instances.get(&category).map_or(0, InstanceStream::size)
    }

    /// Queue one instance for this frame.
    ///
    /// Returns `false` if the instance was dropped; the failure is logged.
    pub fn push_instance(&mut self, category: MeshCategory, transform: InstanceTransform) -> bool {
        let Some(stream) = self.instances.get_mut(&category) else {
            return false;
        };
        match stream.append(transform) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Dropped {category} instance: {e}");
                false
            }
        }
    }

    /// Record uploads of every instance stream into `pass`.
    ///
    /// Returns the number of streams that failed; each failure is logged and
    /// that category is skipped by [`RenderContext::draw`] this frame.
    pub fn upload_instances(&mut self, pass: &mut CopyPass) -> usize {
        let mut failed = 0;
        for (category, stream) in &mut self.instances {
            if let Err(e) = stream.upload(pass) {
                log::error!("Failed to upload {category} instances: {e}");
                failed += 1;
            }
        }
        failed
    }

    /// Issue one instanced draw per category with instances, a mesh and a
    /// device buffer. Returns the number of draws issued.
    pub fn draw(&self, encoder: &mut dyn DrawEncoder) -> usize {
        let mut draws = 0;
        for (category, stream) in &self.instances {
            let instance_count = stream.size();
            if instance_count == 0 {
                continue;
            }
            let Some(mesh) = self.meshes.get(category) else {
                log::trace!("No mesh registered for {category}, skipping draw");
                continue;
            };
            let Some(instances) = stream.device_buffer() else {
                continue;
            };

            let bound = encoder
                .bind_vertex_buffers(mesh.vertex_buffer(), instances)
                .and_then(|()| encoder.bind_index_buffer(mesh.index_buffer(), mesh.index_format()))
                .and_then(|()| encoder.bind_palette(mesh.palette()));
            if let Err(e) = bound {
                log::warn!("Skipping {category} draw: {e}");
                continue;
            }

            encoder.draw_indexed(mesh.index_count(), instance_count);
            draws += 1;
        }
        draws
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("meshes", &self.meshes.keys().collect::<Vec<_>>())
            .field("instances", &self.instances)
            .finish()
    }
}
