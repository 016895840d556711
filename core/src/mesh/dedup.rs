//! Per-build vertex deduplication cache.

use std::collections::HashMap;

use super::vertex::PackedVertex;

/// Maps each distinct [`PackedVertex`] to its output index.
///
/// Output order is first-seen order. A cache lives for a single mesh build.
#[derive(Debug, Default)]
pub struct DedupCache {
    indices: HashMap<PackedVertex, u32>,
    vertices: Vec<PackedVertex>,
}

impl DedupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache sized for `corners` face corners.
    pub fn with_capacity(corners: usize) -> Self {
        Self {
            indices: HashMap::with_capacity(corners),
            vertices: Vec::with_capacity(corners),
        }
    }

    /// Return the index stored for `key`, inserting it at the end if new.
    pub fn lookup_or_insert(&mut self, key: PackedVertex) -> u32 {
        let next_index = self.vertices.len() as u32;
        *self.indices.entry(key).or_insert_with(|| {
            self.vertices.push(key);
            next_index
        })
    }

    /// Number of unique vertices seen so far.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether no vertex has been inserted.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Unique vertices in first-seen order.
    pub fn vertices(&self) -> &[PackedVertex] {
        &self.vertices
    }

    /// Consume the cache, keeping the unique vertex array.
    pub fn into_vertices(self) -> Vec<PackedVertex> {
        self.vertices
    }
}
