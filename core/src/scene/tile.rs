//! Tile kinds and tile-space geometry.

use super::category::MeshCategory;
use super::transform::InstanceTransform;

/// World-space width of one tile.
pub const TILE_WIDTH: f32 = 16.0;

/// Axis-aligned bounds on the ground plane (x/z).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Aabb {
    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    /// Square bounds of the given half extent around `center`.
    pub fn around(center: [f32; 2], half_extent: f32) -> Self {
        Self {
            min: [center[0] - half_extent, center[1] - half_extent],
            max: [center[0] + half_extent, center[1] + half_extent],
        }
    }

    /// Whether the two bounds overlap. Touching edges count as overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(self.max[0] < other.min[0]
            || self.min[0] > other.max[0]
            || self.max[1] < other.min[1]
            || self.min[1] > other.max[1])
    }
}

/// Ground tile types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Dirt,
    Grass,
    Sand,
    Tree,
    Water,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Dirt,
        TileKind::Grass,
        TileKind::Sand,
        TileKind::Tree,
        TileKind::Water,
    ];

    /// Mesh drawn for this tile.
    pub fn mesh_category(self) -> MeshCategory {
        match self {
            Self::Dirt => MeshCategory::Dirt00,
            Self::Grass => MeshCategory::Grass00,
            Self::Sand => MeshCategory::Sand00,
            Self::Tree => MeshCategory::Tree00,
            Self::Water => MeshCategory::Water00,
        }
    }
}

/// Instance transform of the tile at grid cell `(x, z)`.
pub fn tile_transform(x: i32, z: i32) -> InstanceTransform {
    InstanceTransform::new([x as f32 * TILE_WIDTH, 0.0, z as f32 * TILE_WIDTH], 0.0)
}

/// Ground bounds of the tile at grid cell `(x, z)`.
pub fn tile_bounds(x: i32, z: i32) -> Aabb {
    Aabb::around([x as f32 * TILE_WIDTH, z as f32 * TILE_WIDTH], TILE_WIDTH / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_transform() {
        let t = tile_transform(2, -3);
        assert_eq!(t.position, [32.0, 0.0, -48.0]);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn test_tile_bounds() {
        let b = tile_bounds(1, 0);
        assert_eq!(b.min, [8.0, -8.0]);
        assert_eq!(b.max, [24.0, 8.0]);
    }

    #[test]
    fn test_intersects() {
        let view = Aabb::around([0.0, 0.0], 100.0);
        assert!(view.intersects(&tile_bounds(6, 6)));
        // 7 * 16 - 8 = 104, past the view edge.
        assert!(!view.intersects(&tile_bounds(7, 0)));
        assert!(view.intersects(&Aabb::new([100.0, 0.0], [101.0, 1.0])));
    }

    #[test]
    fn test_tile_categories_are_distinct() {
        let mut categories: Vec<_> = TileKind::ALL.iter().map(|t| t.mesh_category()).collect();
        categories.sort();
        categories.dedup();
        assert_eq!(categories.len(), TileKind::ALL.len());
        assert!(!categories.contains(&MeshCategory::Player00));
    }
}
