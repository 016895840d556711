//! Square tile grid plus its live entities.

use super::entity::Entity;
use super::tile::{Aabb, TileKind, tile_bounds};

/// One level: a `width x width` tile grid centred on the origin and the
/// entities walking on it.
#[derive(Debug, Clone)]
pub struct Level {
    width: i32,
    tiles: Vec<Option<TileKind>>,
    entities: Vec<Entity>,
}

impl Level {
    /// Create an empty level. Negative widths are clamped to zero.
    pub fn new(width: i32) -> Self {
        let width = width.max(0);
        Self {
            width,
            tiles: vec![None; (width * width) as usize],
            entities: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    fn origin(&self) -> i32 {
        -(self.width / 2)
    }

    fn slot(&self, x: i32, z: i32) -> Option<usize> {
        let (gx, gz) = (x - self.origin(), z - self.origin());
        ((0..self.width).contains(&gx) && (0..self.width).contains(&gz))
            .then(|| (gz * self.width + gx) as usize)
    }

    pub fn tile(&self, x: i32, z: i32) -> Option<TileKind> {
        self.slot(x, z).and_then(|i| self.tiles[i])
    }

    /// Set a tile. Returns `false` if `(x, z)` is outside the grid.
    pub fn set_tile(&mut self, x: i32, z: i32, kind: Option<TileKind>) -> bool {
        match self.slot(x, z) {
            Some(i) => {
                self.tiles[i] = kind;
                true
            }
            None => false,
        }
    }

    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Tick every live entity, then drop the dead ones.
    pub fn tick(&mut self, dt: f32) {
        for entity in self.entities.iter_mut().filter(|e| e.is_alive()) {
            entity.tick(dt);
        }
        self.entities.retain(Entity::is_alive);
    }

    /// Entities whose bounds intersect `view`.
    pub fn visible_entities<'a>(&'a self, view: &'a Aabb) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .iter()
            .filter(move |e| view.intersects(&e.bounds()))
    }

    /// Occupied tiles whose bounds intersect `view`, as `(x, z, kind)`.
    pub fn visible_tiles<'a>(
        &'a self,
        view: &'a Aabb,
    ) -> impl Iterator<Item = (i32, i32, TileKind)> + 'a {
        let origin = self.origin();
        let width = self.width;
        (0..width * width).filter_map(move |i| {
            let (x, z) = (origin + i % width, origin + i / width);
            let kind = self.tiles[i as usize]?;
            view.intersects(&tile_bounds(x, z)).then_some((x, z, kind))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MeshCategory;

    #[test]
    fn test_grid_addressing() {
        let mut level = Level::new(4);
        assert!(level.set_tile(-2, -2, Some(TileKind::Sand)));
        assert!(level.set_tile(1, 1, Some(TileKind::Water)));
        assert!(!level.set_tile(2, 0, Some(TileKind::Dirt)));
        assert_eq!(level.tile(-2, -2), Some(TileKind::Sand));
        assert_eq!(level.tile(1, 1), Some(TileKind::Water));
        assert_eq!(level.tile(0, 0), None);
    }

    #[test]
    fn test_visible_tiles_filters_by_view() {
        let mut level = Level::new(32);
        level.set_tile(0, 0, Some(TileKind::Grass));
        level.set_tile(10, 0, Some(TileKind::Dirt));
        let view = Aabb::around([0.0, 0.0], 100.0);
        let visible: Vec<_> = level.visible_tiles(&view).collect();
        assert_eq!(visible, vec![(0, 0, TileKind::Grass)]);
    }

    #[test]
    fn test_tick_drops_dead_entities() {
        let mut level = Level::new(1);
        level.spawn(Entity::player([0.0, 0.0, 0.0]));
        level.spawn(Entity::item([0.0, 0.0, 0.0], MeshCategory::Dirt00));
        level.entities_mut()[1].state_mut().alive = false;
        level.tick(0.1);
        assert_eq!(level.entities().len(), 1);
    }
}
