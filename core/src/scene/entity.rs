//! World entities as a closed set of variants.

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};

use super::category::MeshCategory;
use super::tile::Aabb;
use super::transform::InstanceTransform;

/// Player walking speed in world units per second.
pub const PLAYER_SPEED: f32 = 32.0;
/// Collision radius of the player.
pub const PLAYER_RADIUS: f32 = 4.0;
/// Collision radius of a dropped item.
pub const ITEM_RADIUS: f32 = 2.0;
/// Spin rate of a dropped item in radians per second.
pub const ITEM_SPIN: f32 = 1.5;

/// State shared by every entity variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityState {
    pub position: [f32; 3],
    pub rotation: f32,
    pub radius: f32,
    pub alive: bool,
}

impl EntityState {
    fn new(position: [f32; 3], radius: f32) -> Self {
        Self {
            position,
            rotation: 0.0,
            radius,
            alive: true,
        }
    }
}

/// A world entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// Player moved by a per-tick input direction on the x/z plane.
    Player { state: EntityState, input: [f32; 2] },
    /// Dropped item drawn with a tile mesh.
    Item {
        state: EntityState,
        category: MeshCategory,
    },
}

/// Fixed-size serialized entity.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct EntityRecord {
    pub kind: u32,
    pub category: u32,
    pub position: [f32; 3],
    pub rotation: f32,
    pub radius: f32,
}

static_assertions::assert_eq_size!(EntityRecord, [u8; 28]);

const KIND_PLAYER: u32 = 0;
const KIND_ITEM: u32 = 1;

impl Entity {
    pub fn player(position: [f32; 3]) -> Self {
        Self::Player {
            state: EntityState::new(position, PLAYER_RADIUS),
            input: [0.0, 0.0],
        }
    }

    pub fn item(position: [f32; 3], category: MeshCategory) -> Self {
        Self::Item {
            state: EntityState::new(position, ITEM_RADIUS),
            category,
        }
    }

    pub fn state(&self) -> &EntityState {
        match self {
            Self::Player { state, .. } | Self::Item { state, .. } => state,
        }
    }

    pub fn state_mut(&mut self) -> &mut EntityState {
        match self {
            Self::Player { state, .. } | Self::Item { state, .. } => state,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state().alive
    }

    /// Set the player's movement direction. No effect on other variants.
    pub fn set_input(&mut self, direction: [f32; 2]) {
        if let Self::Player { input, .. } = self {
            *input = direction;
        }
    }

    /// Advance the entity by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        match self {
            Self::Player { state, input } => {
                let [dx, dz] = *input;
                let length = (dx * dx + dz * dz).sqrt();
                if length > 0.0 {
                    let step = PLAYER_SPEED * dt / length;
                    state.position[0] += dx * step;
                    state.position[2] += dz * step;
                    state.rotation = dx.atan2(dz);
                }
            }
            Self::Item { state, .. } => {
                state.rotation = (state.rotation + ITEM_SPIN * dt).rem_euclid(TAU);
            }
        }
    }

    /// Mesh drawn for this entity.
    pub fn mesh_category(&self) -> MeshCategory {
        match self {
            Self::Player { .. } => MeshCategory::Player00,
            Self::Item { category, .. } => *category,
        }
    }

    pub fn transform(&self) -> InstanceTransform {
        let state = self.state();
        InstanceTransform::new(state.position, state.rotation)
    }

    /// Ground bounds used for visibility tests.
    pub fn bounds(&self) -> Aabb {
        let state = self.state();
        Aabb::around([state.position[0], state.position[2]], state.radius)
    }

    pub fn serialize(&self) -> EntityRecord {
        let state = self.state();
        let (kind, category) = match self {
            Self::Player { .. } => (KIND_PLAYER, 0),
            Self::Item { category, .. } => (KIND_ITEM, *category as u32),
        };
        EntityRecord {
            kind,
            category,
            position: state.position,
            rotation: state.rotation,
            radius: state.radius,
        }
    }

    /// Rebuild an entity from its record. Unknown kinds or categories yield `None`.
    pub fn deserialize(record: &EntityRecord) -> Option<Self> {
        let mut entity = match record.kind {
            KIND_PLAYER => Self::player(record.position),
            KIND_ITEM => {
                let category = *MeshCategory::ALL.get(record.category as usize)?;
                Self::item(record.position, category)
            }
            _ => return None,
        };
        let state = entity.state_mut();
        state.rotation = record.rotation;
        state.radius = record.radius;
        Some(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_moves_with_input() {
        let mut player = Entity::player([0.0, 0.0, 0.0]);
        player.set_input([1.0, 0.0]);
        player.tick(0.5);
        assert_eq!(player.state().position, [16.0, 0.0, 0.0]);
        assert_eq!(player.mesh_category(), MeshCategory::Player00);

        player.set_input([0.0, 0.0]);
        player.tick(1.0);
        assert_eq!(player.state().position, [16.0, 0.0, 0.0]);
    }

    #[test]
    fn test_item_spins_and_wraps() {
        let mut item = Entity::item([0.0, 0.0, 0.0], MeshCategory::Tree00);
        item.tick(10.0);
        let rotation = item.state().rotation;
        assert!((0.0..TAU).contains(&rotation));
        assert_eq!(item.mesh_category(), MeshCategory::Tree00);
    }

    #[test]
    fn test_record_restores_entity() {
        let mut item = Entity::item([1.0, 2.0, 3.0], MeshCategory::Sand00);
        item.tick(0.25);
        let record = item.serialize();
        assert_eq!(Entity::deserialize(&record), Some(item));

        let bad = EntityRecord {
            kind: 9,
            ..record
        };
        assert_eq!(Entity::deserialize(&bad), None);
    }

    #[test]
    fn test_bounds_use_radius() {
        let player = Entity::player([10.0, 0.0, -4.0]);
        assert_eq!(player.bounds(), Aabb::new([6.0, -8.0], [14.0, 0.0]));
    }
}
