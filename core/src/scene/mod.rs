//! World-side data fed into the per-frame instance streams.
//!
//! All types use plain arrays (`[f32; 3]`, `[f32; 2]`) instead of math
//! library types.
//!
//! - [`InstanceTransform`] - Per-instance GPU record (position + yaw)
//! - [`MeshCategory`] - Closed set of static meshes
//! - [`TileKind`] / [`Aabb`] - Tiles and ground-plane bounds
//! - [`Entity`] - Player and dropped items
//! - [`Level`] - Tile grid plus entities

mod category;
mod entity;
mod level;
mod tile;
mod transform;

pub use category::MeshCategory;
pub use entity::{Entity, EntityRecord, EntityState, ITEM_RADIUS, PLAYER_RADIUS, PLAYER_SPEED};
pub use level::Level;
pub use tile::{Aabb, TILE_WIDTH, TileKind, tile_bounds, tile_transform};
pub use transform::InstanceTransform;
