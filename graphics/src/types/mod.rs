//! Common types and descriptors for graphics resources.
//!
//! This module contains format enums, usage flags, and descriptor structs
//! used throughout the graphics system.

mod buffer;
mod texture;

pub use buffer::{BufferDescriptor, BufferUsage, IndexFormat, align_up};
pub use texture::{Extent2d, TextureDescriptor, TextureFormat, TextureUsage};
