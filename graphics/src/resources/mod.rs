//! GPU resources.
//!
//! This module contains the GPU resource types that are created by [`GraphicsDevice`]:
//! - [`Buffer`] - Device-resident memory buffer
//! - [`StagingBuffer`] - Host-visible memory feeding uploads
//! - [`Texture`] - GPU texture/image
//! - [`GrowableBuffer`] - Geometrically growing staging buffer with a device mirror
//!
//! Resources are reference-counted with [`Arc`] and can be shared across threads.
//! Each resource holds a weak reference back to its parent device.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod buffer;
mod growable;
mod staging;
mod texture;

pub use buffer::Buffer;
pub use growable::GrowableBuffer;
pub use staging::StagingBuffer;
pub use texture::Texture;
