//! # Voxtile Core
//!
//! GPU-agnostic data for the voxtile client: packed mesh vertices and the
//! deduplicating mesh builder, palette textures, and the world-side types that
//! feed per-frame instance streams.

pub mod mesh;
pub mod scene;
pub mod texture;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log that the core library is ready.
pub fn init() {
    log::info!("Voxtile Core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
