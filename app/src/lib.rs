//! # Voxtile App
//!
//! Headless frame driver: builds the category meshes and the level, then
//! runs the per-frame instance streaming, upload and draw cycle.
//!
//! ## Overview
//!
//! - [`AppHandler`] - Trait for per-frame simulation callbacks
//! - [`AppArgs`] - Command line configuration
//! - [`App`] - Owns the device, meshes and level and runs the frame loop
//!
//! ## Example
//!
//! ```ignore
//! use voxtile_app::{App, AppArgs, WanderHandler};
//!
//! fn main() -> Result<(), voxtile_app::AppError> {
//!     let mut app = App::new(WanderHandler::new(), AppArgs::parse())?;
//!     app.run();
//!     Ok(())
//! }
//! ```

mod app;
mod args;
mod context;
mod handler;

pub use app::{App, AppError, FRAME_TIME, build_level, visible_categories};
pub use args::{AppArgs, CliBackend};
pub use context::{AppContext, FrameStats, RunSummary};
pub use handler::{AppHandler, WanderHandler};

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the app subsystem.
///
/// This should be called before using any app functionality.
pub fn init() {
    log::info!("Voxtile App v{} initialized", VERSION);
}
