//! Command line arguments.
//!
//! Uses clap for CLI parsing with:
//! - Help text (`--help`)
//! - Validation and clear error messages

use std::path::PathBuf;

use clap::Parser;
use voxtile_graphics::BackendType;

/// Graphics backend selection for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliBackend {
    /// Use wgpu if an adapter is available, otherwise the dummy backend.
    #[default]
    Auto,
    /// Cross-platform backend via wgpu.
    Wgpu,
    /// Host-memory backend for testing and CI environments.
    Dummy,
}

impl From<CliBackend> for BackendType {
    fn from(cli: CliBackend) -> Self {
        match cli {
            CliBackend::Auto => BackendType::Auto,
            CliBackend::Wgpu => BackendType::Wgpu,
            CliBackend::Dummy => BackendType::Dummy,
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppArgs {
    pub backend: BackendType,
    /// Number of frames to run.
    pub frames: u64,
    /// Width of the square tile grid.
    pub grid: i32,
    /// Directory holding `<category>.png` palettes. Generated palettes are
    /// used when unset.
    pub assets: Option<PathBuf>,
    /// Number of dropped items scattered over the level.
    pub items: u32,
    /// Half extent of the visible region around the player.
    pub view: f32,
}

impl Default for AppArgs {
    fn default() -> Self {
        Self {
            backend: BackendType::Auto,
            frames: 60,
            grid: 12,
            assets: None,
            items: 8,
            view: 100.0,
        }
    }
}

impl AppArgs {
    /// Parse from the process command line.
    pub fn parse() -> Self {
        ClapArgs::parse().into()
    }

    /// Parse from an explicit argument list (first item is the program name).
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        ClapArgs::try_parse_from(args).map(Into::into)
    }

    /// Set the graphics backend.
    pub fn with_backend(mut self, backend: BackendType) -> Self {
        self.backend = backend;
        self
    }

    /// Set the number of frames.
    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = frames;
        self
    }

    /// Set the grid width.
    pub fn with_grid(mut self, grid: i32) -> Self {
        self.grid = grid;
        self
    }

    /// Set the number of items.
    pub fn with_items(mut self, items: u32) -> Self {
        self.items = items;
        self
    }
}

/// Voxtile headless client arguments.
#[derive(Parser, Debug)]
#[command(
    name = "voxtile",
    about = "Headless voxtile client",
    long_about = "Builds the tile and entity meshes, then streams per-frame instance \
        transforms to the GPU and records one instanced draw per populated mesh category.\n\n\
        EXAMPLES:\n\
          # Run on the host-memory backend for 10 frames\n\
          voxtile --backend dummy --frames 10\n\
        \n\
          # Use palettes from an asset directory\n\
          voxtile --assets assets/",
    version
)]
struct ClapArgs {
    /// Graphics backend to use.
    #[arg(long, default_value = "auto", value_enum)]
    backend: CliBackend,

    /// Exit after N frames.
    #[arg(long, default_value = "60")]
    frames: u64,

    /// Width of the square tile grid.
    #[arg(long, default_value = "12", value_parser = clap::value_parser!(i32).range(0..=1024))]
    grid: i32,

    /// Directory with palette PNGs named after mesh categories.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Number of dropped items to spawn.
    #[arg(long, default_value = "8")]
    items: u32,

    /// Half extent of the visible region.
    #[arg(long, default_value = "100")]
    view: f32,
}

impl From<ClapArgs> for AppArgs {
    fn from(args: ClapArgs) -> Self {
        Self {
            backend: args.backend.into(),
            frames: args.frames,
            grid: args.grid,
            assets: args.assets,
            items: args.items,
            view: args.view,
        }
    }
}
