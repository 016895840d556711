//! Main application struct and frame loop.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use voxtile_core::mesh::generators::generate_block_corners;
use voxtile_core::scene::{Entity, Level, MeshCategory, TILE_WIDTH, TileKind, tile_transform};
use voxtile_core::texture::{CpuTexture, load_palette};
use voxtile_graphics::{
    GraphicsDevice, GraphicsError, GraphicsInstance, InstanceParameters, MeshAsset, MeshLoadError,
    RecordingEncoder, RenderContext,
};

use crate::args::AppArgs;
use crate::context::{AppContext, FrameStats, RunSummary};
use crate::handler::AppHandler;

/// Fixed simulation step.
pub const FRAME_TIME: f32 = 1.0 / 60.0;

/// Errors that stop the application before the first frame.
#[derive(Debug)]
pub enum AppError {
    /// The graphics instance or device could not be created.
    Graphics(GraphicsError),
    /// A category mesh could not be built.
    Mesh {
        category: MeshCategory,
        source: MeshLoadError,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graphics(e) => write!(f, "graphics setup failed: {e}"),
            Self::Mesh { category, source } => write!(f, "failed to load {category}: {source}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Graphics(e) => Some(e),
            Self::Mesh { source, .. } => Some(source),
        }
    }
}

impl From<GraphicsError> for AppError {
    fn from(e: GraphicsError) -> Self {
        Self::Graphics(e)
    }
}

/// Headless client: owns the device, the meshes and the level, and runs the
/// per-frame stream/upload/draw cycle.
///
/// # Example
///
/// ```ignore
/// use voxtile_app::{App, AppArgs, WanderHandler};
///
/// let mut app = App::new(WanderHandler::new(), AppArgs::parse())?;
/// let summary = app.run();
/// ```
pub struct App<H: AppHandler> {
    handler: H,
    frames: u64,
    device: Arc<GraphicsDevice>,
    render: RenderContext,
    context: AppContext,
    encoder: RecordingEncoder,
}

impl<H: AppHandler> App<H> {
    /// Create the graphics device, build every category mesh and populate the level.
    ///
    /// # Errors
    ///
    /// Fails if no device can be created or any mesh fails to build. Missing
    /// palettes under `args.assets` are reported per category.
    pub fn new(mut handler: H, args: AppArgs) -> Result<Self, AppError> {
        let params = InstanceParameters::new().with_backend(args.backend);
        let instance = GraphicsInstance::with_params(params)?;
        let device = instance.create_device()?;
        log::info!("Using {} ({})", instance.backend_name(), device.name());

        let mut render = RenderContext::new(&device);
        for category in MeshCategory::ALL {
            let mesh = build_category_mesh(&device, category, &args)
                .map_err(|source| AppError::Mesh { category, source })?;
            log::debug!(
                "Built {category}: {} vertices, {} indices",
                mesh.vertex_count(),
                mesh.index_count()
            );
            render.register_mesh(category, mesh);
        }

        let level = build_level(args.grid, args.items);
        log::info!(
            "Level {0}x{0} with {1} entities",
            level.width(),
            level.entities().len()
        );

        let mut context = AppContext::new(level, FRAME_TIME, args.view);
        handler.on_init(&mut context);

        Ok(Self {
            handler,
            frames: args.frames,
            device,
            render,
            context,
            encoder: RecordingEncoder::new(),
        })
    }

    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    pub fn render_context(&self) -> &RenderContext {
        &self.render
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Draw commands recorded by the most recent frame.
    pub fn encoder(&self) -> &RecordingEncoder {
        &self.encoder
    }

    /// Run until the frame limit is reached or the handler asks to stop.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        while summary.frames < self.frames {
            self.context.frame_number = summary.frames;
            if !self.handler.on_update(&mut self.context) {
                log::info!("Handler requested exit at frame {}", summary.frames);
                break;
            }
            let stats = self.frame();
            self.handler.on_frame_end(&self.context, &stats);
            summary.record(&stats);
        }

        log::info!(
            "Ran {} frames: {} draws, peak {} instances, {} dropped, {} failed uploads",
            summary.frames,
            summary.draws,
            summary.peak_instances,
            summary.dropped,
            summary.upload_failures
        );
        summary
    }

    fn frame(&mut self) -> FrameStats {
        let mut stats = FrameStats {
            frame: self.context.frame_number,
            ..FrameStats::default()
        };

        self.context.level.tick(self.context.delta_time);

        let view = self.context.view_bounds();
        let level = &self.context.level;
        let tiles = level
            .visible_tiles(&view)
            .map(|(x, z, kind)| (kind.mesh_category(), tile_transform(x, z)));
        let entities = level
            .visible_entities(&view)
            .map(|e| (e.mesh_category(), e.transform()));
        for (category, transform) in tiles.chain(entities) {
            if self.render.push_instance(category, transform) {
                stats.instances += 1;
            } else {
                stats.dropped += 1;
            }
        }

        let mut pass = self.device.begin_copy_pass();
        stats.upload_failures = self.render.upload_instances(&mut pass);
        self.encoder.clear();
        if let Err(e) = pass.submit() {
            log::error!("Frame {}: instance upload failed: {e}", stats.frame);
            return stats;
        }

        stats.draws = self.render.draw(&mut self.encoder);
        log::trace!(
            "Frame {}: {} instances, {} draws",
            stats.frame,
            stats.instances,
            stats.draws
        );
        stats
    }
}

/// Geometry half extent of each category's block mesh.
fn half_extent(category: MeshCategory) -> f32 {
    match category {
        MeshCategory::Player00 => 0.5,
        MeshCategory::Tree00 => 0.6,
        _ => 0.8,
    }
}

/// Single-colour palette used when no asset directory is given.
fn generated_palette(category: MeshCategory) -> Result<CpuTexture, MeshLoadError> {
    let color = match category {
        MeshCategory::Player00 => [220, 60, 60, 255],
        MeshCategory::Dirt00 => [120, 85, 50, 255],
        MeshCategory::Grass00 => [90, 170, 70, 255],
        MeshCategory::Sand00 => [220, 200, 140, 255],
        MeshCategory::Tree00 => [40, 110, 40, 255],
        MeshCategory::Water00 => [50, 110, 200, 255],
    };
    Ok(CpuTexture::from_colors(&[color])?)
}

fn build_category_mesh(
    device: &Arc<GraphicsDevice>,
    category: MeshCategory,
    args: &AppArgs,
) -> Result<MeshAsset, MeshLoadError> {
    let palette = match &args.assets {
        Some(dir) => load_palette(dir.join(format!("{}.png", category.asset_name())))?,
        None => generated_palette(category)?,
    };
    let corners = generate_block_corners(half_extent(category), palette.texcoord_for(0));
    MeshAsset::build(device, &corners, &palette, category.asset_name())
}

/// Deterministic tile pattern.
fn tile_kind_at(x: i32, z: i32) -> TileKind {
    match (x * 3 + z * 5).rem_euclid(11) {
        0 => TileKind::Tree,
        1 | 2 => TileKind::Sand,
        3 => TileKind::Dirt,
        4 => TileKind::Water,
        _ => TileKind::Grass,
    }
}

/// Fill a `grid x grid` level, then spawn the player at the origin and
/// `items` dropped items spread over the grid.
pub fn build_level(grid: i32, items: u32) -> Level {
    let mut level = Level::new(grid);
    let width = level.width();
    let origin = -(width / 2);
    for z in origin..origin + width {
        for x in origin..origin + width {
            level.set_tile(x, z, Some(tile_kind_at(x, z)));
        }
    }

    level.spawn(Entity::player([0.0, TILE_WIDTH / 2.0, 0.0]));
    let span = width.max(1) as u32;
    for i in 0..items {
        let x = origin + ((i * 7) % span) as i32;
        let z = origin + ((i * 3) % span) as i32;
        let category = TileKind::ALL[i as usize % TileKind::ALL.len()].mesh_category();
        let position = [x as f32 * TILE_WIDTH, TILE_WIDTH / 2.0, z as f32 * TILE_WIDTH];
        level.spawn(Entity::item(position, category));
    }
    level
}

/// Distinct mesh categories visible in the current view.
pub fn visible_categories(ctx: &AppContext) -> BTreeSet<MeshCategory> {
    let view = ctx.view_bounds();
    let level = ctx.level();
    level
        .visible_tiles(&view)
        .map(|(_, _, kind)| kind.mesh_category())
        .chain(level.visible_entities(&view).map(Entity::mesh_category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use voxtile_core::texture::PaletteError;
    use voxtile_graphics::{BackendType, DrawCommand};

    #[derive(Default)]
    struct Recorder {
        stop_after: Option<u64>,
        inits: u32,
        frames: Vec<(FrameStats, usize, u32)>,
    }

    impl AppHandler for Recorder {
        fn on_init(&mut self, _ctx: &mut AppContext) {
            self.inits += 1;
        }

        fn on_update(&mut self, ctx: &mut AppContext) -> bool {
            self.stop_after.is_none_or(|n| ctx.frame_number() < n)
        }

        fn on_frame_end(&mut self, ctx: &AppContext, stats: &FrameStats) {
            let view = ctx.view_bounds();
            let level = ctx.level();
            let visible =
                level.visible_tiles(&view).count() + level.visible_entities(&view).count();
            self.frames
                .push((*stats, visible_categories(ctx).len(), visible as u32));
        }
    }

    fn dummy_args() -> AppArgs {
        AppArgs::default()
            .with_backend(BackendType::Dummy)
            .with_frames(3)
            .with_grid(4)
            .with_items(3)
    }

    #[test]
    fn test_builds_every_category_mesh() {
        let app = App::new(Recorder::default(), dummy_args()).unwrap();
        assert_eq!(app.render_context().mesh_count(), MeshCategory::COUNT);
        for category in MeshCategory::ALL {
            let mesh = app.render_context().mesh(category).unwrap();
            assert_eq!(mesh.vertex_count(), 24);
            assert_eq!(mesh.index_count(), 36);
        }
        assert_eq!(app.handler.inits, 1);
    }

    #[test]
    fn test_level_layout() {
        let level = build_level(4, 3);
        assert_eq!(level.width(), 4);
        for z in -2..2 {
            for x in -2..2 {
                assert!(level.tile(x, z).is_some());
            }
        }
        assert!(level.tile(2, 0).is_none());
        assert_eq!(level.entities().len(), 4);
        assert!(matches!(level.entities()[0], Entity::Player { .. }));
    }

    #[test]
    fn test_empty_level_still_has_player() {
        let level = build_level(0, 2);
        assert_eq!(level.width(), 0);
        assert_eq!(level.entities().len(), 3);
    }

    #[rstest]
    #[case::small(4, 3)]
    #[case::no_items(6, 0)]
    #[case::crowded(12, 40)]
    fn test_each_frame_draws_visible_categories(#[case] grid: i32, #[case] items: u32) {
        let args = dummy_args().with_grid(grid).with_items(items);
        let mut app = App::new(Recorder::default(), args).unwrap();
        let summary = app.run();

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.upload_failures, 0);
        assert_eq!(app.handler.frames.len(), 3);
        for (stats, categories, visible) in &app.handler.frames {
            assert_eq!(stats.draws, *categories);
            assert_eq!(stats.instances, *visible);
        }

        let drawn: u32 = app.encoder().draws().iter().map(|&(_, n)| n).sum();
        assert_eq!(drawn, app.handler.frames[2].2);
        assert!(
            app.encoder()
                .draws()
                .iter()
                .all(|&(index_count, _)| index_count == 36)
        );
    }

    #[test]
    fn test_draws_bind_before_drawing() {
        let mut app = App::new(Recorder::default(), dummy_args().with_frames(1)).unwrap();
        app.run();
        let commands = app.encoder().commands();
        assert!(!commands.is_empty());
        for group in commands.chunks(4) {
            assert!(matches!(group[0], DrawCommand::BindVertexBuffers { .. }));
            assert!(matches!(group[1], DrawCommand::BindIndexBuffer { .. }));
            assert!(matches!(group[2], DrawCommand::BindPalette { .. }));
            assert!(matches!(group[3], DrawCommand::DrawIndexed { .. }));
        }
    }

    #[test]
    fn test_handler_can_stop_early() {
        let handler = Recorder {
            stop_after: Some(2),
            ..Recorder::default()
        };
        let mut app = App::new(handler, dummy_args().with_frames(10)).unwrap();
        let summary = app.run();
        assert_eq!(summary.frames, 2);
        assert_eq!(app.context().frame_number(), 2);
    }

    #[test]
    fn test_missing_palette_names_category() {
        let mut args = dummy_args();
        args.assets = Some("definitely/not/here".into());
        let err = App::new(Recorder::default(), args).err().unwrap();
        assert!(matches!(
            err,
            AppError::Mesh {
                category: MeshCategory::Player00,
                source: MeshLoadError::Palette(PaletteError::Io(_)),
            }
        ));
        assert!(err.to_string().contains("player_00"));
    }
}
