//! Application handler trait.

use crate::context::{AppContext, FrameStats};

/// Trait for driving the simulation between frames.
///
/// # Lifecycle
///
/// 1. `on_init` - Called once before the first frame
/// 2. `on_update` - Called every frame before the level is ticked
/// 3. `on_frame_end` - Called every frame after the draws were recorded
///
/// # Example
///
/// ```ignore
/// use voxtile_app::{AppContext, AppHandler};
///
/// struct Idle;
///
/// impl AppHandler for Idle {
///     fn on_update(&mut self, ctx: &mut AppContext) -> bool {
///         ctx.frame_number() < 100
///     }
/// }
/// ```
pub trait AppHandler {
    /// Called once after the level and meshes are built.
    fn on_init(&mut self, _ctx: &mut AppContext) {}

    /// Called every frame before the level is ticked.
    ///
    /// Returns `true` to continue running, `false` to exit.
    fn on_update(&mut self, _ctx: &mut AppContext) -> bool {
        true
    }

    /// Called every frame once instances are uploaded and drawn.
    fn on_frame_end(&mut self, _ctx: &AppContext, _stats: &FrameStats) {}
}

/// Walks the player in a slow circle.
#[derive(Debug, Default)]
pub struct WanderHandler {
    heading: f32,
}

impl WanderHandler {
    /// Heading change per second, in radians.
    pub const TURN_RATE: f32 = 0.5;

    pub fn new() -> Self {
        Self::default()
    }
}

impl AppHandler for WanderHandler {
    fn on_update(&mut self, ctx: &mut AppContext) -> bool {
        self.heading += Self::TURN_RATE * ctx.delta_time();
        let direction = [self.heading.sin(), self.heading.cos()];
        if let Some(player) = ctx.player_mut() {
            player.set_input(direction);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxtile_core::scene::{Entity, Level};

    #[test]
    fn test_wander_steers_player() {
        let mut level = Level::new(2);
        level.spawn(Entity::player([0.0; 3]));
        let mut ctx = AppContext::new(level, 1.0, 50.0);

        let mut handler = WanderHandler::new();
        assert!(handler.on_update(&mut ctx));

        let Some(Entity::Player { input, .. }) = ctx.player() else {
            panic!("player missing");
        };
        let heading = WanderHandler::TURN_RATE;
        assert_eq!(*input, [heading.sin(), heading.cos()]);
    }
}
