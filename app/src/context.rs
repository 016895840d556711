//! Per-run simulation state handed to [`AppHandler`](crate::AppHandler) callbacks.

use voxtile_core::scene::{Aabb, Entity, Level};

/// Application context providing access to the level and frame timing.
pub struct AppContext {
    pub(crate) level: Level,
    /// Current frame number.
    pub(crate) frame_number: u64,
    /// Fixed simulation step in seconds.
    pub(crate) delta_time: f32,
    /// Half extent of the visible region around the player.
    pub(crate) view_extent: f32,
}

impl AppContext {
    pub(crate) fn new(level: Level, delta_time: f32, view_extent: f32) -> Self {
        Self {
            level,
            frame_number: 0,
            delta_time,
            view_extent,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    /// Get the current frame number.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Get the simulation step in seconds.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// The player entity, if one is alive.
    pub fn player(&self) -> Option<&Entity> {
        self.level
            .entities()
            .iter()
            .find(|e| matches!(e, Entity::Player { .. }))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.level
            .entities_mut()
            .iter_mut()
            .find(|e| matches!(e, Entity::Player { .. }))
    }

    /// Region culled against this frame. Centred on the player, or on the
    /// origin when there is none.
    pub fn view_bounds(&self) -> Aabb {
        let center = self
            .player()
            .map_or([0.0, 0.0], |p| {
                let [x, _, z] = p.state().position;
                [x, z]
            });
        Aabb::around(center, self.view_extent)
    }
}

/// Counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    /// Instances queued across all categories.
    pub instances: u32,
    /// Instances that could not be queued.
    pub dropped: u32,
    /// Instance streams whose upload failed.
    pub upload_failures: usize,
    /// Instanced draws recorded.
    pub draws: usize,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub draws: usize,
    pub dropped: u32,
    pub upload_failures: usize,
    /// Largest per-frame instance count.
    pub peak_instances: u32,
}

impl RunSummary {
    pub(crate) fn record(&mut self, stats: &FrameStats) {
        self.frames += 1;
        self.draws += stats.draws;
        self.dropped += stats.dropped;
        self.upload_failures += stats.upload_failures;
        self.peak_instances = self.peak_instances.max(stats.instances);
    }
}
