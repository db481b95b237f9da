use crate::feature::DrawableFeature;

/// Per-frame state the drawer reads from the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Render frame number, strictly increasing
    pub draw_frame: u64,
    /// Fraction of a simulation frame elapsed since the last update
    pub time_offset: f32,
    /// Ally team of the local player
    pub my_ally_team: usize,
    /// Spectators with full view see every feature regardless of LOS
    pub spectating_full_view: bool,
    /// Current terrain height range
    pub min_height: f32,
    pub max_height: f32,
}

impl FrameContext {
    pub fn new(draw_frame: u64) -> Self {
        Self {
            draw_frame,
            time_offset: 0.0,
            my_ally_team: 0,
            spectating_full_view: false,
            min_height: 0.0,
            max_height: 0.0,
        }
    }

    /// Whether the local player only sees features in its ally team's LOS.
    pub fn needs_los(&self) -> bool {
        !self.spectating_full_view
    }

    /// Visibility of a feature to the local player, line of sight only.
    pub fn sees(&self, feature: &DrawableFeature) -> bool {
        !self.needs_los() || feature.is_in_los_for_ally_team(self.my_ally_team)
    }
}
