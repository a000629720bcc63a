//! Data-driven game balance
//!
//! Every constant the generator and validator depend on lives here so a level
//! designer can override them from JSON without touching code.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Balance and board parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Board ===
    /// Board width in pixels
    pub board_width: f32,
    /// Board height in pixels
    pub board_height: f32,
    /// Ball radius (hit radius for pointer lookups)
    pub ball_radius: f32,

    // === Drawing ===
    /// Padding around existing lines and foreign balls, also the boundary inset
    pub line_margin: f32,
    /// Pointer moves at or below this distance are ignored
    pub min_move_distance: f32,

    // === Generation ===
    /// Candidate samples per placement pass
    pub placement_attempts: u32,
    /// Same-color pairs closer than this make a level too easy
    pub too_easy_distance: f32,
    /// Failed generation attempts between constraint relaxations
    pub relax_every: u32,
    /// Multiplier applied to same-color spacing on each relaxation
    pub relax_factor: f32,
    /// Hard cap on generation attempts before giving up
    pub max_generation_attempts: u32,

    // === Timing (milliseconds) ===
    pub status_reset_ms: f64,
    pub hint_reset_ms: f64,
    pub level_advance_ms: f64,

    /// Show a notice when a path is released on a ball of another color
    pub wrong_color_notice: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            board_width: BOARD_WIDTH,
            board_height: BOARD_HEIGHT,
            ball_radius: BALL_RADIUS,

            line_margin: LINE_MARGIN,
            min_move_distance: MIN_MOVE_DISTANCE,

            placement_attempts: 2000,
            too_easy_distance: 150.0,
            relax_every: 250,
            relax_factor: 0.85,
            max_generation_attempts: 5000,

            status_reset_ms: 5000.0,
            hint_reset_ms: 1000.0,
            level_advance_ms: 1000.0,

            wrong_color_notice: false,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Distance from the board edge a drawn point must keep
    pub fn boundary_margin(&self) -> f32 {
        self.line_margin
    }

    /// Minimum distance between any two ball centers
    pub fn min_ball_distance(&self) -> f32 {
        self.ball_radius * 3.0 + 5.0
    }

    /// Inset from the board edge for ball centers during generation
    pub fn placement_margin(&self) -> f32 {
        self.ball_radius * 2.0
    }
}
