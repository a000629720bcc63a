//! Orb Link - connect matching colored balls without crossing lines
//!
//! Core modules:
//! - `geom`: Segment, rectangle and circle intersection primitives
//! - `sim`: Level generation, board state, path validation and the session
//! - `ui`: Output port the session drives (DOM, canvas, audio)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod geom;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use settings::Settings;
pub use sim::Session;
pub use tuning::Tuning;
pub use ui::{GameUi, NullUi, SoundEffect, StatusKind};

/// Game configuration constants
pub mod consts {
    /// Board dimensions
    pub const BOARD_WIDTH: f32 = 400.0;
    pub const BOARD_HEIGHT: f32 = 400.0;

    pub const BALL_RADIUS: f32 = 25.0;
    /// Paths keep this far from the board edge, other paths and foreign balls
    pub const LINE_MARGIN: f32 = 16.0;
    /// Pointer moves shorter than this are ignored while drawing
    pub const MIN_MOVE_DISTANCE: f32 = 12.0;

    /// Status line messages
    pub const DEFAULT_STATUS: &str = "Connect the matching colors!";
    pub const CONNECTED_STATUS: &str = "✅ Great connection!";
    pub const DISCONNECTED_STATUS: &str = "🔄 Connection removed!";
    pub const HINT_STATUS: &str = "💡 Drag from a ball to its twin. Lines may not cross or touch other colors.";
}
