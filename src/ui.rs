//! Output port to the host (DOM, canvas, audio)
//!
//! The session never touches the page directly; everything visible or audible
//! goes through [`GameUi`]. All calls are fire-and-forget.

use serde::{Deserialize, Serialize};

use crate::sim::{Ball, PaletteColor, Path};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Button press
    Click,
    /// Two balls joined
    Connect,
    /// Crossed a path, hit a foreign ball, or wrong color
    Wrong,
    /// Ran into the board edge
    Empty,
    /// Connection removed
    Cancel,
    /// Level complete
    Win,
}

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Click => "click",
            SoundEffect::Connect => "connect",
            SoundEffect::Wrong => "wrong",
            SoundEffect::Empty => "empty",
            SoundEffect::Cancel => "cancel",
            SoundEffect::Win => "win",
        }
    }
}

/// Status line classification (maps to a CSS class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusKind {
    #[default]
    Info,
    Error,
    Completed,
}

impl StatusKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusKind::Info => "",
            StatusKind::Error => "error",
            StatusKind::Completed => "completed",
        }
    }
}

/// Everything the game asks of its host
pub trait GameUi {
    fn set_status(&mut self, message: &str, kind: StatusKind);
    fn set_score(&mut self, score: i64);
    fn set_level_title(&mut self, level: u32);
    /// Number of colors in play
    fn set_difficulty_indicator(&mut self, num_colors: u32);
    fn play_sound(&mut self, effect: SoundEffect);

    /// Erase all rendered balls and paths before a redraw
    fn clear_drawing(&mut self);
    fn draw_path(&mut self, path: &Path, color: &PaletteColor);
    fn draw_ball(&mut self, _ball: &Ball, _color: &PaletteColor) {}

    fn set_drawing_cursor(&mut self, _drawing: bool) {}
    /// Reflect the mute toggle on the host's buttons
    fn set_muted(&mut self, _muted: bool) {}
    /// Cosmetic level-complete effect
    fn celebrate(&mut self, _level: u32) {}
}

/// A host that ignores everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUi;

impl GameUi for NullUi {
    fn set_status(&mut self, _message: &str, _kind: StatusKind) {}
    fn set_score(&mut self, _score: i64) {}
    fn set_level_title(&mut self, _level: u32) {}
    fn set_difficulty_indicator(&mut self, _num_colors: u32) {}
    fn play_sound(&mut self, _effect: SoundEffect) {}
    fn clear_drawing(&mut self) {}
    fn draw_path(&mut self, _path: &Path, _color: &PaletteColor) {}
}
