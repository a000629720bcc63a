//! Puzzle core
//!
//! Everything that decides the game lives here and stays deterministic:
//! - Seeded RNG only (layouts are reproducible from a seed)
//! - Stable iteration order (balls and paths keep insertion order)
//! - No DOM, canvas or audio; effects leave through the `GameUi` port

pub mod board;
pub mod generator;
pub mod palette;
pub mod schedule;
pub mod session;
pub mod validator;

pub use board::{Ball, BoardState, InvalidCommit, Path};
pub use generator::{
    BallSpec, GenerationError, LevelLayout, LevelParams, MAX_BALLS_PER_COLOR, generate_level,
    generate_level_seeded, is_too_easy,
};
pub use palette::{Palette, PaletteColor};
pub use schedule::{DeferredAction, Scheduler};
pub use session::Session;
pub use validator::{
    DragOutcome, DrawState, InvalidMove, PathValidator, PressOutcome, ReleaseOutcome,
    validate_segment,
};
