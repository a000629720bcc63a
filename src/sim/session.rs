//! Game session controller
//!
//! Routes pointer input through the [`PathValidator`], applies the outcome to
//! score, status and sound, and owns level progression. All host effects go
//! through the injected [`GameUi`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::board::{BoardState, InvalidCommit, Path};
use super::generator::{GenerationError, LevelLayout, generate_level};
use super::palette::Palette;
use super::schedule::{DeferredAction, Scheduler};
use super::validator::{DragOutcome, InvalidMove, PathValidator, PressOutcome, ReleaseOutcome};
use crate::consts::{CONNECTED_STATUS, DEFAULT_STATUS, DISCONNECTED_STATUS, HINT_STATUS};
use crate::settings::Settings;
use crate::tuning::Tuning;
use crate::ui::{GameUi, SoundEffect, StatusKind};

/// One player's run through the levels
pub struct Session<U: GameUi> {
    tuning: Tuning,
    palette: Palette,
    settings: Settings,
    rng: Pcg32,
    board: BoardState,
    validator: PathValidator,
    scheduler: Scheduler,
    layout: LevelLayout,
    ui: U,
    score: i64,
    /// Bumped on every level load; stale deferred actions are dropped
    generation: u64,
    now_ms: f64,
}

impl<U: GameUi> Session<U> {
    /// Create a session and start level 1
    pub fn new(
        seed: u64,
        tuning: Tuning,
        palette: Palette,
        settings: Settings,
        ui: U,
    ) -> Result<Self, GenerationError> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let layout = generate_level(
            1,
            tuning.board_width,
            tuning.board_height,
            &palette,
            &tuning,
            &mut rng,
        )?;

        let mut session = Self {
            board: BoardState::new(tuning.ball_radius),
            validator: PathValidator::new(&tuning),
            scheduler: Scheduler::new(),
            layout: layout.clone(),
            tuning,
            palette,
            settings,
            rng,
            ui,
            score: 0,
            generation: 0,
            now_ms: 0.0,
        };

        session.ui.set_muted(session.settings.muted);
        session.ui.set_score(session.score);
        session.apply_layout(layout);
        Ok(session)
    }

    /// Generate and load `level`
    pub fn start_level(&mut self, level: u32) -> Result<(), GenerationError> {
        let layout = generate_level(
            level,
            self.tuning.board_width,
            self.tuning.board_height,
            &self.palette,
            &self.tuning,
            &mut self.rng,
        )?;
        self.apply_layout(layout);
        Ok(())
    }

    /// Reset button: a fresh layout for the current level
    pub fn restart_level(&mut self) -> Result<(), GenerationError> {
        self.play(SoundEffect::Click);
        self.start_level(self.layout.level)
    }

    pub fn show_hint(&mut self) {
        self.ui.set_status(HINT_STATUS, StatusKind::Info);
        self.play(SoundEffect::Click);
        self.defer(self.tuning.hint_reset_ms, DeferredAction::ResetStatus);
    }

    pub fn toggle_mute(&mut self) {
        self.settings.muted = !self.settings.muted;
        self.settings.save();
        self.ui.set_muted(self.settings.muted);
        self.play(SoundEffect::Click);
        log::info!("Sound {}", if self.settings.muted { "muted" } else { "on" });
    }

    pub fn pointer_down(&mut self, point: Vec2) {
        // Waiting for the next level
        if self.board.is_complete() {
            return;
        }

        self.ui.set_drawing_cursor(true);
        match self.validator.press(&mut self.board, point) {
            PressOutcome::NoBall => {}
            PressOutcome::Disconnected(path) => self.on_disconnected(&path),
            PressOutcome::Started { freed, .. } => {
                if let Some(path) = freed {
                    self.on_disconnected(&path);
                } else {
                    self.redraw();
                }
            }
        }
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        match self.validator.drag(&self.board, point) {
            DragOutcome::Ignored => {}
            DragOutcome::Extended => self.redraw(),
            DragOutcome::Cancelled(violation) => {
                self.ui.set_status(&violation.to_string(), StatusKind::Error);
                self.play(match violation {
                    InvalidMove::Boundary => SoundEffect::Empty,
                    InvalidMove::Crossing | InvalidMove::WrongBall => SoundEffect::Wrong,
                });
                self.redraw();
                self.defer(self.tuning.status_reset_ms, DeferredAction::ResetStatus);
            }
        }
    }

    pub fn pointer_up(&mut self, point: Vec2) {
        self.ui.set_drawing_cursor(false);
        match self.validator.release(&mut self.board, point) {
            ReleaseOutcome::NotDrawing => return,
            ReleaseOutcome::Committed { level_complete, .. } => {
                self.add_score(self.points_per_move());
                if level_complete {
                    self.on_level_complete();
                } else {
                    self.ui.set_status(CONNECTED_STATUS, StatusKind::Info);
                    self.play(SoundEffect::Connect);
                }
            }
            ReleaseOutcome::Rejected(reason) => {
                log::debug!("Release rejected: {:?}", reason);
                if self.tuning.wrong_color_notice && reason == InvalidCommit::ColorMismatch {
                    self.ui.set_status(&format!("❌ {reason}"), StatusKind::Error);
                    self.play(SoundEffect::Wrong);
                }
            }
        }
        self.redraw();
        self.defer(self.tuning.status_reset_ms, DeferredAction::ResetStatus);
    }

    /// The host lost the pointer mid-drag: drop the path in progress
    pub fn pointer_cancel(&mut self) {
        self.ui.set_drawing_cursor(false);
        if self.validator.is_drawing() {
            log::debug!("Pointer cancelled while drawing");
            self.validator.reset();
            self.redraw();
        }
    }

    /// Advance the clock to `now_ms` and run due deferred actions
    pub fn update(&mut self, now_ms: f64) -> Result<(), GenerationError> {
        self.now_ms = now_ms;
        for (token, action) in self.scheduler.due(now_ms) {
            if token != self.generation {
                log::debug!("Dropping stale {:?} (token {}, current {})", action, token, self.generation);
                continue;
            }
            match action {
                DeferredAction::ResetStatus => self.ui.set_status(DEFAULT_STATUS, StatusKind::Info),
                DeferredAction::AdvanceLevel => self.start_level(self.layout.level + 1)?,
            }
        }
        Ok(())
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn level(&self) -> u32 {
        self.layout.level
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn is_drawing(&self) -> bool {
        self.validator.is_drawing()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    fn apply_layout(&mut self, layout: LevelLayout) {
        self.generation += 1;
        self.validator.reset();
        self.board.load_level(&layout);

        log::info!(
            "Starting level {} ({} colors, {} balls)",
            layout.level,
            layout.num_colors,
            layout.total_balls()
        );
        self.ui.set_level_title(layout.level);
        self.ui.set_difficulty_indicator(layout.num_colors);
        self.ui.set_status(DEFAULT_STATUS, StatusKind::Info);
        self.layout = layout;
        self.redraw();
    }

    fn on_disconnected(&mut self, path: &Path) {
        log::debug!("Removed {} path from {}", path.color, path.start);
        self.add_score(-self.points_per_move());
        self.play(SoundEffect::Cancel);
        self.ui.set_status(DISCONNECTED_STATUS, StatusKind::Info);
        self.redraw();
    }

    fn on_level_complete(&mut self) {
        let level = self.layout.level;
        log::info!("Level {} complete, score {}", level, self.score);
        self.ui.set_status(&format!("🎉 Level {level} Complete!"), StatusKind::Completed);
        self.play(SoundEffect::Win);
        self.ui.celebrate(level);
        self.defer(self.tuning.level_advance_ms, DeferredAction::AdvanceLevel);
    }

    /// Each connect and disconnect is worth the level's ball count
    fn points_per_move(&self) -> i64 {
        self.layout.total_balls() as i64
    }

    fn add_score(&mut self, delta: i64) {
        self.score += delta;
        self.ui.set_score(self.score);
    }

    fn play(&mut self, effect: SoundEffect) {
        if !self.settings.muted {
            self.ui.play_sound(effect);
        }
    }

    fn defer(&mut self, delay_ms: f64, action: DeferredAction) {
        self.scheduler
            .schedule(self.now_ms, delay_ms, self.generation, action);
    }

    /// Repaint balls, committed paths and the path in progress
    fn redraw(&mut self) {
        self.ui.clear_drawing();
        for ball in self.board.balls() {
            if let Some(color) = self.palette.find(&ball.color) {
                self.ui.draw_ball(ball, color);
            }
        }
        for path in self.board.paths().iter().chain(self.validator.current()) {
            if path.points.len() < 2 {
                continue;
            }
            if let Some(color) = self.palette.find(&path.color) {
                self.ui.draw_path(path, color);
            }
        }
    }
}
