//! Live board state: balls and committed connection paths
//!
//! Balls are created in bulk from a [`LevelLayout`] and only ever change
//! their connection flags. Paths in the committed set are immutable.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::generator::LevelLayout;
use crate::geom::distance;

/// Why a release could not complete a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidCommit {
    #[error("Release on a ball to connect")]
    NoBall,
    #[error("Cannot connect a ball to itself")]
    SameBall,
    #[error("Colors don't match!")]
    ColorMismatch,
    #[error("That ball is already connected")]
    AlreadyConnected,
    #[error("Unknown ball")]
    UnknownBall,
}

/// A ball on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: String,
    pub pos: Vec2,
    /// Pairing group key
    pub color: String,
    pub pair_index: u32,
    pub connected: bool,
    pub connected_to: Option<String>,
}

impl Ball {
    fn reset_connection(&mut self) {
        self.connected = false;
        self.connected_to = None;
    }
}

/// A drawn connection, either in progress or committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub start: String,
    pub end: Option<String>,
    /// Traced points, first is the start ball's center
    pub points: Vec<Vec2>,
    /// Start ball's color key
    pub color: String,
    pub completed: bool,
}

impl Path {
    /// Begin a path at a ball's center
    pub fn begin(ball: &Ball) -> Self {
        Self {
            start: ball.id.clone(),
            end: None,
            points: vec![ball.pos],
            color: ball.color.clone(),
            completed: false,
        }
    }

    pub fn last_point(&self) -> Vec2 {
        // A path always holds its start point
        self.points.last().copied().unwrap_or_default()
    }

    pub fn has_endpoint(&self, ball_id: &str) -> bool {
        self.start == ball_id || self.end.as_deref() == Some(ball_id)
    }

    /// Consecutive point pairs
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Balls and committed paths of the active level
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardState {
    level: u32,
    width: f32,
    height: f32,
    ball_radius: f32,
    balls: Vec<Ball>,
    paths: Vec<Path>,
}

impl BoardState {
    pub fn new(ball_radius: f32) -> Self {
        Self {
            ball_radius,
            ..Default::default()
        }
    }

    /// Replace everything with fresh, unconnected balls from `layout`
    pub fn load_level(&mut self, layout: &LevelLayout) {
        self.level = layout.level;
        self.width = layout.width;
        self.height = layout.height;
        self.paths.clear();
        self.balls = layout
            .balls
            .iter()
            .map(|spec| Ball {
                id: spec.id.clone(),
                pos: spec.pos,
                color: spec.color.clone(),
                pair_index: spec.pair_index,
                connected: false,
                connected_to: None,
            })
            .collect();
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn ball_radius(&self) -> f32 {
        self.ball_radius
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Committed paths, oldest first
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn ball(&self, id: &str) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    fn ball_mut(&mut self, id: &str) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Balls sharing a color key, in layout order
    pub fn group<'a>(&'a self, color: &'a str) -> impl Iterator<Item = &'a Ball> + 'a {
        self.balls.iter().filter(move |b| b.color == color)
    }

    /// First ball whose center is strictly within the ball radius of `point`
    pub fn ball_at(&self, point: Vec2) -> Option<&Ball> {
        self.balls
            .iter()
            .find(|b| distance(point, b.pos) < self.ball_radius)
    }

    pub fn connected_count(&self) -> usize {
        self.balls.iter().filter(|b| b.connected).count()
    }

    /// Every ball connected (an empty board never is)
    pub fn is_complete(&self) -> bool {
        !self.balls.is_empty() && self.balls.iter().all(|b| b.connected)
    }

    /// Join two unconnected same-color balls with a completed path
    ///
    /// `points` is the traced line; the end ball's center is appended.
    pub fn connect(
        &mut self,
        start_id: &str,
        end_id: &str,
        mut points: Vec<Vec2>,
    ) -> Result<&Path, InvalidCommit> {
        let start = self.ball(start_id).ok_or(InvalidCommit::UnknownBall)?;
        let end = self.ball(end_id).ok_or(InvalidCommit::UnknownBall)?;

        if start.id == end.id {
            return Err(InvalidCommit::SameBall);
        }
        if start.color != end.color {
            return Err(InvalidCommit::ColorMismatch);
        }
        if start.connected || end.connected {
            return Err(InvalidCommit::AlreadyConnected);
        }

        let color = start.color.clone();
        if points.is_empty() {
            points.push(start.pos);
        }
        points.push(end.pos);

        if let Some(ball) = self.ball_mut(start_id) {
            ball.connected = true;
            ball.connected_to = Some(end_id.to_string());
        }
        if let Some(ball) = self.ball_mut(end_id) {
            ball.connected = true;
            ball.connected_to = Some(start_id.to_string());
        }

        self.paths.push(Path {
            start: start_id.to_string(),
            end: Some(end_id.to_string()),
            points,
            color,
            completed: true,
        });
        Ok(&self.paths[self.paths.len() - 1])
    }

    /// Remove the committed path holding `ball_id` and free both endpoints
    ///
    /// Prefers the path the ball terminates; otherwise falls back to the first
    /// path of the ball's color group.
    pub fn disconnect(&mut self, ball_id: &str) -> Option<Path> {
        let color = self.ball(ball_id)?.color.clone();
        let index = self
            .paths
            .iter()
            .position(|p| p.has_endpoint(ball_id))
            .or_else(|| self.paths.iter().position(|p| p.color == color))?;

        let path = self.paths.remove(index);
        for id in std::iter::once(&path.start).chain(path.end.iter()) {
            if let Some(ball) = self.ball_mut(id) {
                ball.reset_connection();
            }
        }
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn board() -> BoardState {
        let mut board = BoardState::new(25.0);
        board.load_level(&LevelLayout::fixture(&[
            ("red1", "red", 60.0, 60.0),
            ("red2", "red", 340.0, 60.0),
            ("blue1", "blue", 60.0, 200.0),
            ("blue2", "blue", 340.0, 200.0),
            ("green1", "green", 60.0, 340.0),
            ("green2", "green", 340.0, 340.0),
        ]));
        board
    }

    #[test]
    fn test_load_level_resets() {
        let mut board = board();
        board.connect("red1", "red2", vec![]).unwrap();
        board.load_level(&LevelLayout::fixture(&[("blue1", "blue", 100.0, 100.0)]));
        assert_eq!(board.balls().len(), 1);
        assert!(board.paths().is_empty());
        assert!(!board.balls()[0].connected);
    }

    #[test]
    fn test_ball_at() {
        let board = board();
        assert_eq!(board.ball_at(Vec2::new(70.0, 70.0)).map(|b| b.id.as_str()), Some("red1"));
        assert!(board.ball_at(Vec2::new(200.0, 200.0)).is_none());
        // Exactly on the radius is outside
        assert!(board.ball_at(Vec2::new(85.0, 60.0)).is_none());
    }

    #[test]
    fn test_connect_links_both_balls() {
        let mut board = board();
        let path = board
            .connect("red1", "red2", vec![Vec2::new(60.0, 60.0), Vec2::new(200.0, 60.0)])
            .unwrap();
        assert!(path.completed);
        assert_eq!(path.points.last(), Some(&Vec2::new(340.0, 60.0)));

        let red1 = board.ball("red1").unwrap();
        let red2 = board.ball("red2").unwrap();
        assert!(red1.connected && red2.connected);
        assert_eq!(red1.connected_to.as_deref(), Some("red2"));
        assert_eq!(red2.connected_to.as_deref(), Some("red1"));
        assert_eq!(board.connected_count(), 2);
    }

    #[test]
    fn test_connect_rejections() {
        let mut board = board();
        assert_eq!(board.connect("red1", "red1", vec![]).unwrap_err(), InvalidCommit::SameBall);
        assert_eq!(
            board.connect("red1", "blue1", vec![]).unwrap_err(),
            InvalidCommit::ColorMismatch
        );
        assert_eq!(board.connect("red1", "pink1", vec![]).unwrap_err(), InvalidCommit::UnknownBall);

        board.connect("red1", "red2", vec![]).unwrap();
        assert_eq!(
            board.connect("red2", "red1", vec![]).unwrap_err(),
            InvalidCommit::AlreadyConnected
        );
        assert_eq!(board.paths().len(), 1);
    }

    #[test]
    fn test_disconnect_frees_both_endpoints() {
        let mut board = board();
        board.connect("red1", "red2", vec![]).unwrap();
        board.connect("blue1", "blue2", vec![]).unwrap();

        let removed = board.disconnect("red2").unwrap();
        assert_eq!(removed.start, "red1");
        assert_eq!(board.paths().len(), 1);
        assert!(!board.ball("red1").unwrap().connected);
        assert!(board.ball("red2").unwrap().connected_to.is_none());
        assert!(board.ball("blue1").unwrap().connected);

        assert!(board.disconnect("red1").is_none());
        assert!(board.disconnect("nobody").is_none());
    }

    #[test]
    fn test_disconnect_falls_back_to_color_group() {
        let mut board = BoardState::new(25.0);
        board.load_level(&LevelLayout::fixture(&[
            ("red1", "red", 60.0, 60.0),
            ("red2", "red", 340.0, 60.0),
            ("red3", "red", 60.0, 340.0),
            ("red4", "red", 340.0, 340.0),
        ]));
        board.connect("red1", "red2", vec![]).unwrap();

        let removed = board.disconnect("red3").unwrap();
        assert_eq!(removed.end.as_deref(), Some("red2"));
        assert_eq!(board.connected_count(), 0);
    }

    #[test]
    fn test_completion() {
        let mut board = board();
        assert!(!board.is_complete());
        board.connect("red1", "red2", vec![]).unwrap();
        board.connect("blue1", "blue2", vec![]).unwrap();
        assert!(!board.is_complete());
        board.connect("green2", "green1", vec![]).unwrap();
        assert!(board.is_complete());

        assert!(!BoardState::new(25.0).is_complete());
    }

    proptest! {
        #[test]
        fn prop_connect_requires_matching_colors(a in 0usize..6, b in 0usize..6) {
            let mut board = board();
            let start = board.balls()[a].clone();
            let end = board.balls()[b].clone();

            let result = board.connect(&start.id, &end.id, vec![]).map(|p| p.clone());
            let expected = a != b && start.color == end.color;
            prop_assert_eq!(result.is_ok(), expected);
            if !expected {
                prop_assert!(board.paths().is_empty());
                prop_assert_eq!(board.connected_count(), 0);
            }
        }
    }
}
