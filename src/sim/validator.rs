//! Path drawing state machine
//!
//! `Idle` -> press on an unconnected ball -> `Drawing`. Each drag extends the
//! path by one point if the new segment stays inside the board, clear of
//! committed paths, and clear of foreign-colored balls. Any violation cancels
//! the path. Release on a free same-color ball commits it to the board.

use glam::Vec2;
use thiserror::Error;

use super::board::{BoardState, InvalidCommit, Path};
use crate::geom::{Circle, Rect, Segment, distance, segment_intersects_circle, segment_intersects_rect};
use crate::tuning::Tuning;

/// Why a drag was refused; the message is shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidMove {
    #[error("❌ Cannot hit the boundary!")]
    Boundary,
    #[error("❌ Cannot cross another path!")]
    Crossing,
    #[error("❌ Cannot pass through a different-colored ball!")]
    WrongBall,
}

/// Current drawing state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawState {
    #[default]
    Idle,
    /// A path is being dragged (never completed)
    Drawing(Path),
}

/// Result of a pointer press
#[derive(Debug, Clone, PartialEq)]
pub enum PressOutcome {
    /// Nothing under the pointer
    NoBall,
    /// Pressed a connected ball: its path was removed
    Disconnected(Path),
    /// Started drawing from `ball`; `freed` is a same-color path broken to make
    /// room for the new connection
    Started { ball: String, freed: Option<Path> },
}

/// Result of a pointer drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Not drawing, or the pointer barely moved
    Ignored,
    Extended,
    /// The in-progress path was discarded
    Cancelled(InvalidMove),
}

/// Result of a pointer release
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    NotDrawing,
    Committed { path: Path, level_complete: bool },
    Rejected(InvalidCommit),
}

/// Check one new segment of `path` against the board's constraints
///
/// Rules run in order: boundary, crossing committed paths, foreign balls.
pub fn validate_segment(
    board: &BoardState,
    path: &Path,
    from: Vec2,
    to: Vec2,
    margin: f32,
) -> Result<(), InvalidMove> {
    let bounds = Rect::new(
        Vec2::splat(margin),
        Vec2::new(board.width() - margin, board.height() - margin),
    );
    if !bounds.contains(to) {
        return Err(InvalidMove::Boundary);
    }

    let segment = Segment::new(from, to);

    let crosses = board.paths().iter().any(|committed| {
        committed
            .segments()
            .any(|(a, b)| segment_intersects_rect(&segment, &Rect::from_points(a, b).inflate(margin)))
    });
    if crosses {
        return Err(InvalidMove::Crossing);
    }

    // Same-color balls are exempt: the line must be able to reach its partner
    let radius = board.ball_radius() + margin;
    let hits_foreign = board
        .balls()
        .iter()
        .filter(|ball| ball.id != path.start && ball.color != path.color)
        .any(|ball| segment_intersects_circle(&segment, &Circle::new(ball.pos, radius)));
    if hits_foreign {
        return Err(InvalidMove::WrongBall);
    }

    Ok(())
}

/// Drives a single in-progress path against a board
#[derive(Debug, Clone)]
pub struct PathValidator {
    state: DrawState,
    line_margin: f32,
    min_move_distance: f32,
}

impl PathValidator {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            state: DrawState::Idle,
            line_margin: tuning.line_margin,
            min_move_distance: tuning.min_move_distance,
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing(_))
    }

    /// The path being dragged, if any
    pub fn current(&self) -> Option<&Path> {
        match &self.state {
            DrawState::Drawing(path) => Some(path),
            DrawState::Idle => None,
        }
    }

    /// Drop any in-progress path
    pub fn reset(&mut self) {
        self.state = DrawState::Idle;
    }

    /// Pointer down
    pub fn press(&mut self, board: &mut BoardState, point: Vec2) -> PressOutcome {
        let Some(ball) = board.ball_at(point).cloned() else {
            return PressOutcome::NoBall;
        };

        if ball.connected {
            self.state = DrawState::Idle;
            log::debug!("Press on connected ball {}: disconnecting", ball.id);
            return board
                .disconnect(&ball.id)
                .map_or(PressOutcome::NoBall, PressOutcome::Disconnected);
        }

        // The partner is the first other ball of the group in layout order;
        // if it is already paired, that path is broken to free it
        let connected_partner = board
            .group(&ball.color)
            .find(|b| b.id != ball.id)
            .filter(|b| b.connected)
            .map(|b| b.id.clone());
        let freed = connected_partner.and_then(|id| board.disconnect(&id));

        log::debug!("Drawing from {}", ball.id);
        self.state = DrawState::Drawing(Path::begin(&ball));
        PressOutcome::Started {
            ball: ball.id,
            freed,
        }
    }

    /// Pointer move
    pub fn drag(&mut self, board: &BoardState, point: Vec2) -> DragOutcome {
        let DrawState::Drawing(path) = &mut self.state else {
            return DragOutcome::Ignored;
        };

        let last = path.last_point();
        if distance(last, point) <= self.min_move_distance {
            return DragOutcome::Ignored;
        }

        match validate_segment(board, path, last, point, self.line_margin) {
            Ok(()) => {
                path.points.push(point);
                DragOutcome::Extended
            }
            Err(violation) => {
                log::debug!("Path cancelled: {:?}", violation);
                self.state = DrawState::Idle;
                DragOutcome::Cancelled(violation)
            }
        }
    }

    /// Pointer up
    pub fn release(&mut self, board: &mut BoardState, point: Vec2) -> ReleaseOutcome {
        let DrawState::Drawing(path) = std::mem::take(&mut self.state) else {
            return ReleaseOutcome::NotDrawing;
        };

        let Some(end_id) = board.ball_at(point).map(|b| b.id.clone()) else {
            return ReleaseOutcome::Rejected(InvalidCommit::NoBall);
        };

        match board.connect(&path.start, &end_id, path.points) {
            Ok(committed) => {
                let committed = committed.clone();
                log::debug!("Connected {} -> {}", committed.start, end_id);
                ReleaseOutcome::Committed {
                    path: committed,
                    level_complete: board.is_complete(),
                }
            }
            Err(reason) => ReleaseOutcome::Rejected(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::generator::LevelLayout;

    fn setup() -> (BoardState, PathValidator) {
        let mut board = BoardState::new(25.0);
        board.load_level(&LevelLayout::fixture(&[
            ("red1", "red", 60.0, 60.0),
            ("red2", "red", 340.0, 60.0),
            ("blue1", "blue", 60.0, 200.0),
            ("blue2", "blue", 340.0, 200.0),
            ("green1", "green", 200.0, 340.0),
            ("green2", "green", 340.0, 340.0),
        ]));
        (board, PathValidator::new(&Tuning::default()))
    }

    fn drag_all(v: &mut PathValidator, board: &BoardState, points: &[(f32, f32)]) -> DragOutcome {
        let mut last = DragOutcome::Ignored;
        for &(x, y) in points {
            last = v.drag(board, Vec2::new(x, y));
            assert_ne!(last, DragOutcome::Ignored, "move to ({x}, {y}) ignored");
        }
        last
    }

    #[test]
    fn test_press_starts_drawing() {
        let (mut board, mut v) = setup();
        let outcome = v.press(&mut board, Vec2::new(62.0, 58.0));
        assert_eq!(
            outcome,
            PressOutcome::Started {
                ball: "red1".into(),
                freed: None
            }
        );
        let path = v.current().unwrap();
        assert_eq!(path.start, "red1");
        assert_eq!(path.points, vec![Vec2::new(60.0, 60.0)]);
    }

    #[test]
    fn test_press_on_empty_space() {
        let (mut board, mut v) = setup();
        assert_eq!(v.press(&mut board, Vec2::new(200.0, 120.0)), PressOutcome::NoBall);
        assert!(!v.is_drawing());
    }

    #[test]
    fn test_debounce() {
        let (mut board, mut v) = setup();
        v.press(&mut board, Vec2::new(60.0, 60.0));
        assert_eq!(v.drag(&board, Vec2::new(70.0, 60.0)), DragOutcome::Ignored);
        assert_eq!(v.drag(&board, Vec2::new(72.0, 60.0)), DragOutcome::Ignored);
        assert_eq!(v.drag(&board, Vec2::new(73.0, 60.0)), DragOutcome::Extended);
        assert_eq!(v.current().unwrap().points.len(), 2);
    }

    #[test]
    fn test_drag_while_idle_is_ignored() {
        let (board, mut v) = setup();
        assert_eq!(v.drag(&board, Vec2::new(100.0, 100.0)), DragOutcome::Ignored);
    }

    #[test]
    fn test_boundary_cancel_leaves_board_unchanged() {
        let (mut board, mut v) = setup();
        board.connect("blue1", "blue2", vec![]).unwrap();
        let before = board.clone();

        v.press(&mut board, Vec2::new(340.0, 60.0));
        // 15 px past the right edge
        let outcome = v.drag(&board, Vec2::new(415.0, 60.0));
        assert_eq!(outcome, DragOutcome::Cancelled(InvalidMove::Boundary));
        assert!(!v.is_drawing());
        assert_eq!(board, before);
    }

    #[test]
    fn test_boundary_margin() {
        let (mut board, mut v) = setup();
        v.press(&mut board, Vec2::new(60.0, 60.0));
        assert_eq!(v.drag(&board, Vec2::new(60.0, 16.0)), DragOutcome::Extended);
        assert_eq!(
            v.drag(&board, Vec2::new(60.0, 0.0)),
            DragOutcome::Cancelled(InvalidMove::Boundary)
        );
    }

    #[test]
    fn test_crossing_committed_path() {
        let (mut board, mut v) = setup();
        // Vertical red line at x = 200 from y = 60 down to y = 130
        board
            .connect("red1", "red2", vec![
                Vec2::new(60.0, 60.0),
                Vec2::new(200.0, 60.0),
                Vec2::new(200.0, 130.0),
                Vec2::new(340.0, 130.0),
            ])
            .unwrap();

        v.press(&mut board, Vec2::new(200.0, 340.0));
        let outcome = drag_all(&mut v, &board, &[(200.0, 300.0), (200.0, 260.0), (200.0, 140.0)]);
        assert_eq!(outcome, DragOutcome::Cancelled(InvalidMove::Crossing));
    }

    #[test]
    fn test_foreign_ball_blocks() {
        let (mut board, mut v) = setup();
        v.press(&mut board, Vec2::new(60.0, 60.0));
        // Straight down through blue1 at (60, 200)
        let outcome = drag_all(&mut v, &board, &[(60.0, 100.0), (60.0, 250.0)]);
        assert_eq!(outcome, DragOutcome::Cancelled(InvalidMove::WrongBall));
    }

    #[test]
    fn test_same_color_ball_is_exempt() {
        let (mut board, mut v) = setup();
        v.press(&mut board, Vec2::new(60.0, 60.0));
        let outcome = drag_all(&mut v, &board, &[(150.0, 60.0), (250.0, 60.0), (340.0, 60.0)]);
        assert_eq!(outcome, DragOutcome::Extended);
    }

    #[test]
    fn test_release_commits() {
        let (mut board, mut v) = setup();
        v.press(&mut board, Vec2::new(60.0, 60.0));
        drag_all(&mut v, &board, &[(150.0, 60.0), (250.0, 60.0)]);

        match v.release(&mut board, Vec2::new(335.0, 62.0)) {
            ReleaseOutcome::Committed {
                path,
                level_complete,
            } => {
                assert!(!level_complete);
                assert!(path.completed);
                assert_eq!(path.end.as_deref(), Some("red2"));
                assert_eq!(path.points.len(), 4);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(board.ball("red1").unwrap().connected);
        assert!(board.ball("red2").unwrap().connected);
        assert!(!v.is_drawing());
    }

    #[test]
    fn test_release_rejections() {
        let (mut board, mut v) = setup();

        v.press(&mut board, Vec2::new(60.0, 60.0));
        assert_eq!(
            v.release(&mut board, Vec2::new(60.0, 60.0)),
            ReleaseOutcome::Rejected(InvalidCommit::SameBall)
        );

        v.press(&mut board, Vec2::new(60.0, 60.0));
        assert_eq!(
            v.release(&mut board, Vec2::new(60.0, 200.0)),
            ReleaseOutcome::Rejected(InvalidCommit::ColorMismatch)
        );

        v.press(&mut board, Vec2::new(60.0, 60.0));
        assert_eq!(
            v.release(&mut board, Vec2::new(200.0, 200.0)),
            ReleaseOutcome::Rejected(InvalidCommit::NoBall)
        );

        assert_eq!(v.release(&mut board, Vec2::new(340.0, 60.0)), ReleaseOutcome::NotDrawing);
        assert!(board.paths().is_empty());
        assert_eq!(board.connected_count(), 0);
    }

    #[test]
    fn test_press_connected_ball_disconnects() {
        let (mut board, mut v) = setup();
        board.connect("red1", "red2", vec![]).unwrap();

        match v.press(&mut board, Vec2::new(340.0, 60.0)) {
            PressOutcome::Disconnected(path) => assert_eq!(path.start, "red1"),
            other => panic!("expected disconnect, got {other:?}"),
        }
        assert!(!v.is_drawing());
        assert!(board.paths().is_empty());
        assert!(!board.ball("red1").unwrap().connected);
        assert!(!board.ball("red2").unwrap().connected);
    }

    #[test]
    fn test_last_pair_completes_level() {
        let (mut board, mut v) = setup();
        board.connect("red1", "red2", vec![]).unwrap();
        board.connect("blue1", "blue2", vec![]).unwrap();

        v.press(&mut board, Vec2::new(200.0, 340.0));
        drag_all(&mut v, &board, &[(260.0, 340.0)]);
        let outcome = v.release(&mut board, Vec2::new(340.0, 340.0));
        assert!(matches!(
            outcome,
            ReleaseOutcome::Committed {
                level_complete: true,
                ..
            }
        ));

        // Pairing invariant: connected_to is a bijection within each group
        assert!(board.is_complete());
        for ball in board.balls() {
            let partner = board.ball(ball.connected_to.as_deref().unwrap()).unwrap();
            assert_eq!(partner.color, ball.color);
            assert_eq!(partner.connected_to.as_deref(), Some(ball.id.as_str()));
        }
    }

    #[test]
    fn test_press_frees_connected_partner() {
        let mut board = BoardState::new(25.0);
        board.load_level(&LevelLayout::fixture(&[
            ("red1", "red", 60.0, 60.0),
            ("red2", "red", 340.0, 60.0),
            ("red3", "red", 60.0, 340.0),
            ("red4", "red", 340.0, 340.0),
        ]));
        let mut v = PathValidator::new(&Tuning::default());
        board.connect("red1", "red2", vec![]).unwrap();

        // red1 is red3's partner, so red1-red2 is broken
        match v.press(&mut board, Vec2::new(60.0, 340.0)) {
            PressOutcome::Started {
                ball,
                freed: Some(path),
            } => {
                assert_eq!(ball, "red3");
                assert!(path.has_endpoint("red1"));
                assert!(path.has_endpoint("red2"));
            }
            other => panic!("expected freed partner, got {other:?}"),
        }
        assert!(v.is_drawing());
        assert!(board.paths().is_empty());
        assert_eq!(board.connected_count(), 0);
    }

    #[test]
    fn test_press_keeps_unrelated_group_path() {
        let mut board = BoardState::new(25.0);
        board.load_level(&LevelLayout::fixture(&[
            ("red1", "red", 60.0, 60.0),
            ("red2", "red", 340.0, 60.0),
            ("red3", "red", 60.0, 340.0),
            ("red4", "red", 340.0, 340.0),
        ]));
        let mut v = PathValidator::new(&Tuning::default());
        board.connect("red3", "red4", vec![]).unwrap();

        // red2's partner red1 is free, the red3-red4 path stays
        let outcome = v.press(&mut board, Vec2::new(340.0, 60.0));
        assert_eq!(
            outcome,
            PressOutcome::Started {
                ball: "red2".into(),
                freed: None
            }
        );
        assert_eq!(board.paths().len(), 1);
    }

    fn near_miss_board() -> BoardState {
        let mut board = BoardState::new(25.0);
        board.load_level(&LevelLayout::fixture(&[
            ("red1", "red", 60.0, 60.0),
            ("red2", "red", 340.0, 60.0),
            ("blue1", "blue", 200.0, 200.0),
            ("blue2", "blue", 340.0, 340.0),
        ]));
        board
    }

    #[test]
    fn test_foreign_ball_padding() {
        let board = near_miss_board();
        let path = Path::begin(board.ball("red1").unwrap());

        // 40 px from blue1's center: inside radius + margin (41)
        assert_eq!(
            validate_segment(&board, &path, Vec2::new(60.0, 160.0), Vec2::new(260.0, 160.0), 16.0),
            Err(InvalidMove::WrongBall)
        );
        // 42 px clears it
        assert_eq!(
            validate_segment(&board, &path, Vec2::new(60.0, 158.0), Vec2::new(260.0, 158.0), 16.0),
            Ok(())
        );
    }

    #[test]
    fn test_committed_path_padding() {
        let mut board = near_miss_board();
        board
            .connect("blue1", "blue2", vec![Vec2::new(200.0, 200.0), Vec2::new(340.0, 200.0)])
            .unwrap();
        let path = Path::begin(board.ball("red1").unwrap());

        // Ends 14 px above the committed line at y = 200
        assert_eq!(
            validate_segment(&board, &path, Vec2::new(260.0, 150.0), Vec2::new(260.0, 186.0), 16.0),
            Err(InvalidMove::Crossing)
        );
        // 18 px stays outside the padding
        assert_eq!(
            validate_segment(&board, &path, Vec2::new(260.0, 150.0), Vec2::new(260.0, 182.0), 16.0),
            Ok(())
        );
    }
}
