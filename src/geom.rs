//! Geometry primitives for path validation and level generation
//!
//! All tests are inclusive: touching a boundary counts as intersecting.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance for colinearity and degenerate segments
const EPSILON: f32 = 1e-4;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    /// Closest point on the segment to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let line_vec = self.b - self.a;
        let line_len_sq = line_vec.length_squared();

        if line_len_sq < EPSILON {
            return self.a; // Degenerate segment
        }

        let t = ((p - self.a).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
        self.a + line_vec * t
    }

    /// Shortest distance from `p` to the segment
    pub fn distance_to(&self, p: Vec2) -> f32 {
        distance(p, self.closest_point(p))
    }
}

/// A circle (ball body, optionally padded)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        distance(p, self.center) <= self.radius
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Bounding box of two points
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Grow every side by `amount`
    pub fn inflate(self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// The four edges, clockwise from the top-left corner
    pub fn edges(&self) -> [Segment; 4] {
        let tl = self.min;
        let tr = Vec2::new(self.max.x, self.min.y);
        let br = self.max;
        let bl = Vec2::new(self.min.x, self.max.y);
        [
            Segment::new(tl, tr),
            Segment::new(tr, br),
            Segment::new(br, bl),
            Segment::new(bl, tl),
        ]
    }
}

/// Sign of the turn a -> b -> c (0 when colinear)
fn orientation(a: Vec2, b: Vec2, c: Vec2) -> i8 {
    let cross = (b - a).perp_dot(c - a);
    if cross.abs() < EPSILON {
        0
    } else if cross > 0.0 {
        1
    } else {
        -1
    }
}

/// For colinear points: is `p` within the bounding box of `s`?
fn on_segment(s: &Segment, p: Vec2) -> bool {
    p.x >= s.a.x.min(s.b.x) - EPSILON
        && p.x <= s.a.x.max(s.b.x) + EPSILON
        && p.y >= s.a.y.min(s.b.y) - EPSILON
        && p.y <= s.a.y.max(s.b.y) + EPSILON
}

/// Do two segments cross or touch?
pub fn segments_intersect(s1: &Segment, s2: &Segment) -> bool {
    let o1 = orientation(s1.a, s1.b, s2.a);
    let o2 = orientation(s1.a, s1.b, s2.b);
    let o3 = orientation(s2.a, s2.b, s1.a);
    let o4 = orientation(s2.a, s2.b, s1.b);

    if o1 != o2 && o3 != o4 {
        return true;
    }

    // Colinear / touching cases
    (o1 == 0 && on_segment(s1, s2.a))
        || (o2 == 0 && on_segment(s1, s2.b))
        || (o3 == 0 && on_segment(s2, s1.a))
        || (o4 == 0 && on_segment(s2, s1.b))
}

/// Does the segment enter or touch the rectangle?
pub fn segment_intersects_rect(segment: &Segment, rect: &Rect) -> bool {
    if rect.contains(segment.a) || rect.contains(segment.b) {
        return true;
    }
    rect.edges()
        .iter()
        .any(|edge| segments_intersect(segment, edge))
}

/// Does the segment enter or touch the circle?
pub fn segment_intersects_circle(segment: &Segment, circle: &Circle) -> bool {
    segment.distance_to(circle.center) <= circle.radius
}
