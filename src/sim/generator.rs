//! Procedural level generation
//!
//! Places balls at random with spacing constraints, assigns them to color
//! groups, and rejects layouts that are infeasible or too easy. Difficulty
//! scales with the level: more colors, larger groups, and same-color balls
//! allowed closer together.
//!
//! Generation is bounded. After every `relax_every` failed attempts the
//! spacing constraints are relaxed, and after `max_generation_attempts` the
//! generator gives up with [`GenerationError::Exhausted`].

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::palette::Palette;
use crate::geom::distance;
use crate::tuning::Tuning;

/// Largest pairing group
pub const MAX_BALLS_PER_COLOR: u32 = 4;

/// Why a level could not be generated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("Levels start at 1")]
    InvalidLevel,
    #[error("Palette has {available} colors, need at least 1")]
    PaletteTooSmall { available: usize },
    #[error("Board {width}x{height} cannot fit a single color group")]
    BoardTooSmall { width: f32, height: f32 },
    #[error("Level {level} not generated after {attempts} attempts")]
    Exhausted { level: u32, attempts: u32 },
}

/// A placed ball in a generated layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSpec {
    pub id: String,
    pub pos: Vec2,
    pub color: String,
    /// Ordinal within the color group (0-based)
    pub pair_index: u32,
}

/// Immutable output of the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub level: u32,
    pub width: f32,
    pub height: f32,
    pub num_colors: u32,
    pub balls_per_color: u32,
    /// Effective minimum center distance (after any relaxation)
    pub min_distance: f32,
    /// Effective minimum same-color distance (after any relaxation)
    pub same_color_min_distance: f32,
    /// Generation attempts used
    pub attempts: u32,
    /// Times the spacing constraints were relaxed
    pub relaxations: u32,
    pub balls: Vec<BallSpec>,
}

impl LevelLayout {
    pub fn total_balls(&self) -> usize {
        self.balls.len()
    }

    /// Hand-placed 400x400 level-1 layout from `(id, color, x, y)` tuples
    #[cfg(test)]
    pub(crate) fn fixture(specs: &[(&str, &str, f32, f32)]) -> Self {
        let balls: Vec<BallSpec> = specs
            .iter()
            .enumerate()
            .map(|(i, (id, color, x, y))| BallSpec {
                id: id.to_string(),
                pos: Vec2::new(*x, *y),
                color: color.to_string(),
                pair_index: i as u32,
            })
            .collect();
        Self {
            level: 1,
            width: 400.0,
            height: 400.0,
            num_colors: 0,
            balls_per_color: 2,
            min_distance: 80.0,
            same_color_min_distance: 160.0,
            attempts: 1,
            relaxations: 0,
            balls,
        }
    }
}

/// Difficulty parameters derived from the level number and board size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelParams {
    pub num_colors: u32,
    pub balls_per_color: u32,
    pub margin: f32,
    pub min_distance: f32,
    pub same_color_min_distance: f32,
}

impl LevelParams {
    pub fn for_level(
        level: u32,
        width: f32,
        height: f32,
        palette_len: usize,
        tuning: &Tuning,
    ) -> Result<Self, GenerationError> {
        if level == 0 {
            return Err(GenerationError::InvalidLevel);
        }
        if palette_len == 0 {
            return Err(GenerationError::PaletteTooSmall { available: 0 });
        }

        let mut num_colors = (3 + level / 10).min(palette_len as u32);
        // Odd groups can never be fully connected, so round down to even
        let raw_per_color = (2 + level / 20).min(MAX_BALLS_PER_COLOR);
        let mut balls_per_color = raw_per_color - raw_per_color % 2;

        let margin = tuning.placement_margin();
        let min_distance = tuning.min_ball_distance();

        let capacity = board_capacity(width, height, margin, min_distance)
            .ok_or(GenerationError::BoardTooSmall { width, height })?;

        if num_colors * balls_per_color > capacity {
            num_colors = capacity / balls_per_color;
            if num_colors == 0 {
                balls_per_color = 2;
                num_colors = (capacity / balls_per_color).min(palette_len as u32);
            }
        }
        if num_colors == 0 {
            return Err(GenerationError::BoardTooSmall { width, height });
        }

        // Higher levels allow same-color balls closer together
        let same_color_min_distance = width.max(height) / (2.5 + (level / 8) as f32);

        Ok(Self {
            num_colors,
            balls_per_color,
            margin,
            min_distance,
            same_color_min_distance,
        })
    }

    pub fn total_balls(&self) -> u32 {
        self.num_colors * self.balls_per_color
    }
}

/// How many balls comfortably fit: three quarters of a square grid at
/// `min_distance` spacing. `None` when the placement area is empty.
fn board_capacity(width: f32, height: f32, margin: f32, min_distance: f32) -> Option<u32> {
    let usable_w = width - 2.0 * margin;
    let usable_h = height - 2.0 * margin;
    if usable_w < 0.0 || usable_h < 0.0 || min_distance <= 0.0 {
        return None;
    }
    let cols = (usable_w / min_distance).floor() as u32 + 1;
    let rows = (usable_h / min_distance).floor() as u32 + 1;
    Some(cols * rows * 3 / 4)
}

/// True if any same-color pair lies closer than `threshold`
pub fn is_too_easy(balls: &[BallSpec], threshold: f32) -> bool {
    balls.iter().enumerate().any(|(i, a)| {
        balls[i + 1..]
            .iter()
            .any(|b| a.color == b.color && distance(a.pos, b.pos) < threshold)
    })
}

/// Spacing constraints in force for one attempt
#[derive(Debug, Clone, Copy)]
struct Spacing {
    min_distance: f32,
    same_color_min_distance: f32,
    too_easy_distance: f32,
}

/// Sample up to `count` positions no closer than `min_distance` to each other
fn sample_positions<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    width: f32,
    height: f32,
    margin: f32,
    min_distance: f32,
    budget: u32,
) -> Vec<Vec2> {
    let mut positions: Vec<Vec2> = Vec::with_capacity(count);
    let mut attempts = 0;

    while positions.len() < count && attempts < budget {
        let candidate = Vec2::new(
            rng.random_range(margin..=width - margin),
            rng.random_range(margin..=height - margin),
        );
        if positions
            .iter()
            .all(|p| distance(*p, candidate) >= min_distance)
        {
            positions.push(candidate);
        }
        attempts += 1;
    }

    positions
}

/// Assign shuffled positions to color groups in order, skipping any ball that
/// would sit too close to a same-color ball already placed
fn assign_colors(
    positions: &[Vec2],
    palette: &Palette,
    params: &LevelParams,
    same_color_min_distance: f32,
) -> Vec<BallSpec> {
    let per_color = params.balls_per_color as usize;
    let mut balls: Vec<BallSpec> = Vec::with_capacity(positions.len());

    for (i, color) in palette.iter().take(params.num_colors as usize).enumerate() {
        for j in 0..per_color {
            let Some(&pos) = positions.get(i * per_color + j) else {
                continue;
            };
            let crowded = balls
                .iter()
                .filter(|b| b.color == color.key)
                .any(|b| distance(b.pos, pos) < same_color_min_distance);
            if crowded {
                continue;
            }
            balls.push(BallSpec {
                id: format!("{}{}", color.key, j + 1),
                pos,
                color: color.key.clone(),
                pair_index: j as u32,
            });
        }
    }

    balls
}

/// Generate a layout for `level` on a `width` x `height` board
pub fn generate_level<R: Rng + ?Sized>(
    level: u32,
    width: f32,
    height: f32,
    palette: &Palette,
    tuning: &Tuning,
    rng: &mut R,
) -> Result<LevelLayout, GenerationError> {
    let params = LevelParams::for_level(level, width, height, palette.len(), tuning)?;
    let total = params.total_balls() as usize;

    let mut spacing = Spacing {
        min_distance: params.min_distance,
        same_color_min_distance: params.same_color_min_distance,
        too_easy_distance: tuning.too_easy_distance,
    };
    let no_overlap = tuning.ball_radius * 2.0;
    let relax_every = tuning.relax_every.max(1);

    let mut attempts = 0;
    let mut relaxations = 0;

    while attempts < tuning.max_generation_attempts {
        attempts += 1;

        let mut positions = sample_positions(
            rng,
            total,
            width,
            height,
            params.margin,
            spacing.min_distance,
            tuning.placement_attempts,
        );

        if positions.len() == total {
            positions.shuffle(rng);
            let balls = assign_colors(&positions, palette, &params, spacing.same_color_min_distance);

            if balls.len() == total && !is_too_easy(&balls, spacing.too_easy_distance) {
                log::info!(
                    "Level {}: {} colors x {} balls, {} attempts, {} relaxations",
                    level,
                    params.num_colors,
                    params.balls_per_color,
                    attempts,
                    relaxations
                );
                return Ok(LevelLayout {
                    level,
                    width,
                    height,
                    num_colors: params.num_colors,
                    balls_per_color: params.balls_per_color,
                    min_distance: spacing.min_distance,
                    same_color_min_distance: spacing.same_color_min_distance,
                    attempts,
                    relaxations,
                    balls,
                });
            }
        }

        if attempts % relax_every == 0 {
            relaxations += 1;
            spacing.same_color_min_distance *= tuning.relax_factor;
            spacing.too_easy_distance *= tuning.relax_factor;
            spacing.min_distance = (spacing.min_distance * tuning.relax_factor).max(no_overlap);
            log::warn!(
                "Level {}: relaxing spacing after {} attempts (same-color {:.1}, too-easy {:.1})",
                level,
                attempts,
                spacing.same_color_min_distance,
                spacing.too_easy_distance
            );
        }
    }

    log::error!("Level {} generation exhausted after {} attempts", level, attempts);
    Err(GenerationError::Exhausted { level, attempts })
}

/// Reproducible generation from a seed
pub fn generate_level_seeded(
    level: u32,
    seed: u64,
    palette: &Palette,
    tuning: &Tuning,
) -> Result<LevelLayout, GenerationError> {
    let mut rng = Pcg32::seed_from_u64(seed);
    generate_level(
        level,
        tuning.board_width,
        tuning.board_height,
        palette,
        tuning,
        &mut rng,
    )
}
