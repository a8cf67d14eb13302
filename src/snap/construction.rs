//! Snapping onto construction lines
//!
//! Tools place an origin and a set of directions while the user drags;
//! the resolver picks the line the cursor is closest to and lands the
//! snap on a grid intersection near that line. The direction snapped to
//! last is "active" and keeps a widened capture radius so small cursor
//! wobbles do not flip the snap between lines.

use super::helper::SnapConfig;
use crate::geometry::{Vec2D, Vec2I};

/// One snap request from a tool, with everything the resolver needs.
#[derive(Clone, Copy, Debug)]
pub struct SnapQuery {
    /// Raw cursor position.
    pub point: Vec2I,
    /// Grid intersection nearest the cursor.
    pub nearest_grid: Vec2I,
    /// Current grid spacing.
    pub grid: Vec2D,
    /// Grid anchor offset.
    pub grid_offset: Vec2I,
    /// Maximum snap distance, in internal units.
    pub snap_range: f64,
    /// Whether results must land on grid intersections.
    pub grid_snapping: bool,
    /// Anchor to leave alone, usually the point being dragged.
    pub skip: Option<Vec2I>,
}

/// Construction lines radiating from a common origin. Directions are
/// integer vectors as drawn; zero-length ones are skipped, not errors.
#[derive(Clone, Debug, Default)]
pub struct SnapLines {
    origin: Option<Vec2I>,
    directions: Vec<Vec2I>,
    active_direction: Option<usize>,
    end_point: Option<Vec2I>,
}

impl SnapLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor the lines at `origin`. Resets the active direction, since
    /// hysteresis from the previous anchor would be meaningless.
    pub fn set_origin(&mut self, origin: Vec2I) {
        self.origin = Some(origin);
        self.active_direction = None;
    }

    pub fn origin(&self) -> Option<Vec2I> {
        self.origin
    }

    pub fn set_directions(&mut self, directions: Vec<Vec2I>) {
        self.directions = directions;
        self.active_direction = None;
    }

    pub fn directions(&self) -> &[Vec2I] {
        &self.directions
    }

    /// Where the preview line should end, normally the last snap result.
    pub fn set_end_point(&mut self, p: Vec2I) {
        self.end_point = Some(p);
    }

    pub fn end_point(&self) -> Option<Vec2I> {
        self.end_point
    }

    pub fn active_direction(&self) -> Option<usize> {
        self.active_direction
    }

    pub fn clear(&mut self) {
        self.origin = None;
        self.directions.clear();
        self.active_direction = None;
        self.end_point = None;
    }

    pub fn has_geometry(&self) -> bool {
        self.origin.is_some() && !self.directions.is_empty()
    }

    /// Snap the query's cursor onto the closest construction line, or
    /// `None` when every line misses its capture radius.
    ///
    /// Lines are ranked by perpendicular distance from the cursor;
    /// near-ties fall back to the candidate closest to the cursor. A
    /// successful snap marks its direction active, and a miss leaves the
    /// active direction untouched so it still gets the widened radius on
    /// the next query.
    pub fn snap(&mut self, q: &SnapQuery, cfg: &SnapConfig) -> Option<Vec2I> {
        let origin = self.origin?;
        let cursor = q.point.to_f64();
        let origin_f = origin.to_f64();

        // (perp distance, candidate-to-cursor distance, candidate, index)
        let mut best: Option<(f64, f64, Vec2I, usize)> = None;

        for (idx, raw) in self.directions.iter().enumerate() {
            if raw.is_zero() {
                continue;
            }
            let dir = raw.to_f64().normalized();

            let along = (cursor - origin_f).dot(dir);
            let on_line = origin_f + dir * along;
            let perp = cursor.distance(on_line);

            // Leaving the active line takes a wider miss than entering it
            let mut threshold = q.snap_range;
            if self.active_direction == Some(idx) {
                threshold *= cfg.hysteresis_factor;
            }
            if perp > threshold {
                continue;
            }

            // With grid snapping off every line, axis-aligned included,
            // lands on the raw projection
            let candidate = if !q.grid_snapping {
                on_line.round()
            } else if dir.x == 0.0 {
                Vec2I::new(origin.x, q.nearest_grid.y)
            } else if dir.y == 0.0 {
                Vec2I::new(q.nearest_grid.x, origin.y)
            } else {
                best_grid_near_line(origin_f, dir, on_line, cursor, q, cfg)
            };

            if q.skip == Some(candidate) {
                continue;
            }

            let cand_cursor = candidate.to_f64().distance(cursor);
            let better = match best {
                None => true,
                Some((bp, bc, _, _)) => {
                    perp + cfg.perp_epsilon < bp
                        || ((perp - bp).abs() <= cfg.perp_epsilon && cand_cursor < bc)
                }
            };
            if better {
                best = Some((perp, cand_cursor, candidate, idx));
            }
        }

        let (_, _, candidate, idx) = best?;
        self.active_direction = Some(idx);
        Some(candidate)
    }
}

/// Best grid intersection for a diagonal line: search the 3x3 block of
/// intersections around the cursor's projection and take the one closest
/// to the line, lightly weighted toward the cursor.
fn best_grid_near_line(
    origin: Vec2D,
    dir: Vec2D,
    on_line: Vec2D,
    cursor: Vec2D,
    q: &SnapQuery,
    cfg: &SnapConfig,
) -> Vec2I {
    let sx = q.grid.x.max(1.0);
    let sy = q.grid.y.max(1.0);
    let base_i = ((on_line.x - q.grid_offset.x as f64) / sx).round();
    let base_j = ((on_line.y - q.grid_offset.y as f64) / sy).round();

    let mut best = (f64::INFINITY, on_line.round());
    for dj in -1i32..=1 {
        for di in -1i32..=1 {
            let cand = Vec2D::new(
                (base_i + di as f64) * sx + q.grid_offset.x as f64,
                (base_j + dj as f64) * sy + q.grid_offset.y as f64,
            );
            let along = (cand - origin).dot(dir);
            let perp = cand.distance(origin + dir * along);
            let score = perp + cfg.cursor_weight * cand.distance(cursor);
            if score < best.0 {
                best = (score, cand.round());
            }
        }
    }
    best.1
}
