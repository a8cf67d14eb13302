//! Cursor-to-grid alignment

use serde::{Deserialize, Serialize};

use super::helper::SnapSource;
use crate::geometry::{Vec2D, Vec2I, IU_PER_MM};

/// Grid spacing and anchor used for alignment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    /// Spacing per axis, in internal units.
    pub size: Vec2D,
    /// World-space anchor the grid is offset by.
    pub origin: Vec2I,
    /// Spacing the view actually draws, which may be a multiple of `size`.
    pub visible_size: Vec2D,
    /// Master switch for grid snapping.
    pub snapping_enabled: bool,
}

impl Default for GridDescriptor {
    fn default() -> Self {
        // 1.27mm (50 mil), the usual connectable grid
        let size = 1.27 * IU_PER_MM as f64;
        GridDescriptor {
            size: Vec2D::new(size, size),
            origin: Vec2I::ZERO,
            visible_size: Vec2D::new(size, size),
            snapping_enabled: true,
        }
    }
}

impl GridDescriptor {
    /// Square grid of the given spacing, anchored at the world origin.
    pub fn uniform(size: f64) -> Self {
        GridDescriptor {
            size: Vec2D::new(size, size),
            visible_size: Vec2D::new(size, size),
            ..Default::default()
        }
    }
}

/// Align `point` to the nearest grid intersection.
///
/// Halfway points round away from zero on both axes. Degenerate grid
/// sizes are clamped to one internal unit so alignment never divides by
/// zero.
pub fn align_to_grid(point: Vec2I, size: Vec2D, offset: Vec2I) -> Vec2I {
    let sx = size.x.max(1.0);
    let sy = size.y.max(1.0);
    let x = ((point.x - offset.x) as f64 / sx).round() * sx + offset.x as f64;
    let y = ((point.y - offset.y) as f64 / sy).round() * sy + offset.y as f64;
    Vec2D::new(x, y).round()
}

/// Align `point` to the grid, letting an auxiliary axis win any axis on
/// which it is strictly closer to the cursor than the grid intersection.
pub fn align_with_aux(
    point: Vec2I,
    size: Vec2D,
    offset: Vec2I,
    aux: Option<Vec2I>,
) -> (Vec2I, SnapSource) {
    let grid = align_to_grid(point, size, offset);
    let Some(axis) = aux else {
        return (grid, SnapSource::GRID);
    };

    let mut result = grid;
    let mut source = SnapSource::NONE;
    if (axis.x - point.x).abs() < (grid.x - point.x).abs() {
        result.x = axis.x;
        source |= SnapSource::AUX_AXIS;
    } else {
        source |= SnapSource::GRID;
    }
    if (axis.y - point.y).abs() < (grid.y - point.y).abs() {
        result.y = axis.y;
        source |= SnapSource::AUX_AXIS;
    } else {
        source |= SnapSource::GRID;
    }
    (result, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid10() -> Vec2D {
        Vec2D::new(10.0, 10.0)
    }

    #[test]
    fn test_align_rounds_to_nearest() {
        assert_eq!(
            align_to_grid(Vec2I::new(14, 6), grid10(), Vec2I::ZERO),
            Vec2I::new(10, 10)
        );
        assert_eq!(
            align_to_grid(Vec2I::new(16, 4), grid10(), Vec2I::ZERO),
            Vec2I::new(20, 0)
        );
    }

    #[test]
    fn test_align_halfway_rounds_away_from_zero() {
        assert_eq!(
            align_to_grid(Vec2I::new(5, 5), grid10(), Vec2I::ZERO),
            Vec2I::new(10, 10)
        );
        assert_eq!(
            align_to_grid(Vec2I::new(-5, -5), grid10(), Vec2I::ZERO),
            Vec2I::new(-10, -10)
        );
    }

    #[test]
    fn test_align_honors_offset() {
        assert_eq!(
            align_to_grid(Vec2I::new(14, 6), grid10(), Vec2I::new(3, 0)),
            Vec2I::new(13, 10)
        );
    }

    #[test]
    fn test_align_clamps_degenerate_grid() {
        let aligned = align_to_grid(Vec2I::new(7, 9), Vec2D::new(0.0, -4.0), Vec2I::ZERO);
        assert_eq!(aligned, Vec2I::new(7, 9));
    }

    #[test]
    fn test_aux_axis_wins_when_closer() {
        let (pos, source) = align_with_aux(
            Vec2I::new(4, 4),
            grid10(),
            Vec2I::ZERO,
            Some(Vec2I::new(3, 3)),
        );
        assert_eq!(pos, Vec2I::new(3, 3));
        assert_eq!(source, SnapSource::AUX_AXIS);
    }

    #[test]
    fn test_aux_axis_is_per_axis() {
        // Closer on x only, so y still comes from the grid
        let (pos, source) = align_with_aux(
            Vec2I::new(4, 4),
            grid10(),
            Vec2I::ZERO,
            Some(Vec2I::new(3, 40)),
        );
        assert_eq!(pos, Vec2I::new(3, 0));
        assert!(source.contains(SnapSource::AUX_AXIS));
        assert!(source.contains(SnapSource::GRID));
    }

    #[test]
    fn test_aux_axis_tie_goes_to_grid() {
        let (pos, source) = align_with_aux(
            Vec2I::new(5, 0),
            grid10(),
            Vec2I::ZERO,
            Some(Vec2I::new(10, 0)),
        );
        assert_eq!(pos, Vec2I::new(10, 0));
        assert_eq!(source, SnapSource::GRID);
    }

    #[test]
    fn test_default_grid_is_50_mil() {
        let grid = GridDescriptor::default();
        assert_eq!(grid.size.x as i64, 1_270_000);
        assert!(grid.snapping_enabled);
    }
}
