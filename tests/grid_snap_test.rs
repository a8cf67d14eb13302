// Exercise the snapping pipeline through the public GridHelper facade
use pcb_core::geometry::{Vec2D, Vec2I, IU_PER_MM};
use pcb_core::snap::{GridDescriptor, GridHelper, SnapSource};
use std::time::Instant;

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn mm(v: f64) -> i64 {
        (v * IU_PER_MM as f64).round() as i64
    }

    /// Helper with a 1mm manual grid and a 0.2mm snap radius.
    fn helper_1mm() -> GridHelper {
        let mut helper = GridHelper::new();
        helper.set_manual_grid(GridDescriptor::uniform(IU_PER_MM as f64));
        helper.set_manual_snap_range(0.2 * IU_PER_MM as f64);
        helper
    }

    #[test]
    fn test_default_grid_is_50_mil() {
        let helper = GridHelper::new();
        let grid = helper.grid();
        assert_eq!(grid.size, Vec2D::new(1_270_000.0, 1_270_000.0));
        assert!(grid.snapping_enabled);

        // 1.0mm sits closer to 1.27mm than to 0, 0.2mm closer to 0
        let aligned = helper.align(Vec2I::new(mm(1.0), mm(0.2)));
        assert_eq!(aligned, Vec2I::new(1_270_000, 0));
        println!("✓ Default 1.27mm grid aligns (1.0, 0.2)mm to {:?}", aligned);
    }

    #[test]
    fn test_aux_axis_wins_per_axis() {
        let mut helper = helper_1mm();
        helper.set_aux_axis(Some(Vec2I::new(mm(0.3), mm(0.3))));

        // x: axis at 0.3 beats grid at 0; y: grid at 1.0 beats axis at 0.3
        let anchor = helper.best_snap_anchor(Vec2I::new(mm(0.4), mm(0.9)));
        assert_eq!(anchor, Vec2I::new(mm(0.3), mm(1.0)));

        let item = helper.snap_item().expect("grid snap always yields an item");
        assert!(item.sources.contains(SnapSource::AUX_AXIS));
        assert!(item.sources.contains(SnapSource::GRID));
        assert_eq!(helper.snapped_point(), Some(anchor));
        println!("✓ Auxiliary axis overrode x only: {:?}", anchor);
    }

    #[test]
    fn test_diagonal_construction_line_capture() {
        let mut helper = helper_1mm();
        helper.set_snap_origin(Vec2I::ZERO);
        helper.set_snap_directions(vec![Vec2I::new(1, 1)]);

        // 0.14mm off the 45 degree line, within the 0.2mm radius
        let anchor = helper.best_snap_anchor(Vec2I::new(mm(2.1), mm(1.9)));
        assert_eq!(
            anchor,
            Vec2I::new(mm(2.0), mm(2.0)),
            "expected the grid intersection on the line, got {:?}",
            anchor
        );

        let item = helper.snap_item().unwrap();
        assert_eq!(item.sources, SnapSource::CONSTRUCTION_LINE);
        assert_eq!(helper.snap_lines().end_point(), Some(anchor));
        assert!(helper.preview_shown());
        println!("✓ Captured onto the 45 degree line at {:?}", anchor);
    }

    #[test]
    fn test_line_capture_without_grid_lands_on_projection() {
        let mut helper = helper_1mm();
        let mut grid = GridDescriptor::uniform(IU_PER_MM as f64);
        grid.snapping_enabled = false;
        helper.set_manual_grid(grid);

        helper.set_snap_origin(Vec2I::ZERO);
        helper.set_snap_directions(vec![Vec2I::new(1, 1)]);

        // Projection of (1.5, 1.3) onto the diagonal is (1.4, 1.4)
        let anchor = helper.best_snap_anchor(Vec2I::new(mm(1.5), mm(1.3)));
        assert_eq!(anchor, Vec2I::new(mm(1.4), mm(1.4)));
        println!("✓ Free line snap landed on the projection {:?}", anchor);
    }

    #[test]
    fn test_axis_line_capture_without_grid_uses_projection() {
        let mut helper = helper_1mm();
        let mut grid = GridDescriptor::uniform(IU_PER_MM as f64);
        grid.snapping_enabled = false;
        helper.set_manual_grid(grid);

        helper.set_snap_origin(Vec2I::ZERO);
        helper.set_snap_directions(vec![Vec2I::new(0, 1)]);

        // 0.05mm off the vertical line; y must stay at the cursor
        // instead of pulling onto the disabled 1mm grid
        let anchor = helper.best_snap_anchor(Vec2I::new(mm(0.05), mm(1.37)));
        assert_eq!(anchor, Vec2I::new(0, mm(1.37)));
        assert_eq!(
            helper.snap_item().unwrap().sources,
            SnapSource::CONSTRUCTION_LINE
        );
        println!("✓ Axis line capture stayed off the grid: {:?}", anchor);
    }

    #[test]
    fn test_sticky_direction_across_a_drag() {
        let mut helper = helper_1mm();
        helper.set_snap_origin(Vec2I::ZERO);
        helper.set_snap_directions(vec![Vec2I::new(1, 0), Vec2I::new(0, 1)]);

        // Capture the horizontal line 0.15mm away
        let a = helper.best_snap_anchor(Vec2I::new(mm(3.0), mm(0.15)));
        assert_eq!(a, Vec2I::new(mm(3.0), 0));
        assert_eq!(helper.snap_lines().active_direction(), Some(0));

        // 0.25mm would miss cold, but the active line holds to 0.3mm
        let b = helper.best_snap_anchor(Vec2I::new(mm(3.0), mm(0.25)));
        assert_eq!(b, Vec2I::new(mm(3.0), 0), "hysteresis should keep the line");

        // Far from both lines: fall back to the grid, line stays active
        let c = helper.best_snap_anchor(Vec2I::new(mm(0.25), mm(3.0)));
        assert_eq!(c, Vec2I::new(0, mm(3.0)));
        assert_eq!(helper.snap_item().unwrap().sources, SnapSource::GRID);
        assert_eq!(helper.snap_lines().active_direction(), Some(0));

        // Close enough to the vertical line: the snap hands over
        let d = helper.best_snap_anchor(Vec2I::new(mm(0.15), mm(3.0)));
        assert_eq!(d, Vec2I::new(0, mm(3.0)));
        assert_eq!(helper.snap_item().unwrap().sources, SnapSource::CONSTRUCTION_LINE);
        assert_eq!(helper.snap_lines().active_direction(), Some(1));
        println!("✓ Drag sequence: {:?} {:?} {:?} {:?}", a, b, c, d);
    }

    #[test]
    fn test_skip_point_falls_back_to_grid() {
        let mut helper = helper_1mm();
        helper.set_snap_origin(Vec2I::ZERO);
        helper.set_snap_directions(vec![Vec2I::new(1, 0)]);

        // The dragged point itself must not be a snap target
        helper.set_skip_point(Some(Vec2I::new(mm(3.0), 0)));
        let anchor = helper.best_snap_anchor(Vec2I::new(mm(3.0), mm(0.15)));
        assert_eq!(anchor, Vec2I::new(mm(3.0), 0));
        assert_eq!(helper.snap_item().unwrap().sources, SnapSource::GRID);

        helper.set_skip_point(None);
        let anchor = helper.best_snap_anchor(Vec2I::new(mm(3.0), mm(0.15)));
        assert_eq!(helper.snap_item().unwrap().sources, SnapSource::CONSTRUCTION_LINE);
        println!("✓ Skip point forced the grid fallback, then released: {:?}", anchor);
    }

    #[test]
    fn test_alignment_is_idempotent_over_random_grids() {
        let mut rng = rand::rng();
        let mut helper = GridHelper::new();
        let start = Instant::now();

        for _ in 0..1000 {
            let size = Vec2D::new(
                rng.random_range(1..=5_000_000i64) as f64,
                rng.random_range(1..=5_000_000i64) as f64,
            );
            let origin = Vec2I::new(
                rng.random_range(-2_000_000..2_000_000),
                rng.random_range(-2_000_000..2_000_000),
            );
            helper.set_manual_grid(GridDescriptor {
                size,
                origin,
                visible_size: size,
                snapping_enabled: true,
            });

            let p = Vec2I::new(
                rng.random_range(-50_000_000..50_000_000),
                rng.random_range(-50_000_000..50_000_000),
            );
            let once = helper.align(p);
            let twice = helper.align(once);
            assert_eq!(
                once, twice,
                "align must be idempotent: p={:?} size={:?} origin={:?}",
                p, size, origin
            );
        }

        println!("✓ 1000 random alignments idempotent");
        println!("Alignment time: {:.3}ms", start.elapsed().as_secs_f64() * 1000.0);
    }
}
