//! Grid helper facade
//!
//! `GridHelper` is what interactive tools talk to: it resolves the
//! current grid (from an attached view or a manual override), applies the
//! auxiliary axis, runs construction-line snapping and keeps the preview
//! visibility callbacks informed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::construction::{SnapLines, SnapQuery};
use super::grid::{align_to_grid, align_with_aux, GridDescriptor};
use crate::geometry::{BBox, Vec2D, Vec2I, IU_PER_MM};

/// Bitmask of the features that produced a snapped position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapSource(u8);

impl SnapSource {
    pub const NONE: SnapSource = SnapSource(0);
    pub const GRID: SnapSource = SnapSource(1 << 0);
    pub const AUX_AXIS: SnapSource = SnapSource(1 << 1);
    pub const CONSTRUCTION_LINE: SnapSource = SnapSource(1 << 2);

    pub fn contains(self, other: SnapSource) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for SnapSource {
    type Output = SnapSource;

    fn bitor(self, rhs: SnapSource) -> SnapSource {
        SnapSource(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for SnapSource {
    fn bitor_assign(&mut self, rhs: SnapSource) {
        self.0 |= rhs.0;
    }
}

/// A resolved snap anchor and the features that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SnapItem {
    pub position: Vec2I,
    pub sources: SnapSource,
}

/// Tunables for interactive snapping.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Snap radius on screen, converted through the view scale.
    pub snap_range_px: f64,
    /// Multiplier applied to the radius when leaving the active line.
    pub hysteresis_factor: f64,
    /// Weight of cursor distance when ranking grid points along a line.
    pub cursor_weight: f64,
    /// Perpendicular distances closer than this count as equal.
    pub perp_epsilon: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        SnapConfig {
            snap_range_px: 25.0,
            hysteresis_factor: 1.5,
            cursor_weight: 0.1,
            perp_epsilon: 1e-9,
        }
    }
}

/// Item classes that can carry their own preferred grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridClass {
    Connectable,
    Wires,
    Vias,
    Text,
    Graphics,
}

/// View state the helper reads while a canvas is attached.
pub trait ViewProvider {
    /// Current snapping grid, in internal units.
    fn grid_size(&self) -> Vec2D;
    fn grid_origin(&self) -> Vec2I;
    /// Spacing of the drawn grid, which can be a multiple of the snap grid.
    fn visible_grid_size(&self) -> Vec2D;
    fn grid_snapping_enabled(&self) -> bool;
    /// Screen pixels per internal unit at the current zoom.
    fn world_scale(&self) -> f64;
    /// Visible world-space area.
    fn viewport(&self) -> BBox;
}

/// Facade tying grid state, the auxiliary axis and construction lines
/// into one snap pipeline.
pub struct GridHelper {
    view: Option<Box<dyn ViewProvider>>,
    manual_grid: GridDescriptor,
    manual_snap_range: f64,
    config: SnapConfig,
    aux_axis: Option<Vec2I>,
    snap_lines: SnapLines,
    skip_point: Option<Vec2I>,
    snap_item: Option<SnapItem>,
    class_grids: IndexMap<GridClass, Vec2D>,
    preview_shown: bool,
    visibility_cb: Option<Box<dyn FnMut(bool)>>,
    refresh_cb: Option<Box<dyn FnMut()>>,
}

impl Default for GridHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl GridHelper {
    pub fn new() -> Self {
        GridHelper {
            view: None,
            manual_grid: GridDescriptor::default(),
            manual_snap_range: 0.5 * IU_PER_MM as f64,
            config: SnapConfig::default(),
            aux_axis: None,
            snap_lines: SnapLines::new(),
            skip_point: None,
            snap_item: None,
            class_grids: IndexMap::new(),
            preview_shown: false,
            visibility_cb: None,
            refresh_cb: None,
        }
    }

    pub fn with_view(view: Box<dyn ViewProvider>) -> Self {
        GridHelper {
            view: Some(view),
            ..Self::new()
        }
    }

    pub fn attach_view(&mut self, view: Box<dyn ViewProvider>) {
        self.view = Some(view);
        self.update_preview();
    }

    pub fn detach_view(&mut self) {
        self.view = None;
        self.update_preview();
    }

    /// Grid currently in force: the attached view's, else the manual one.
    pub fn grid(&self) -> GridDescriptor {
        match &self.view {
            Some(v) => GridDescriptor {
                size: v.grid_size(),
                origin: v.grid_origin(),
                visible_size: v.visible_grid_size(),
                snapping_enabled: v.grid_snapping_enabled(),
            },
            None => self.manual_grid,
        }
    }

    pub fn set_manual_grid(&mut self, grid: GridDescriptor) {
        self.manual_grid = grid;
    }

    /// Snap radius in internal units. Views convert the configured pixel
    /// radius through their zoom; without a usable scale the manual range
    /// applies.
    pub fn snap_range(&self) -> f64 {
        match &self.view {
            Some(v) if v.world_scale() > 0.0 => self.config.snap_range_px / v.world_scale(),
            _ => self.manual_snap_range,
        }
    }

    pub fn set_manual_snap_range(&mut self, range: f64) {
        self.manual_snap_range = range;
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SnapConfig) {
        self.config = config;
    }

    pub fn set_aux_axis(&mut self, axis: Option<Vec2I>) {
        self.aux_axis = axis;
    }

    pub fn aux_axis(&self) -> Option<Vec2I> {
        self.aux_axis
    }

    pub fn set_skip_point(&mut self, p: Option<Vec2I>) {
        self.skip_point = p;
    }

    pub fn skip_point(&self) -> Option<Vec2I> {
        self.skip_point
    }

    pub fn snap_lines(&self) -> &SnapLines {
        &self.snap_lines
    }

    pub fn snap_lines_mut(&mut self) -> &mut SnapLines {
        &mut self.snap_lines
    }

    /// Anchor the construction lines and refresh the preview.
    pub fn set_snap_origin(&mut self, origin: Vec2I) {
        self.snap_lines.set_origin(origin);
        self.update_preview();
    }

    /// Replace the construction directions and refresh the preview.
    pub fn set_snap_directions(&mut self, directions: Vec<Vec2I>) {
        self.snap_lines.set_directions(directions);
        self.update_preview();
    }

    /// Drop all construction geometry and hide its preview.
    pub fn reset_lines(&mut self) {
        self.snap_lines.clear();
        self.update_preview();
    }

    /// The anchor resolved by the last `best_snap_anchor` call.
    pub fn snap_item(&self) -> Option<SnapItem> {
        self.snap_item
    }

    /// Position of the last locked snap item.
    pub fn snapped_point(&self) -> Option<Vec2I> {
        self.snap_item.map(|item| item.position)
    }

    /// Align `point` to the active grid, or pass it through when grid
    /// snapping is off.
    pub fn align(&self, point: Vec2I) -> Vec2I {
        let grid = self.grid();
        if !grid.snapping_enabled {
            return point;
        }
        align_to_grid(point, grid.size, grid.origin)
    }

    /// Resolve the best anchor for a cursor position.
    ///
    /// Construction lines take priority when one captures the cursor;
    /// otherwise the grid (with the auxiliary-axis override) decides.
    /// With grid snapping off and no line hit, the cursor passes through
    /// unsnapped.
    pub fn best_snap_anchor(&mut self, cursor: Vec2I) -> Vec2I {
        let grid = self.grid();
        // Alignment is a passthrough while snapping is off, so lines
        // measure against the raw cursor
        let (aligned, sources) = if grid.snapping_enabled {
            align_with_aux(cursor, grid.size, grid.origin, self.aux_axis)
        } else {
            (cursor, SnapSource::NONE)
        };

        let query = SnapQuery {
            point: cursor,
            nearest_grid: aligned,
            grid: grid.size,
            grid_offset: grid.origin,
            snap_range: self.snap_range(),
            grid_snapping: grid.snapping_enabled,
            skip: self.skip_point,
        };
        let line_hit = self.snap_lines.snap(&query, &self.config);

        let anchor = match line_hit {
            Some(pos) => {
                self.snap_lines.set_end_point(pos);
                self.snap_item = Some(SnapItem {
                    position: pos,
                    sources: SnapSource::CONSTRUCTION_LINE,
                });
                pos
            }
            None => {
                if grid.snapping_enabled {
                    self.snap_item = Some(SnapItem {
                        position: aligned,
                        sources,
                    });
                    aligned
                } else {
                    self.snap_item = None;
                    cursor
                }
            }
        };
        self.update_preview();
        anchor
    }

    /// True while the construction-line preview should be drawn.
    pub fn preview_shown(&self) -> bool {
        self.preview_shown
    }

    /// Called with the new state whenever preview visibility flips.
    pub fn on_preview_visibility<F: FnMut(bool) + 'static>(&mut self, cb: F) {
        self.visibility_cb = Some(Box::new(cb));
    }

    /// Called after any visibility flip, for canvas redraw scheduling.
    pub fn on_refresh<F: FnMut() + 'static>(&mut self, cb: F) {
        self.refresh_cb = Some(Box::new(cb));
    }

    /// True when the construction origin sits inside the attached view's
    /// viewport. Without a view or an origin there is nothing to draw.
    pub fn origin_visible(&self) -> bool {
        self.view
            .as_ref()
            .zip(self.snap_lines.origin())
            .map_or(false, |(v, o)| v.viewport().contains(o))
    }

    pub fn set_grid_for_class(&mut self, class: GridClass, size: Vec2D) {
        self.class_grids.insert(class, size);
    }

    /// Preferred grid for an item class, falling back to the active grid.
    pub fn grid_for_class(&self, class: GridClass) -> Vec2D {
        match self.class_grids.get(&class) {
            Some(&size) => size,
            None => self.grid().size,
        }
    }

    /// Coarsest grid among the classes in a mixed selection, so a drag
    /// never lands an item off its own grid.
    pub fn selection_grid(&self, classes: &[GridClass]) -> Vec2D {
        let mut best: Option<Vec2D> = None;
        for &class in classes {
            let g = self.grid_for_class(class);
            if best.map_or(true, |b| g.x.hypot(g.y) > b.x.hypot(b.y)) {
                best = Some(g);
            }
        }
        best.unwrap_or_else(|| self.grid().size)
    }

    /// Preview visibility tracks the construction geometry, not single
    /// snap results; with a view attached the origin must also be on
    /// screen. Callbacks fire only when the state flips.
    fn update_preview(&mut self) {
        let mut show = self.snap_lines.has_geometry();
        if show && self.view.is_some() {
            show = self.origin_visible();
        }
        if show == self.preview_shown {
            return;
        }
        self.preview_shown = show;
        if let Some(cb) = self.visibility_cb.as_mut() {
            cb(show);
        }
        if let Some(cb) = self.refresh_cb.as_mut() {
            cb();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct TestView {
        grid: f64,
        scale: f64,
        snapping: bool,
    }

    impl ViewProvider for TestView {
        fn grid_size(&self) -> Vec2D {
            Vec2D::new(self.grid, self.grid)
        }

        fn grid_origin(&self) -> Vec2I {
            Vec2I::ZERO
        }

        fn visible_grid_size(&self) -> Vec2D {
            Vec2D::new(self.grid * 2.0, self.grid * 2.0)
        }

        fn grid_snapping_enabled(&self) -> bool {
            self.snapping
        }

        fn world_scale(&self) -> f64 {
            self.scale
        }

        fn viewport(&self) -> BBox {
            BBox::new(Vec2I::new(-100, -100), Vec2I::new(100, 100))
        }
    }

    fn manual_helper() -> GridHelper {
        let mut helper = GridHelper::new();
        helper.set_manual_grid(GridDescriptor::uniform(10.0));
        helper.set_manual_snap_range(50.0);
        helper
    }

    #[test]
    fn test_snap_source_bits() {
        let s = SnapSource::GRID | SnapSource::AUX_AXIS;
        assert!(s.contains(SnapSource::GRID));
        assert!(s.contains(SnapSource::AUX_AXIS));
        assert!(!s.contains(SnapSource::CONSTRUCTION_LINE));
        assert!(SnapSource::NONE.is_empty());
    }

    #[test]
    fn test_view_grid_overrides_manual() {
        let mut helper = manual_helper();
        assert_eq!(helper.grid().size, Vec2D::new(10.0, 10.0));

        helper.attach_view(Box::new(TestView {
            grid: 25.0,
            scale: 0.5,
            snapping: true,
        }));
        assert_eq!(helper.grid().size, Vec2D::new(25.0, 25.0));
        assert_eq!(helper.grid().visible_size, Vec2D::new(50.0, 50.0));
        // 25px radius at 0.5 px per unit covers 50 units
        assert_eq!(helper.snap_range(), 50.0);

        helper.detach_view();
        assert_eq!(helper.grid().size, Vec2D::new(10.0, 10.0));
        assert_eq!(helper.snap_range(), 50.0);
    }

    #[test]
    fn test_degenerate_scale_falls_back_to_manual_range() {
        let mut helper = manual_helper();
        helper.attach_view(Box::new(TestView {
            grid: 25.0,
            scale: 0.0,
            snapping: true,
        }));
        assert_eq!(helper.snap_range(), 50.0);
    }

    #[test]
    fn test_align_respects_snapping_switch() {
        let mut helper = manual_helper();
        assert_eq!(helper.align(Vec2I::new(14, 6)), Vec2I::new(10, 10));

        let mut grid = GridDescriptor::uniform(10.0);
        grid.snapping_enabled = false;
        helper.set_manual_grid(grid);
        assert_eq!(helper.align(Vec2I::new(14, 6)), Vec2I::new(14, 6));
    }

    #[test]
    fn test_anchor_from_grid() {
        let mut helper = manual_helper();
        assert_eq!(helper.best_snap_anchor(Vec2I::new(14, 6)), Vec2I::new(10, 10));
        let item = helper.snap_item().unwrap();
        assert_eq!(item.position, Vec2I::new(10, 10));
        assert_eq!(item.sources, SnapSource::GRID);
    }

    #[test]
    fn test_anchor_from_aux_axis() {
        let mut helper = manual_helper();
        helper.set_aux_axis(Some(Vec2I::new(3, 3)));
        assert_eq!(helper.best_snap_anchor(Vec2I::new(4, 4)), Vec2I::new(3, 3));
        let item = helper.snap_item().unwrap();
        assert_eq!(item.sources, SnapSource::AUX_AXIS);
    }

    #[test]
    fn test_anchor_prefers_construction_line() {
        let mut helper = manual_helper();
        helper.snap_lines_mut().set_origin(Vec2I::ZERO);
        helper
            .snap_lines_mut()
            .set_directions(vec![Vec2I::new(1, 0)]);

        assert_eq!(helper.best_snap_anchor(Vec2I::new(22, 12)), Vec2I::new(20, 0));
        let item = helper.snap_item().unwrap();
        assert_eq!(item.sources, SnapSource::CONSTRUCTION_LINE);
        assert_eq!(helper.snap_lines().end_point(), Some(Vec2I::new(20, 0)));
    }

    #[test]
    fn test_disabled_grid_passes_cursor_through() {
        let mut helper = manual_helper();
        let mut grid = GridDescriptor::uniform(10.0);
        grid.snapping_enabled = false;
        helper.set_manual_grid(grid);

        assert_eq!(helper.best_snap_anchor(Vec2I::new(14, 6)), Vec2I::new(14, 6));
        assert!(helper.snap_item().is_none());
    }

    #[test]
    fn test_preview_follows_geometry_not_snap_results() {
        let seen: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));
        let refreshes = Rc::new(RefCell::new(0));

        let mut helper = manual_helper();
        let seen_cb = Rc::clone(&seen);
        helper.on_preview_visibility(move |shown| seen_cb.borrow_mut().push(shown));
        let refresh_cb = Rc::clone(&refreshes);
        helper.on_refresh(move || *refresh_cb.borrow_mut() += 1);

        // An origin alone is not geometry; adding directions shows it
        helper.set_snap_origin(Vec2I::ZERO);
        assert!(!helper.preview_shown());
        helper.set_snap_directions(vec![Vec2I::new(1, 0)]);
        assert!(helper.preview_shown());

        // A hit then a miss: the lines are still set, so no transition
        helper.best_snap_anchor(Vec2I::new(22, 12));
        helper.best_snap_anchor(Vec2I::new(30, 400));
        assert!(helper.preview_shown());

        helper.reset_lines();
        assert!(!helper.preview_shown());
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert_eq!(*refreshes.borrow(), 2);
    }

    #[test]
    fn test_reset_lines_hides_preview() {
        let seen: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));

        let mut helper = manual_helper();
        let seen_cb = Rc::clone(&seen);
        helper.on_preview_visibility(move |shown| seen_cb.borrow_mut().push(shown));

        helper.set_snap_origin(Vec2I::ZERO);
        helper.set_snap_directions(vec![Vec2I::new(1, 0)]);
        assert!(helper.preview_shown());

        helper.reset_lines();
        assert!(!helper.preview_shown());
        assert!(!helper.snap_lines().has_geometry());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_view_gates_preview_on_origin_visibility() {
        let seen: Rc<RefCell<Vec<bool>>> = Rc::new(RefCell::new(Vec::new()));

        let mut helper = manual_helper();
        helper.attach_view(Box::new(TestView {
            grid: 10.0,
            scale: 1.0,
            snapping: true,
        }));
        let seen_cb = Rc::clone(&seen);
        helper.on_preview_visibility(move |shown| seen_cb.borrow_mut().push(shown));

        // Geometry exists but the origin sits outside the viewport
        helper.set_snap_origin(Vec2I::new(500, 0));
        helper.set_snap_directions(vec![Vec2I::new(1, 0)]);
        assert!(!helper.preview_shown());

        // Moving the origin on screen shows it, moving it off hides it
        helper.set_snap_origin(Vec2I::new(5, 5));
        assert!(helper.preview_shown());
        helper.set_snap_origin(Vec2I::new(500, 0));
        assert!(!helper.preview_shown());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_origin_visibility_needs_view_and_origin() {
        let mut helper = manual_helper();
        assert!(!helper.origin_visible());

        helper.snap_lines_mut().set_origin(Vec2I::new(5, 5));
        assert!(!helper.origin_visible());

        helper.attach_view(Box::new(TestView {
            grid: 10.0,
            scale: 1.0,
            snapping: true,
        }));
        assert!(helper.origin_visible());

        helper.snap_lines_mut().set_origin(Vec2I::new(500, 0));
        assert!(!helper.origin_visible());
    }

    #[test]
    fn test_class_grids_and_selection_grid() {
        let mut helper = manual_helper();
        helper.set_grid_for_class(GridClass::Wires, Vec2D::new(25.0, 25.0));
        helper.set_grid_for_class(GridClass::Text, Vec2D::new(5.0, 5.0));

        assert_eq!(helper.grid_for_class(GridClass::Wires), Vec2D::new(25.0, 25.0));
        // Unset classes use the active grid
        assert_eq!(helper.grid_for_class(GridClass::Vias), Vec2D::new(10.0, 10.0));

        let grid = helper.selection_grid(&[GridClass::Text, GridClass::Wires]);
        assert_eq!(grid, Vec2D::new(25.0, 25.0));
        assert_eq!(helper.selection_grid(&[]), Vec2D::new(10.0, 10.0));
    }
}
