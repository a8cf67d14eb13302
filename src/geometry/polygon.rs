//! Polygon sets and clearance collision
//!
//! A `PolygonSet` is zero or more well-formed outlines treated as a union
//! of positive areas. Collision queries return a signed "actual" distance:
//! the minimum boundary gap when the sets are disjoint, or the negated
//! penetration depth when they overlap. Penetration is measured by
//! sampling boundary features of each set inside the other (vertices and
//! clipped-edge midpoints) against the other set's boundary, which is
//! exact for the axis-aligned courtyard shapes this is used on and a
//! close lower bound for arbitrary ones.

use serde::Serialize;

use super::bbox::BBox;
use super::outline::Outline;
use super::segment::Segment;
use super::vector::{Vec2D, Vec2I};

/// Result of a collision query: signed actual distance (negative means
/// overlap) and a representative position for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub actual: i64,
    pub position: Vec2I,
}

/// Union of simple closed outlines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PolygonSet {
    outlines: Vec<Outline>,
}

impl PolygonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outlines(outlines: Vec<Outline>) -> Self {
        PolygonSet { outlines }
    }

    pub fn push(&mut self, outline: Outline) {
        self.outlines.push(outline);
    }

    pub fn clear(&mut self) {
        self.outlines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
    }

    pub fn outline_count(&self) -> usize {
        self.outlines.len()
    }

    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    pub fn bbox(&self) -> BBox {
        self.outlines
            .iter()
            .fold(BBox::EMPTY, |acc, o| acc.merge(o.bbox()))
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        self.outlines.iter().flat_map(|o| o.edges())
    }

    /// True if any outline contains `p` (even-odd per outline).
    pub fn contains(&self, p: Vec2I) -> bool {
        self.outlines.iter().any(|o| o.contains(p))
    }

    /// Minimum distance from `p` to any outline edge.
    pub fn boundary_distance(&self, p: Vec2D) -> f64 {
        let mut best = f64::INFINITY;
        for e in self.edges() {
            best = best.min(e.distance_to_point(p));
        }
        best
    }

    /// Exact clearance collision against another polygon set.
    ///
    /// Returns `Some` when the sets overlap or their gap is below
    /// `clearance`, with the signed actual distance and the location of
    /// the closest approach (disjoint) or deepest sample (overlap).
    pub fn collide(&self, other: &PolygonSet, clearance: i64) -> Option<Collision> {
        if self.is_empty() || other.is_empty() {
            return None;
        }

        // Box pre-filter: far-apart sets cannot violate
        if !self
            .bbox()
            .inflate(clearance.max(0))
            .intersects(&other.bbox())
        {
            return None;
        }

        if let Some(seed) = self.overlap_point(other) {
            let mut deepest = (0.0f64, seed);
            self.sample_penetration(other, &mut deepest);
            other.sample_penetration(self, &mut deepest);
            // Touching counts as zero distance, so at zero clearance the
            // strict comparison lets adjacent boundaries pass
            let actual = -deepest.0;
            if actual < clearance as f64 {
                return Some(Collision {
                    actual: actual.round() as i64,
                    position: deepest.1.round(),
                });
            }
            return None;
        }

        // Disjoint: minimum over all boundary edge pairs
        let mut best: Option<(f64, Vec2D)> = None;
        for ea in self.edges() {
            for eb in other.edges() {
                let (d, mid) = ea.approach(&eb);
                if best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, mid));
                }
            }
        }
        let (d, mid) = best?;
        if d < clearance as f64 {
            Some(Collision {
                actual: d.round() as i64,
                position: mid.round(),
            })
        } else {
            None
        }
    }

    /// Collision of a stadium (segment swept by `width / 2`) against this
    /// set, at the given clearance. Used for pad holes against courtyards.
    pub fn collide_stadium(&self, seg: &Segment, width: i64, clearance: i64) -> Option<Collision> {
        if self.is_empty() {
            return None;
        }
        let radius = width as f64 / 2.0;

        let mut best = (f64::INFINITY, Vec2D::ZERO);
        for e in self.edges() {
            let (d, mid) = e.approach(seg);
            if d < best.0 {
                best = (d, mid);
            }
        }

        // A stadium fully inside the set never gets near an edge, so the
        // center containment decides the sign there
        let inside = self.contains(seg.a);
        let actual = if inside {
            -(best.0 + radius)
        } else {
            best.0 - radius
        };

        if actual < clearance as f64 {
            Some(Collision {
                actual: actual.round() as i64,
                position: best.1.round(),
            })
        } else {
            None
        }
    }

    /// Any point witnessing an overlap with `other`: an edge crossing, or
    /// a vertex of one set inside the other (covers full containment).
    fn overlap_point(&self, other: &PolygonSet) -> Option<Vec2D> {
        for ea in self.edges() {
            for eb in other.edges() {
                if ea.intersects(&eb) {
                    return Some(ea.approach(&eb).1);
                }
            }
        }
        // No boundary crossings: containment is all-or-nothing per outline
        for outline in &other.outlines {
            if let Some(&v) = outline.points().first() {
                if self.contains(v) {
                    return Some(v.to_f64());
                }
            }
        }
        for outline in &self.outlines {
            if let Some(&v) = outline.points().first() {
                if other.contains(v) {
                    return Some(v.to_f64());
                }
            }
        }
        None
    }

    /// Deepen `deepest` with samples of `piercing`'s boundary inside
    /// `self`: contained vertices, plus midpoints of edge spans clipped by
    /// `self`'s boundary.
    fn sample_penetration(&self, piercing: &PolygonSet, deepest: &mut (f64, Vec2D)) {
        for outline in &piercing.outlines {
            for &v in outline.points() {
                if self.contains(v) {
                    let d = self.boundary_distance(v.to_f64());
                    if d > deepest.0 {
                        *deepest = (d, v.to_f64());
                    }
                }
            }
            for e in outline.edges() {
                let mut ts = vec![0.0, 1.0];
                for ce in self.edges() {
                    if let Some(t) = e.crossing_param(&ce) {
                        ts.push(t);
                    }
                }
                ts.sort_by(f64::total_cmp);
                for w in ts.windows(2) {
                    let m = e.point_at((w[0] + w[1]) * 0.5);
                    if self.contains(m.round()) {
                        let d = self.boundary_distance(m);
                        if d > deepest.0 {
                            *deepest = (d, m);
                        }
                    }
                }
            }
        }
    }
}
