//! Line segments and distance queries
//!
//! Exact integer orientation tests decide crossings; distances are
//! computed in f64. Degenerate (zero-length) segments behave as points.

use serde::Serialize;

use super::bbox::BBox;
use super::vector::{Vec2D, Vec2I};

/// Line segment with integer endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub a: Vec2I,
    pub b: Vec2I,
}

/// Sign of the cross product (b - a) x (c - a), exact in i128.
fn orientation(a: Vec2I, b: Vec2I, c: Vec2I) -> i32 {
    let v = (b.x - a.x) as i128 * (c.y - a.y) as i128
        - (b.y - a.y) as i128 * (c.x - a.x) as i128;
    if v > 0 {
        1
    } else if v < 0 {
        -1
    } else {
        0
    }
}

/// True if `p` (known collinear with `a`-`b`) lies within the segment box.
fn on_segment(a: Vec2I, b: Vec2I, p: Vec2I) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closest point on the segment `a`-`b` to `p`, all in f64.
fn closest_point_on(a: Vec2D, b: Vec2D, p: Vec2D) -> Vec2D {
    let d = b - a;
    let len_sq = d.dot(d);
    // Degenerate segment: treat as a point
    if len_sq < 1e-10 {
        return a;
    }
    let t = ((p - a).dot(d) / len_sq).clamp(0.0, 1.0);
    a + d * t
}

impl Segment {
    pub fn new(a: Vec2I, b: Vec2I) -> Self {
        Self { a, b }
    }

    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.a, self.b)
    }

    pub fn midpoint(&self) -> Vec2D {
        (self.a.to_f64() + self.b.to_f64()) * 0.5
    }

    /// Closest point on this segment to `p`.
    pub fn closest_point(&self, p: Vec2D) -> Vec2D {
        closest_point_on(self.a.to_f64(), self.b.to_f64(), p)
    }

    pub fn distance_to_point(&self, p: Vec2D) -> f64 {
        self.closest_point(p).distance(p)
    }

    /// Inclusive intersection test: touching endpoints and collinear
    /// overlap both count.
    pub fn intersects(&self, other: &Segment) -> bool {
        let d1 = orientation(other.a, other.b, self.a);
        let d2 = orientation(other.a, other.b, self.b);
        let d3 = orientation(self.a, self.b, other.a);
        let d4 = orientation(self.a, self.b, other.b);

        if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0))
            && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0))
        {
            return true;
        }

        (d1 == 0 && on_segment(other.a, other.b, self.a))
            || (d2 == 0 && on_segment(other.a, other.b, self.b))
            || (d3 == 0 && on_segment(self.a, self.b, other.a))
            || (d4 == 0 && on_segment(self.a, self.b, other.b))
    }

    /// Parameter t along `self` where the two segments properly cross, if
    /// they do. Collinear overlaps yield no single parameter and return
    /// None; the endpoints cover those when sampling.
    pub fn crossing_param(&self, other: &Segment) -> Option<f64> {
        let p = self.a.to_f64();
        let r = self.b.to_f64() - p;
        let q = other.a.to_f64();
        let s = other.b.to_f64() - q;

        let denom = r.cross(s);
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = (q - p).cross(s) / denom;
        let u = (q - p).cross(r) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(t)
        } else {
            None
        }
    }

    pub fn point_at(&self, t: f64) -> Vec2D {
        self.a.to_f64() + (self.b.to_f64() - self.a.to_f64()) * t
    }

    /// Minimum distance between two segments.
    pub fn distance_to(&self, other: &Segment) -> f64 {
        self.approach(other).0
    }

    /// Minimum distance between two segments, plus the midpoint of the
    /// closest-approach pair (the natural place to flag a clearance hit).
    pub fn approach(&self, other: &Segment) -> (f64, Vec2D) {
        if self.intersects(other) {
            if let Some(t) = self.crossing_param(other) {
                return (0.0, self.point_at(t));
            }
            // Collinear overlap: midpoint of the shared span
            let span = self.overlap_span(other);
            return (0.0, span);
        }

        // Disjoint segments realize their minimum at an endpoint
        let mut best = (f64::INFINITY, Vec2D::ZERO);
        for (seg, p) in [
            (other, self.a),
            (other, self.b),
            (self, other.a),
            (self, other.b),
        ] {
            let pf = p.to_f64();
            let c = seg.closest_point(pf);
            let d = c.distance(pf);
            if d < best.0 {
                best = (d, (c + pf) * 0.5);
            }
        }
        best
    }

    /// Midpoint of the overlapping parameter span of two collinear
    /// intersecting segments.
    fn overlap_span(&self, other: &Segment) -> Vec2D {
        let a = self.a.to_f64();
        let d = self.b.to_f64() - a;
        let len_sq = d.dot(d);
        if len_sq < 1e-10 {
            return a;
        }
        let t0 = ((other.a.to_f64() - a).dot(d) / len_sq).clamp(0.0, 1.0);
        let t1 = ((other.b.to_f64() - a).dot(d) / len_sq).clamp(0.0, 1.0);
        self.point_at((t0 + t1) * 0.5)
    }
}
