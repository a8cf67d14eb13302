//! Closed polygon rings
//!
//! `Outline` validates on construction: consecutive duplicate points are
//! dropped, the closing point may be repeated or omitted, and any
//! self-intersection rejects the ring. A well-formed outline is the only
//! thing a `PolygonSet` will accept, so everything downstream can assume
//! simple polygons.

use thiserror::Error;

use super::bbox::BBox;
use super::segment::Segment;
use super::vector::Vec2I;

/// Why an outline could not be built into a courtyard polygon. Each
/// variant carries a position usable for violation placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum OutlineError {
    #[error("outline is not closed")]
    Unclosed { position: Vec2I },
    #[error("outline has fewer than 3 distinct points")]
    TooFewPoints { position: Vec2I },
    #[error("outline is self-intersecting")]
    SelfIntersecting { position: Vec2I },
}

impl OutlineError {
    pub fn position(&self) -> Vec2I {
        match *self {
            OutlineError::Unclosed { position }
            | OutlineError::TooFewPoints { position }
            | OutlineError::SelfIntersecting { position } => position,
        }
    }
}

/// A simple (non-self-intersecting) closed ring of integer points. The
/// closing edge from the last point back to the first is implicit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outline {
    points: Vec<Vec2I>,
}

impl Outline {
    /// Validate and build a ring. The input may or may not repeat the
    /// first point at the end.
    pub fn new(points: Vec<Vec2I>) -> Result<Outline, OutlineError> {
        let anchor = points.first().copied().unwrap_or(Vec2I::ZERO);

        let mut ring: Vec<Vec2I> = Vec::with_capacity(points.len());
        for p in points {
            if ring.last() != Some(&p) {
                ring.push(p);
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }

        if ring.len() < 3 {
            return Err(OutlineError::TooFewPoints { position: anchor });
        }

        if let Some(position) = self_intersection(&ring) {
            return Err(OutlineError::SelfIntersecting { position });
        }

        Ok(Outline { points: ring })
    }

    pub fn points(&self) -> &[Vec2I] {
        &self.points
    }

    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Segment::new(self.points[i], self.points[(i + 1) % n]))
    }

    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.points.iter().copied())
    }

    /// Even-odd point containment via a horizontal ray cast.
    pub fn contains(&self, p: Vec2I) -> bool {
        let mut inside = false;
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let t = (p.y - a.y) as f64 / (b.y - a.y) as f64;
                let x = a.x as f64 + t * (b.x - a.x) as f64;
                if (p.x as f64) < x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// First crossing of two non-adjacent ring edges, if any.
fn self_intersection(ring: &[Vec2I]) -> Option<Vec2I> {
    let n = ring.len();
    for i in 0..n {
        let ei = Segment::new(ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // Adjacent edges share a vertex by construction
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let ej = Segment::new(ring[j], ring[(j + 1) % n]);
            if ei.intersects(&ej) {
                let position = match ei.crossing_param(&ej) {
                    Some(t) => ei.point_at(t).round(),
                    None => ei.a,
                };
                return Some(position);
            }
        }
    }
    None
}
