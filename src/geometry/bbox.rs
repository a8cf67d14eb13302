//! Axis-aligned bounding boxes
//!
//! Integer boxes used for broad-phase culling. The empty box is encoded
//! with inverted extremes so it merges as a neutral element and never
//! intersects anything.

use serde::Serialize;

use super::vector::Vec2I;

/// Axis-aligned box with integer corners. `min > max` means empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BBox {
    pub min: Vec2I,
    pub max: Vec2I,
}

impl BBox {
    pub const EMPTY: BBox = BBox {
        min: Vec2I {
            x: i64::MAX,
            y: i64::MAX,
        },
        max: Vec2I {
            x: i64::MIN,
            y: i64::MIN,
        },
    };

    /// Box spanning two corners, given in any order.
    pub fn new(a: Vec2I, b: Vec2I) -> Self {
        BBox {
            min: Vec2I::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2I::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec2I>,
    {
        let mut result = BBox::EMPTY;
        for p in points {
            result = result.include(p);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow (or shrink, for negative amounts) by `amount` on every side.
    /// The empty box stays empty.
    pub fn inflate(self, amount: i64) -> Self {
        if self.is_empty() {
            return self;
        }
        BBox {
            min: Vec2I::new(self.min.x - amount, self.min.y - amount),
            max: Vec2I::new(self.max.x + amount, self.max.y + amount),
        }
    }

    pub fn include(self, p: Vec2I) -> Self {
        BBox {
            min: Vec2I::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Vec2I::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    pub fn merge(self, other: BBox) -> Self {
        BBox {
            min: Vec2I::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2I::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains(&self, p: Vec2I) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Center point; the empty box has no meaningful center and returns zero.
    pub fn center(&self) -> Vec2I {
        if self.is_empty() {
            return Vec2I::ZERO;
        }
        Vec2I::new(
            self.min.x + (self.max.x - self.min.x) / 2,
            self.min.y + (self.max.y - self.min.y) / 2,
        )
    }
}

impl Default for BBox {
    fn default() -> Self {
        BBox::EMPTY
    }
}
