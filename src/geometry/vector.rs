//! 2D vector types
//!
//! `Vec2I` carries board coordinates in internal units; `Vec2D` is the f64
//! counterpart used for intermediate math (projections, normalization).
//! Conversion back to integers rounds half away from zero, which is the
//! rounding every snap computation in the editor relies on.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Integer 2D vector / point in internal units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2I {
    pub x: i64,
    pub y: i64,
}

impl Vec2I {
    pub const ZERO: Vec2I = Vec2I { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub fn to_f64(self) -> Vec2D {
        Vec2D {
            x: self.x as f64,
            y: self.y as f64,
        }
    }

    /// Euclidean length, computed in f64.
    pub fn length(self) -> f64 {
        self.to_f64().length()
    }

    pub fn distance(self, other: Vec2I) -> f64 {
        self.to_f64().distance(other.to_f64())
    }
}

impl Add for Vec2I {
    type Output = Vec2I;

    fn add(self, rhs: Vec2I) -> Vec2I {
        Vec2I::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2I {
    fn add_assign(&mut self, rhs: Vec2I) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2I {
    type Output = Vec2I;

    fn sub(self, rhs: Vec2I) -> Vec2I {
        Vec2I::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2I {
    type Output = Vec2I;

    fn neg(self) -> Vec2I {
        Vec2I::new(-self.x, -self.y)
    }
}

/// Double-precision 2D vector for intermediate geometry math.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2D {
    pub x: f64,
    pub y: f64,
}

impl Vec2D {
    pub const ZERO: Vec2D = Vec2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross).
    pub fn cross(self, other: Vec2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2D) -> f64 {
        (other - self).length()
    }

    /// Unit-length copy; returns zero for a (near-)zero input instead of
    /// dividing by zero.
    pub fn normalized(self) -> Vec2D {
        let len = self.length();
        if len < 1e-12 {
            return Vec2D::ZERO;
        }
        Vec2D::new(self.x / len, self.y / len)
    }

    /// Counter-clockwise perpendicular.
    pub fn perpendicular(self) -> Vec2D {
        Vec2D::new(-self.y, self.x)
    }

    /// Round to integer coordinates, half away from zero.
    pub fn round(self) -> Vec2I {
        Vec2I::new(self.x.round() as i64, self.y.round() as i64)
    }
}

impl Add for Vec2D {
    type Output = Vec2D;

    fn add(self, rhs: Vec2D) -> Vec2D {
        Vec2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2D {
    type Output = Vec2D;

    fn sub(self, rhs: Vec2D) -> Vec2D {
        Vec2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2D {
    type Output = Vec2D;

    fn mul(self, rhs: f64) -> Vec2D {
        Vec2D::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2D {
    type Output = Vec2D;

    fn neg(self) -> Vec2D {
        Vec2D::new(-self.x, -self.y)
    }
}
