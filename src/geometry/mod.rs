//! 2D geometry kernel
//!
//! Integer-coordinate primitives and the polygon operations the snap and
//! DRC subsystems are built on:
//! - `vector`: `Vec2I` / `Vec2D` component math
//! - `bbox`: axis-aligned bounding boxes with an inverted-empty state
//! - `segment`: distances, crossings, closest-approach queries
//! - `outline`: closed rings with self-intersection validation
//! - `polygon`: polygon sets, clearance collision, stadium collision

pub mod bbox;
pub mod outline;
pub mod polygon;
pub mod segment;
pub mod vector;

pub use bbox::BBox;
pub use outline::{Outline, OutlineError};
pub use polygon::{Collision, PolygonSet};
pub use segment::Segment;
pub use vector::{Vec2D, Vec2I};

/// Internal units per millimeter (1 IU = 1 nm).
pub const IU_PER_MM: i64 = 1_000_000;

/// Convert internal units to millimeters (report/logging boundary only).
pub fn to_mm(iu: i64) -> f64 {
    iu as f64 / IU_PER_MM as f64
}

/// Convert millimeters to internal units (configuration boundary only).
pub fn from_mm(mm: f64) -> i64 {
    (mm * IU_PER_MM as f64).round() as i64
}
