//! Core geometric engine for the board editor.
//!
//! Two loosely coupled subsystems over a shared 2D kernel:
//! - Interactive snapping: grid alignment, auxiliary axis, construction-line
//!   matching, and the grid helper facade the tool layer talks to
//! - Courtyard DRC: per-footprint courtyard validation and the pairwise
//!   clearance / hole-in-courtyard checker
//!
//! All coordinates are internal units (1 IU = 1 nm); nothing in here
//! converts units at runtime.
//!
//! Modules:
//! - [`geometry`]: vectors, bounding boxes, segments, outlines, polygon sets
//! - [`snap`]: grid alignment and construction-line snapping
//! - [`board`]: board / footprint / pad model with courtyard caches
//! - [`drc`]: design rules, violation reporting, the courtyard test provider

pub mod board;
pub mod drc;
pub mod geometry;
pub mod snap;
