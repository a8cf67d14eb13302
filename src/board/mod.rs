//! Board model
//!
//! - `footprint`: placed footprints with cached courtyard polygons
//! - `pad`: pads, their attributes and drilled holes

pub mod footprint;
pub mod pad;

pub use footprint::{CourtyardShape, Footprint};
pub use pad::{Pad, PadAttribute, PadProperty};

use serde::{Deserialize, Serialize};

/// Board side an item lives on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Front,
    Back,
}

/// The design under check: a flat list of footprints.
#[derive(Clone, Debug, Default)]
pub struct Board {
    footprints: Vec<Footprint>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_footprint(&mut self, footprint: Footprint) {
        self.footprints.push(footprint);
    }

    pub fn footprints(&self) -> &[Footprint] {
        &self.footprints
    }

    pub fn footprints_mut(&mut self) -> &mut [Footprint] {
        &mut self.footprints
    }
}
