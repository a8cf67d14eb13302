//! Pads and their drilled holes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Segment, Vec2I};

/// Electrical role of a pad. Decides whether the pad brings a hole of
/// its own into courtyard checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadAttribute {
    /// Surface-mount pad.
    Smd,
    /// Plated through hole.
    Pth,
    /// Unplated mechanical hole.
    Npth,
    /// Card-edge contact.
    EdgeConnector,
}

/// Special function markers that can exempt a pad from checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadProperty {
    Bga,
    Fiducial,
    Testpoint,
    Heatsink,
    Castellated,
}

/// A single pad, positioned in absolute board coordinates.
#[derive(Clone, Debug)]
pub struct Pad {
    pub uuid: Uuid,
    pub number: String,
    pub position: Vec2I,
    pub attribute: PadAttribute,
    pub property: Option<PadProperty>,
    /// Drill size per axis; `None` when the padstack has no hole. Oval
    /// drills have distinct x and y.
    pub drill: Option<Vec2I>,
}

impl Pad {
    pub fn new(number: &str, position: Vec2I, attribute: PadAttribute) -> Self {
        Pad {
            uuid: Uuid::new_v4(),
            number: number.to_string(),
            position,
            attribute,
            property: None,
            drill: None,
        }
    }

    pub fn with_drill(mut self, drill: Vec2I) -> Self {
        self.drill = Some(drill);
        self
    }

    pub fn with_property(mut self, property: PadProperty) -> Self {
        self.property = Some(property);
        self
    }

    pub fn has_hole(&self) -> bool {
        self.drill.map_or(false, |d| d.x > 0 && d.y > 0)
    }

    /// Drill outline as a stadium: centerline segment plus width. Round
    /// drills degenerate to a point; oval drills run along their larger
    /// axis.
    pub fn hole_shape(&self) -> Option<(Segment, i64)> {
        let drill = self.drill.filter(|d| d.x > 0 && d.y > 0)?;
        let (half_span, width) = if drill.x >= drill.y {
            (Vec2I::new((drill.x - drill.y) / 2, 0), drill.y)
        } else {
            (Vec2I::new(0, (drill.y - drill.x) / 2), drill.x)
        };
        let seg = Segment::new(self.position - half_span, self.position + half_span);
        Some((seg, width))
    }
}
