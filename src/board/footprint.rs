//! Footprints and their courtyard caches

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pad::Pad;
use super::Side;
use crate::geometry::{BBox, Outline, OutlineError, PolygonSet, Vec2I};

/// Raw courtyard geometry as authored: one point chain per shape. A
/// chain only counts as courtyard once it is explicitly closed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourtyardShape {
    pub side: Side,
    pub points: Vec<Vec2I>,
    pub closed: bool,
}

/// A placed footprint.
///
/// Courtyard polygons are cached per side and rebuilt on demand after
/// shape edits; the malformed flag sticks until the next rebuild.
#[derive(Clone, Debug)]
pub struct Footprint {
    pub uuid: Uuid,
    pub reference: String,
    pub position: Vec2I,
    /// Suppresses the missing-courtyard check for intentionally bare
    /// footprints such as logos and mounting holes.
    pub allow_missing_courtyard: bool,
    courtyard_shapes: Vec<CourtyardShape>,
    pads: Vec<Pad>,

    courtyard_front: PolygonSet,
    courtyard_back: PolygonSet,
    courtyard_bbox_front: BBox,
    courtyard_bbox_back: BBox,
    courtyards_dirty: bool,
    courtyards_malformed: bool,
}

impl Footprint {
    pub fn new(reference: &str, position: Vec2I) -> Self {
        Footprint {
            uuid: Uuid::new_v4(),
            reference: reference.to_string(),
            position,
            allow_missing_courtyard: false,
            courtyard_shapes: Vec::new(),
            pads: Vec::new(),
            courtyard_front: PolygonSet::new(),
            courtyard_back: PolygonSet::new(),
            courtyard_bbox_front: BBox::EMPTY,
            courtyard_bbox_back: BBox::EMPTY,
            courtyards_dirty: true,
            courtyards_malformed: false,
        }
    }

    pub fn add_pad(&mut self, pad: Pad) {
        self.pads.push(pad);
    }

    pub fn pads(&self) -> &[Pad] {
        &self.pads
    }

    pub fn add_courtyard_shape(&mut self, shape: CourtyardShape) {
        self.courtyard_shapes.push(shape);
        self.courtyards_dirty = true;
    }

    /// Convenience for the common rectangular courtyard.
    pub fn add_courtyard_rect(&mut self, side: Side, min: Vec2I, max: Vec2I) {
        self.add_courtyard_shape(CourtyardShape {
            side,
            points: vec![
                min,
                Vec2I::new(max.x, min.y),
                max,
                Vec2I::new(min.x, max.y),
            ],
            closed: true,
        });
    }

    pub fn courtyard_shapes(&self) -> &[CourtyardShape] {
        &self.courtyard_shapes
    }

    /// Rebuild the per-side polygon caches from the raw shapes, feeding
    /// every bad shape to `on_error`. Bad shapes are skipped, so a
    /// footprint with one good and one bad shape still gets a usable
    /// courtyard from the good one.
    pub fn build_courtyard_caches(&mut self, on_error: &mut dyn FnMut(&OutlineError)) {
        self.courtyard_front.clear();
        self.courtyard_back.clear();
        self.courtyards_malformed = false;

        for shape in &self.courtyard_shapes {
            if !shape.closed {
                let position = shape.points.first().copied().unwrap_or(self.position);
                self.courtyards_malformed = true;
                on_error(&OutlineError::Unclosed { position });
                continue;
            }
            match Outline::new(shape.points.clone()) {
                Ok(outline) => match shape.side {
                    Side::Front => self.courtyard_front.push(outline),
                    Side::Back => self.courtyard_back.push(outline),
                },
                Err(err) => {
                    self.courtyards_malformed = true;
                    on_error(&err);
                }
            }
        }

        self.courtyard_bbox_front = self.courtyard_front.bbox();
        self.courtyard_bbox_back = self.courtyard_back.bbox();
        self.courtyards_dirty = false;
    }

    /// Make sure the caches exist, ignoring shape errors.
    pub fn ensure_courtyard_caches(&mut self) {
        if self.courtyards_dirty {
            self.build_courtyard_caches(&mut |_| {});
        }
    }

    pub fn courtyards_dirty(&self) -> bool {
        self.courtyards_dirty
    }

    pub fn courtyards_malformed(&self) -> bool {
        self.courtyards_malformed
    }

    pub fn courtyard(&self, side: Side) -> &PolygonSet {
        match side {
            Side::Front => &self.courtyard_front,
            Side::Back => &self.courtyard_back,
        }
    }

    pub fn courtyard_bbox(&self, side: Side) -> BBox {
        match side {
            Side::Front => self.courtyard_bbox_front,
            Side::Back => self.courtyard_bbox_back,
        }
    }

    /// Extent of the whole footprint: anchor, pads with their drills,
    /// and the raw courtyard points.
    pub fn bounding_box(&self) -> BBox {
        let mut bbox = BBox::EMPTY.include(self.position);
        for pad in &self.pads {
            bbox = bbox.include(pad.position);
            if let Some(drill) = pad.drill {
                let half = Vec2I::new(drill.x / 2, drill.y / 2);
                bbox = bbox
                    .include(pad.position - half)
                    .include(pad.position + half);
            }
        }
        for shape in &self.courtyard_shapes {
            for &p in &shape.points {
                bbox = bbox.include(p);
            }
        }
        bbox
    }
}
