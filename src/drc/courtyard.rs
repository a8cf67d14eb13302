//! Courtyard definition and clearance checks
//!
//! Runs in two phases. The definitions phase validates every
//! footprint's courtyard geometry, rebuilds stale polygon caches and
//! flags malformed or missing courtyards. The clearance phase walks
//! footprint pairs through an R-tree of cached envelopes, runs exact
//! polygon collision per board side at the resolved clearance and then
//! tests each footprint's drilled holes against the other's courtyards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rstar::{RTree, RTreeObject, AABB};

use super::engine::{DrcContext, TestProvider, ViolationStore};
use super::rules::DesignRules;
use super::types::{ConstraintKind, Severity, Violation, ViolationKind};
use crate::board::{Board, Footprint, PadAttribute, PadProperty, Side};
use crate::geometry::{to_mm, BBox};

/// Footprint envelope in the pair-search tree. `order_pos` indexes the
/// uuid-sorted footprint order, which keeps pair visits and therefore
/// report order deterministic.
struct CourtyardEnvelope {
    order_pos: usize,
    env: AABB<[i64; 2]>,
}

impl RTreeObject for CourtyardEnvelope {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.env
    }
}

// Callers guarantee a non-empty box; an inverted empty would flip into
// a universe-sized envelope here
fn to_aabb(bbox: BBox) -> AABB<[i64; 2]> {
    AABB::from_corners([bbox.min.x, bbox.min.y], [bbox.max.x, bbox.max.y])
}

/// Detects overlapping footprint courtyards and holes breaching them.
pub struct CourtyardClearanceProvider {
    largest_clearance: i64,
}

impl CourtyardClearanceProvider {
    pub fn new() -> Self {
        CourtyardClearanceProvider {
            largest_clearance: 0,
        }
    }

    /// Pairwise clearance and hole checks over the R-tree.
    fn test_courtyard_clearances(
        &self,
        board: &mut Board,
        rules: &DesignRules,
        store: &mut ViolationStore,
        cancel: &AtomicBool,
    ) -> bool {
        let start = Instant::now();

        let test_courtyards = !store.is_limit_exceeded(ViolationKind::OverlappingFootprints);
        let test_holes = !store.is_limit_exceeded(ViolationKind::PthInCourtyard)
            || !store.is_limit_exceeded(ViolationKind::NpthInCourtyard);
        if !test_courtyards && !test_holes {
            return true;
        }

        // Caches can be stale when the definitions phase was skipped
        for fp in board.footprints_mut() {
            fp.ensure_courtyard_caches();
        }
        let footprints = board.footprints();

        // Stable order: reports must not depend on insertion order
        let mut order: Vec<usize> = (0..footprints.len()).collect();
        order.sort_by_key(|&i| footprints[i].uuid);

        let body_bboxes: Vec<BBox> = footprints.iter().map(|fp| fp.bounding_box()).collect();

        let mut envelopes = Vec::with_capacity(order.len());
        for (pos, &idx) in order.iter().enumerate() {
            let fp = &footprints[idx];
            let total = fp
                .courtyard_bbox(Side::Front)
                .merge(fp.courtyard_bbox(Side::Back))
                .merge(body_bboxes[idx]);
            envelopes.push(CourtyardEnvelope {
                order_pos: pos,
                env: to_aabb(total),
            });
        }
        let tree = RTree::bulk_load(envelopes);

        let inflate_by = self.largest_clearance;
        let mut pairs = 0usize;

        for (pos_a, &idx_a) in order.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                return false;
            }
            let a = &footprints[idx_a];

            let search = to_aabb(
                a.courtyard_bbox(Side::Front)
                    .merge(a.courtyard_bbox(Side::Back))
                    .merge(body_bboxes[idx_a])
                    .inflate(inflate_by),
            );

            // Visit each unordered pair once, from its earlier member
            let mut neighbors: Vec<usize> = tree
                .locate_in_envelope_intersecting(&search)
                .filter(|n| n.order_pos > pos_a)
                .map(|n| n.order_pos)
                .collect();
            neighbors.sort_unstable();

            for pos_b in neighbors {
                if cancel.load(Ordering::SeqCst) {
                    return false;
                }
                let b = &footprints[order[pos_b]];
                pairs += 1;

                let fronts_touch = courtyard_boxes_touch(a, b, Side::Front, inflate_by);
                let backs_touch = courtyard_boxes_touch(a, b, Side::Back, inflate_by);
                if !fronts_touch && !backs_touch && !test_holes {
                    continue;
                }

                if test_courtyards && fronts_touch {
                    check_courtyard_pair(a, b, Side::Front, rules, store);
                }
                if test_courtyards && backs_touch {
                    check_courtyard_pair(a, b, Side::Back, rules, store);
                }
                if test_holes {
                    check_hole_intrusions(a, b, rules, store);
                    check_hole_intrusions(b, a, rules, store);
                }
            }
        }

        log::info!(
            "courtyard clearances: {} footprints, {} pairs in {:?}",
            footprints.len(),
            pairs,
            start.elapsed()
        );
        true
    }
}

impl Default for CourtyardClearanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProvider for CourtyardClearanceProvider {
    fn name(&self) -> &'static str {
        "courtyard_clearance"
    }

    fn description(&self) -> &'static str {
        "Checks footprints' courtyard clearance"
    }

    fn run(&mut self, ctx: DrcContext<'_>) -> bool {
        let DrcContext {
            board,
            rules,
            store,
            cancel,
        } = ctx;

        if !test_courtyard_definitions(board, rules, store, cancel) {
            return false;
        }

        self.largest_clearance = rules
            .worst_constraint(ConstraintKind::CourtyardClearance)
            .clearance
            .max(0);

        self.test_courtyard_clearances(board, rules, store, cancel)
    }
}

/// Validate courtyard geometry, rebuild polygon caches and flag
/// malformed or missing courtyards.
fn test_courtyard_definitions(
    board: &mut Board,
    rules: &DesignRules,
    store: &mut ViolationStore,
    cancel: &AtomicBool,
) -> bool {
    let start = Instant::now();

    if store.is_limit_exceeded(ViolationKind::MalformedCourtyard)
        && store.is_limit_exceeded(ViolationKind::MissingCourtyard)
    {
        return true;
    }

    let malformed_severity = rules.severity_for(ViolationKind::MalformedCourtyard);
    let missing_severity = rules.severity_for(ViolationKind::MissingCourtyard);

    for fp in board.footprints_mut() {
        if cancel.load(Ordering::SeqCst) {
            return false;
        }

        fp.ensure_courtyard_caches();

        if fp.courtyards_malformed() {
            // Rebuild with a collecting callback, one violation per bad shape
            let uuid = fp.uuid;
            fp.build_courtyard_caches(&mut |err| {
                if store.is_limit_exceeded(ViolationKind::MalformedCourtyard) {
                    return;
                }
                store.report(
                    Violation::new(ViolationKind::MalformedCourtyard, malformed_severity)
                        .with_items(vec![uuid])
                        .with_detail(err.to_string()),
                    err.position(),
                    None,
                );
            });
        } else if fp.courtyard(Side::Front).is_empty() && fp.courtyard(Side::Back).is_empty() {
            if fp.allow_missing_courtyard || store.is_limit_exceeded(ViolationKind::MissingCourtyard)
            {
                continue;
            }
            store.report(
                Violation::new(ViolationKind::MissingCourtyard, missing_severity)
                    .with_items(vec![fp.uuid]),
                fp.position,
                None,
            );
        }
    }

    log::info!(
        "courtyard definitions: {} footprints in {:?}",
        board.footprints().len(),
        start.elapsed()
    );
    true
}

fn courtyard_boxes_touch(a: &Footprint, b: &Footprint, side: Side, inflate_by: i64) -> bool {
    a.courtyard_bbox(side)
        .inflate(inflate_by)
        .intersects(&b.courtyard_bbox(side))
}

/// Exact courtyard clearance for one pair on one side.
fn check_courtyard_pair(
    a: &Footprint,
    b: &Footprint,
    side: Side,
    rules: &DesignRules,
    store: &mut ViolationStore,
) {
    if store.is_limit_exceeded(ViolationKind::OverlappingFootprints) {
        return;
    }
    if a.courtyard(side).is_empty() || b.courtyard(side).is_empty() {
        return;
    }

    let constraint = rules.eval(ConstraintKind::CourtyardClearance, a, Some(b), Some(side));
    if constraint.severity == Severity::Ignore || constraint.clearance < 0 {
        return;
    }

    let collision = match a.courtyard(side).collide(b.courtyard(side), constraint.clearance) {
        Some(c) => c,
        None => return,
    };

    let severity = rules.constraint_severity(ViolationKind::OverlappingFootprints, &constraint);
    let mut violation = Violation::new(ViolationKind::OverlappingFootprints, severity)
        .with_items(vec![a.uuid, b.uuid]);
    if constraint.clearance > 0 {
        violation = violation.with_detail(format!(
            "clearance {:.4} mm; actual {:.4} mm",
            to_mm(constraint.clearance),
            to_mm(collision.actual),
        ));
    }
    if let Some(rule) = &constraint.rule {
        violation = violation.with_rule(rule);
    }

    store.report(violation, collision.position, Some(side));
}

/// Holes of `fp` against the other footprint's courtyards.
fn check_hole_intrusions(
    fp: &Footprint,
    other: &Footprint,
    rules: &DesignRules,
    store: &mut ViolationStore,
) {
    // The pair constraint gates the check; the holes themselves collide
    // at zero clearance
    let constraint = rules.eval(ConstraintKind::CourtyardClearance, fp, Some(other), None);
    if constraint.severity == Severity::Ignore || constraint.clearance < 0 {
        return;
    }

    for pad in fp.pads() {
        // Surface and card-edge pads bring no hole of their own, and
        // heatsink pads are exempt
        if matches!(
            pad.attribute,
            PadAttribute::Smd | PadAttribute::EdgeConnector
        ) {
            continue;
        }
        if pad.property == Some(PadProperty::Heatsink) {
            continue;
        }
        let (hole, width) = match pad.hole_shape() {
            Some(shape) => shape,
            None => continue,
        };

        let kind = match pad.attribute {
            PadAttribute::Npth => ViolationKind::NpthInCourtyard,
            _ => ViolationKind::PthInCourtyard,
        };
        if store.is_limit_exceeded(kind) {
            continue;
        }

        // Front takes priority when both sides collide
        for side in [Side::Front, Side::Back] {
            if other.courtyard(side).collide_stadium(&hole, width, 0).is_some() {
                let severity = rules.constraint_severity(kind, &constraint);
                let mut violation =
                    Violation::new(kind, severity).with_items(vec![pad.uuid, other.uuid]);
                if let Some(rule) = &constraint.rule {
                    violation = violation.with_rule(rule);
                }
                store.report(violation, pad.position, Some(side));
                break;
            }
        }
    }
}
