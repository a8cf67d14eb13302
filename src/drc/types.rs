//! Violation data types and severities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Side;
use crate::geometry::Vec2I;

/// How seriously a reported violation is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Suppressed entirely; never reaches the report.
    Ignore,
    Warning,
    Error,
}

/// Everything the courtyard checks can flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    OverlappingFootprints,
    MissingCourtyard,
    MalformedCourtyard,
    PthInCourtyard,
    NpthInCourtyard,
}

impl ViolationKind {
    /// Headline shown for a violation of this kind.
    pub fn description(self) -> &'static str {
        match self {
            ViolationKind::OverlappingFootprints => "Courtyards overlap",
            ViolationKind::MissingCourtyard => "Footprint has no courtyard defined",
            ViolationKind::MalformedCourtyard => "Footprint has malformed courtyard",
            ViolationKind::PthInCourtyard => "PTH inside courtyard",
            ViolationKind::NpthInCourtyard => "NPTH inside courtyard",
        }
    }
}

/// A reported problem. Violations are the checker's product, not
/// errors; they carry everything a report frontend needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    /// Extra context below the headline, e.g. measured clearance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Name of the rule that set the constraint, when one did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Items involved, in report order.
    pub items: Vec<Uuid>,
    pub position: Vec2I,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<Side>,
}

impl Violation {
    pub fn new(kind: ViolationKind, severity: Severity) -> Self {
        Violation {
            kind,
            severity,
            detail: None,
            rule: None,
            items: Vec::new(),
            position: Vec2I::ZERO,
            layer: None,
        }
    }

    pub fn with_items(mut self, items: Vec<Uuid>) -> Self {
        self.items = items;
        self
    }

    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }
}

/// Constraint kinds the rule table can resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstraintKind {
    CourtyardClearance,
}

/// A resolved constraint for one check on one item pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub severity: Severity,
    /// Required clearance in internal units. Negative disables the check.
    pub clearance: i64,
    /// Rule that supplied the value, `None` for the base default.
    pub rule: Option<String>,
}
