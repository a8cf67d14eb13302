//! Design rules and constraint resolution
//!
//! The base courtyard clearance applies everywhere; named rules layer
//! scoped overrides on top. `eval` resolves the constraint for one pair
//! and `worst_constraint` gives the global maximum used to inflate
//! broad-phase search boxes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{Constraint, ConstraintKind, Severity, ViolationKind};
use crate::board::{Footprint, Side};
use crate::geometry::from_mm;

/// A named courtyard-clearance override, optionally scoped to one board
/// side or to footprint references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClearanceRule {
    pub name: String,
    /// Required clearance in internal units. Negative disables the
    /// check for matching pairs.
    pub clearance: i64,
    #[serde(default)]
    pub severity: Option<Severity>,
    /// Only applies on this side when set. Side-scoped rules never
    /// match the hole checks, which span both sides.
    #[serde(default)]
    pub layer: Option<Side>,
    /// Footprint references the rule binds to, in either pair order.
    #[serde(default)]
    pub footprint_a: Option<String>,
    #[serde(default)]
    pub footprint_b: Option<String>,
}

impl ClearanceRule {
    fn binds(pattern: &Option<String>, fp: Option<&Footprint>) -> bool {
        match pattern {
            None => true,
            Some(reference) => fp.map_or(false, |f| f.reference == *reference),
        }
    }

    fn matches(&self, a: &Footprint, b: Option<&Footprint>, layer: Option<Side>) -> bool {
        if let Some(side) = self.layer {
            if layer != Some(side) {
                return false;
            }
        }
        let forward = Self::binds(&self.footprint_a, Some(a)) && Self::binds(&self.footprint_b, b);
        let reverse = Self::binds(&self.footprint_a, b) && Self::binds(&self.footprint_b, Some(a));
        forward || reverse
    }
}

/// Rule table driving the courtyard checks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignRules {
    /// Base courtyard clearance in internal units. Zero means
    /// courtyards may touch but not overlap.
    pub courtyard_clearance: i64,
    /// Severity for violations without an override.
    pub severity: Severity,
    /// Named overrides, evaluated in order; the last match wins.
    pub rules: Vec<ClearanceRule>,
    /// Per-kind severity overrides.
    pub severity_overrides: IndexMap<ViolationKind, Severity>,
    /// Cap on reported violations per kind. Zero lifts the cap.
    pub max_error_count: usize,
}

impl Default for DesignRules {
    fn default() -> Self {
        DesignRules {
            courtyard_clearance: 0,
            severity: Severity::Error,
            rules: Vec::new(),
            severity_overrides: IndexMap::new(),
            max_error_count: 500,
        }
    }
}

impl DesignRules {
    /// Base clearance given in millimetres.
    pub fn with_clearance_mm(mm: f64) -> Self {
        DesignRules {
            courtyard_clearance: from_mm(mm),
            ..Default::default()
        }
    }

    /// Resolve the constraint for a footprint pair. `layer: None`
    /// queries the hole checks, which span both sides.
    pub fn eval(
        &self,
        kind: ConstraintKind,
        a: &Footprint,
        b: Option<&Footprint>,
        layer: Option<Side>,
    ) -> Constraint {
        let mut constraint = Constraint {
            kind,
            severity: self.severity,
            clearance: self.courtyard_clearance,
            rule: None,
        };

        for rule in &self.rules {
            if !rule.matches(a, b, layer) {
                continue;
            }
            constraint.clearance = rule.clearance;
            constraint.rule = Some(rule.name.clone());
            if let Some(severity) = rule.severity {
                constraint.severity = severity;
            }
        }
        constraint
    }

    /// The largest clearance any rule can demand, for broad-phase
    /// search inflation.
    pub fn worst_constraint(&self, kind: ConstraintKind) -> Constraint {
        let mut worst = Constraint {
            kind,
            severity: self.severity,
            clearance: self.courtyard_clearance,
            rule: None,
        };
        for rule in &self.rules {
            if rule.clearance > worst.clearance {
                worst.clearance = rule.clearance;
                worst.rule = Some(rule.name.clone());
            }
        }
        worst
    }

    /// Severity for a violation kind, with overrides applied.
    pub fn severity_for(&self, kind: ViolationKind) -> Severity {
        self.severity_overrides
            .get(&kind)
            .copied()
            .unwrap_or(self.severity)
    }

    /// Severity for a violation produced under a resolved constraint:
    /// the per-kind override wins, else the constraint's own severity.
    pub fn constraint_severity(&self, kind: ViolationKind, constraint: &Constraint) -> Severity {
        self.severity_overrides
            .get(&kind)
            .copied()
            .unwrap_or(constraint.severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2I;

    fn footprint(reference: &str) -> Footprint {
        Footprint::new(reference, Vec2I::ZERO)
    }

    fn rule(name: &str, clearance: i64) -> ClearanceRule {
        ClearanceRule {
            name: name.to_string(),
            clearance,
            severity: None,
            layer: None,
            footprint_a: None,
            footprint_b: None,
        }
    }

    #[test]
    fn test_base_clearance_without_rules() {
        let rules = DesignRules::with_clearance_mm(0.2);
        let (a, b) = (footprint("U1"), footprint("U2"));
        let constraint = rules.eval(
            ConstraintKind::CourtyardClearance,
            &a,
            Some(&b),
            Some(Side::Front),
        );
        assert_eq!(constraint.clearance, 200_000);
        assert_eq!(constraint.severity, Severity::Error);
        assert_eq!(constraint.rule, None);
    }

    #[test]
    fn test_reference_scoped_rule_matches_both_orders() {
        let mut rules = DesignRules::default();
        rules.rules.push(ClearanceRule {
            footprint_a: Some("U1".to_string()),
            footprint_b: Some("J1".to_string()),
            ..rule("connector_gap", 500_000)
        });

        let (u1, j1, u2) = (footprint("U1"), footprint("J1"), footprint("U2"));

        let c = rules.eval(ConstraintKind::CourtyardClearance, &u1, Some(&j1), None);
        assert_eq!(c.clearance, 500_000);
        assert_eq!(c.rule.as_deref(), Some("connector_gap"));

        let c = rules.eval(ConstraintKind::CourtyardClearance, &j1, Some(&u1), None);
        assert_eq!(c.clearance, 500_000);

        let c = rules.eval(ConstraintKind::CourtyardClearance, &u1, Some(&u2), None);
        assert_eq!(c.clearance, 0);
        assert_eq!(c.rule, None);
    }

    #[test]
    fn test_side_scoped_rule_skips_hole_queries() {
        let mut rules = DesignRules::default();
        rules.rules.push(ClearanceRule {
            layer: Some(Side::Back),
            ..rule("back_only", 300_000)
        });

        let (a, b) = (footprint("U1"), footprint("U2"));
        let back = rules.eval(ConstraintKind::CourtyardClearance, &a, Some(&b), Some(Side::Back));
        assert_eq!(back.clearance, 300_000);

        let front = rules.eval(ConstraintKind::CourtyardClearance, &a, Some(&b), Some(Side::Front));
        assert_eq!(front.clearance, 0);

        let holes = rules.eval(ConstraintKind::CourtyardClearance, &a, Some(&b), None);
        assert_eq!(holes.clearance, 0);
    }

    #[test]
    fn test_last_matching_rule_wins() {
        let mut rules = DesignRules::default();
        rules.rules.push(rule("first", 100_000));
        rules.rules.push(ClearanceRule {
            severity: Some(Severity::Warning),
            ..rule("second", 50_000)
        });

        let (a, b) = (footprint("U1"), footprint("U2"));
        let c = rules.eval(ConstraintKind::CourtyardClearance, &a, Some(&b), None);
        assert_eq!(c.clearance, 50_000);
        assert_eq!(c.rule.as_deref(), Some("second"));
        assert_eq!(c.severity, Severity::Warning);
    }

    #[test]
    fn test_worst_constraint_is_global_maximum() {
        let mut rules = DesignRules::with_clearance_mm(0.1);
        rules.rules.push(rule("tight", 50_000));
        rules.rules.push(ClearanceRule {
            footprint_a: Some("J1".to_string()),
            ..rule("wide", 750_000)
        });

        let worst = rules.worst_constraint(ConstraintKind::CourtyardClearance);
        assert_eq!(worst.clearance, 750_000);
        assert_eq!(worst.rule.as_deref(), Some("wide"));
    }

    #[test]
    fn test_severity_override_per_kind() {
        let mut rules = DesignRules::default();
        rules
            .severity_overrides
            .insert(ViolationKind::MissingCourtyard, Severity::Ignore);

        assert_eq!(
            rules.severity_for(ViolationKind::MissingCourtyard),
            Severity::Ignore
        );
        assert_eq!(
            rules.severity_for(ViolationKind::OverlappingFootprints),
            Severity::Error
        );
    }

    #[test]
    fn test_rules_round_trip_through_json() {
        let mut rules = DesignRules::with_clearance_mm(0.25);
        rules.rules.push(rule("named", 10_000));

        let json = serde_json::to_string(&rules).unwrap();
        let back: DesignRules = serde_json::from_str(&json).unwrap();
        assert_eq!(back.courtyard_clearance, rules.courtyard_clearance);
        assert_eq!(back.rules.len(), 1);
        assert_eq!(back.max_error_count, 500);
    }
}
