//! Design rule checking
//!
//! - `types`: severities, violation kinds and resolved constraints
//! - `rules`: the design rule set and per-pair constraint resolution
//! - `engine`: the check engine, provider trait and violation store
//! - `courtyard`: courtyard definition and clearance checks

pub mod courtyard;
pub mod engine;
pub mod rules;
pub mod types;

pub use courtyard::CourtyardClearanceProvider;
pub use engine::{all_providers, DrcContext, DrcEngine, TestProvider, ViolationStore};
pub use rules::{ClearanceRule, DesignRules};
pub use types::{Constraint, ConstraintKind, Severity, Violation, ViolationKind};
