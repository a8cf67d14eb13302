//! Check engine, test providers and the violation store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use indexmap::IndexMap;
use serde::Serialize;

use super::courtyard::CourtyardClearanceProvider;
use super::rules::DesignRules;
use super::types::{Severity, Violation, ViolationKind};
use crate::board::{Board, Side};
use crate::geometry::Vec2I;

/// Collects violations during a run and enforces the per-kind cap.
#[derive(Debug, Default)]
pub struct ViolationStore {
    violations: Vec<Violation>,
    counts: IndexMap<ViolationKind, usize>,
    max_per_kind: usize,
}

impl ViolationStore {
    /// `max_per_kind` of zero lifts the cap.
    pub fn new(max_per_kind: usize) -> Self {
        ViolationStore {
            violations: Vec::new(),
            counts: IndexMap::new(),
            max_per_kind,
        }
    }

    /// File a violation at a position. Ignore-severity reports are
    /// dropped here so providers never have to care.
    pub fn report(&mut self, mut violation: Violation, position: Vec2I, layer: Option<Side>) {
        if violation.severity == Severity::Ignore {
            return;
        }
        violation.position = position;
        violation.layer = layer;
        log::debug!(
            "violation: {} at ({}, {})",
            violation.kind.description(),
            position.x,
            position.y
        );
        *self.counts.entry(violation.kind).or_insert(0) += 1;
        self.violations.push(violation);
    }

    /// True once a kind has used up its report budget.
    pub fn is_limit_exceeded(&self, kind: ViolationKind) -> bool {
        self.max_per_kind != 0
            && self.counts.get(&kind).copied().unwrap_or(0) >= self.max_per_kind
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.violations.len()
    }

    pub fn clear(&mut self) {
        self.violations.clear();
        self.counts.clear();
    }
}

/// Everything a provider sees during a run. Public fields so providers
/// can split the borrows: caches on the board get rebuilt while
/// violations go to the store.
pub struct DrcContext<'a> {
    pub board: &'a mut Board,
    pub rules: &'a DesignRules,
    pub store: &'a mut ViolationStore,
    pub cancel: &'a AtomicBool,
}

/// One self-contained check over the board.
///
/// `run` returns `false` only when cancelled mid-run; violations are
/// reported through the context, never returned.
pub trait TestProvider {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn run(&mut self, ctx: DrcContext<'_>) -> bool;
}

/// Every provider the engine runs, in execution order.
pub fn all_providers() -> Vec<Box<dyn TestProvider>> {
    vec![Box::new(CourtyardClearanceProvider::new())]
}

/// Runs every provider over a board and owns the results.
pub struct DrcEngine {
    rules: DesignRules,
    cancel: Arc<AtomicBool>,
    store: ViolationStore,
}

impl DrcEngine {
    pub fn new(rules: DesignRules) -> Self {
        let store = ViolationStore::new(rules.max_error_count);
        DrcEngine {
            rules,
            cancel: Arc::new(AtomicBool::new(false)),
            store,
        }
    }

    pub fn rules(&self) -> &DesignRules {
        &self.rules
    }

    /// Flag another thread can raise to stop a run in progress.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Lower the cancel flag before starting a fresh run. `run` itself
    /// never touches the flag, so a flag raised before the call cancels
    /// immediately.
    pub fn clear_cancel(&self) {
        self.cancel.store(false, Ordering::SeqCst);
    }

    /// Run all providers to completion. Returns `false` when cancelled;
    /// the store then holds only what was found before the abort.
    pub fn run(&mut self, board: &mut Board) -> bool {
        let start = Instant::now();
        self.store.clear();

        let mut providers = all_providers();
        for provider in providers.iter_mut() {
            log::info!("running {}", provider.name());
            let ctx = DrcContext {
                board,
                rules: &self.rules,
                store: &mut self.store,
                cancel: &self.cancel,
            };
            if !provider.run(ctx) {
                log::info!("{} cancelled after {:?}", provider.name(), start.elapsed());
                return false;
            }
        }

        log::info!(
            "checked {} footprints, {} violations found in {:?}",
            board.footprints().len(),
            self.store.total(),
            start.elapsed()
        );
        true
    }

    pub fn violations(&self) -> &[Violation] {
        self.store.violations()
    }

    pub fn store(&self) -> &ViolationStore {
        &self.store
    }

    /// Serialize the current results for a report frontend.
    pub fn report_json(&self) -> anyhow::Result<String> {
        #[derive(Serialize)]
        struct Report<'a> {
            violations: &'a [Violation],
            counts: &'a IndexMap<ViolationKind, usize>,
        }

        let report = Report {
            violations: self.store.violations(),
            counts: &self.store.counts,
        };
        serde_json::to_string_pretty(&report).context("serializing check report")
    }
}
