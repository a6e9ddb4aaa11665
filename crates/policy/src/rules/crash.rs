//! Heartbeat-based crash detection
//!
//! A worker whose heartbeat lease lapsed cannot be trusted to report its own
//! run's ending: the report may be arbitrarily stale, or the run may have
//! been re-assigned since. This rule intercepts worker-reported endings of a
//! `Running` run and redirects them to `Crashed` when the assigned worker's
//! lease is no longer current.
//!
//! The rewrite re-dispatches through the pipeline, so slot release still runs
//! against the `Crashed` destination.

use crate::context::TransitionContext;
use crate::rule::{Rule, RuleDecision, RuleScope};
use crate::rules::priority;
use cadence_core::{State, StateKind, WorkerLiveness};
use std::sync::Arc;

/// Redirect `Running -> Completed/Failed` to `Running -> Crashed` when the
/// assigned worker's heartbeat lease has lapsed.
pub struct CrashDetectionRule {
    liveness: Arc<dyn WorkerLiveness>,
}

impl CrashDetectionRule {
    /// Build the rule over a liveness probe.
    pub fn new(liveness: Arc<dyn WorkerLiveness>) -> Self {
        Self { liveness }
    }
}

impl Rule for CrashDetectionRule {
    fn name(&self) -> &str {
        "crash-detection"
    }

    fn priority(&self) -> u32 {
        priority::CRASH_DETECTION
    }

    fn scope(&self) -> RuleScope {
        RuleScope::any()
            .from([StateKind::Running])
            .to([StateKind::Completed, StateKind::Failed])
    }

    fn evaluate(&self, ctx: &mut TransitionContext<'_>) -> RuleDecision {
        let Some(worker) = ctx.run().assigned_worker() else {
            // No assignment on record; nothing to check against.
            return RuleDecision::Proceed;
        };
        if self.liveness.is_alive(worker, ctx.now()) {
            return RuleDecision::Proceed;
        }
        let message = format!("worker {worker} heartbeat lapsed before run ended");
        RuleDecision::Rewrite(State::crashed(message))
    }
}
