//! Concurrency-limit rules
//!
//! Two halves of one protocol. On entry into `Running`,
//! [`ConcurrencyLimitRule`] stages one slot acquire per limit group the run
//! belongs to; on leaving `Running`, [`ReleaseConcurrencySlots`] stages the
//! matching releases. The store applies staged effects atomically with the
//! commit, so the active count per group tracks committed `Running` entries
//! exactly.
//!
//! The rule's own headroom check is an advisory fast path: it answers
//! `Delay` without touching the store when a group is already full. The
//! authoritative check is the all-or-nothing acquire inside the store commit;
//! losing that race also surfaces as a delay, never as an overshoot.

use crate::context::TransitionContext;
use crate::rule::{Rule, RuleDecision, RuleScope};
use crate::rules::priority;
use cadence_core::{LimitGroup, SideEffect, StateKind};
use std::sync::Arc;
use std::time::Duration;

/// Read-only headroom probe over the store's limit table.
///
/// Defined here so the policy layer stays independent of the store crate;
/// the engine implements it by delegating to the store's `LimitTable`.
pub trait LimitProbe: Send + Sync {
    /// Whether the group can admit one more run right now.
    fn has_headroom(&self, group: &LimitGroup) -> bool;
}

/// Admission control on entry into `Running`.
pub struct ConcurrencyLimitRule {
    probe: Arc<dyn LimitProbe>,
    backoff: Duration,
}

impl ConcurrencyLimitRule {
    /// Build the rule with a headroom probe and the backoff interval
    /// returned on a full group.
    pub fn new(probe: Arc<dyn LimitProbe>, backoff: Duration) -> Self {
        Self { probe, backoff }
    }
}

impl Rule for ConcurrencyLimitRule {
    fn name(&self) -> &str {
        "concurrency-limit"
    }

    fn priority(&self) -> u32 {
        priority::CONCURRENCY_ACQUIRE
    }

    fn scope(&self) -> RuleScope {
        RuleScope::any().to([StateKind::Running])
    }

    fn evaluate(&self, ctx: &mut TransitionContext<'_>) -> RuleDecision {
        for group in &ctx.run().limit_groups {
            if !self.probe.has_headroom(group) {
                return RuleDecision::Delay(self.backoff);
            }
        }
        for group in ctx.run().limit_groups.clone() {
            ctx.stage(SideEffect::AcquireSlot(group));
        }
        RuleDecision::Proceed
    }
}

/// Slot release on leaving `Running`.
///
/// Scoped to `Running ->` only, so a later `Cancelling -> Cancelled` commit
/// cannot double-release.
pub struct ReleaseConcurrencySlots;

impl Rule for ReleaseConcurrencySlots {
    fn name(&self) -> &str {
        "concurrency-release"
    }

    fn priority(&self) -> u32 {
        priority::CONCURRENCY_RELEASE
    }

    fn scope(&self) -> RuleScope {
        RuleScope::any().from([StateKind::Running]).to([
            StateKind::Completed,
            StateKind::Failed,
            StateKind::Crashed,
            StateKind::Cancelled,
            StateKind::Cancelling,
            StateKind::Paused,
        ])
    }

    fn evaluate(&self, ctx: &mut TransitionContext<'_>) -> RuleDecision {
        for group in ctx.run().limit_groups.clone() {
            ctx.stage(SideEffect::ReleaseSlot(group));
        }
        RuleDecision::Proceed
    }
}
