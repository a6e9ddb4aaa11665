//! Collaborator trait seams
//!
//! The engine calls out to four external collaborators. Each is a trait with
//! a no-op (or permissive) default implementation so an embedded engine works
//! standalone; hosts override them to wire in real delivery, auth, alerting,
//! and worker liveness.
//!
//! All seams are infallible from the engine's point of view: a collaborator
//! that fails must never block or fail the underlying transition.

use crate::run::Run;
use crate::state::State;
use crate::types::WorkerId;
use chrono::{DateTime, Utc};

/// Notification delivery, invoked on entry into configured states.
///
/// Fire-and-forget: the engine calls this after the transition is already
/// committed, catches panics, and never propagates failures.
pub trait Notifier: Send + Sync {
    /// A run entered `state`.
    fn state_entered(&self, run: &Run, state: &State);
}

/// No-op notifier. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn state_entered(&self, _run: &Run, _state: &State) {}
}

/// Capability predicate consulted before accepting a transition from a
/// UI-originated caller.
pub trait Capability: Send + Sync {
    /// May `actor` perform `action` on `run`?
    fn can(&self, actor: &str, action: &str, run: &Run) -> bool;
}

/// Permit-everything capability check. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Capability for AllowAll {
    fn can(&self, _actor: &str, _action: &str, _run: &Run) -> bool {
        true
    }
}

/// Worker liveness probe.
///
/// Claim expiry and crash detection both require a worker to be *dead*, not
/// merely slow: a claim times out only when the worker's heartbeat lease has
/// also lapsed, and a worker-reported completion is rewritten to `Crashed`
/// only when the lease lapsed before the report.
pub trait WorkerLiveness: Send + Sync {
    /// Whether the worker's heartbeat lease is current at `now`.
    fn is_alive(&self, worker: &WorkerId, now: DateTime<Utc>) -> bool;
}

/// Liveness probe that considers every worker alive. The default; disables
/// heartbeat-based crash detection and makes claim expiry purely cooperative.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAlive;

impl WorkerLiveness for AlwaysAlive {
    fn is_alive(&self, _worker: &WorkerId, _now: DateTime<Utc>) -> bool {
        true
    }
}

/// Escalation seam for reportable anomalies.
///
/// The engine never auto-resolves these; it reports and moves on.
pub trait AnomalyReporter: Send + Sync {
    /// A run has sat in `Cancelling` since `since`, beyond the configured
    /// timeout.
    fn stuck_cancelling(&self, run: &Run, since: DateTime<Utc>);
}

/// No-op anomaly reporter. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnomalyReporter;

impl AnomalyReporter for NoopAnomalyReporter {
    fn stuck_cancelling(&self, _run: &Run, _since: DateTime<Utc>) {}
}
