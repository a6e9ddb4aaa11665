//! Engine configuration
//!
//! Every timeout, backoff, and retry bound in the system lives here; none
//! are hard-coded at use sites. The defaults suit an embedded engine with
//! workers heartbeating every few seconds.

use cadence_core::StateKind;
use std::collections::HashSet;
use std::time::Duration;

/// Tunable engine parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many times an engine-managed proposal re-reads and re-runs the
    /// pipeline after an optimistic-lock conflict before surfacing it.
    pub max_commit_retries: u32,
    /// Backoff interval returned with `Delayed` outcomes (concurrency
    /// backpressure, lost slot races).
    pub delayed_backoff: Duration,
    /// How long a queue claim stays exclusive without the worker reporting a
    /// transition. Expiry alone does not release the claim; the worker's
    /// heartbeat lease must also be stale.
    pub claim_timeout: Duration,
    /// How long a run may sit in `Cancelling` before it is reported to the
    /// anomaly seam.
    pub cancelling_timeout: Duration,
    /// How long a worker heartbeat lease stays fresh.
    pub worker_lease_ttl: Duration,
    /// State kinds whose entry triggers the notifier.
    pub notify_on: HashSet<StateKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 3,
            delayed_backoff: Duration::from_secs(5),
            claim_timeout: Duration::from_secs(60),
            cancelling_timeout: Duration::from_secs(300),
            worker_lease_ttl: Duration::from_secs(30),
            notify_on: [StateKind::Failed, StateKind::Crashed].into_iter().collect(),
        }
    }
}

/// Ceiling for chrono conversions: a century. `DateTime + Duration` panics
/// on overflow, so deadline arithmetic needs every converted duration to
/// keep `now + d` representable.
fn to_chrono_clamped(d: Duration) -> chrono::Duration {
    let horizon = chrono::Duration::days(36_500);
    chrono::Duration::from_std(d).map_or(horizon, |cd| cd.min(horizon))
}

impl EngineConfig {
    /// `claim_timeout` as a chrono duration for deadline arithmetic,
    /// clamped so `now + claim_timeout` cannot overflow.
    pub fn claim_timeout_chrono(&self) -> chrono::Duration {
        to_chrono_clamped(self.claim_timeout)
    }

    /// `cancelling_timeout` as a chrono duration, clamped.
    pub fn cancelling_timeout_chrono(&self) -> chrono::Duration {
        to_chrono_clamped(self.cancelling_timeout)
    }

    /// `worker_lease_ttl` as a chrono duration, clamped.
    pub fn worker_lease_ttl_chrono(&self) -> chrono::Duration {
        to_chrono_clamped(self.worker_lease_ttl)
    }
}
