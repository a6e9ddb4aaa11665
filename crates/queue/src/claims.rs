//! Claim table
//!
//! A claim makes a run invisible to other polls while a worker holds it. The
//! table entry is the exclusivity guard: `try_claim` wins or loses on the
//! map entry itself, so two workers racing for one run can never both hold
//! it, regardless of how their claim transitions interleave.
//!
//! Expiry is two-condition: the claim deadline must have passed *and* the
//! worker's heartbeat lease must be stale. A slow-but-alive worker keeps its
//! claim past the deadline.

use cadence_core::{QueueId, RunId, WorkerId, WorkerLiveness};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// An exclusive hold on a run by a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// The claimed run.
    pub run: RunId,
    /// The holding worker.
    pub worker: WorkerId,
    /// The queue the run was polled from.
    pub queue: QueueId,
    /// When the claim was taken.
    pub claimed_at: DateTime<Utc>,
    /// Deadline after which the claim is expirable (given a stale worker
    /// lease).
    pub expires_at: DateTime<Utc>,
}

/// All live claims, keyed by run.
#[derive(Debug, Default)]
pub struct ClaimTable {
    inner: DashMap<RunId, Claim>,
}

impl ClaimTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim a run. Returns `false` if another claim exists.
    pub fn try_claim(&self, claim: Claim) -> bool {
        match self.inner.entry(claim.run) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(claim);
                true
            }
        }
    }

    /// Release a run's claim, if any. Returns the released claim.
    pub fn release(&self, run: &RunId) -> Option<Claim> {
        self.inner.remove(run).map(|(_, claim)| claim)
    }

    /// Whether a run is currently claimed.
    pub fn is_claimed(&self, run: &RunId) -> bool {
        self.inner.contains_key(run)
    }

    /// The claim on a run, if any.
    pub fn get(&self, run: &RunId) -> Option<Claim> {
        self.inner.get(run).map(|c| c.clone())
    }

    /// Claims whose deadline has passed and whose worker lease is stale.
    ///
    /// Read-only scan; the caller decides what to do with each (release,
    /// re-pool via the pipeline).
    pub fn expired(&self, now: DateTime<Utc>, liveness: &dyn WorkerLiveness) -> Vec<Claim> {
        self.inner
            .iter()
            .filter(|entry| {
                let claim = entry.value();
                claim.expires_at <= now && !liveness.is_alive(&claim.worker, now)
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// A point-in-time copy of every live claim.
    pub fn snapshot(&self) -> Vec<Claim> {
        self.inner.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of live claims.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no claims are held.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
