//! Worker heartbeat leases
//!
//! Workers heartbeat while they hold claims or run work; polling counts as a
//! heartbeat. A worker whose last heartbeat is older than the lease TTL is
//! considered dead for claim expiry and crash detection. Unknown workers are
//! dead: a worker must heartbeat (or poll) at least once before anything
//! vouches for it.

use cadence_core::{WorkerId, WorkerLiveness};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Heartbeat lease registry; the engine's liveness seam.
#[derive(Debug)]
pub struct WorkerRegistry {
    leases: DashMap<WorkerId, DateTime<Utc>>,
    lease_ttl: Duration,
}

impl WorkerRegistry {
    /// Create a registry with the given lease TTL.
    pub fn new(lease_ttl: Duration) -> Self {
        Self {
            leases: DashMap::new(),
            lease_ttl,
        }
    }

    /// Record a heartbeat at `now`.
    pub fn heartbeat(&self, worker: &WorkerId, now: DateTime<Utc>) {
        self.leases.insert(worker.clone(), now);
    }

    /// The worker's last heartbeat, if any.
    pub fn last_heartbeat(&self, worker: &WorkerId) -> Option<DateTime<Utc>> {
        self.leases.get(worker).map(|t| *t)
    }

    /// Forget a worker (shutdown deregistration).
    pub fn deregister(&self, worker: &WorkerId) {
        self.leases.remove(worker);
    }

    /// Number of workers ever seen and not deregistered.
    pub fn len(&self) -> usize {
        self.leases.len()
    }

    /// Whether no workers are registered.
    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }
}

impl WorkerLiveness for WorkerRegistry {
    fn is_alive(&self, worker: &WorkerId, now: DateTime<Utc>) -> bool {
        match self.last_heartbeat(worker) {
            Some(last) => now - last < self.lease_ttl,
            None => false,
        }
    }
}
