//! Worker operations
//!
//! Access via `cadence.workers`. The registry backing this handle is also
//! the engine's liveness probe: a worker that stops heartbeating loses its
//! claims (once they expire) and has its completion reports rewritten to
//! `Crashed`.

use cadence_core::WorkerId;
use cadence_queue::QueueService;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Worker heartbeat operations.
pub struct Workers {
    service: Arc<QueueService>,
}

impl Workers {
    pub(crate) fn new(service: Arc<QueueService>) -> Self {
        Self { service }
    }

    /// Record a heartbeat for a worker. Polling also counts as a heartbeat.
    pub fn heartbeat(&self, worker: &WorkerId) {
        self.service.heartbeat(worker);
    }

    /// The worker's last recorded heartbeat, if any.
    pub fn last_heartbeat(&self, worker: &WorkerId) -> Option<DateTime<Utc>> {
        self.service.workers().last_heartbeat(worker)
    }

    /// Whether the worker's heartbeat lease is current.
    pub fn is_alive(&self, worker: &WorkerId) -> bool {
        use cadence_core::WorkerLiveness;
        self.service.workers().is_alive(worker, Utc::now())
    }

    /// Deregister a worker on clean shutdown.
    pub fn deregister(&self, worker: &WorkerId) {
        self.service.workers().deregister(worker);
    }
}
