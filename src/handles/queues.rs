//! Work queue operations
//!
//! Queue registry, worker polling, and the periodic sweepers. Access via
//! `cadence.queues`.

use cadence_core::{QueueId, Result, Run, RunId, WorkerId};
use cadence_queue::{QueueFilter, QueueService, WorkQueue};
use chrono::Utc;
use std::sync::Arc;

/// Work queue operations.
pub struct Queues {
    service: Arc<QueueService>,
}

impl Queues {
    pub(crate) fn new(service: Arc<QueueService>) -> Self {
        Self { service }
    }

    /// Create a queue serving runs matched by `filter`. Names are unique.
    pub fn create(&self, name: impl Into<String>, filter: QueueFilter) -> Result<WorkQueue> {
        self.service.create_queue(name, filter)
    }

    /// Register a pre-built queue record (for concurrency limits or
    /// priority).
    ///
    /// # Example
    ///
    /// ```ignore
    /// cadence.queues.register(
    ///     WorkQueue::new("gpu", QueueFilter::all().with_tag("gpu"))
    ///         .with_concurrency_limit(2),
    /// )?;
    /// ```
    pub fn register(&self, queue: WorkQueue) -> Result<WorkQueue> {
        self.service.register_queue(queue)
    }

    /// Read a queue.
    pub fn get(&self, id: &QueueId) -> Result<WorkQueue> {
        self.service.get_queue(id)
    }

    /// List queues, ordered by priority then name.
    pub fn list(&self) -> Vec<WorkQueue> {
        self.service.list_queues()
    }

    /// Pause a queue; polls return no work until it resumes.
    pub fn pause(&self, id: &QueueId) -> Result<()> {
        self.service.pause_queue(id)
    }

    /// Resume a paused queue.
    pub fn resume(&self, id: &QueueId) -> Result<()> {
        self.service.resume_queue(id)
    }

    /// Delete a queue. Runs it served are untouched.
    pub fn delete(&self, id: &QueueId) -> Result<()> {
        self.service.delete_queue(id)
    }

    /// Poll a queue for up to `capacity` runs on behalf of a worker. Each
    /// returned run is claimed and committed to `Pending` assigned to the
    /// worker.
    pub fn poll(&self, queue: &QueueId, worker: &WorkerId, capacity: usize) -> Result<Vec<Run>> {
        self.service.poll(queue, worker, capacity)
    }

    /// Sweep the claim table now: drop fulfilled claims and re-pool runs
    /// whose claims expired with a dead worker. Returns the number of claims
    /// released. Hosts call this on a timer.
    pub fn reap_claims(&self) -> usize {
        self.service.reap_claims(Utc::now())
    }

    /// Report runs stuck in `Cancelling` beyond the configured timeout.
    /// Returns the run ids reported. Hosts call this on a timer.
    pub fn report_stuck_cancelling(&self) -> Vec<RunId> {
        self.service.report_stuck_cancelling(Utc::now())
    }
}
