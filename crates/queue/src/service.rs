//! The queue service
//!
//! Poll/claim front end over the orchestration engine, plus the two
//! sweepers (claim reaping, stuck-cancellation reporting) and the queue and
//! deployment registries.
//!
//! Claiming is a two-step handshake. The claim-table entry is the
//! exclusivity guard between racing polls; the engine transition
//! (`-> Pending(assigned)`, proposed with a pinned version) is the durable
//! record. A poll that wins the table entry but loses the pinned commit
//! releases the entry and moves on, so the table can never hold a claim the
//! store does not reflect for long.

use crate::claims::{Claim, ClaimTable};
use crate::deployments::DeploymentRegistry;
use crate::queue::{QueueFilter, WorkQueue};
use crate::workers::WorkerRegistry;
use cadence_core::{Error, Parent, QueueId, Result, Run, RunFilter, RunId, State, StateKind, WorkerId};
use cadence_engine::Orchestrator;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Work-queue service: queue registry, poll/claim, and sweepers.
///
/// Shares the engine; every state mutation it performs goes through
/// [`Orchestrator::propose`] like any other caller's.
pub struct QueueService {
    engine: Arc<Orchestrator>,
    queues: DashMap<QueueId, WorkQueue>,
    claims: ClaimTable,
    workers: Arc<WorkerRegistry>,
    deployments: DeploymentRegistry,
}

impl QueueService {
    /// Create a service over an engine and a worker registry.
    ///
    /// The registry should be the same one wired into the engine as its
    /// liveness probe, so claim expiry and crash detection agree on who is
    /// alive.
    pub fn new(engine: Arc<Orchestrator>, workers: Arc<WorkerRegistry>) -> Self {
        Self {
            engine,
            queues: DashMap::new(),
            claims: ClaimTable::new(),
            workers,
            deployments: DeploymentRegistry::new(),
        }
    }

    /// The deployment registry.
    pub fn deployments(&self) -> &DeploymentRegistry {
        &self.deployments
    }

    /// The worker registry.
    pub fn workers(&self) -> &Arc<WorkerRegistry> {
        &self.workers
    }

    /// The claim table.
    pub fn claims(&self) -> &ClaimTable {
        &self.claims
    }

    // --- queue registry ---

    /// Create a work queue. Names must be unique.
    pub fn create_queue(&self, name: impl Into<String>, filter: QueueFilter) -> Result<WorkQueue> {
        let name = name.into();
        if self.queues.iter().any(|q| q.name == name) {
            return Err(Error::AlreadyExists(format!("queue '{name}'")));
        }
        let queue = WorkQueue::new(name, filter);
        self.queues.insert(queue.id, queue.clone());
        tracing::info!(queue = %queue.id, name = %queue.name, "queue created");
        Ok(queue)
    }

    /// Register a pre-built queue record (concurrency limit, priority).
    pub fn register_queue(&self, queue: WorkQueue) -> Result<WorkQueue> {
        if self.queues.iter().any(|q| q.name == queue.name) {
            return Err(Error::AlreadyExists(format!("queue '{}'", queue.name)));
        }
        self.queues.insert(queue.id, queue.clone());
        tracing::info!(queue = %queue.id, name = %queue.name, "queue created");
        Ok(queue)
    }

    /// Read a queue.
    pub fn get_queue(&self, id: &QueueId) -> Result<WorkQueue> {
        self.queues
            .get(id)
            .map(|q| q.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// List all queues, ordered by priority then name.
    pub fn list_queues(&self) -> Vec<WorkQueue> {
        let mut all: Vec<WorkQueue> = self.queues.iter().map(|q| q.clone()).collect();
        all.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        all
    }

    /// Pause a queue. Polls against it return no work until resumed.
    pub fn pause_queue(&self, id: &QueueId) -> Result<()> {
        self.set_queue_paused(id, true)
    }

    /// Resume a paused queue.
    pub fn resume_queue(&self, id: &QueueId) -> Result<()> {
        self.set_queue_paused(id, false)
    }

    /// Delete a queue. Runs it served are untouched: membership is computed
    /// from the filter at scan time, never stored on the run.
    pub fn delete_queue(&self, id: &QueueId) -> Result<()> {
        self.queues
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn set_queue_paused(&self, id: &QueueId, paused: bool) -> Result<()> {
        let mut entry = self
            .queues
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        entry.paused = paused;
        Ok(())
    }

    // --- polling ---

    /// Poll a queue for up to `capacity` runs on behalf of a worker.
    ///
    /// Polling counts as a heartbeat. Returns the runs the worker now holds
    /// claims on, each committed to `Pending` assigned to the worker. A
    /// paused queue, an empty queue, or a queue at its concurrency limit
    /// returns an empty batch; none of those is an error.
    pub fn poll(&self, queue_id: &QueueId, worker: &WorkerId, capacity: usize) -> Result<Vec<Run>> {
        let now = Utc::now();
        self.workers.heartbeat(worker, now);
        let queue = self.get_queue(queue_id)?;
        if queue.paused || capacity == 0 {
            return Ok(Vec::new());
        }

        // Opportunistic sweep so a dead worker's claims free up on the next
        // poll rather than waiting for a dedicated sweeper tick.
        self.reap_claims(now);

        let budget = match self.queue_headroom(&queue) {
            Some(0) => return Ok(Vec::new()),
            Some(headroom) => capacity.min(headroom),
            None => capacity,
        };

        let mut candidates = self.poolable_candidates(&queue, now);
        candidates.sort_by(|a, b| {
            let a_due = a.state.scheduled_for.unwrap_or(a.created_at);
            let b_due = b.state.scheduled_for.unwrap_or(b.created_at);
            a_due.cmp(&b_due).then_with(|| a.created_at.cmp(&b.created_at))
        });

        let expires_at = now + self.engine.config().claim_timeout_chrono();
        let mut claimed = Vec::new();
        for run in candidates {
            if claimed.len() == budget {
                break;
            }
            let claim = Claim {
                run: run.id,
                worker: worker.clone(),
                queue: queue.id,
                claimed_at: now,
                expires_at,
            };
            if !self.claims.try_claim(claim) {
                continue;
            }
            // Pinned version: if anything moved the run since our scan, give
            // the claim back instead of retrying over the other writer.
            match self
                .engine
                .propose(&run.id, State::assigned(worker.clone()), Some(run.version))
            {
                Ok(outcome) if outcome.is_accepted() => {
                    let run = self.engine.get_run(&run.id)?;
                    tracing::debug!(run = %run.id, queue = %queue.id, worker = %worker, "run claimed");
                    claimed.push(run);
                }
                Ok(_) => {
                    // Rejected or delayed by policy; not ours to hold.
                    self.claims.release(&run.id);
                }
                Err(err) if err.is_conflict() || err.is_not_found() => {
                    self.claims.release(&run.id);
                }
                Err(err) => {
                    self.claims.release(&run.id);
                    return Err(err);
                }
            }
        }
        Ok(claimed)
    }

    /// Record a worker heartbeat.
    pub fn heartbeat(&self, worker: &WorkerId) {
        self.workers.heartbeat(worker, Utc::now());
    }

    /// Remaining `Running` headroom for a queue, or `None` if unlimited.
    fn queue_headroom(&self, queue: &WorkQueue) -> Option<usize> {
        let limit = queue.concurrency_limit? as usize;
        let running = self
            .engine
            .query(&RunFilter::all().with_states([StateKind::Running]))
            .into_iter()
            .filter(|run| queue.filter.matches(run))
            .count();
        Some(limit.saturating_sub(running))
    }

    /// Unclaimed, due, poolable runs served by the queue.
    fn poolable_candidates(&self, queue: &WorkQueue, now: DateTime<Utc>) -> Vec<Run> {
        self.engine
            .query(
                &RunFilter::all()
                    .with_states([StateKind::Scheduled, StateKind::Pending])
                    .scheduled_before(now),
            )
            .into_iter()
            .filter(|run| queue.filter.matches(run))
            .filter(|run| !self.claims.is_claimed(&run.id))
            .filter(|run| run.assigned_worker().is_none())
            .filter(|run| match run.parent {
                Parent::Deployment(id) => !self.deployments.is_paused(&id),
                _ => true,
            })
            .collect()
    }

    // --- sweepers ---

    /// Sweep the claim table at `now`. Returns the number of claims
    /// released.
    ///
    /// Fulfilled claims (the run has left `Pending`, so the worker reported
    /// something) are simply dropped. Expired claims (past the deadline
    /// *and* the worker's heartbeat lease is stale) are dropped and the run
    /// is proposed back to an immediately-due `Scheduled`, making it
    /// poolable again; the proposal runs the full pipeline like any other.
    pub fn reap_claims(&self, now: DateTime<Utc>) -> usize {
        let mut released = 0;

        for claim in self.claims.snapshot() {
            let Ok(run) = self.engine.get_run(&claim.run) else {
                self.claims.release(&claim.run);
                released += 1;
                continue;
            };
            if run.state.kind != StateKind::Pending {
                self.claims.release(&claim.run);
                released += 1;
            }
        }

        for claim in self.claims.expired(now, self.engine.liveness().as_ref()) {
            self.claims.release(&claim.run);
            released += 1;
            tracing::warn!(
                run = %claim.run,
                worker = %claim.worker,
                "claim expired with stale worker lease, re-pooling"
            );
            match self.engine.propose(&claim.run, State::scheduled(None), None) {
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(run = %claim.run, %err, "re-pool proposal failed");
                }
            }
        }

        released
    }

    /// Report runs stuck in `Cancelling` beyond the configured timeout to
    /// the anomaly seam. Returns the ids reported. Never auto-resolves:
    /// forcing `Cancelled` would race a worker that is still tearing down.
    pub fn report_stuck_cancelling(&self, now: DateTime<Utc>) -> Vec<RunId> {
        let timeout = self.engine.config().cancelling_timeout_chrono();
        let mut reported = Vec::new();
        for run in self
            .engine
            .query(&RunFilter::all().with_states([StateKind::Cancelling]))
        {
            let since = run.state.timestamp;
            if since + timeout <= now {
                tracing::warn!(run = %run.id, %since, "run stuck in Cancelling");
                self.engine.anomalies().stuck_cancelling(&run, since);
                reported.push(run.id);
            }
        }
        reported
    }
}
