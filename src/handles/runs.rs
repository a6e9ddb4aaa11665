//! Run operations
//!
//! Creation, reads, queries, and transition proposals. Access via
//! `cadence.runs`.

use cadence_core::{Result, Run, RunFilter, RunId, RunSpec, State};
use cadence_engine::Orchestrator;
use cadence_policy::Outcome;
use std::sync::Arc;

/// Run lifecycle operations.
pub struct Runs {
    engine: Arc<Orchestrator>,
}

impl Runs {
    pub(crate) fn new(engine: Arc<Orchestrator>) -> Self {
        Self { engine }
    }

    /// Create a run. It starts in `Scheduled`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let run = cadence.runs.create(
    ///     RunSpec::new(Parent::Flow(FlowId::new())).with_tag("etl"),
    /// )?;
    /// ```
    pub fn create(&self, spec: RunSpec) -> Result<Run> {
        self.engine.create_run(spec)
    }

    /// Read a run.
    pub fn get(&self, id: &RunId) -> Result<Run> {
        self.engine.get_run(id)
    }

    /// Query runs, ordered by creation time (oldest first).
    pub fn list(&self, filter: &RunFilter) -> Vec<Run> {
        self.engine.query(filter)
    }

    /// Propose a state transition; the engine manages conflict retries.
    ///
    /// The returned [`Outcome`] says whether orchestration accepted,
    /// rejected, or delayed the proposal. A rejection is an outcome, not an
    /// error: the run is untouched and the caller can inspect the reason.
    pub fn transition(&self, id: &RunId, state: State) -> Result<Outcome> {
        self.engine.propose(id, state, None)
    }

    /// Propose a transition against the exact version the caller last read
    /// (compare-and-set). Any intervening commit surfaces as
    /// [`Error::Conflict`](cadence_core::Error::Conflict) instead of being
    /// retried.
    pub fn transition_at(&self, id: &RunId, state: State, version: u64) -> Result<Outcome> {
        self.engine.propose(id, state, Some(version))
    }

    /// Propose a transition on behalf of a named actor, subject to the
    /// configured capability check.
    pub fn transition_as(&self, actor: &str, id: &RunId, state: State) -> Result<Outcome> {
        self.engine.propose_as(actor, id, state, None)
    }

    /// Request cancellation. The run moves to `Cancelling`; the worker must
    /// observe it and acknowledge with `Cancelled`.
    pub fn cancel(&self, id: &RunId) -> Result<Outcome> {
        self.engine.propose(id, State::cancelling(), None)
    }

    /// Pause a run.
    pub fn pause(&self, id: &RunId) -> Result<Outcome> {
        self.engine.propose(id, State::paused(), None)
    }
}
