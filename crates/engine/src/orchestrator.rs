//! The orchestrator
//!
//! Single writer-side entry point for run lifecycles: creation and the
//! transition proposal loop. All mutation of a run flows through
//! [`Orchestrator::propose`]; nothing else in the system writes run state.

use crate::config::EngineConfig;
use cadence_core::{
    AllowAll, AlwaysAlive, AnomalyReporter, Capability, Error, NoopAnomalyReporter, NoopNotifier,
    Notifier, Result, Run, RunFilter, RunId, RunSpec, State, WorkerLiveness,
};
use cadence_machine::TransitionGraph;
use cadence_policy::{
    ConcurrencyLimitRule, CrashDetectionRule, LimitProbe, Outcome, Pipeline, PipelineVerdict,
    RejectionReason, ReleaseConcurrencySlots, Rule, TransitionContext,
};
use cadence_store::{CommitResult, RunStore};
use chrono::Utc;
use std::sync::Arc;

/// Headroom probe over the store's limit table, handed to the
/// concurrency-limit rule. Keeps the policy crate independent of the store.
struct StoreLimitProbe {
    store: Arc<RunStore>,
}

impl LimitProbe for StoreLimitProbe {
    fn has_headroom(&self, group: &cadence_core::LimitGroup) -> bool {
        self.store.limits().has_headroom(group)
    }
}

/// The orchestration engine.
///
/// Cheap to share: wrap in an `Arc` and hand clones to API handlers, queue
/// services, and sweepers. Every method takes `&self`.
pub struct Orchestrator {
    store: Arc<RunStore>,
    graph: TransitionGraph,
    pipeline: Pipeline,
    config: EngineConfig,
    notifier: Arc<dyn Notifier>,
    capability: Arc<dyn Capability>,
    liveness: Arc<dyn WorkerLiveness>,
    anomalies: Arc<dyn AnomalyReporter>,
}

impl Orchestrator {
    /// Start building an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// An orchestrator with all defaults (standard graph, built-in rules,
    /// no-op collaborators).
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// The run store.
    pub fn store(&self) -> &Arc<RunStore> {
        &self.store
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The worker liveness probe.
    pub fn liveness(&self) -> &Arc<dyn WorkerLiveness> {
        &self.liveness
    }

    /// The anomaly escalation seam.
    pub fn anomalies(&self) -> &Arc<dyn AnomalyReporter> {
        &self.anomalies
    }

    /// Create a run in `Scheduled`.
    ///
    /// Creation is the graph's entry edge, validated like any other edge;
    /// a custom graph without an entry edge into `Scheduled` refuses run
    /// creation.
    pub fn create_run(&self, spec: RunSpec) -> Result<Run> {
        self.graph.validate(None, cadence_core::StateKind::Scheduled)?;
        let run = Run::create(spec);
        self.store.insert(run.clone())?;
        tracing::info!(run = %run.id, parent = %run.parent, "run created");
        Ok(run)
    }

    /// Read a run.
    pub fn get_run(&self, id: &RunId) -> Result<Run> {
        self.store.get(id)
    }

    /// Query runs.
    pub fn query(&self, filter: &RunFilter) -> Vec<Run> {
        self.store.query(filter)
    }

    /// Propose a state transition.
    ///
    /// With `expected_version: None` the engine manages optimistic
    /// concurrency itself: a conflicting commit triggers a fresh read and a
    /// full pipeline re-run, up to the configured retry bound. With
    /// `Some(v)`, the caller pinned the version it read (CAS semantics) and
    /// any conflict is surfaced immediately as [`Error::Conflict`].
    pub fn propose(
        &self,
        id: &RunId,
        proposed: State,
        expected_version: Option<u64>,
    ) -> Result<Outcome> {
        let mut attempts = 0u32;
        loop {
            let run = self.store.get(id)?;
            if let Some(expected) = expected_version {
                if run.version != expected {
                    return Err(Error::Conflict {
                        expected,
                        actual: run.version,
                    });
                }
            }

            let from = run.state.kind;
            if self.graph.validate(Some(from), proposed.kind).is_err() {
                return Ok(Outcome::Rejected {
                    reason: RejectionReason::InvalidTransition {
                        from,
                        to: proposed.kind,
                    },
                });
            }

            let mut ctx = TransitionContext::new(&run, proposed.clone(), Utc::now());
            match self.pipeline.evaluate(&mut ctx) {
                PipelineVerdict::Proceed => {}
                PipelineVerdict::Reject { rule, message } => {
                    return Ok(Outcome::Rejected {
                        reason: RejectionReason::Policy { rule, message },
                    });
                }
                PipelineVerdict::Delay(retry_after) => {
                    return Ok(Outcome::Delayed { retry_after });
                }
            }

            let final_state = ctx.proposed().clone();
            if final_state.kind != proposed.kind {
                // A rewrite changed the destination; the new edge must be
                // legal too.
                if self.graph.validate(Some(from), final_state.kind).is_err() {
                    return Ok(Outcome::Rejected {
                        reason: RejectionReason::InvalidTransition {
                            from,
                            to: final_state.kind,
                        },
                    });
                }
            }
            let effects = ctx.take_effects();

            match self
                .store
                .commit(id, run.version, final_state.clone(), &effects)?
            {
                CommitResult::Committed { version, sequence } => {
                    tracing::info!(
                        run = %id,
                        from = %from,
                        to = %final_state.kind,
                        version,
                        sequence,
                        "transition accepted"
                    );
                    self.notify_entry(id, &final_state);
                    return Ok(Outcome::Accepted {
                        state: final_state,
                        version,
                    });
                }
                CommitResult::Conflict { actual } => {
                    if let Some(expected) = expected_version {
                        return Err(Error::Conflict { expected, actual });
                    }
                    attempts += 1;
                    if attempts > self.config.max_commit_retries {
                        tracing::warn!(run = %id, attempts, "conflict retries exhausted");
                        return Err(Error::Conflict {
                            expected: run.version,
                            actual,
                        });
                    }
                    continue;
                }
                CommitResult::SlotExhausted { group } => {
                    // An advisory headroom pass lost the race to another
                    // committer. Same answer as the rule's fast path.
                    tracing::debug!(run = %id, group = %group, "slot race lost, delaying");
                    return Ok(Outcome::Delayed {
                        retry_after: self.config.delayed_backoff,
                    });
                }
            }
        }
    }

    /// Propose a transition on behalf of a UI-originated actor.
    ///
    /// The capability predicate runs first; denial never reaches the
    /// pipeline and is reported as [`Error::PermissionDenied`], distinct
    /// from orchestration rejections.
    pub fn propose_as(
        &self,
        actor: &str,
        id: &RunId,
        proposed: State,
        expected_version: Option<u64>,
    ) -> Result<Outcome> {
        let run = self.store.get(id)?;
        if !self.capability.can(actor, "transition", &run) {
            tracing::debug!(run = %id, actor, "transition denied by capability check");
            return Err(Error::PermissionDenied(format!(
                "actor {actor} may not transition run {id}"
            )));
        }
        self.propose(id, proposed, expected_version)
    }

    /// Fire the notifier for entries into configured states. Best-effort:
    /// panics are caught and logged, never propagated, and the transition is
    /// already committed by the time this runs.
    fn notify_entry(&self, id: &RunId, state: &State) {
        if !self.config.notify_on.contains(&state.kind) {
            return;
        }
        let Ok(run) = self.store.get(id) else { return };
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.notifier.state_entered(&run, state);
        }));
        if outcome.is_err() {
            tracing::warn!(run = %id, state = %state.kind, "notifier panicked");
        }
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Orchestrator`].
///
/// The built-in rules (crash detection, concurrency acquire/release) are
/// always installed; `rule` adds host rules alongside them.
pub struct OrchestratorBuilder {
    store: Option<Arc<RunStore>>,
    graph: TransitionGraph,
    config: EngineConfig,
    extra_rules: Vec<Arc<dyn Rule>>,
    notifier: Arc<dyn Notifier>,
    capability: Arc<dyn Capability>,
    liveness: Option<Arc<dyn WorkerLiveness>>,
    anomalies: Arc<dyn AnomalyReporter>,
}

impl OrchestratorBuilder {
    fn new() -> Self {
        Self {
            store: None,
            graph: TransitionGraph::default(),
            config: EngineConfig::default(),
            extra_rules: Vec::new(),
            notifier: Arc::new(NoopNotifier),
            capability: Arc::new(AllowAll),
            liveness: None,
            anomalies: Arc::new(NoopAnomalyReporter),
        }
    }

    /// Use an existing store instead of a fresh one.
    pub fn store(mut self, store: Arc<RunStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the standard transition graph.
    pub fn graph(mut self, graph: TransitionGraph) -> Self {
        self.graph = graph;
        self
    }

    /// Replace the default configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a host rule alongside the built-ins.
    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.extra_rules.push(rule);
        self
    }

    /// Wire the notification collaborator.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Wire the capability predicate.
    pub fn capability(mut self, capability: Arc<dyn Capability>) -> Self {
        self.capability = capability;
        self
    }

    /// Wire the worker liveness probe. Defaults to [`AlwaysAlive`], which
    /// disables crash detection.
    pub fn liveness(mut self, liveness: Arc<dyn WorkerLiveness>) -> Self {
        self.liveness = Some(liveness);
        self
    }

    /// Wire the anomaly escalation seam.
    pub fn anomalies(mut self, anomalies: Arc<dyn AnomalyReporter>) -> Self {
        self.anomalies = anomalies;
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Orchestrator {
        let store = self.store.unwrap_or_else(|| Arc::new(RunStore::new()));
        let liveness: Arc<dyn WorkerLiveness> =
            self.liveness.unwrap_or_else(|| Arc::new(AlwaysAlive));

        let mut rules: Vec<Arc<dyn Rule>> = vec![
            Arc::new(CrashDetectionRule::new(Arc::clone(&liveness))),
            Arc::new(ConcurrencyLimitRule::new(
                Arc::new(StoreLimitProbe {
                    store: Arc::clone(&store),
                }),
                self.config.delayed_backoff,
            )),
            Arc::new(ReleaseConcurrencySlots),
        ];
        rules.extend(self.extra_rules);

        Orchestrator {
            pipeline: Pipeline::new(rules),
            store,
            graph: self.graph,
            config: self.config,
            notifier: self.notifier,
            capability: self.capability,
            liveness,
            anomalies: self.anomalies,
        }
    }
}
