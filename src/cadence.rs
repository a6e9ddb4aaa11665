//! Main engine entry point
//!
//! [`Cadence`] wires the orchestrator, the queue service, and the worker
//! registry together and exposes them through focused handles. Build one
//! with [`Cadence::in_memory`] for defaults or [`Cadence::builder`] for a
//! custom graph, rules, limits, and collaborators.

use crate::handles::{Deployments, Queues, Runs, Workers};
use cadence_core::{AnomalyReporter, Capability, LimitGroup, Notifier, WorkerLiveness};
use cadence_engine::{EngineConfig, Orchestrator};
use cadence_machine::TransitionGraph;
use cadence_policy::Rule;
use cadence_queue::{QueueService, WorkerRegistry};
use std::sync::Arc;

/// The Cadence orchestration engine.
///
/// Cheap to share behind an `Arc`; all handles take `&self` and are safe to
/// call from many threads.
///
/// # Example
///
/// ```ignore
/// use cadence::prelude::*;
///
/// let cadence = Cadence::in_memory();
/// let run = cadence.runs.create(RunSpec::new(Parent::Flow(FlowId::new())))?;
/// cadence.runs.transition(&run.id, State::pending())?;
/// ```
pub struct Cadence {
    /// The underlying orchestrator.
    pub(crate) engine: Arc<Orchestrator>,

    /// The underlying queue service.
    pub(crate) service: Arc<QueueService>,

    /// Run creation, queries, and transition proposals.
    pub runs: Runs,

    /// Work queue registry, polling, and sweepers.
    pub queues: Queues,

    /// Deployment registry.
    pub deployments: Deployments,

    /// Worker heartbeats.
    pub workers: Workers,
}

impl Cadence {
    /// An in-memory engine with the standard transition graph, built-in
    /// rules, and no-op collaborators.
    pub fn in_memory() -> Self {
        Self::builder().build()
    }

    /// Start building a configured engine.
    pub fn builder() -> CadenceBuilder {
        CadenceBuilder::new()
    }

    /// The orchestrator, for callers that outgrow the handles.
    pub fn engine(&self) -> &Arc<Orchestrator> {
        &self.engine
    }

    /// The queue service behind the `queues` handle.
    pub fn queue_service(&self) -> &Arc<QueueService> {
        &self.service
    }

    /// Set a concurrency limit: at most `limit` runs drawing from `group`
    /// may be `Running` at once. Lowering a limit below current usage stops
    /// new acquisitions but never evicts running work.
    pub fn set_concurrency_limit(&self, group: impl Into<LimitGroup>, limit: u32) {
        self.engine.store().limits().set_limit(group.into(), limit);
    }

    /// Remove a concurrency limit; the group becomes unlimited.
    pub fn remove_concurrency_limit(&self, group: &LimitGroup) {
        self.engine.store().limits().remove_limit(group);
    }

    fn from_parts(engine: Arc<Orchestrator>, workers: Arc<WorkerRegistry>) -> Self {
        let service = Arc::new(QueueService::new(Arc::clone(&engine), Arc::clone(&workers)));
        Self {
            runs: Runs::new(Arc::clone(&engine)),
            queues: Queues::new(Arc::clone(&service)),
            deployments: Deployments::new(Arc::clone(&service)),
            workers: Workers::new(Arc::clone(&service)),
            engine,
            service,
        }
    }
}

impl Default for Cadence {
    /// Equivalent to [`Cadence::in_memory`].
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Builder for [`Cadence`].
///
/// # Example
///
/// ```ignore
/// let cadence = Cadence::builder()
///     .config(EngineConfig::default())
///     .limit("db-pool", 8)
///     .build();
/// ```
pub struct CadenceBuilder {
    graph: Option<TransitionGraph>,
    config: EngineConfig,
    rules: Vec<Arc<dyn Rule>>,
    notifier: Option<Arc<dyn Notifier>>,
    capability: Option<Arc<dyn Capability>>,
    anomalies: Option<Arc<dyn AnomalyReporter>>,
    limits: Vec<(LimitGroup, u32)>,
}

impl CadenceBuilder {
    fn new() -> Self {
        Self {
            graph: None,
            config: EngineConfig::default(),
            rules: Vec::new(),
            notifier: None,
            capability: None,
            anomalies: None,
            limits: Vec::new(),
        }
    }

    /// Replace the standard transition graph.
    pub fn graph(mut self, graph: TransitionGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Replace the default engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a host orchestration rule alongside the built-ins.
    pub fn rule(mut self, rule: Arc<dyn Rule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Wire a notification collaborator.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Wire a capability predicate for UI-originated transitions.
    pub fn capability(mut self, capability: Arc<dyn Capability>) -> Self {
        self.capability = Some(capability);
        self
    }

    /// Wire an anomaly reporter.
    pub fn anomalies(mut self, anomalies: Arc<dyn AnomalyReporter>) -> Self {
        self.anomalies = Some(anomalies);
        self
    }

    /// Pre-register a concurrency limit.
    pub fn limit(mut self, group: impl Into<LimitGroup>, limit: u32) -> Self {
        self.limits.push((group.into(), limit));
        self
    }

    /// Build the engine.
    ///
    /// The worker registry doubles as the orchestrator's liveness probe, so
    /// crash detection and claim expiry both key off worker heartbeats.
    pub fn build(self) -> Cadence {
        let workers = Arc::new(WorkerRegistry::new(self.config.worker_lease_ttl_chrono()));

        let mut builder = Orchestrator::builder()
            .config(self.config)
            .liveness(Arc::clone(&workers) as Arc<dyn WorkerLiveness>);
        if let Some(graph) = self.graph {
            builder = builder.graph(graph);
        }
        if let Some(notifier) = self.notifier {
            builder = builder.notifier(notifier);
        }
        if let Some(capability) = self.capability {
            builder = builder.capability(capability);
        }
        if let Some(anomalies) = self.anomalies {
            builder = builder.anomalies(anomalies);
        }
        for rule in self.rules {
            builder = builder.rule(rule);
        }

        let engine = Arc::new(builder.build());
        for (group, limit) in self.limits {
            engine.store().limits().set_limit(group, limit);
        }
        Cadence::from_parts(engine, workers)
    }
}

impl Default for CadenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
