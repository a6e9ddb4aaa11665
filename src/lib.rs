//! # Cadence
//!
//! Embeddable run-state orchestration engine.
//!
//! Cadence manages the lifecycle of runs (executions of flows, tasks, and
//! deployments) through a fixed state machine, a policy rule pipeline, an
//! optimistically-versioned run store, and work queues that match eligible
//! runs to polling workers.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cadence::prelude::*;
//!
//! // An in-memory engine with the standard transition graph.
//! let cadence = Cadence::in_memory();
//!
//! // Create a run and a queue serving it.
//! let run = cadence.runs.create(RunSpec::new(Parent::Flow(FlowId::new())))?;
//! let queue = cadence.queues.create("default", QueueFilter::all())?;
//!
//! // A worker polls, claims, and reports progress.
//! let worker = WorkerId::new("worker-1");
//! let batch = cadence.queues.poll(&queue.id, &worker, 1)?;
//! cadence.runs.transition(&run.id, State::running(worker))?;
//! cadence.runs.transition(&run.id, State::completed())?;
//! ```
//!
//! ## Layers
//!
//! 1. **Simple** - the [`Cadence`] handles: `cadence.runs.transition(...)`
//! 2. **Configured** - [`Cadence::builder`]: custom graph, rules, limits,
//!    notifier, capability checks
//! 3. **Full control** - the member crates directly: `cadence-engine`'s
//!    [`Orchestrator`], `cadence-store`'s `RunStore`
//!
//! ## Handles
//!
//! - [`Runs`] - run creation, queries, and transition proposals
//! - [`Queues`] - work queue registry, polling, sweepers
//! - [`Deployments`] - deployment registry and pause/resume
//! - [`Workers`] - worker heartbeats and liveness

#![warn(missing_docs)]

mod cadence;
mod handles;

pub mod prelude;

// Re-export the main entry points
pub use crate::cadence::{Cadence, CadenceBuilder};
pub use crate::handles::{Deployments, Queues, Runs, Workers};

// Re-export the vocabulary the handles speak
pub use cadence_core::{
    Deployment, DeploymentId, Error, FlowId, LimitGroup, Parent, QueueId, Result, Run, RunFilter,
    RunId, RunSpec, SideEffect, State, StateKind, TaskId, WorkerId,
};
pub use cadence_engine::{EngineConfig, Orchestrator};
pub use cadence_machine::{TransitionGraph, TransitionGraphBuilder};
pub use cadence_policy::{Outcome, RejectionReason, Rule, RuleDecision, RuleScope};
pub use cadence_queue::{Claim, QueueFilter, QueueService, WorkQueue, WorkerRegistry};
pub use cadence_store::{CommitResult, RunStore};

// Collaborator seams, for hosts that wire their own
pub use cadence_core::{AnomalyReporter, Capability, Notifier, WorkerLiveness};
