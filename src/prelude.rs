//! Convenient imports for Cadence.
//!
//! Re-exports the types most embeddings need so a single import gets you
//! started:
//!
//! ```ignore
//! use cadence::prelude::*;
//!
//! let cadence = Cadence::in_memory();
//! let run = cadence.runs.create(RunSpec::new(Parent::Flow(FlowId::new())))?;
//! ```

// Main entry point
pub use crate::cadence::{Cadence, CadenceBuilder};

// Error handling
pub use cadence_core::{Error, Result};

// Handles
pub use crate::handles::{Deployments, Queues, Runs, Workers};

// Run vocabulary
pub use cadence_core::{
    Parent, Run, RunFilter, RunSpec, State, StateKind,
};

// Ids
pub use cadence_core::{DeploymentId, FlowId, LimitGroup, QueueId, RunId, TaskId, WorkerId};

// Orchestration outcomes and configuration
pub use cadence_engine::EngineConfig;
pub use cadence_policy::{Outcome, RejectionReason};

// Queues
pub use cadence_queue::{QueueFilter, WorkQueue};

// Re-export serde_json for payload construction
pub use serde_json::json;
