//! Core types for the Cadence orchestration engine
//!
//! This crate defines the shared vocabulary used by every other layer:
//! - Identifiers ([`RunId`], [`FlowId`], [`TaskId`], [`DeploymentId`],
//!   [`QueueId`], [`WorkerId`], [`LimitGroup`])
//! - Run states ([`StateKind`], [`State`])
//! - The [`Run`] record and its creation parameters ([`RunSpec`])
//! - Query filters ([`RunFilter`])
//! - Collaborator trait seams ([`Notifier`], [`Capability`],
//!   [`WorkerLiveness`], [`AnomalyReporter`])
//! - The unified [`Error`] type
//!
//! Nothing in this crate performs orchestration. It is pure data plus the
//! trait seams the engine calls out through.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deployment;
pub mod effect;
pub mod error;
pub mod filter;
pub mod run;
pub mod state;
pub mod traits;
pub mod types;

pub use deployment::Deployment;
pub use effect::SideEffect;
pub use error::{Error, Result};
pub use filter::RunFilter;
pub use run::{Parent, Run, RunSpec};
pub use state::{State, StateKind};
pub use traits::{
    AllowAll, AlwaysAlive, AnomalyReporter, Capability, NoopAnomalyReporter, NoopNotifier,
    Notifier, WorkerLiveness,
};
pub use types::{DeploymentId, FlowId, LimitGroup, QueueId, RunId, TaskId, WorkerId};
