//! Orchestration engine for Cadence
//!
//! This crate coordinates the layers below it into the single transition
//! entry point:
//!
//! ```text
//! read run -> graph validation -> rule pipeline -> store commit
//! ```
//!
//! A rewrite by a rule re-validates the new edge before the commit.
//!
//! The whole sequence is an atomic, retryable unit. An optimistic-lock
//! conflict during an engine-managed proposal triggers a fresh read and a
//! full re-run of the pipeline, up to a bounded retry count; a caller that
//! pinned an explicit expected version gets the conflict surfaced
//! immediately instead.
//!
//! The engine also owns the collaborator seams: notifications on entry into
//! configured states (fire-and-forget), the capability predicate for
//! UI-originated callers, worker liveness for crash detection, and anomaly
//! escalation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod orchestrator;

pub use config::EngineConfig;
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
