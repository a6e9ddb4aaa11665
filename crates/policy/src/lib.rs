//! Orchestration rule pipeline for Cadence
//!
//! A transition proposal passes through an ordered sequence of [`Rule`]s
//! before it may commit. Each rule declares the (from, to) state pairs it
//! applies to; the [`Pipeline`] resolves a dispatch table at construction so
//! only relevant rules run per transition. Rules may pass, rewrite the
//! proposed state, reject, or request a delay; they stage resource side
//! effects on the [`TransitionContext`] rather than mutating anything
//! directly, and the store applies staged effects atomically with the commit.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod outcome;
pub mod pipeline;
pub mod rule;
pub mod rules;

pub use context::TransitionContext;
pub use outcome::{Outcome, RejectionReason};
pub use pipeline::{Pipeline, PipelineVerdict};
pub use rule::{Rule, RuleDecision, RuleScope};
pub use rules::{ConcurrencyLimitRule, CrashDetectionRule, LimitProbe, ReleaseConcurrencySlots};
