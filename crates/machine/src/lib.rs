//! State machine core for Cadence
//!
//! This crate owns the legal-transition graph for run states. It is a pure
//! validation layer: a predicate over (source, destination) pairs plus the
//! configured edge set, with no side effects and no knowledge of stores,
//! rules, or queues.
//!
//! The edge set is data, not code. [`TransitionGraph::default`] carries the
//! standard orchestration policy; hosts with different lifecycle needs build
//! their own graph with [`TransitionGraph::builder`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod graph;

pub use graph::{TransitionGraph, TransitionGraphBuilder};
