//! The legal-transition graph
//!
//! Legal transitions form a directed graph over [`StateKind`]. Run creation
//! is modeled as an entry edge with no source (`None -> Scheduled` in the
//! standard graph); re-running a terminal run is modeled as creating a new
//! run, so terminal kinds have no outgoing edges.

use cadence_core::{Error, Result, StateKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A directed graph of legal state transitions.
///
/// Edges are `(Option<StateKind>, StateKind)` pairs; a `None` source marks an
/// entry edge used when a run is created. Validation is a pure set lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionGraph {
    edges: BTreeSet<(Option<StateKind>, StateKind)>,
}

impl TransitionGraph {
    /// A graph with no edges. Every transition is rejected until edges are
    /// added; mostly useful as a builder starting point in tests.
    pub fn empty() -> Self {
        Self {
            edges: BTreeSet::new(),
        }
    }

    /// Start building a graph from scratch.
    pub fn builder() -> TransitionGraphBuilder {
        TransitionGraphBuilder {
            graph: Self::empty(),
        }
    }

    /// Whether the edge `from -> to` is legal.
    pub fn allows(&self, from: Option<StateKind>, to: StateKind) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Validate a proposed transition.
    ///
    /// Pure predicate: no side effects, no clock reads. Returns
    /// [`Error::InvalidTransition`] for any edge not in the graph.
    pub fn validate(&self, from: Option<StateKind>, to: StateKind) -> Result<()> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(Error::InvalidTransition { from, to })
        }
    }

    /// The legal destinations out of `from`.
    pub fn targets(&self, from: Option<StateKind>) -> Vec<StateKind> {
        self.edges
            .iter()
            .filter(|(f, _)| *f == from)
            .map(|(_, t)| *t)
            .collect()
    }

    /// Number of edges in the graph.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Default for TransitionGraph {
    /// The standard orchestration policy graph.
    ///
    /// - Entry: `(new) -> Scheduled`
    /// - `Scheduled -> Pending | Running | Cancelling | Paused`
    /// - `Pending -> Pending | Scheduled | Running | Cancelling | Paused | Crashed`
    ///   (the self-edge is the queue's claim transition; `Pending ->
    ///   Scheduled` re-pools an abandoned claim)
    /// - `Running -> Completed | Failed | Crashed | Cancelling | Paused`
    /// - `Paused -> Running` (a paused run resumes before it can cancel)
    /// - `Cancelling -> Cancelled`
    /// - Terminal kinds have no outgoing edges.
    fn default() -> Self {
        use StateKind::*;
        Self::builder()
            .allow_entry(Scheduled)
            .allow(Scheduled, Pending)
            .allow(Scheduled, Running)
            .allow(Scheduled, Cancelling)
            .allow(Scheduled, Paused)
            .allow(Pending, Pending)
            .allow(Pending, Scheduled)
            .allow(Pending, Running)
            .allow(Pending, Cancelling)
            .allow(Pending, Paused)
            .allow(Pending, Crashed)
            .allow(Running, Completed)
            .allow(Running, Failed)
            .allow(Running, Crashed)
            .allow(Running, Cancelling)
            .allow(Running, Paused)
            .allow(Paused, Running)
            .allow(Cancelling, Cancelled)
            .build()
    }
}

/// Builder for [`TransitionGraph`].
#[derive(Debug, Clone)]
pub struct TransitionGraphBuilder {
    graph: TransitionGraph,
}

impl TransitionGraphBuilder {
    /// Add the edge `from -> to`.
    pub fn allow(mut self, from: StateKind, to: StateKind) -> Self {
        self.graph.edges.insert((Some(from), to));
        self
    }

    /// Add an entry edge (run creation) into `to`.
    pub fn allow_entry(mut self, to: StateKind) -> Self {
        self.graph.edges.insert((None, to));
        self
    }

    /// Remove the edge `from -> to` if present.
    pub fn disallow(mut self, from: StateKind, to: StateKind) -> Self {
        self.graph.edges.remove(&(Some(from), to));
        self
    }

    /// Finish building.
    pub fn build(self) -> TransitionGraph {
        self.graph
    }
}
