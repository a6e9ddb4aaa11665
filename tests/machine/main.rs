//! Transition Graph Test Suite
//!
//! Verifies the standard transition graph edge-by-edge, the closure of
//! terminal states, and custom graph parameterization through the builder.
//!
//! ```bash
//! cargo test --test machine
//! ```

use cadence::{StateKind, TransitionGraph};

use StateKind::*;

/// Every edge of the standard graph, as (from, to) pairs. `None` is the
/// entry pseudo-state for run creation.
fn standard_edges() -> Vec<(Option<StateKind>, StateKind)> {
    vec![
        (None, Scheduled),
        (Some(Scheduled), Pending),
        (Some(Scheduled), Running),
        (Some(Scheduled), Cancelling),
        (Some(Scheduled), Paused),
        (Some(Pending), Pending),
        (Some(Pending), Scheduled),
        (Some(Pending), Running),
        (Some(Pending), Cancelling),
        (Some(Pending), Paused),
        (Some(Pending), Crashed),
        (Some(Running), Completed),
        (Some(Running), Failed),
        (Some(Running), Crashed),
        (Some(Running), Cancelling),
        (Some(Running), Paused),
        (Some(Paused), Running),
        (Some(Cancelling), Cancelled),
    ]
}

// =============================================================================
// STANDARD GRAPH
// =============================================================================

#[test]
fn standard_graph_allows_exactly_the_standard_edges() {
    let graph = TransitionGraph::default();
    let edges = standard_edges();

    // Exhaustive over the full (from, to) space, entry edges included.
    let mut froms: Vec<Option<StateKind>> = vec![None];
    froms.extend(StateKind::ALL.into_iter().map(Some));

    for from in froms {
        for to in StateKind::ALL {
            let expected = edges.contains(&(from, to));
            assert_eq!(
                graph.allows(from, to),
                expected,
                "edge {from:?} -> {to:?} should be allows={expected}"
            );
        }
    }
    assert_eq!(graph.len(), edges.len());
}

#[test]
fn terminal_states_have_no_outgoing_edges() {
    let graph = TransitionGraph::default();
    for from in StateKind::ALL.into_iter().filter(StateKind::is_terminal) {
        for to in StateKind::ALL {
            assert!(
                !graph.allows(Some(from), to),
                "terminal {from} must not allow -> {to}"
            );
        }
    }
}

#[test]
fn cancelling_is_entered_only_from_active_states() {
    let graph = TransitionGraph::default();
    let sources: Vec<StateKind> = StateKind::ALL
        .into_iter()
        .filter(|from| graph.allows(Some(*from), Cancelling))
        .collect();
    assert_eq!(sources, vec![Scheduled, Pending, Running]);
}

#[test]
fn validate_reports_the_offending_edge() {
    let graph = TransitionGraph::default();
    let err = graph.validate(Some(Completed), Running).unwrap_err();
    assert!(err.is_invalid_transition());

    assert!(graph.validate(Some(Scheduled), Pending).is_ok());
    assert!(graph.validate(None, Scheduled).is_ok());
}

// =============================================================================
// CUSTOM GRAPHS
// =============================================================================

#[test]
fn builder_composes_a_strict_pipeline_graph() {
    // A host with a linear lifecycle and no pause or cancel support.
    let graph = TransitionGraph::builder()
        .allow_entry(Scheduled)
        .allow(Scheduled, Pending)
        .allow(Pending, Running)
        .allow(Running, Completed)
        .allow(Running, Failed)
        .build();

    assert!(graph.allows(None, Scheduled));
    assert!(graph.allows(Some(Pending), Running));
    assert!(!graph.allows(Some(Running), Paused));
    assert!(!graph.allows(Some(Scheduled), Cancelling));
    assert_eq!(graph.len(), 5);
}

#[test]
fn disallow_prunes_an_added_edge() {
    let graph = TransitionGraph::builder()
        .allow(Running, Completed)
        .allow(Running, Failed)
        .disallow(Running, Failed)
        .build();
    assert!(graph.allows(Some(Running), Completed));
    assert!(!graph.allows(Some(Running), Failed));
}

#[test]
fn empty_graph_refuses_everything() {
    let graph = TransitionGraph::empty();
    assert!(graph.is_empty());
    assert!(!graph.allows(None, Scheduled));
    assert!(!graph.allows(Some(Scheduled), Pending));
}
