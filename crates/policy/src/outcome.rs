//! Transition outcomes
//!
//! The result of proposing a transition. Rejections and delays are ordinary
//! outcomes, not errors: the caller's input was understood and answered.

use cadence_core::{State, StateKind};
use std::time::Duration;

/// Why a proposal was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The edge is not in the legal-transition graph (structural,
    /// non-retryable).
    InvalidTransition {
        /// Source state.
        from: StateKind,
        /// Proposed destination.
        to: StateKind,
    },
    /// A rule vetoed the proposal (non-retryable without changed input).
    Policy {
        /// The rule that rejected.
        rule: String,
        /// The rule's stated reason, surfaced verbatim to UI/CLI callers.
        message: String,
    },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::InvalidTransition { from, to } => {
                write!(f, "invalid transition: {from} -> {to}")
            }
            RejectionReason::Policy { rule, message } => write!(f, "[{rule}] {message}"),
        }
    }
}

/// The answer to a transition proposal.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The transition (possibly rewritten by rules) was committed.
    Accepted {
        /// The state that was actually persisted.
        state: State,
        /// The run's new version.
        version: u64,
    },
    /// The transition was refused. Retrying without changed input will not
    /// succeed.
    Rejected {
        /// Why.
        reason: RejectionReason,
    },
    /// Not yet — retry after the indicated interval. Used for
    /// concurrency-limit backpressure. Workers must apply the backoff, not
    /// busy-loop.
    Delayed {
        /// How long to wait before retrying.
        retry_after: Duration,
    },
}

impl Outcome {
    /// Whether the transition committed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    /// Whether the transition was refused.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected { .. })
    }

    /// Whether the transition should be retried later.
    pub fn is_delayed(&self) -> bool {
        matches!(self, Outcome::Delayed { .. })
    }

    /// The committed state, if accepted.
    pub fn accepted_state(&self) -> Option<&State> {
        match self {
            Outcome::Accepted { state, .. } => Some(state),
            _ => None,
        }
    }
}
