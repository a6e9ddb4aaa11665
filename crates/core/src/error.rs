//! Unified error types for Cadence.
//!
//! This is the canonical error type for all orchestration operations. Policy
//! vetoes and backpressure are *not* errors — they are `Outcome` variants on
//! the transition path — so this enum covers structural and operational
//! failures only.

use crate::state::StateKind;
use thiserror::Error;

fn fmt_source(from: &Option<StateKind>) -> &'static str {
    match from {
        Some(kind) => kind.as_str(),
        None => "(new)",
    }
}

/// All Cadence errors.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The proposed edge is not in the legal-transition graph.
    #[error("invalid transition: {} -> {to}", fmt_source(.from))]
    InvalidTransition {
        /// Source state (`None` for run creation).
        from: Option<StateKind>,
        /// Proposed destination state.
        to: StateKind,
    },

    /// Optimistic-lock collision: the run changed under the caller.
    /// Retryable immediately with a fresh read.
    #[error("conflict: expected version {expected}, found {actual}")]
    Conflict {
        /// The version the caller observed.
        expected: u64,
        /// The version actually in the store.
        actual: u64,
    },

    /// Unknown run, queue, or deployment id.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate create.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Capability check denied the request. Distinct from orchestration
    /// rejections: the pipeline never saw the proposal.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Bug or invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for Cadence operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether retrying with fresh data may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Whether this is an optimistic-lock collision.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Whether this is a structural transition rejection.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition { .. })
    }
}
