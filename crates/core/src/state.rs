//! Run states
//!
//! A run's status at a point in time is a [`State`]: a [`StateKind`] tag plus
//! a timestamp and optional structured payload. The legal movements between
//! kinds are owned by the transition graph in `cadence-machine`; this module
//! only defines the vocabulary.

use crate::types::WorkerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fixed set of run state kinds.
///
/// Terminal kinds (`Completed`, `Failed`, `Crashed`, `Cancelled`) have no
/// outgoing edges in the standard transition graph; re-running a terminal run
/// is modeled as creating a new run, never as a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateKind {
    /// Created and waiting for its scheduled start time.
    Scheduled,
    /// Eligible for execution; possibly claimed by a worker.
    Pending,
    /// Actively executing on a worker.
    Running,
    /// Finished successfully (terminal).
    Completed,
    /// Finished with an error reported by the run itself (terminal).
    Failed,
    /// Infrastructure-level failure: the worker died or stopped reporting
    /// (terminal).
    Crashed,
    /// Cancellation requested; the worker must observe this and stop.
    Cancelling,
    /// Cancellation acknowledged (terminal).
    Cancelled,
    /// Execution suspended; may resume to `Running`.
    Paused,
}

impl StateKind {
    /// All nine state kinds, in declaration order.
    pub const ALL: [StateKind; 9] = [
        StateKind::Scheduled,
        StateKind::Pending,
        StateKind::Running,
        StateKind::Completed,
        StateKind::Failed,
        StateKind::Crashed,
        StateKind::Cancelling,
        StateKind::Cancelled,
        StateKind::Paused,
    ];

    /// Whether this kind is terminal (no outgoing edges).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StateKind::Completed | StateKind::Failed | StateKind::Crashed | StateKind::Cancelled
        )
    }

    /// Whether a run in this kind can be offered to workers by a queue.
    pub fn is_poolable(&self) -> bool {
        matches!(self, StateKind::Scheduled | StateKind::Pending)
    }

    /// String representation used in logs and wire payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Scheduled => "Scheduled",
            StateKind::Pending => "Pending",
            StateKind::Running => "Running",
            StateKind::Completed => "Completed",
            StateKind::Failed => "Failed",
            StateKind::Crashed => "Crashed",
            StateKind::Cancelling => "Cancelling",
            StateKind::Cancelled => "Cancelled",
            StateKind::Paused => "Paused",
        }
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point-in-time status of a run.
///
/// States are immutable once committed: the store appends them to the run's
/// history and never rewrites past entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The state kind.
    pub kind: StateKind,
    /// When this state was proposed.
    pub timestamp: DateTime<Utc>,
    /// Optional human-readable message (failure reason, cancellation note).
    pub message: Option<String>,
    /// Optional structured payload (result data, error detail).
    pub data: Option<serde_json::Value>,
    /// For `Scheduled` states: the earliest time the run may start.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// For claim-assigned `Pending` and `Running` states: the worker that
    /// holds the run.
    pub assigned_worker: Option<WorkerId>,
}

impl State {
    /// Create a state of the given kind timestamped now, with no payload.
    pub fn new(kind: StateKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
            message: None,
            data: None,
            scheduled_for: None,
            assigned_worker: None,
        }
    }

    /// A `Scheduled` state due at `scheduled_for` (or immediately if `None`).
    pub fn scheduled(scheduled_for: Option<DateTime<Utc>>) -> Self {
        Self {
            scheduled_for,
            ..Self::new(StateKind::Scheduled)
        }
    }

    /// An unassigned `Pending` state.
    pub fn pending() -> Self {
        Self::new(StateKind::Pending)
    }

    /// A `Pending` state assigned to a worker (the claim transition a queue
    /// performs on poll).
    pub fn assigned(worker: WorkerId) -> Self {
        Self {
            assigned_worker: Some(worker),
            ..Self::new(StateKind::Pending)
        }
    }

    /// A `Running` state reported by a worker.
    pub fn running(worker: WorkerId) -> Self {
        Self {
            assigned_worker: Some(worker),
            ..Self::new(StateKind::Running)
        }
    }

    /// A terminal `Completed` state.
    pub fn completed() -> Self {
        Self::new(StateKind::Completed)
    }

    /// A terminal `Failed` state with a reason.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(StateKind::Failed)
        }
    }

    /// A terminal `Crashed` state with a reason.
    pub fn crashed(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(StateKind::Crashed)
        }
    }

    /// A `Cancelling` state (cancellation requested, not yet acknowledged).
    pub fn cancelling() -> Self {
        Self::new(StateKind::Cancelling)
    }

    /// A terminal `Cancelled` state.
    pub fn cancelled() -> Self {
        Self::new(StateKind::Cancelled)
    }

    /// A `Paused` state.
    pub fn paused() -> Self {
        Self::new(StateKind::Paused)
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Override the timestamp (tests and replay paths).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Whether the run is due to start at `now`.
    ///
    /// `Scheduled` states with a future `scheduled_for` are not yet due;
    /// everything else is.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.scheduled_for {
            Some(t) => t <= now,
            None => true,
        }
    }
}
