//! The run record
//!
//! A [`Run`] is one execution attempt of a schedulable unit of work. The
//! record carries its full state history (append-only) and an optimistic
//! concurrency version. Two invariants hold at all times:
//!
//! - `state` equals the last entry of `history`
//! - `history` is never rewritten, only appended to by the store's commit

use crate::state::{State, StateKind};
use crate::types::{DeploymentId, FlowId, LimitGroup, RunId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a run is an execution attempt of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parent {
    /// An ad-hoc flow execution.
    Flow(FlowId),
    /// A task within a flow.
    Task(TaskId),
    /// A registered deployment.
    Deployment(DeploymentId),
}

impl std::fmt::Display for Parent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parent::Flow(id) => write!(f, "flow/{id}"),
            Parent::Task(id) => write!(f, "task/{id}"),
            Parent::Deployment(id) => write!(f, "deployment/{id}"),
        }
    }
}

/// One execution attempt of a flow, task, or deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Unique id.
    pub id: RunId,
    /// What this run executes.
    pub parent: Parent,
    /// Current state. Always the last entry of `history`.
    pub state: State,
    /// Ordered state history, oldest first. Append-only.
    pub history: Vec<State>,
    /// Free-form tags; work-queue filters match on these.
    pub tags: BTreeSet<String>,
    /// Concurrency-limit groups this run draws from when entering `Running`.
    pub limit_groups: Vec<LimitGroup>,
    /// Optimistic concurrency version. Incremented by every committed
    /// transition; a commit must present the version it last observed.
    pub version: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last committed transition.
    pub updated_at: DateTime<Utc>,
}

impl Run {
    /// Materialize a new run from its creation parameters.
    ///
    /// The run starts at version 1 with a single `Scheduled` history entry.
    pub fn create(spec: RunSpec) -> Self {
        let now = Utc::now();
        let state = State::scheduled(spec.scheduled_for);
        Run {
            id: RunId::new(),
            parent: spec.parent,
            state: state.clone(),
            history: vec![state],
            tags: spec.tags,
            limit_groups: spec.limit_groups,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// The current state kind.
    pub fn state_kind(&self) -> StateKind {
        self.state.kind
    }

    /// Whether the run has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.kind.is_terminal()
    }

    /// Check the history invariant: current state equals the last history
    /// entry. Used by the store on insert and by tests after every operation.
    pub fn history_is_consistent(&self) -> bool {
        self.history.last() == Some(&self.state)
    }

    /// The worker currently associated with this run, if any.
    pub fn assigned_worker(&self) -> Option<&crate::types::WorkerId> {
        self.state.assigned_worker.as_ref()
    }
}

/// Parameters for creating a run.
///
/// Built with the fluent methods and handed to the engine's `create_run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// What the run executes.
    pub parent: Parent,
    /// Tags for queue-filter matching.
    pub tags: BTreeSet<String>,
    /// Concurrency-limit groups.
    pub limit_groups: Vec<LimitGroup>,
    /// Earliest start time. `None` means runnable immediately.
    pub scheduled_for: Option<DateTime<Utc>>,
}

impl RunSpec {
    /// A run spec for the given parent with no tags, groups, or start time.
    pub fn new(parent: Parent) -> Self {
        Self {
            parent,
            tags: BTreeSet::new(),
            limit_groups: Vec::new(),
            scheduled_for: None,
        }
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add a concurrency-limit group.
    pub fn with_limit_group(mut self, group: impl Into<LimitGroup>) -> Self {
        self.limit_groups.push(group.into());
        self
    }

    /// Set the earliest start time.
    pub fn scheduled_at(mut self, when: DateTime<Utc>) -> Self {
        self.scheduled_for = Some(when);
        self
    }
}
