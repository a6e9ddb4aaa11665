//! Run query filters
//!
//! [`RunFilter`] is the read-side query language shared by the UI-facing
//! query API and the scheduler's candidate scans. Matching is conjunctive:
//! every populated field must hold.

use crate::run::{Parent, Run};
use crate::state::StateKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter over runs.
///
/// An empty filter matches every run. Results are ordered by creation time
/// (oldest first) and paginated with `offset`/`limit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFilter {
    /// Match runs whose current state kind is in this set.
    pub states: Option<Vec<StateKind>>,
    /// Match runs carrying all of these tags.
    pub tags: Vec<String>,
    /// Match runs with exactly this parent.
    pub parent: Option<Parent>,
    /// Match runs scheduled at or before this instant (runs with no
    /// scheduled time count as due).
    pub scheduled_before: Option<DateTime<Utc>>,
    /// Match runs scheduled at or after this instant.
    pub scheduled_after: Option<DateTime<Utc>>,
    /// Skip the first N matches.
    pub offset: usize,
    /// Return at most N matches.
    pub limit: Option<usize>,
}

impl RunFilter {
    /// A filter matching every run.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given state kinds.
    pub fn with_states(mut self, states: impl IntoIterator<Item = StateKind>) -> Self {
        self.states = Some(states.into_iter().collect());
        self
    }

    /// Require a tag (repeatable; all required tags must be present).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Restrict to runs of one parent.
    pub fn with_parent(mut self, parent: Parent) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Restrict to runs due at or before `when`.
    pub fn scheduled_before(mut self, when: DateTime<Utc>) -> Self {
        self.scheduled_before = Some(when);
        self
    }

    /// Restrict to runs scheduled at or after `when`.
    pub fn scheduled_after(mut self, when: DateTime<Utc>) -> Self {
        self.scheduled_after = Some(when);
        self
    }

    /// Cap the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` results.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether a run matches every populated predicate.
    pub fn matches(&self, run: &Run) -> bool {
        if let Some(states) = &self.states {
            if !states.contains(&run.state.kind) {
                return false;
            }
        }
        if !self.tags.iter().all(|t| run.tags.contains(t)) {
            return false;
        }
        if let Some(parent) = &self.parent {
            if run.parent != *parent {
                return false;
            }
        }
        if let Some(before) = self.scheduled_before {
            if !run.state.is_due(before) {
                return false;
            }
        }
        if let Some(after) = self.scheduled_after {
            match run.state.scheduled_for {
                Some(t) if t >= after => {}
                _ => return false,
            }
        }
        true
    }
}
