//! Work queue records and membership filters

use cadence_core::{DeploymentId, Parent, QueueId, Run};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};

/// Which runs a queue serves.
///
/// Both predicates are conjunctive; an empty filter serves every run. A run
/// belongs to at most one queue at a time by convention of the host's filter
/// design; the engine does not enforce disjointness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueFilter {
    /// Runs must carry all of these tags.
    pub tags: BTreeSet<String>,
    /// If non-empty, runs must belong to one of these deployments.
    pub deployments: HashSet<DeploymentId>,
}

impl QueueFilter {
    /// A filter serving every run.
    pub fn all() -> Self {
        Self::default()
    }

    /// Require a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Serve a deployment.
    pub fn with_deployment(mut self, id: DeploymentId) -> Self {
        self.deployments.insert(id);
        self
    }

    /// Whether a run is served by this queue.
    pub fn matches(&self, run: &Run) -> bool {
        if !self.tags.iter().all(|t| run.tags.contains(t)) {
            return false;
        }
        if !self.deployments.is_empty() {
            match run.parent {
                Parent::Deployment(id) => {
                    if !self.deployments.contains(&id) {
                        return false;
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

/// A filtered, capacity-limited channel matching eligible runs to workers.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    /// Unique id.
    pub id: QueueId,
    /// Human-readable name, unique per registry.
    pub name: String,
    /// Which runs this queue serves.
    pub filter: QueueFilter,
    /// Max runs from this queue concurrently `Running`. `None` = unlimited.
    pub concurrency_limit: Option<u32>,
    /// Ordering among queues; lower is offered first when a worker polls
    /// several queues.
    pub priority: u32,
    /// A paused queue answers every poll with no work.
    pub paused: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl WorkQueue {
    /// Create a queue.
    pub fn new(name: impl Into<String>, filter: QueueFilter) -> Self {
        Self {
            id: QueueId::new(),
            name: name.into(),
            filter,
            concurrency_limit: None,
            priority: 100,
            paused: false,
            created_at: Utc::now(),
        }
    }

    /// Set the concurrency limit.
    pub fn with_concurrency_limit(mut self, limit: u32) -> Self {
        self.concurrency_limit = Some(limit);
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}
