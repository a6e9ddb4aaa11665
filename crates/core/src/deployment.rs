//! Deployment records
//!
//! A deployment is a registered, schedulable flow. Runs reference their
//! deployment through [`Parent::Deployment`](crate::run::Parent); work-queue
//! filters may select runs by deployment id. Queue membership is always
//! computed from the filter, never stored on the run or the deployment.

use crate::types::DeploymentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A registered, schedulable flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique id.
    pub id: DeploymentId,
    /// Human-readable name, unique per registry.
    pub name: String,
    /// Tags applied to runs created from this deployment.
    pub tags: BTreeSet<String>,
    /// While paused, the scheduler offers none of this deployment's runs.
    pub paused: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl Deployment {
    /// Register a new deployment.
    pub fn new(name: impl Into<String>, tags: BTreeSet<String>) -> Self {
        Self {
            id: DeploymentId::new(),
            name: name.into(),
            tags,
            paused: false,
            created_at: Utc::now(),
        }
    }
}
