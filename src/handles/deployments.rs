//! Deployment operations
//!
//! Access via `cadence.deployments`.

use cadence_core::{Deployment, DeploymentId, Result};
use cadence_queue::QueueService;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Deployment registry operations.
pub struct Deployments {
    service: Arc<QueueService>,
}

impl Deployments {
    pub(crate) fn new(service: Arc<QueueService>) -> Self {
        Self { service }
    }

    /// Register a deployment. Names are unique.
    pub fn create(&self, name: impl Into<String>, tags: BTreeSet<String>) -> Result<Deployment> {
        self.service.deployments().create(name, tags)
    }

    /// Read a deployment.
    pub fn get(&self, id: &DeploymentId) -> Result<Deployment> {
        self.service.deployments().get(id)
    }

    /// List deployments, ordered by name.
    pub fn list(&self) -> Vec<Deployment> {
        self.service.deployments().list()
    }

    /// Pause a deployment; its runs stop being offered to workers.
    pub fn pause(&self, id: &DeploymentId) -> Result<()> {
        self.service.deployments().pause(id)
    }

    /// Resume a paused deployment.
    pub fn resume(&self, id: &DeploymentId) -> Result<()> {
        self.service.deployments().resume(id)
    }
}
