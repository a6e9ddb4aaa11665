//! Deployment registry
//!
//! Registered, schedulable flows. A paused deployment's runs stay in the
//! store but are skipped by every poll scan until the deployment resumes.

use cadence_core::{Deployment, DeploymentId, Error, Result};
use dashmap::DashMap;
use std::collections::BTreeSet;

/// In-process deployment registry.
#[derive(Debug, Default)]
pub struct DeploymentRegistry {
    inner: DashMap<DeploymentId, Deployment>,
}

impl DeploymentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a deployment. Names must be unique.
    pub fn create(&self, name: impl Into<String>, tags: BTreeSet<String>) -> Result<Deployment> {
        let name = name.into();
        if self.inner.iter().any(|d| d.name == name) {
            return Err(Error::AlreadyExists(format!("deployment '{name}'")));
        }
        let deployment = Deployment::new(name, tags);
        self.inner.insert(deployment.id, deployment.clone());
        tracing::info!(deployment = %deployment.id, name = %deployment.name, "deployment registered");
        Ok(deployment)
    }

    /// Read a deployment.
    pub fn get(&self, id: &DeploymentId) -> Result<Deployment> {
        self.inner
            .get(id)
            .map(|d| d.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// List all deployments, ordered by name.
    pub fn list(&self) -> Vec<Deployment> {
        let mut all: Vec<Deployment> = self.inner.iter().map(|d| d.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Pause a deployment.
    pub fn pause(&self, id: &DeploymentId) -> Result<()> {
        self.set_paused(id, true)
    }

    /// Resume a paused deployment.
    pub fn resume(&self, id: &DeploymentId) -> Result<()> {
        self.set_paused(id, false)
    }

    /// Whether a deployment is currently paused. Unknown deployments are not
    /// paused (ad-hoc runs have no deployment to pause).
    pub fn is_paused(&self, id: &DeploymentId) -> bool {
        self.inner.get(id).map(|d| d.paused).unwrap_or(false)
    }

    fn set_paused(&self, id: &DeploymentId, paused: bool) -> Result<()> {
        let mut entry = self
            .inner
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        entry.paused = paused;
        Ok(())
    }
}
