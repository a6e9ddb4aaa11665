//! Work queues and scheduling for Cadence
//!
//! A work queue is a filtered, capacity-limited channel matching eligible
//! runs to polling workers. Membership is computed from the queue's filter at
//! scan time — never stored on the run — so deleting a queue can not dangle.
//!
//! The crate owns:
//! - [`WorkQueue`]/[`QueueFilter`]: queue records and membership predicates
//! - [`QueueService`]: poll/claim, sweepers, queue and deployment registries
//! - [`ClaimTable`]: exclusive claims handed out by poll
//! - [`WorkerRegistry`]: heartbeat leases backing the liveness seam
//!
//! Claiming goes through the orchestration engine like every other
//! transition (a claim is `-> Pending(assigned)`), so concurrency limits and
//! host rules apply to claims too.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod claims;
pub mod deployments;
pub mod queue;
pub mod service;
pub mod workers;

pub use claims::{Claim, ClaimTable};
pub use deployments::DeploymentRegistry;
pub use queue::{QueueFilter, WorkQueue};
pub use service::QueueService;
pub use workers::WorkerRegistry;
