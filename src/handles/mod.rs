//! Focused operation handles
//!
//! Each handle wraps one area of the engine and is accessed as a field of
//! [`Cadence`](crate::Cadence): `cadence.runs`, `cadence.queues`,
//! `cadence.deployments`, `cadence.workers`.

mod deployments;
mod queues;
mod runs;
mod workers;

pub use deployments::Deployments;
pub use queues::Queues;
pub use runs::Runs;
pub use workers::Workers;
