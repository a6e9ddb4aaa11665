//! Run store for Cadence
//!
//! This crate implements the persistent record of runs with optimistic
//! concurrency control:
//! - [`RunStore`]: sharded in-memory run map, per-run version counters,
//!   global commit sequence
//! - [`LimitTable`]: the concurrency-limit resource table, mutated only
//!   inside the store's commit critical section
//!
//! A commit presents the version the caller last observed; a mismatch yields
//! [`CommitResult::Conflict`] and the caller re-reads and retries from
//! scratch. The whole propose -> validate -> commit sequence is an atomic,
//! retryable unit — never partially applied.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod limits;
pub mod store;

pub use limits::LimitTable;
pub use store::{CommitResult, RunStore};
