//! The run store
//!
//! Sharded in-memory map of runs with optimistic concurrency. Reads are
//! lock-free-ish via DashMap; a commit holds the run's shard entry for the
//! duration of its critical section so the version check, the limit-table
//! mutation, and the history append are atomic with respect to every other
//! commit on the same run.
//!
//! ## Commit sequence
//!
//! ```text
//! 1. Look up the run (entry lock held from here)
//! 2. Version check — mismatch returns Conflict{actual}
//! 3. Apply staged side effects to the limit table (all-or-nothing) —
//!    a full group returns SlotExhausted{group}
//! 4. Allocate the global commit sequence number
//! 5. Append the new state to history, bump version, stamp updated_at
//! 6. Release the entry lock, return Committed{version, sequence}
//! ```
//!
//! Lock order is always run entry -> limit table; nothing acquires in the
//! reverse order, so the two locks cannot deadlock.

use crate::limits::LimitTable;
use cadence_core::{Error, Result, Run, RunFilter, RunId, SideEffect, State};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of a commit attempt.
///
/// `Conflict` and `SlotExhausted` are expected outcomes under contention, not
/// errors: the orchestration layer maps them to a retry and to backpressure
/// respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// The transition was persisted.
    Committed {
        /// The run's new version.
        version: u64,
        /// Global commit sequence number; totally orders commits across runs.
        sequence: u64,
    },
    /// The caller's expected version is stale.
    Conflict {
        /// The version actually in the store.
        actual: u64,
    },
    /// A staged slot acquire found its group full. Nothing was applied.
    SlotExhausted {
        /// The group that had no headroom.
        group: cadence_core::LimitGroup,
    },
}

/// The persistent record of runs.
#[derive(Debug, Default)]
pub struct RunStore {
    runs: DashMap<RunId, Run>,
    limits: LimitTable,
    /// Global commit sequence. Monotonic; gaps never occur because the
    /// number is allocated only after the version check and slot acquire
    /// have both passed.
    sequence: AtomicU64,
}

impl RunStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly created run.
    ///
    /// Fails with [`Error::AlreadyExists`] on id collision and
    /// [`Error::Internal`] if the run's history invariant does not hold.
    pub fn insert(&self, run: Run) -> Result<()> {
        if !run.history_is_consistent() {
            return Err(Error::Internal(format!(
                "run {} current state does not match last history entry",
                run.id
            )));
        }
        match self.runs.entry(run.id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(Error::AlreadyExists(run.id.to_string()))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                tracing::debug!(run = %run.id, parent = %run.parent, "run inserted");
                slot.insert(run);
                Ok(())
            }
        }
    }

    /// Read a run by id (cloned snapshot).
    pub fn get(&self, id: &RunId) -> Result<Run> {
        self.runs
            .get(id)
            .map(|r| r.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Query runs matching a filter, ordered by creation time then id,
    /// paginated by the filter's offset/limit.
    pub fn query(&self, filter: &RunFilter) -> Vec<Run> {
        let mut matches: Vec<Run> = self
            .runs
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        matches
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Commit a state transition with optimistic concurrency.
    ///
    /// `expected_version` must be the version the caller read; a mismatch
    /// returns `Conflict` and applies nothing. Staged `effects` are applied
    /// to the limit table in the same critical section — exactly when the
    /// transition commits, never otherwise.
    pub fn commit(
        &self,
        id: &RunId,
        expected_version: u64,
        new_state: State,
        effects: &[SideEffect],
    ) -> Result<CommitResult> {
        let mut entry = self
            .runs
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let run = entry.value_mut();

        if run.version != expected_version {
            return Ok(CommitResult::Conflict {
                actual: run.version,
            });
        }

        if let Err(group) = self.limits.apply(effects) {
            tracing::debug!(run = %id, group = %group, "commit refused: limit group full");
            return Ok(CommitResult::SlotExhausted { group });
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        run.history.push(new_state.clone());
        run.state = new_state;
        run.version += 1;
        run.updated_at = Utc::now();

        tracing::debug!(
            run = %id,
            state = %run.state.kind,
            version = run.version,
            sequence,
            "transition committed"
        );
        Ok(CommitResult::Committed {
            version: run.version,
            sequence,
        })
    }

    /// The concurrency-limit resource table.
    pub fn limits(&self) -> &LimitTable {
        &self.limits
    }

    /// Number of runs in the store.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the store holds no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
