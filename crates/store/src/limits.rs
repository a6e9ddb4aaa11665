//! Concurrency-limit resource table
//!
//! One active-count per limit group, owned by the store. The table is only
//! mutated through [`LimitTable::apply`], which the store calls inside its
//! commit critical section — a limit counter never moves unless the state
//! transition that staged it commits in the same step.
//!
//! Groups without a configured limit are unlimited: acquires always succeed
//! and the active count is still tracked for observability.

use cadence_core::{LimitGroup, SideEffect};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct GroupState {
    /// Configured ceiling. `None` means unlimited.
    limit: Option<u32>,
    /// Runs currently holding a slot.
    active: u32,
}

/// The limit-group resource table.
///
/// A single mutex guards the whole table: acquire-check-and-increment must be
/// atomic per group, and a commit may touch several groups at once
/// (all-or-nothing).
#[derive(Debug, Default)]
pub struct LimitTable {
    groups: Mutex<HashMap<LimitGroup, GroupState>>,
}

impl LimitTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure (or reconfigure) a group's limit.
    ///
    /// Lowering a limit below the current active count does not evict
    /// holders; the group simply admits nothing new until it drains.
    pub fn set_limit(&self, group: LimitGroup, limit: u32) {
        let mut groups = self.groups.lock();
        groups
            .entry(group)
            .and_modify(|g| g.limit = Some(limit))
            .or_insert(GroupState {
                limit: Some(limit),
                active: 0,
            });
    }

    /// Remove a group's limit, making it unlimited. The active count is kept.
    pub fn remove_limit(&self, group: &LimitGroup) {
        let mut groups = self.groups.lock();
        if let Some(g) = groups.get_mut(group) {
            g.limit = None;
        }
    }

    /// The configured limit for a group, if any.
    pub fn limit(&self, group: &LimitGroup) -> Option<u32> {
        self.groups.lock().get(group).and_then(|g| g.limit)
    }

    /// Runs currently holding a slot in the group.
    pub fn active(&self, group: &LimitGroup) -> u32 {
        self.groups.lock().get(group).map(|g| g.active).unwrap_or(0)
    }

    /// Whether the group can admit one more run.
    ///
    /// Advisory only: the authoritative check is the atomic acquire inside
    /// [`apply`](Self::apply). Rules use this as a fast-path probe to return
    /// backpressure before staging anything.
    pub fn has_headroom(&self, group: &LimitGroup) -> bool {
        let groups = self.groups.lock();
        match groups.get(group) {
            Some(g) => match g.limit {
                Some(limit) => g.active < limit,
                None => true,
            },
            None => true,
        }
    }

    /// Apply a batch of staged effects atomically.
    ///
    /// All acquires succeed or none do: on the first full group, every
    /// acquire already taken in this batch is rolled back and the full
    /// group's name is returned. Releases never fail; releasing an empty
    /// group is a logged no-op (it indicates a rule staged an unmatched
    /// release).
    pub fn apply(&self, effects: &[SideEffect]) -> Result<(), LimitGroup> {
        let mut groups = self.groups.lock();
        let mut acquired: Vec<&LimitGroup> = Vec::new();

        for effect in effects {
            match effect {
                SideEffect::AcquireSlot(group) => {
                    let g = groups.entry(group.clone()).or_insert(GroupState {
                        limit: None,
                        active: 0,
                    });
                    let full = matches!(g.limit, Some(limit) if g.active >= limit);
                    if full {
                        for taken in acquired {
                            if let Some(g) = groups.get_mut(taken) {
                                g.active -= 1;
                            }
                        }
                        return Err(group.clone());
                    }
                    g.active += 1;
                    acquired.push(group);
                }
                SideEffect::ReleaseSlot(group) => match groups.get_mut(group) {
                    Some(g) if g.active > 0 => g.active -= 1,
                    _ => {
                        tracing::warn!(group = %group, "release without matching acquire");
                    }
                },
            }
        }
        Ok(())
    }
}
