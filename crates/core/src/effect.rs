//! Staged transition side effects
//!
//! Rules do not mutate shared resources while they evaluate. They stage
//! [`SideEffect`]s on the transition context; the store applies the staged
//! effects atomically with the state commit, so an effect is visible exactly
//! when (and only when) its transition is.

use crate::types::LimitGroup;
use serde::{Deserialize, Serialize};

/// A resource mutation staged by a rule, applied at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffect {
    /// Take one slot from a concurrency-limit group. Applied all-or-nothing
    /// with every other staged acquire; a full group aborts the commit with a
    /// slot-exhausted result instead of committing a limit overshoot.
    AcquireSlot(LimitGroup),
    /// Return one slot to a concurrency-limit group.
    ReleaseSlot(LimitGroup),
}

impl std::fmt::Display for SideEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SideEffect::AcquireSlot(g) => write!(f, "acquire-slot({g})"),
            SideEffect::ReleaseSlot(g) => write!(f, "release-slot({g})"),
        }
    }
}
