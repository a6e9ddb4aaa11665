//! The rule trait
//!
//! A rule is a named, ordered policy unit. Rules are stateless with respect
//! to the run: they read the current and proposed state, may rewrite the
//! proposal, reject it, or request a delay, and may stage side effects and
//! scratch values on the context. Anything a rule stages takes effect only if
//! the transition ultimately commits.

use crate::context::TransitionContext;
use cadence_core::{State, StateKind};
use std::collections::HashSet;
use std::time::Duration;

/// Which (from, to) pairs a rule applies to.
///
/// `None` for either side means "any". The pipeline resolves scopes into a
/// dispatch table at construction, so scope checks never run per transition.
#[derive(Debug, Clone, Default)]
pub struct RuleScope {
    from: Option<HashSet<StateKind>>,
    to: Option<HashSet<StateKind>>,
}

impl RuleScope {
    /// Applies to every transition.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restrict the source states.
    pub fn from(mut self, states: impl IntoIterator<Item = StateKind>) -> Self {
        self.from = Some(states.into_iter().collect());
        self
    }

    /// Restrict the destination states.
    pub fn to(mut self, states: impl IntoIterator<Item = StateKind>) -> Self {
        self.to = Some(states.into_iter().collect());
        self
    }

    /// Whether the scope covers the pair.
    pub fn matches(&self, from: StateKind, to: StateKind) -> bool {
        let from_ok = self.from.as_ref().map_or(true, |set| set.contains(&from));
        let to_ok = self.to.as_ref().map_or(true, |set| set.contains(&to));
        from_ok && to_ok
    }
}

/// What a rule decided about the proposal.
#[derive(Debug, Clone)]
pub enum RuleDecision {
    /// No objection; continue with the next rule.
    Proceed,
    /// Replace the proposed state and re-dispatch against the new
    /// destination (e.g. redirect a reported completion into `Crashed`).
    Rewrite(State),
    /// Veto the transition. Short-circuits the pipeline.
    Reject {
        /// Reason surfaced verbatim to the caller.
        message: String,
    },
    /// Backpressure: retry after the interval. Short-circuits the pipeline.
    Delay(Duration),
}

/// A named, ordered policy unit.
///
/// Rules run in ascending [`priority`](Rule::priority) order. Names must be
/// unique within a pipeline; the pipeline uses them to avoid re-running a
/// rule after a rewrite re-dispatch.
pub trait Rule: Send + Sync {
    /// Unique rule name (used in logs and rejection reasons).
    fn name(&self) -> &str;

    /// Ordering key; lower runs earlier.
    fn priority(&self) -> u32 {
        100
    }

    /// The (from, to) pairs this rule applies to.
    fn scope(&self) -> RuleScope;

    /// Evaluate the proposal.
    fn evaluate(&self, ctx: &mut TransitionContext<'_>) -> RuleDecision;
}
