//! Transition context
//!
//! One [`TransitionContext`] exists per transition attempt. It carries a
//! snapshot of the run, the proposed state (which rules may rewrite), a keyed
//! scratch map for cross-rule coordination within the attempt, and the staged
//! side effects. Its lifetime is exactly one attempt: a conflict retry builds
//! a fresh context from a fresh read.

use cadence_core::{Run, SideEffect, State, StateKind};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Mutable working state for one transition attempt.
#[derive(Debug)]
pub struct TransitionContext<'a> {
    run: &'a Run,
    proposed: State,
    now: DateTime<Utc>,
    scratch: HashMap<String, serde_json::Value>,
    effects: Vec<SideEffect>,
}

impl<'a> TransitionContext<'a> {
    /// Build a context for one attempt.
    pub fn new(run: &'a Run, proposed: State, now: DateTime<Utc>) -> Self {
        Self {
            run,
            proposed,
            now,
            scratch: HashMap::new(),
            effects: Vec::new(),
        }
    }

    /// The run as read at the start of the attempt.
    pub fn run(&self) -> &Run {
        self.run
    }

    /// The source state kind of this transition.
    pub fn from(&self) -> StateKind {
        self.run.state.kind
    }

    /// The currently proposed destination state (may have been rewritten).
    pub fn proposed(&self) -> &State {
        &self.proposed
    }

    /// Replace the proposed state. Called by the pipeline on a rewrite.
    pub(crate) fn set_proposed(&mut self, state: State) {
        self.proposed = state;
    }

    /// The attempt's wall-clock instant. Rules read time from here, never
    /// from the system clock, so a whole attempt sees one consistent `now`.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Stage a side effect to be applied atomically with the commit.
    pub fn stage(&mut self, effect: SideEffect) {
        self.effects.push(effect);
    }

    /// The staged effects so far.
    pub fn staged_effects(&self) -> &[SideEffect] {
        &self.effects
    }

    /// Take ownership of the staged effects (hands them to the store).
    pub fn take_effects(&mut self) -> Vec<SideEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Write a scratch value visible to later rules in this attempt.
    pub fn set_scratch(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.scratch.insert(key.into(), value);
    }

    /// Read a scratch value written earlier in this attempt.
    pub fn scratch(&self, key: &str) -> Option<&serde_json::Value> {
        self.scratch.get(key)
    }
}
