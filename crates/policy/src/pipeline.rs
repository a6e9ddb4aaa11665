//! The rule pipeline
//!
//! An ordered, composable sequence of rules with dispatch keyed by
//! (from, to) state pair. The table is resolved once at construction: for
//! every pair, the subset of rules whose scope covers it, sorted by priority
//! then name. Evaluation walks that list; the first reject or delay
//! short-circuits, and a rewrite re-dispatches against the new destination
//! without re-running rules that already executed.

use crate::context::TransitionContext;
use crate::rule::{Rule, RuleDecision};
use cadence_core::StateKind;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on rewrites within one attempt. Rewrite chains longer than
/// this indicate rules fighting each other.
const MAX_REWRITES: u32 = 4;

/// What the pipeline decided.
#[derive(Debug, Clone)]
pub enum PipelineVerdict {
    /// Every applicable rule passed; the (possibly rewritten) proposal may
    /// proceed to graph validation and commit.
    Proceed,
    /// A rule vetoed the proposal.
    Reject {
        /// The vetoing rule's name.
        rule: String,
        /// The rule's reason.
        message: String,
    },
    /// A rule requested backpressure.
    Delay(Duration),
}

/// An ordered composition of rules with per-pair dispatch.
pub struct Pipeline {
    table: HashMap<(StateKind, StateKind), Vec<Arc<dyn Rule>>>,
}

impl Pipeline {
    /// Resolve a pipeline from a rule set.
    ///
    /// Rules are sorted by (priority, name) and bucketed per (from, to) pair
    /// up front; `evaluate` does no scope matching.
    pub fn new(mut rules: Vec<Arc<dyn Rule>>) -> Self {
        rules.sort_by(|a, b| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.name().cmp(b.name()))
        });

        let mut table: HashMap<(StateKind, StateKind), Vec<Arc<dyn Rule>>> = HashMap::new();
        for rule in &rules {
            let scope = rule.scope();
            for from in StateKind::ALL {
                for to in StateKind::ALL {
                    if scope.matches(from, to) {
                        table.entry((from, to)).or_default().push(Arc::clone(rule));
                    }
                }
            }
        }
        Self { table }
    }

    /// A pipeline with no rules; every proposal proceeds untouched.
    pub fn passthrough() -> Self {
        Self::new(Vec::new())
    }

    /// The rules applicable to one pair, in execution order.
    pub fn rules_for(&self, from: StateKind, to: StateKind) -> Vec<&str> {
        self.table
            .get(&(from, to))
            .map(|rules| rules.iter().map(|r| r.name()).collect())
            .unwrap_or_default()
    }

    /// Run the applicable rules against the context.
    ///
    /// On `Rewrite` the proposed state is replaced and dispatch restarts
    /// against the new (from, to') pair, skipping rules that already ran.
    pub fn evaluate(&self, ctx: &mut TransitionContext<'_>) -> PipelineVerdict {
        let from = ctx.from();
        let mut executed: HashSet<String> = HashSet::new();
        let mut rewrites = 0u32;

        'dispatch: loop {
            let key = (from, ctx.proposed().kind);
            let rules = match self.table.get(&key) {
                Some(rules) => rules.as_slice(),
                None => return PipelineVerdict::Proceed,
            };

            for rule in rules {
                if executed.contains(rule.name()) {
                    continue;
                }
                executed.insert(rule.name().to_string());

                match rule.evaluate(ctx) {
                    RuleDecision::Proceed => {}
                    RuleDecision::Rewrite(state) => {
                        rewrites += 1;
                        if rewrites > MAX_REWRITES {
                            tracing::warn!(rule = rule.name(), "rewrite chain exceeded bound");
                            return PipelineVerdict::Reject {
                                rule: rule.name().to_string(),
                                message: "rewrite chain exceeded bound".to_string(),
                            };
                        }
                        tracing::debug!(
                            rule = rule.name(),
                            from = %key.1,
                            to = %state.kind,
                            "proposal rewritten"
                        );
                        ctx.set_proposed(state);
                        continue 'dispatch;
                    }
                    RuleDecision::Reject { message } => {
                        tracing::debug!(rule = rule.name(), %message, "proposal rejected");
                        return PipelineVerdict::Reject {
                            rule: rule.name().to_string(),
                            message,
                        };
                    }
                    RuleDecision::Delay(retry_after) => {
                        tracing::debug!(rule = rule.name(), ?retry_after, "proposal delayed");
                        return PipelineVerdict::Delay(retry_after);
                    }
                }
            }
            return PipelineVerdict::Proceed;
        }
    }
}
