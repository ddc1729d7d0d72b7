//! Goal Suggestion
//!
//! Ranks every compatible goal for an agent by `desirability × feasibility`.
//! Scoring is fully deterministic: the same snapshot and signal set always
//! produce the same ranked list, with ties resolved by definition order.

use std::collections::HashMap;

use agent_context::{ContextSnapshot, GoalCategory};

use crate::config::DirectorConfig;
use crate::goals::{GoalDefinition, GoalRegistry};
use crate::signal::{DesirabilitySignalRegistry, FeasibilitySignalRegistry};

/// One ranked candidate goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub goal_id: String,
    pub category: GoalCategory,
    pub desirability: f32,
    pub feasibility: f32,
    /// Always `desirability * feasibility`
    pub score: f32,
    pub reason: String,
    /// Applied multiplier per signal key, plus signal-specific detail entries
    pub trace: HashMap<String, f32>,
}

/// Computes ranked goal suggestions from the signal registries.
pub struct GoalSuggester {
    desirability: DesirabilitySignalRegistry,
    feasibility: FeasibilitySignalRegistry,
}

impl GoalSuggester {
    /// Creates a suggester with the default signal chains for this config.
    pub fn new(config: &DirectorConfig) -> Self {
        let mut desirability = DesirabilitySignalRegistry::new();
        desirability.ensure_defaults(config);
        let mut feasibility = FeasibilitySignalRegistry::new();
        feasibility.ensure_defaults(config);
        Self {
            desirability,
            feasibility,
        }
    }

    /// Access to the desirability chain, e.g. to append custom signals.
    pub fn desirability_signals(&mut self) -> &mut DesirabilitySignalRegistry {
        &mut self.desirability
    }

    /// Access to the feasibility chain.
    pub fn feasibility_signals(&mut self) -> &mut FeasibilitySignalRegistry {
        &mut self.feasibility
    }

    /// Ranks all suggestible goals for this snapshot, best first.
    ///
    /// Goals failing their capability requirement or still inside their hard
    /// cooldown never reach the signals. Goals scoring non-positive on either
    /// axis are discarded.
    pub fn suggest(&self, goals: &GoalRegistry, ctx: &ContextSnapshot) -> Vec<Suggestion> {
        let mut suggestions: Vec<Suggestion> = Vec::new();

        for goal in goals.iter() {
            if !goal.requirement.matches(&ctx.capabilities) {
                continue;
            }
            if self.on_cooldown(goal, ctx) {
                continue;
            }

            let mut trace: HashMap<String, f32> = HashMap::new();

            let mut desirability = goal.priority;
            for signal in self.desirability.iter() {
                let result = signal.evaluate(goal, ctx);
                desirability *= result.applied;
                trace.extend(result.trace);
                trace.insert(signal.key().to_string(), result.applied);
            }
            if desirability <= 0.0 {
                continue;
            }

            let mut feasibility = 1.0;
            for signal in self.feasibility.iter() {
                let result = signal.evaluate(goal, ctx);
                feasibility *= result.applied;
                trace.extend(result.trace);
                trace.insert(signal.key().to_string(), result.applied);
            }
            if feasibility <= 0.0 {
                continue;
            }

            let score = desirability * feasibility;
            suggestions.push(Suggestion {
                goal_id: goal.id.clone(),
                category: goal.category,
                desirability,
                feasibility,
                score,
                reason: format!(
                    "{}: desirability {:.2} x feasibility {:.2} (mood {:?})",
                    goal.id,
                    desirability,
                    feasibility,
                    ctx.mood.dominant()
                ),
                trace,
            });
        }

        // Stable sort keeps definition order for equal scores
        suggestions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        suggestions
    }

    fn on_cooldown(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> bool {
        if goal.cooldown.min_ticks == 0 {
            return false;
        }
        match ctx.history.ticks_since(&goal.id, ctx.tick) {
            Some(ticks_since) => ticks_since < goal.cooldown.min_ticks,
            None => false,
        }
    }
}
