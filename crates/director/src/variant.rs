//! Behavior Variants
//!
//! Concrete presentation choices for abstract plan steps. Variants are
//! stateless: an identity, a match rule over (goal, context), and a
//! presentation tag the executor maps to an animation or pose. Selection is
//! deterministic regardless of registration order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use agent_context::{ContextSnapshot, GoalCategory, Mood};

use crate::goals::GoalDefinition;

/// Declarative match predicate for a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantRule {
    /// Matches every goal and context
    Always,
    /// Goal belongs to the category
    Category(GoalCategory),
    /// Owner present within nearby range
    OwnerNearby,
    /// Dominant mood of the blend
    DominantMood(Mood),
    /// Agent is not airborne
    Grounded,
    /// Agent is currently airborne
    Airborne,
    /// Agent is flight capable
    CanFly,
    /// Agent is swim capable
    CanSwim,
    /// Agent has a small body
    SmallBody,
    /// Every sub-rule matches
    All(Vec<VariantRule>),
}

impl VariantRule {
    /// Evaluates the rule against a goal and context.
    pub fn matches(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> bool {
        match self {
            VariantRule::Always => true,
            VariantRule::Category(category) => goal.category == *category,
            VariantRule::OwnerNearby => ctx.owner_nearby(),
            VariantRule::DominantMood(mood) => ctx.mood.dominant() == *mood,
            VariantRule::Grounded => !ctx.mobility.airborne,
            VariantRule::Airborne => ctx.mobility.airborne,
            VariantRule::CanFly => ctx.capabilities.fly,
            VariantRule::CanSwim => ctx.capabilities.swim,
            VariantRule::SmallBody => ctx.capabilities.small_body,
            VariantRule::All(rules) => rules.iter().all(|r| r.matches(goal, ctx)),
        }
    }
}

/// A registered presentation variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorVariant {
    pub id: String,
    pub rule: VariantRule,
    /// Presentation tag consumed by the executor
    pub presentation: String,
}

impl BehaviorVariant {
    pub fn new(id: impl Into<String>, rule: VariantRule, presentation: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rule,
            presentation: presentation.into(),
        }
    }
}

/// The selected variant for a resolved plan step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantChoice {
    pub variant_id: String,
    pub presentation: String,
}

/// All registered variants, keyed by identity.
///
/// The map is unordered; selection compensates by always preferring the
/// lexicographically smallest matching identity.
#[derive(Debug, Clone, Default)]
pub struct BehaviorVariantRegistry {
    variants: HashMap<String, BehaviorVariant>,
    initialized: bool,
}

impl BehaviorVariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the default variant set once; safe to call redundantly.
    pub fn ensure_defaults(&mut self) {
        if self.initialized {
            return;
        }
        for variant in default_variants() {
            self.register(variant);
        }
        self.initialized = true;
    }

    /// Clears the registry so tests can re-register from scratch.
    pub fn reset(&mut self) {
        self.variants.clear();
        self.initialized = false;
    }

    /// Adds a variant. A later registration under an existing id replaces it.
    pub fn register(&mut self, variant: BehaviorVariant) {
        self.variants.insert(variant.id.clone(), variant);
    }

    pub fn get(&self, id: &str) -> Option<&BehaviorVariant> {
        self.variants.get(id)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Unconstrained selection: of all variants matching the goal and
    /// context, picks the one with the lexicographically smallest identity.
    pub fn select(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> Option<VariantChoice> {
        self.variants
            .values()
            .filter(|v| v.rule.matches(goal, ctx))
            .min_by(|a, b| a.id.cmp(&b.id))
            .map(|v| VariantChoice {
                variant_id: v.id.clone(),
                presentation: v.presentation.clone(),
            })
    }

    /// Pool-first selection: walks the preferred identities in order and
    /// returns the first that is registered and matches; falls back to the
    /// unconstrained scan when the pool is empty or yields nothing.
    pub fn select_with_pool(
        &self,
        goal: &GoalDefinition,
        ctx: &ContextSnapshot,
        pool: &[String],
    ) -> Option<VariantChoice> {
        for id in pool {
            if let Some(variant) = self.variants.get(id) {
                if variant.rule.matches(goal, ctx) {
                    return Some(VariantChoice {
                        variant_id: variant.id.clone(),
                        presentation: variant.presentation.clone(),
                    });
                }
            }
        }
        self.select(goal, ctx)
    }
}

/// The built-in presentation set.
fn default_variants() -> Vec<BehaviorVariant> {
    vec![
        BehaviorVariant::new("perk_ears", VariantRule::Always, "perk_ears"),
        BehaviorVariant::new("calm_sit", VariantRule::Grounded, "sit_loop"),
        BehaviorVariant::new(
            "tail_wag",
            VariantRule::All(vec![
                VariantRule::Category(GoalCategory::Social),
                VariantRule::OwnerNearby,
            ]),
            "wag_fast",
        ),
        BehaviorVariant::new(
            "bounce",
            VariantRule::Category(GoalCategory::Play),
            "bounce_high",
        ),
        BehaviorVariant::new(
            "curl_up",
            VariantRule::Category(GoalCategory::Rest),
            "curl_up",
        ),
        BehaviorVariant::new("hover_bob", VariantRule::CanFly, "hover_bob"),
        BehaviorVariant::new("paddle", VariantRule::CanSwim, "paddle_slow"),
        BehaviorVariant::new(
            "mope",
            VariantRule::DominantMood(Mood::Lonely),
            "head_down",
        ),
    ]
}
