//! Scoring Signal Framework
//!
//! Desirability ("wants to") and feasibility ("currently can") are computed
//! by independent chains of keyed, stateless evaluators. Registries are
//! append-only and populated once at bootstrap; evaluation order is
//! registration order. Nothing in this module draws randomness: identical
//! (goal, context) pairs always produce identical results.

use std::collections::HashMap;

use agent_context::{AgeCategory, ContextSnapshot, GoalCategory, Mood};

use crate::config::DirectorConfig;
use crate::goals::GoalDefinition;

/// Outcome of one signal evaluation.
///
/// `raw` is the signal's own opinion, `applied` is what gets multiplied into
/// the aggregate. The neutral result (1.0, 1.0) leaves the aggregate
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalResult {
    pub raw: f32,
    pub applied: f32,
    pub trace: HashMap<String, f32>,
}

impl SignalResult {
    /// The identity multiplier.
    pub fn neutral() -> Self {
        Self {
            raw: 1.0,
            applied: 1.0,
            trace: HashMap::new(),
        }
    }

    /// A result where raw and applied agree.
    pub fn uniform(value: f32) -> Self {
        Self {
            raw: value,
            applied: value,
            trace: HashMap::new(),
        }
    }

    /// Attaches a trace entry.
    pub fn with_trace(mut self, key: impl Into<String>, value: f32) -> Self {
        self.trace.insert(key.into(), value);
        self
    }
}

/// A desirability modifier.
pub trait DesirabilitySignal: Send + Sync {
    /// Stable identifier, used in suggestion traces.
    fn key(&self) -> &'static str;
    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult;
}

/// A feasibility modifier.
pub trait FeasibilitySignal: Send + Sync {
    /// Stable identifier, used in suggestion traces.
    fn key(&self) -> &'static str;
    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult;
}

/// Ordered, append-only collection of desirability signals.
#[derive(Default)]
pub struct DesirabilitySignalRegistry {
    signals: Vec<Box<dyn DesirabilitySignal>>,
    initialized: bool,
}

impl DesirabilitySignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the default signal chain once; safe to call redundantly.
    pub fn ensure_defaults(&mut self, config: &DirectorConfig) {
        if self.initialized {
            return;
        }
        self.register(Box::new(NatureBiasSignal {
            idle_momentum_threshold: config.scoring.idle_momentum_threshold,
        }));
        self.register(Box::new(MoodBiasSignal));
        self.register(Box::new(AgeBiasSignal));
        self.register(Box::new(BondBiasSignal));
        self.register(Box::new(VarietyPenaltySignal {
            scoring: config.scoring.clone(),
        }));
        self.register(Box::new(MemoryBiasSignal));
        self.initialized = true;
    }

    /// Clears the chain so tests can re-register from scratch.
    pub fn reset(&mut self) {
        self.signals.clear();
        self.initialized = false;
    }

    /// Appends a signal to the chain.
    pub fn register(&mut self, signal: Box<dyn DesirabilitySignal>) {
        self.signals.push(signal);
    }

    /// Signals in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn DesirabilitySignal> {
        self.signals.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Ordered, append-only collection of feasibility signals.
#[derive(Default)]
pub struct FeasibilitySignalRegistry {
    signals: Vec<Box<dyn FeasibilitySignal>>,
    initialized: bool,
}

impl FeasibilitySignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the default signal chain once; safe to call redundantly.
    pub fn ensure_defaults(&mut self, config: &DirectorConfig) {
        if self.initialized {
            return;
        }
        self.register(Box::new(OwnerProximitySignal {
            floor: config.feasibility.owner_discount_floor,
            full_distance: config.feasibility.owner_full_discount_distance,
        }));
        self.register(Box::new(EnergyWindowSignal {
            factor: config.feasibility.energy_window_factor,
        }));
        self.register(Box::new(MobilitySignal {
            penalty: config.feasibility.mobility_penalty,
        }));
        self.register(Box::new(CombatVetoSignal));
        self.initialized = true;
    }

    /// Clears the chain so tests can re-register from scratch.
    pub fn reset(&mut self) {
        self.signals.clear();
        self.initialized = false;
    }

    /// Appends a signal to the chain.
    pub fn register(&mut self, signal: Box<dyn FeasibilitySignal>) {
        self.signals.push(signal);
    }

    /// Signals in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn FeasibilitySignal> {
        self.signals.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Default desirability signals
// ---------------------------------------------------------------------------

/// Innate per-category preference, plus the goal's idle-bias hint while the
/// agent is drifting.
struct NatureBiasSignal {
    idle_momentum_threshold: f32,
}

impl DesirabilitySignal for NatureBiasSignal {
    fn key(&self) -> &'static str {
        "nature_bias"
    }

    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        let raw = ctx.nature.bias(goal.category);
        let idle_boost = if ctx.momentum < self.idle_momentum_threshold {
            1.0 + goal.idle_bias
        } else {
            1.0
        };
        SignalResult {
            raw,
            applied: raw * idle_boost,
            trace: HashMap::new(),
        }
        .with_trace("idle_boost", idle_boost)
    }
}

/// How strongly a mood pulls toward or away from a goal category.
///
/// 1.0 is neutral; the blend weight scales the deviation from neutral.
fn mood_affinity(mood: Mood, category: GoalCategory) -> f32 {
    use GoalCategory::*;
    match mood {
        Mood::Content => 1.0,
        Mood::Playful => match category {
            Play => 1.5,
            Explore => 1.2,
            Rest => 0.7,
            _ => 1.0,
        },
        Mood::Anxious => match category {
            Rest => 1.2,
            Social => 1.1,
            Explore => 0.6,
            Play => 0.8,
            _ => 1.0,
        },
        Mood::Irritable => match category {
            Social => 0.7,
            Play => 0.9,
            Work => 0.8,
            _ => 1.0,
        },
        Mood::Lonely => match category {
            Social => 1.5,
            Play => 1.1,
            _ => 1.0,
        },
        Mood::Drowsy => match category {
            Rest => 1.6,
            Play => 0.6,
            Explore => 0.7,
            _ => 1.0,
        },
    }
}

/// Current mood blend bias: blend-weighted deviation from neutral affinity.
struct MoodBiasSignal;

impl DesirabilitySignal for MoodBiasSignal {
    fn key(&self) -> &'static str {
        "mood_bias"
    }

    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        let mut multiplier = 1.0;
        for (mood, weight) in ctx.mood.iter() {
            multiplier += weight * (mood_affinity(mood, goal.category) - 1.0);
        }
        SignalResult::uniform(multiplier.clamp(0.1, 2.5))
    }
}

/// Life-stage bias.
struct AgeBiasSignal;

impl DesirabilitySignal for AgeBiasSignal {
    fn key(&self) -> &'static str {
        "age_bias"
    }

    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        use GoalCategory::*;
        let multiplier = match ctx.age {
            AgeCategory::Adult => 1.0,
            AgeCategory::Juvenile => match goal.category {
                Play => 1.3,
                Work => 0.7,
                Rest => 0.9,
                _ => 1.0,
            },
            AgeCategory::Elder => match goal.category {
                Play => 0.7,
                Rest => 1.3,
                Explore => 0.8,
                _ => 1.0,
            },
        };
        SignalResult::uniform(multiplier)
    }
}

/// Owner-bond bias: social goals track bond strength.
struct BondBiasSignal;

impl DesirabilitySignal for BondBiasSignal {
    fn key(&self) -> &'static str {
        "bond_bias"
    }

    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        if goal.category != GoalCategory::Social {
            return SignalResult::neutral();
        }
        // Bond 0.5 is neutral; strong bonds pull social goals up
        SignalResult::uniform(0.5 + ctx.bond_strength)
    }
}

/// Staged recency penalty that discourages repeating goals, with an extra
/// position penalty while the goal sits in the short recent-history queue and
/// an overdue nudge once past the goal's cooldown upper bound.
struct VarietyPenaltySignal {
    scoring: crate::config::ScoringConfig,
}

impl DesirabilitySignal for VarietyPenaltySignal {
    fn key(&self) -> &'static str {
        "variety_penalty"
    }

    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        let Some(ticks_since) = ctx.history.ticks_since(&goal.id, ctx.tick) else {
            return SignalResult::neutral();
        };

        let cfg = &self.scoring;
        let staged = if ticks_since < cfg.variety_recent_ticks {
            cfg.variety_recent_factor
        } else if ticks_since < cfg.variety_mid_ticks {
            cfg.variety_mid_factor
        } else if ticks_since < cfg.variety_aged_ticks {
            cfg.variety_aged_factor
        } else {
            1.0
        };

        let position_factor = match ctx.history.position_of(&goal.id) {
            Some(pos) if pos < cfg.history_queue_len => {
                (cfg.history_position_base + cfg.history_position_step * pos as f32).min(1.0)
            }
            _ => 1.0,
        };

        let overdue = if goal.cooldown.max_ticks > 0 && ticks_since > goal.cooldown.max_ticks {
            cfg.overdue_boost
        } else {
            1.0
        };

        SignalResult {
            raw: staged,
            applied: staged * position_factor * overdue,
            trace: HashMap::new(),
        }
        .with_trace("position_factor", position_factor)
        .with_trace("overdue", overdue)
    }
}

/// Reserved extension point for learned preferences. Always neutral.
struct MemoryBiasSignal;

impl DesirabilitySignal for MemoryBiasSignal {
    fn key(&self) -> &'static str {
        "memory_bias"
    }

    fn evaluate(&self, _goal: &GoalDefinition, _ctx: &ContextSnapshot) -> SignalResult {
        SignalResult::neutral()
    }
}

// ---------------------------------------------------------------------------
// Default feasibility signals
// ---------------------------------------------------------------------------

/// Social goals need the owner around; the discount falls linearly with
/// distance down to a floor.
struct OwnerProximitySignal {
    floor: f32,
    full_distance: f32,
}

impl FeasibilitySignal for OwnerProximitySignal {
    fn key(&self) -> &'static str {
        "owner_proximity"
    }

    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        if goal.category != GoalCategory::Social {
            return SignalResult::neutral();
        }
        let Some(owner) = &ctx.owner else {
            return SignalResult::uniform(0.0);
        };
        let slope = (1.0 - self.floor) / self.full_distance;
        let discount = (1.0 - owner.distance * slope).max(self.floor);
        SignalResult::uniform(discount).with_trace("owner_distance", owner.distance)
    }
}

/// Goals outside their energy operating range are discounted, not vetoed.
struct EnergyWindowSignal {
    factor: f32,
}

impl FeasibilitySignal for EnergyWindowSignal {
    fn key(&self) -> &'static str {
        "energy_window"
    }

    fn evaluate(&self, goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        if goal.energy_range.contains(ctx.energy) {
            SignalResult::neutral()
        } else {
            SignalResult::uniform(self.factor).with_trace("energy", ctx.energy)
        }
    }
}

/// Airborne without swimming or a mount makes most behaviors awkward.
struct MobilitySignal {
    penalty: f32,
}

impl FeasibilitySignal for MobilitySignal {
    fn key(&self) -> &'static str {
        "mobility"
    }

    fn evaluate(&self, _goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        if ctx.mobility.is_impaired() {
            SignalResult::uniform(self.penalty)
        } else {
            SignalResult::neutral()
        }
    }
}

/// Active combat zeroes feasibility for every goal, unconditionally.
struct CombatVetoSignal;

impl FeasibilitySignal for CombatVetoSignal {
    fn key(&self) -> &'static str {
        "combat_veto"
    }

    fn evaluate(&self, _goal: &GoalDefinition, ctx: &ContextSnapshot) -> SignalResult {
        if ctx.in_combat {
            SignalResult::uniform(0.0)
        } else {
            SignalResult::neutral()
        }
    }
}
