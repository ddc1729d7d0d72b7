//! Goal Definitions and Catalog
//!
//! Data-defined goals an agent can be steered toward. Definitions arrive from
//! an external loader as JSON; malformed entries are dropped one at a time
//! with a warning, never failing the whole load. The registry is replaced
//! wholesale on reload so readers never see a half-updated catalog.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use agent_context::{CapabilityRequirement, GoalCategory};

/// Cooldown bounds for a goal, in ticks.
///
/// `min_ticks` is a hard gate: the goal is not suggested again until that
/// long after its last run. Past `max_ticks` the goal counts as overdue and
/// picks up a small desirability nudge. Zero disables either bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownBounds {
    pub min_ticks: u64,
    pub max_ticks: u64,
}

impl CooldownBounds {
    pub fn new(min_ticks: u64, max_ticks: u64) -> Self {
        Self {
            min_ticks,
            max_ticks,
        }
    }
}

/// Continuous energy range in which a goal operates well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyRange {
    pub min: f32,
    pub max: f32,
}

impl Default for EnergyRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl EnergyRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Whether an energy level falls inside the range.
    pub fn contains(&self, energy: f32) -> bool {
        energy >= self.min && energy <= self.max
    }
}

/// A single data-defined goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalDefinition {
    pub id: String,
    pub category: GoalCategory,
    /// Base desirability, 0.0 to 1.0
    pub priority: f32,
    #[serde(default)]
    pub cooldown: CooldownBounds,
    #[serde(default)]
    pub requirement: CapabilityRequirement,
    #[serde(default)]
    pub energy_range: EnergyRange,
    /// Extra appeal while the agent is drifting (low momentum), 0 = none
    #[serde(default)]
    pub idle_bias: f32,
    /// Identifier of the registered behavior factory that instantiates this
    /// goal when chosen
    pub factory: String,
}

impl GoalDefinition {
    pub fn new(
        id: impl Into<String>,
        category: GoalCategory,
        priority: f32,
        factory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            priority,
            cooldown: CooldownBounds::default(),
            requirement: CapabilityRequirement::Any,
            energy_range: EnergyRange::default(),
            idle_bias: 0.0,
            factory: factory.into(),
        }
    }

    pub fn with_requirement(mut self, requirement: CapabilityRequirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn with_cooldown(mut self, min_ticks: u64, max_ticks: u64) -> Self {
        self.cooldown = CooldownBounds::new(min_ticks, max_ticks);
        self
    }

    pub fn with_energy_range(mut self, min: f32, max: f32) -> Self {
        self.energy_range = EnergyRange::new(min, max);
        self
    }

    pub fn with_idle_bias(mut self, idle_bias: f32) -> Self {
        self.idle_bias = idle_bias;
        self
    }
}

/// All known goals, in definition order.
///
/// Definition order is meaningful: suggestion ties break toward the earlier
/// definition. Reload replaces the contents wholesale.
#[derive(Debug, Clone, Default)]
pub struct GoalRegistry {
    goals: Vec<GoalDefinition>,
    by_id: HashMap<String, usize>,
}

impl GoalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole catalog. Later duplicates of an id are dropped.
    pub fn replace(&mut self, definitions: Vec<GoalDefinition>) {
        self.goals.clear();
        self.by_id.clear();
        for def in definitions {
            if self.by_id.contains_key(&def.id) {
                tracing::warn!("duplicate goal id '{}' dropped on reload", def.id);
                continue;
            }
            self.by_id.insert(def.id.clone(), self.goals.len());
            self.goals.push(def);
        }
    }

    /// Goals in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &GoalDefinition> {
        self.goals.iter()
    }

    pub fn get(&self, id: &str) -> Option<&GoalDefinition> {
        self.by_id.get(id).map(|&idx| &self.goals[idx])
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }
}

/// Declarative record handed to the behavior executor when a goal is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorHandle {
    pub goal_id: String,
    pub kind: String,
}

/// A registered behavior instantiation function.
pub type BehaviorFactoryFn = fn(&GoalDefinition) -> BehaviorHandle;

fn tagged_factory(goal: &GoalDefinition) -> BehaviorHandle {
    BehaviorHandle {
        goal_id: goal.id.clone(),
        kind: goal.factory.clone(),
    }
}

/// Map from factory identifier to instantiation function, populated at
/// bootstrap. Data files reference the identifier; there is no dynamic class
/// loading.
#[derive(Debug, Clone, Default)]
pub struct FactoryRegistry {
    factories: HashMap<String, BehaviorFactoryFn>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard factory set.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for key in [
            "wander", "fetch", "nap", "follow_owner", "forage", "perform", "patrol",
        ] {
            registry.register(key, tagged_factory);
        }
        registry
    }

    /// Registers a factory under an identifier.
    pub fn register(&mut self, key: impl Into<String>, factory: BehaviorFactoryFn) {
        self.factories.insert(key.into(), factory);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Instantiates a behavior handle for a chosen goal.
    pub fn instantiate(&self, goal: &GoalDefinition) -> Option<BehaviorHandle> {
        self.factories.get(&goal.factory).map(|f| f(goal))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Errors that fail a whole catalog document (individual entries never do).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog root must be a JSON array")]
    NotAnArray,
    #[error("catalog root must be a JSON object")]
    NotAnObject,
}

/// Result of a goal catalog load.
#[derive(Debug, Clone)]
pub struct LoadedGoals {
    pub goals: Vec<GoalDefinition>,
    /// Entries dropped for being malformed, duplicated, or referencing an
    /// unregistered factory
    pub skipped: usize,
}

/// Parses a goal catalog from a JSON array.
///
/// Each entry is validated independently: malformed entries, unknown
/// requirement keywords, duplicate ids, and unregistered factory identifiers
/// are logged and skipped while the rest of the load proceeds.
pub fn load_goal_catalog(
    json: &str,
    factories: &FactoryRegistry,
) -> Result<LoadedGoals, CatalogError> {
    let root: serde_json::Value = serde_json::from_str(json)?;
    let entries = root.as_array().ok_or(CatalogError::NotAnArray)?;

    let mut goals: Vec<GoalDefinition> = Vec::with_capacity(entries.len());
    let mut seen: HashMap<String, ()> = HashMap::new();
    let mut skipped = 0;

    for entry in entries {
        let def: GoalDefinition = match serde_json::from_value(entry.clone()) {
            Ok(def) => def,
            Err(e) => {
                tracing::warn!("skipping malformed goal entry: {}", e);
                skipped += 1;
                continue;
            }
        };
        if seen.contains_key(&def.id) {
            tracing::warn!("skipping duplicate goal id '{}'", def.id);
            skipped += 1;
            continue;
        }
        if !factories.contains(&def.factory) {
            tracing::warn!(
                "skipping goal '{}': unregistered factory '{}'",
                def.id,
                def.factory
            );
            skipped += 1;
            continue;
        }
        seen.insert(def.id.clone(), ());
        goals.push(def);
    }

    Ok(LoadedGoals { goals, skipped })
}
