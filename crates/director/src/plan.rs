//! Action Plan Catalog
//!
//! Pre-authored behavior templates. A plan binds to exactly one goal identity
//! and lists ordered steps; each step references a reusable fragment plus an
//! optional ordered pool of preferred presentation variants. Fragments carry
//! descriptive metadata only; nothing in this layer executes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::goals::CatalogError;

/// Reusable step metadata referenced by plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFragment {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    /// Rough duration a step built on this fragment runs for
    #[serde(default)]
    pub expected_ticks: u32,
}

impl ActionFragment {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, expected_ticks: u32) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            expected_ticks,
        }
    }
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub fragment_id: String,
    /// Ordered variant identities to try before an unconstrained selection
    #[serde(default)]
    pub preferred_variants: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PlanStep {
    pub fn new(fragment_id: impl Into<String>) -> Self {
        Self {
            fragment_id: fragment_id.into(),
            preferred_variants: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_variants(mut self, variants: Vec<String>) -> Self {
        self.preferred_variants = variants;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// An immutable, pre-authored plan template bound 1:1 to a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub id: String,
    pub goal_id: String,
    /// Whether resolution should attempt owner-group formation
    #[serde(default)]
    pub requires_group: bool,
    pub steps: Vec<PlanStep>,
}

impl ActionPlan {
    pub fn new(id: impl Into<String>, goal_id: impl Into<String>, steps: Vec<PlanStep>) -> Self {
        Self {
            id: id.into(),
            goal_id: goal_id.into(),
            requires_group: false,
            steps,
        }
    }

    pub fn with_group(mut self) -> Self {
        self.requires_group = true;
        self
    }
}

/// Known fragments by identity; replaced wholesale on reload.
#[derive(Debug, Clone, Default)]
pub struct FragmentRegistry {
    by_id: HashMap<String, ActionFragment>,
}

impl FragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, fragments: Vec<ActionFragment>) {
        self.by_id = fragments.into_iter().map(|f| (f.id.clone(), f)).collect();
    }

    pub fn get(&self, id: &str) -> Option<&ActionFragment> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Plans keyed by the goal they implement; replaced wholesale on reload.
///
/// The goal binding is 1:1; a later plan for an already-bound goal is dropped
/// with a warning.
#[derive(Debug, Clone, Default)]
pub struct PlanRegistry {
    by_goal: HashMap<String, Arc<ActionPlan>>,
}

impl PlanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, plans: Vec<ActionPlan>) {
        self.by_goal.clear();
        for plan in plans {
            if self.by_goal.contains_key(&plan.goal_id) {
                tracing::warn!(
                    "dropping plan '{}': goal '{}' already has a plan",
                    plan.id,
                    plan.goal_id
                );
                continue;
            }
            self.by_goal.insert(plan.goal_id.clone(), Arc::new(plan));
        }
    }

    /// The plan bound to a goal identity, if any.
    pub fn plan_for_goal(&self, goal_id: &str) -> Option<Arc<ActionPlan>> {
        self.by_goal.get(goal_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_goal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_goal.is_empty()
    }
}

/// Wire form of a step: either a bare fragment id or a full object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StepSpec {
    Bare(String),
    Full {
        fragment: String,
        #[serde(default)]
        variants: Vec<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
}

impl From<StepSpec> for PlanStep {
    fn from(spec: StepSpec) -> Self {
        match spec {
            StepSpec::Bare(fragment) => PlanStep::new(fragment),
            StepSpec::Full {
                fragment,
                variants,
                tags,
            } => PlanStep::new(fragment)
                .with_variants(variants)
                .with_tags(tags),
        }
    }
}

/// Wire form of a plan entry.
#[derive(Debug, Clone, Deserialize)]
struct PlanSpec {
    id: String,
    goal_id: String,
    #[serde(default)]
    requires_group: bool,
    steps: Vec<StepSpec>,
}

/// Result of a plan catalog load.
#[derive(Debug, Clone)]
pub struct LoadedPlans {
    pub fragments: Vec<ActionFragment>,
    pub plans: Vec<ActionPlan>,
    /// Entries dropped for being malformed or referencing unknown fragments
    pub skipped: usize,
}

/// Parses a plan catalog from a JSON object `{ "fragments": [...], "plans":
/// [...] }`.
///
/// Steps accept either a bare fragment id string or `{ fragment, variants,
/// tags }`. Malformed entries and plans referencing unknown fragments are
/// logged and skipped individually.
pub fn load_plan_catalog(json: &str) -> Result<LoadedPlans, CatalogError> {
    let root: serde_json::Value = serde_json::from_str(json)?;
    let obj = root.as_object().ok_or(CatalogError::NotAnObject)?;

    let mut skipped = 0;

    let mut fragments: Vec<ActionFragment> = Vec::new();
    let mut fragment_ids: HashMap<String, ()> = HashMap::new();
    if let Some(entries) = obj.get("fragments").and_then(|v| v.as_array()) {
        for entry in entries {
            match serde_json::from_value::<ActionFragment>(entry.clone()) {
                Ok(fragment) => {
                    if fragment_ids.contains_key(&fragment.id) {
                        tracing::warn!("skipping duplicate fragment id '{}'", fragment.id);
                        skipped += 1;
                        continue;
                    }
                    fragment_ids.insert(fragment.id.clone(), ());
                    fragments.push(fragment);
                }
                Err(e) => {
                    tracing::warn!("skipping malformed fragment entry: {}", e);
                    skipped += 1;
                }
            }
        }
    }

    let mut plans: Vec<ActionPlan> = Vec::new();
    if let Some(entries) = obj.get("plans").and_then(|v| v.as_array()) {
        for entry in entries {
            let spec: PlanSpec = match serde_json::from_value(entry.clone()) {
                Ok(spec) => spec,
                Err(e) => {
                    tracing::warn!("skipping malformed plan entry: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            let steps: Vec<PlanStep> = spec.steps.into_iter().map(PlanStep::from).collect();
            if let Some(bad) = steps
                .iter()
                .find(|s| !fragment_ids.contains_key(&s.fragment_id))
            {
                tracing::warn!(
                    "skipping plan '{}': unknown fragment '{}'",
                    spec.id,
                    bad.fragment_id
                );
                skipped += 1;
                continue;
            }
            let mut plan = ActionPlan::new(spec.id, spec.goal_id, steps);
            plan.requires_group = spec.requires_group;
            plans.push(plan);
        }
    }

    Ok(LoadedPlans {
        fragments,
        plans,
        skipped,
    })
}
