//! Behavior director: adaptive goal selection and plan resolution.
//!
//! The director sits between an agent's tick loop and its behavior executor.
//! For every decision it reads one immutable context snapshot, ranks the
//! goals the agent can and wants to pursue, and resolves the winner into a
//! concrete step sequence the executor can run. It never mutates the world
//! itself.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ContextSnapshot   ┌──────────┐   DirectorDecision
//! │  tick loop   │ ──────────────────▶ │ director │ ──────────────────▶ executor
//! └──────────────┘                     └──────────┘
//! ```
//!
//! Data flows one way per tick: snapshot → suggestions → best suggestion →
//! plan resolution (cache hit or full resolve) → decision.
//!
//! # Modules
//!
//! - [`signal`]: Keyed desirability/feasibility scoring chains
//! - [`suggest`]: Capability-gated goal ranking
//! - [`goals`]: Goal definitions, catalog loading, behavior factories
//! - [`plan`]: Pre-authored plan and fragment templates
//! - [`variant`]: Deterministic presentation variant selection
//! - [`group`]: Short-lived open invites and owner-group formation
//! - [`planner`]: Signature-keyed, cached plan resolution

pub mod config;
pub mod goals;
pub mod group;
pub mod plan;
pub mod planner;
pub mod signal;
pub mod suggest;
pub mod variant;

// Re-export config types
pub use config::{
    default_config_toml, ConfigError, DirectorConfig, FeasibilityConfig, InviteConfig,
    PlannerConfig, ScoringConfig, TomlSerializeError,
};

// Re-export signal types
pub use signal::{
    DesirabilitySignal, DesirabilitySignalRegistry, FeasibilitySignal, FeasibilitySignalRegistry,
    SignalResult,
};

// Re-export suggestion types
pub use suggest::{GoalSuggester, Suggestion};

// Re-export goal catalog types
pub use goals::{
    load_goal_catalog, BehaviorFactoryFn, BehaviorHandle, CatalogError, CooldownBounds,
    EnergyRange, FactoryRegistry, GoalDefinition, GoalRegistry, LoadedGoals,
};

// Re-export plan catalog types
pub use plan::{
    load_plan_catalog, ActionFragment, ActionPlan, FragmentRegistry, LoadedPlans, PlanRegistry,
    PlanStep,
};

// Re-export variant types
pub use variant::{BehaviorVariant, BehaviorVariantRegistry, VariantChoice, VariantRule};

// Re-export group types
pub use group::{GroupCoordinator, GroupMember, InvitePolicy, OpenInvite, OwnerGroup};

// Re-export planner types
pub use planner::{build_signature, DeterministicPlanner, PlanResolution, ResolvedStep};

use std::path::Path;
use std::sync::Arc;

use agent_context::ContextSnapshot;

/// Errors that can occur in director operations.
#[derive(Debug)]
pub enum DirectorError {
    /// Error loading configuration
    Config(ConfigError),
    /// Error loading a goal or plan catalog
    Catalog(CatalogError),
}

impl std::fmt::Display for DirectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectorError::Config(e) => write!(f, "Config error: {}", e),
            DirectorError::Catalog(e) => write!(f, "Catalog error: {}", e),
        }
    }
}

impl std::error::Error for DirectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DirectorError::Config(e) => Some(e),
            DirectorError::Catalog(e) => Some(e),
        }
    }
}

impl From<ConfigError> for DirectorError {
    fn from(e: ConfigError) -> Self {
        DirectorError::Config(e)
    }
}

impl From<CatalogError> for DirectorError {
    fn from(e: CatalogError) -> Self {
        DirectorError::Catalog(e)
    }
}

/// One complete answer to "what should this agent do next?".
#[derive(Debug, Clone)]
pub struct DirectorDecision {
    /// The winning suggestion, or None when nothing scored positive
    pub suggestion: Option<Suggestion>,
    /// The resolved plan, or None when the goal has no plan bound
    pub resolution: Option<Arc<PlanResolution>>,
    pub decided_at_tick: u64,
}

/// The entry point: ranks goals for a context snapshot and resolves the best
/// one into a plan.
///
/// Owns the registries, the signal chains, a per-director resolution cache,
/// and a shareable group coordinator. One director serves one agent (or one
/// pool of agents ticked from the same thread); the coordinator may be shared
/// across directors via [`AdaptiveDirector::coordinator`].
pub struct AdaptiveDirector {
    config: DirectorConfig,
    suggester: GoalSuggester,
    goals: GoalRegistry,
    plans: PlanRegistry,
    fragments: FragmentRegistry,
    variants: BehaviorVariantRegistry,
    factories: FactoryRegistry,
    coordinator: Arc<GroupCoordinator>,
    planner: DeterministicPlanner,
    last_decision: Option<DirectorDecision>,
}

impl AdaptiveDirector {
    /// Creates a director with bootstrapped signal and variant registries and
    /// empty catalogs.
    pub fn new(config: DirectorConfig) -> Self {
        let suggester = GoalSuggester::new(&config);
        let mut variants = BehaviorVariantRegistry::new();
        variants.ensure_defaults();
        let coordinator = Arc::new(GroupCoordinator::new(InvitePolicy::from(&config.invites)));
        let planner = DeterministicPlanner::new(config.planner.cache_capacity);

        Self {
            config,
            suggester,
            goals: GoalRegistry::new(),
            plans: PlanRegistry::new(),
            fragments: FragmentRegistry::new(),
            variants,
            factories: FactoryRegistry::builtin(),
            coordinator,
            planner,
            last_decision: None,
        }
    }

    /// Creates a director from a configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, DirectorError> {
        let config = DirectorConfig::from_file(path)?;
        Ok(Self::new(config))
    }

    /// Creates a director with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DirectorConfig::default())
    }

    /// Makes one decision for one context snapshot.
    ///
    /// Takes the best-scoring suggestion and resolves its plan. When the top
    /// suggestion has no plan bound, the decision carries a null resolution;
    /// the runner-up is deliberately not retried.
    pub fn decide(&mut self, ctx: &ContextSnapshot) -> DirectorDecision {
        let suggestions = self.suggester.suggest(&self.goals, ctx);
        let suggestion = suggestions.into_iter().next();

        let resolution = suggestion.as_ref().and_then(|best| {
            let goal = self.goals.get(&best.goal_id)?;
            self.planner.resolve_plan_with_context(
                goal,
                ctx,
                &self.plans,
                &self.variants,
                &self.coordinator,
            )
        });

        let decision = DirectorDecision {
            suggestion,
            resolution,
            decided_at_tick: ctx.tick,
        };
        self.last_decision = Some(decision.clone());
        decision
    }

    /// The full ranked suggestion list for a snapshot, without resolving.
    pub fn suggest(&self, ctx: &ContextSnapshot) -> Vec<Suggestion> {
        self.suggester.suggest(&self.goals, ctx)
    }

    /// Replaces the goal catalog wholesale from a JSON document. Returns how
    /// many entries were skipped.
    pub fn reload_goals(&mut self, json: &str) -> Result<usize, DirectorError> {
        let loaded = load_goal_catalog(json, &self.factories)?;
        tracing::debug!(
            "goal catalog reloaded: {} goals, {} skipped",
            loaded.goals.len(),
            loaded.skipped
        );
        self.goals.replace(loaded.goals);
        Ok(loaded.skipped)
    }

    /// Replaces the plan and fragment catalogs wholesale from a JSON
    /// document. Returns how many entries were skipped.
    pub fn reload_plans(&mut self, json: &str) -> Result<usize, DirectorError> {
        let loaded = load_plan_catalog(json)?;
        tracing::debug!(
            "plan catalog reloaded: {} fragments, {} plans, {} skipped",
            loaded.fragments.len(),
            loaded.plans.len(),
            loaded.skipped
        );
        self.fragments.replace(loaded.fragments);
        self.plans.replace(loaded.plans);
        // Stale resolutions must not outlive the catalog they came from
        self.planner.clear_cache();
        Ok(loaded.skipped)
    }

    /// Builds the executor handle for a goal via the factory registry.
    pub fn instantiate_behavior(&self, goal_id: &str) -> Option<BehaviorHandle> {
        let goal = self.goals.get(goal_id)?;
        self.factories.instantiate(goal)
    }

    /// Sweeps the coordinator's expired or orphaned invites.
    pub fn cleanup<F>(&self, now: u64, is_alive: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        self.coordinator.cleanup_expired_invites(now, is_alive)
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// The last decision made, for introspection.
    pub fn last_decision(&self) -> Option<&DirectorDecision> {
        self.last_decision.as_ref()
    }

    /// The shared group coordinator; clone the [`Arc`] to let other directors
    /// or the host publish and join invites.
    pub fn coordinator(&self) -> &Arc<GroupCoordinator> {
        &self.coordinator
    }

    pub fn goals(&self) -> &GoalRegistry {
        &self.goals
    }

    pub fn plans(&self) -> &PlanRegistry {
        &self.plans
    }

    pub fn fragments(&self) -> &FragmentRegistry {
        &self.fragments
    }

    pub fn variants(&self) -> &BehaviorVariantRegistry {
        &self.variants
    }

    /// Mutable access to the variant registry, e.g. to register custom
    /// presentations.
    pub fn variants_mut(&mut self) -> &mut BehaviorVariantRegistry {
        &mut self.variants
    }

    /// Mutable access to the factory registry, for hosts that add behavior
    /// kinds beyond the builtin set.
    pub fn factories_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.factories
    }

    /// Mutable access to the suggester, e.g. to append custom signals.
    pub fn suggester_mut(&mut self) -> &mut GoalSuggester {
        &mut self.suggester
    }
}

impl Default for AdaptiveDirector {
    fn default() -> Self {
        Self::with_defaults()
    }
}
