//! Deterministic Plan Resolution
//!
//! Resolves a suggested goal into a concrete step sequence, memoized by a
//! context signature. Two decisions that agree on every signature field are
//! behaviorally identical and share one cached resolution; fields outside the
//! signature must never influence resolution, or reuse would be incorrect.

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use agent_context::ContextSnapshot;

use crate::goals::GoalDefinition;
use crate::group::{GroupCoordinator, GroupMember, OwnerGroup};
use crate::plan::{ActionPlan, PlanRegistry, PlanStep};
use crate::variant::{BehaviorVariantRegistry, VariantChoice};

/// A plan step with its chosen presentation variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedStep {
    pub step: PlanStep,
    pub variant: Option<VariantChoice>,
}

/// The resolved, executable form of a plan for one context signature.
///
/// Reference-stable: for a fixed signature the same [`Arc`] is returned until
/// the entry is evicted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResolution {
    pub plan_id: String,
    pub goal_id: String,
    pub steps: Vec<ResolvedStep>,
    pub group: Option<OwnerGroup>,
    pub signature: String,
}

/// Builds the cache key from the context fields that affect resolution.
///
/// Fields: goal id, plan id, coarse mood level, momentum decimated to one
/// decimal, the emotion-set stable hash, the friendly crowd count, the
/// owner-nearby flag, and the owner identity iff the plan coordinates a
/// group. Momentum differences beyond one decimal are invisible here.
pub fn build_signature(goal: &GoalDefinition, plan: &ActionPlan, ctx: &ContextSnapshot) -> String {
    let level = ctx.mood.coarse_level();
    let momentum_decile = (ctx.momentum * 10.0).round() as i32;

    let mut signature = String::with_capacity(96);
    let _ = write!(
        signature,
        "{}|{}|{:?}:{:?}|m{}|e{:016x}|f{}|o{}",
        goal.id,
        plan.id,
        level.mood,
        level.band,
        momentum_decile,
        ctx.emotions.stable_hash(),
        ctx.crowd.friendly,
        ctx.owner_nearby() as u8,
    );
    if plan.requires_group {
        if let Some(owner) = &ctx.owner {
            let _ = write!(signature, "|{}", owner.owner_id);
        }
    }
    signature
}

/// Per-agent plan resolver with a bounded, insertion-ordered cache.
///
/// Owned by a single director, so no synchronization. Inserting past the
/// capacity evicts the oldest-inserted entry; lookups do not refresh an
/// entry's age.
#[derive(Debug)]
pub struct DeterministicPlanner {
    capacity: usize,
    cache: HashMap<String, Arc<PlanResolution>>,
    order: VecDeque<String>,
}

impl DeterministicPlanner {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cache: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Resolves the plan bound to a goal under this context, reusing the
    /// cached resolution when the signature matches.
    ///
    /// Returns `None` when no plan is bound to the goal; there is no fallback
    /// search.
    pub fn resolve_plan_with_context(
        &mut self,
        goal: &GoalDefinition,
        ctx: &ContextSnapshot,
        plans: &PlanRegistry,
        variants: &BehaviorVariantRegistry,
        coordinator: &GroupCoordinator,
    ) -> Option<Arc<PlanResolution>> {
        let plan = plans.plan_for_goal(&goal.id)?;
        let signature = build_signature(goal, &plan, ctx);

        if let Some(cached) = self.cache.get(&signature) {
            return Some(Arc::clone(cached));
        }

        let group = if plan.requires_group {
            let mut members = Vec::with_capacity(ctx.nearby_agents.len() + 1);
            members.push(GroupMember::new(
                ctx.agent_id.clone(),
                ctx.owner.as_ref().map(|o| o.owner_id.clone()),
            ));
            for nearby in ctx.nearby_agents.iter().filter(|n| n.capability_compatible) {
                members.push(GroupMember::new(
                    nearby.agent_id.clone(),
                    nearby.owner_id.clone(),
                ));
            }
            coordinator.form_owner_group(&members)
        } else {
            None
        };

        let steps = plan
            .steps
            .iter()
            .map(|step| ResolvedStep {
                step: step.clone(),
                variant: variants.select_with_pool(goal, ctx, &step.preferred_variants),
            })
            .collect();

        let resolution = Arc::new(PlanResolution {
            plan_id: plan.id.clone(),
            goal_id: goal.id.clone(),
            steps,
            group,
            signature: signature.clone(),
        });
        self.insert(signature, Arc::clone(&resolution));
        Some(resolution)
    }

    fn insert(&mut self, signature: String, resolution: Arc<PlanResolution>) {
        if self.capacity == 0 {
            return;
        }
        while self.cache.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.cache.remove(&oldest);
                tracing::debug!("evicted oldest plan resolution '{}'", oldest);
            } else {
                break;
            }
        }
        self.order.push_back(signature.clone());
        self.cache.insert(signature, resolution);
    }

    /// Whether a signature currently has a cached resolution.
    pub fn is_cached(&self, signature: &str) -> bool {
        self.cache.contains_key(signature)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached resolution.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.order.clear();
    }
}
