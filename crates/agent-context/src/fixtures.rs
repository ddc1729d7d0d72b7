//! Sample data fixtures for testing.
//!
//! Ready-made agent states and context snapshots for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // agent-context = { path = "../agent-context", features = ["test-fixtures"] }
//!
//! use agent_context::fixtures;
//!
//! let ctx = fixtures::baseline_context(1000);
//! ```

use crate::capability::{AgentState, CapabilityProfile};
use crate::mood::{Emotion, GoalCategory, Mood};
use crate::snapshot::{ContextSnapshot, CrowdSummary, NearbyAgent, OwnerPresence};

/// A small owned land creature: four legs, one carry slot, a voice.
pub fn baseline_agent_state() -> AgentState {
    AgentState {
        legs: 4,
        winged: false,
        gilled: false,
        buoyant: false,
        leap_strength: 0.6,
        carry_slots: 1,
        owner_id: Some("owner_ana".to_string()),
        body_mass: 8.0,
        voice: true,
    }
}

/// A calm snapshot at the given tick: owner 4 units away, mild contentment,
/// two friendly agents in the crowd, neutral energy and momentum.
pub fn baseline_context(tick: u64) -> ContextSnapshot {
    let profile = CapabilityProfile::analyze(&baseline_agent_state());
    let mut ctx = ContextSnapshot::new("agent_pip", tick, "overworld", profile);
    ctx.mood.set(Mood::Content, 0.6);
    ctx.emotions.set(Emotion::Curiosity, 0.3);
    ctx.owner = Some(OwnerPresence::new("owner_ana", 4.0));
    ctx.crowd = CrowdSummary {
        friendly: 2,
        hostile: 0,
    };
    ctx.nearby_agents.push(NearbyAgent::new(
        "agent_momo",
        Some("owner_ana".to_string()),
        true,
    ));
    ctx.nearby_agents.push(NearbyAgent::new(
        "agent_juno",
        Some("owner_bea".to_string()),
        true,
    ));
    ctx
}

/// The baseline snapshot with active combat. Feasibility collapses to zero
/// for every goal under this context.
pub fn combat_context(tick: u64) -> ContextSnapshot {
    let mut ctx = baseline_context(tick);
    ctx.in_combat = true;
    ctx.emotions.set(Emotion::Fear, 0.8);
    ctx
}

/// The baseline snapshot with no owner in range and a lonely, play-hungry
/// affect.
pub fn stray_context(tick: u64) -> ContextSnapshot {
    let mut ctx = baseline_context(tick);
    ctx.owner = None;
    ctx.mood = crate::mood::MoodBlend::single(Mood::Lonely, 0.7);
    ctx.nature.set(GoalCategory::Play, 1.3);
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_context_shape() {
        let ctx = baseline_context(1000);

        assert_eq!(ctx.tick, 1000);
        assert!(ctx.capabilities.ground);
        assert!(ctx.capabilities.has_owner);
        assert!(ctx.owner_nearby());
        assert!(!ctx.in_combat);
        assert_eq!(ctx.nearby_agents.len(), 2);
    }

    #[test]
    fn test_combat_context_flags_combat() {
        let ctx = combat_context(1000);
        assert!(ctx.in_combat);
    }

    #[test]
    fn test_stray_context_has_no_owner() {
        let ctx = stray_context(1000);
        assert!(ctx.owner.is_none());
        assert!(!ctx.owner_nearby());
        assert_eq!(ctx.mood.dominant(), Mood::Lonely);
    }
}
