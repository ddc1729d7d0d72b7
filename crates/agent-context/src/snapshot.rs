//! Context Snapshots
//!
//! The immutable value object a decision reads. The calling tick captures a
//! fresh snapshot for every decision and owns it; the pipeline only borrows.

use serde::{Deserialize, Serialize};

use crate::capability::CapabilityProfile;
use crate::mood::{AgeCategory, EmotionSet, MoodBlend, NatureBias};

/// Owner distance within which the owner counts as "nearby".
pub const OWNER_NEARBY_DISTANCE: f32 = 16.0;

/// Maximum entries kept in a goal history.
pub const GOAL_HISTORY_CAP: usize = 8;

/// A position in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Momentary locomotion state of the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilityState {
    pub airborne: bool,
    pub swimming: bool,
    pub mounted: bool,
}

impl MobilityState {
    /// Airborne without swimming or being mounted leaves most behaviors
    /// awkward to start.
    pub fn is_impaired(&self) -> bool {
        self.airborne && !self.swimming && !self.mounted
    }
}

/// Counts of other agents near the deciding agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrowdSummary {
    pub friendly: u32,
    pub hostile: u32,
}

/// Presence and distance of the agent's bonded owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerPresence {
    pub owner_id: String,
    pub distance: f32,
}

impl OwnerPresence {
    pub fn new(owner_id: impl Into<String>, distance: f32) -> Self {
        Self {
            owner_id: owner_id.into(),
            distance,
        }
    }
}

/// A nearby agent as seen at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyAgent {
    pub agent_id: String,
    /// Owner of the nearby agent, if bonded
    pub owner_id: Option<String>,
    /// Whether the nearby agent's capability profile is compatible with the
    /// deciding agent's (same locomotion class)
    pub capability_compatible: bool,
}

impl NearbyAgent {
    pub fn new(agent_id: impl Into<String>, owner_id: Option<String>, compatible: bool) -> Self {
        Self {
            agent_id: agent_id.into(),
            owner_id,
            capability_compatible: compatible,
        }
    }
}

/// One completed goal run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRun {
    pub goal_id: String,
    pub tick: u64,
}

/// Bounded queue of recently executed goals, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalHistory {
    entries: Vec<GoalRun>,
}

impl GoalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a run at the front, dropping the oldest entry past the cap.
    pub fn record(&mut self, goal_id: impl Into<String>, tick: u64) {
        self.entries.insert(
            0,
            GoalRun {
                goal_id: goal_id.into(),
                tick,
            },
        );
        self.entries.truncate(GOAL_HISTORY_CAP);
    }

    /// Ticks since the most recent run of a goal, or None if never recorded.
    pub fn ticks_since(&self, goal_id: &str, now: u64) -> Option<u64> {
        self.entries
            .iter()
            .find(|run| run.goal_id == goal_id)
            .map(|run| now.saturating_sub(run.tick))
    }

    /// Position of the goal's most recent run in the queue (0 = most recent),
    /// or None if not present.
    pub fn position_of(&self, goal_id: &str) -> Option<usize> {
        self.entries.iter().position(|run| run.goal_id == goal_id)
    }

    /// Entries in most-recent-first order.
    pub fn entries(&self) -> &[GoalRun] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything a single decision may read, captured immutably.
///
/// Snapshots are plain data: construct one with [`ContextSnapshot::new`] and
/// fill the remaining fields directly before handing it to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub agent_id: String,
    pub tick: u64,
    /// World/dimension the agent currently occupies
    pub world_key: String,
    pub position: WorldPos,
    pub capabilities: CapabilityProfile,
    pub mobility: MobilityState,
    pub in_combat: bool,
    /// Current energy, 0..1
    pub energy: f32,
    /// Behavioral momentum, 0..1; how committed the agent is to its current
    /// activity
    pub momentum: f32,
    pub mood: MoodBlend,
    pub emotions: EmotionSet,
    pub nature: NatureBias,
    pub age: AgeCategory,
    /// Bond strength with the owner, 0..1
    pub bond_strength: f32,
    pub crowd: CrowdSummary,
    pub owner: Option<OwnerPresence>,
    pub nearby_agents: Vec<NearbyAgent>,
    pub history: GoalHistory,
}

impl ContextSnapshot {
    /// Creates a snapshot with neutral affect and no surroundings.
    pub fn new(
        agent_id: impl Into<String>,
        tick: u64,
        world_key: impl Into<String>,
        capabilities: CapabilityProfile,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            tick,
            world_key: world_key.into(),
            position: WorldPos::default(),
            capabilities,
            mobility: MobilityState::default(),
            in_combat: false,
            energy: 0.5,
            momentum: 0.5,
            mood: MoodBlend::new(),
            emotions: EmotionSet::new(),
            nature: NatureBias::neutral(),
            age: AgeCategory::default(),
            bond_strength: 0.5,
            crowd: CrowdSummary::default(),
            owner: None,
            nearby_agents: Vec::new(),
            history: GoalHistory::new(),
        }
    }

    /// Whether the owner is present and within [`OWNER_NEARBY_DISTANCE`].
    pub fn owner_nearby(&self) -> bool {
        self.owner
            .as_ref()
            .map(|o| o.distance <= OWNER_NEARBY_DISTANCE)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_pos_distance() {
        let a = WorldPos::new(0.0, 0.0, 0.0);
        let b = WorldPos::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_mobility_impairment() {
        let grounded = MobilityState::default();
        assert!(!grounded.is_impaired());

        let airborne = MobilityState {
            airborne: true,
            ..MobilityState::default()
        };
        assert!(airborne.is_impaired());

        let mounted_flier = MobilityState {
            airborne: true,
            mounted: true,
            ..MobilityState::default()
        };
        assert!(!mounted_flier.is_impaired());
    }

    #[test]
    fn test_goal_history_record_order() {
        let mut history = GoalHistory::new();
        history.record("nap", 100);
        history.record("fetch", 200);

        assert_eq!(history.entries()[0].goal_id, "fetch");
        assert_eq!(history.entries()[1].goal_id, "nap");
        assert_eq!(history.position_of("fetch"), Some(0));
        assert_eq!(history.position_of("nap"), Some(1));
        assert_eq!(history.position_of("patrol"), None);
    }

    #[test]
    fn test_goal_history_ticks_since() {
        let mut history = GoalHistory::new();
        history.record("nap", 100);
        history.record("nap", 400);

        // Most recent run wins
        assert_eq!(history.ticks_since("nap", 450), Some(50));
        assert_eq!(history.ticks_since("fetch", 450), None);
    }

    #[test]
    fn test_goal_history_bounded() {
        let mut history = GoalHistory::new();
        for i in 0..20 {
            history.record(format!("goal_{}", i), i as u64);
        }

        assert_eq!(history.len(), GOAL_HISTORY_CAP);
        // Oldest entries dropped
        assert_eq!(history.position_of("goal_0"), None);
        assert_eq!(history.position_of("goal_19"), Some(0));
    }

    #[test]
    fn test_owner_nearby_threshold() {
        let mut ctx = ContextSnapshot::new("agent_pip", 0, "overworld", CapabilityProfile::default());
        assert!(!ctx.owner_nearby());

        ctx.owner = Some(OwnerPresence::new("owner_ana", 4.0));
        assert!(ctx.owner_nearby());

        ctx.owner = Some(OwnerPresence::new("owner_ana", 20.0));
        assert!(!ctx.owner_nearby());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut ctx = ContextSnapshot::new("agent_pip", 42, "overworld", CapabilityProfile::default());
        ctx.crowd = CrowdSummary {
            friendly: 3,
            hostile: 1,
        };
        ctx.nearby_agents
            .push(NearbyAgent::new("agent_momo", Some("owner_ana".to_string()), true));
        ctx.history.record("nap", 10);

        let json = serde_json::to_string(&ctx).unwrap();
        let parsed: ContextSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(ctx, parsed);
    }
}
