//! Shared context types for the behavior decision pipeline.
//!
//! This crate contains pure data structures with no decision logic.
//! It is a dependency for all other crates in the workspace.

pub mod capability;
pub mod mood;
pub mod snapshot;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export capability types
pub use capability::{AgentState, CapabilityProfile, CapabilityRequirement};

// Re-export mood and disposition types
pub use mood::{
    AgeCategory, Emotion, EmotionSet, GoalCategory, IntensityBand, Mood, MoodBlend, MoodLevel,
    NatureBias,
};

// Re-export snapshot types
pub use snapshot::{
    ContextSnapshot, CrowdSummary, GoalHistory, GoalRun, MobilityState, NearbyAgent,
    OwnerPresence, WorldPos, GOAL_HISTORY_CAP, OWNER_NEARBY_DISTANCE,
};
