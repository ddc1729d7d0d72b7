//! Capability Profiles
//!
//! Derives what an agent can physically do from primitive body observations.
//! Profiles are cheap to recompute and carry no state; goal definitions gate
//! on them with [`CapabilityRequirement`] before any scoring runs.

use serde::{Deserialize, Serialize};

/// Raw physical observations of an agent, as reported by the host simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Number of legs (0 for serpentine or fully aquatic bodies)
    pub legs: u8,
    /// Whether the body has functional wings
    pub winged: bool,
    /// Whether the body has gills
    pub gilled: bool,
    /// Whether the body floats unaided
    pub buoyant: bool,
    /// Leg power, 0..1; drives the jump capability
    pub leap_strength: f32,
    /// Number of item slots the body can hold
    pub carry_slots: u8,
    /// Identity of the bonded owner, if any
    pub owner_id: Option<String>,
    /// Body mass in abstract units; small bodies are under 10.0
    pub body_mass: f32,
    /// Whether the agent can produce calls
    pub voice: bool,
}

/// Boolean capability traits derived from an [`AgentState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub ground: bool,
    pub fly: bool,
    pub swim: bool,
    pub jump: bool,
    pub has_owner: bool,
    pub carry_items: bool,
    pub has_inventory: bool,
    pub can_sit: bool,
    pub vocalize: bool,
    pub prefers_land: bool,
    pub prefers_water: bool,
    pub prefers_air: bool,
    pub small_body: bool,
}

impl CapabilityProfile {
    /// Derives a profile from primitive observations. Pure; identical states
    /// always produce identical profiles.
    pub fn analyze(state: &AgentState) -> Self {
        let ground = state.legs > 0;
        let fly = state.winged;
        let swim = state.gilled || state.buoyant;

        // Habitat preference: gills dominate, then wings, then legs.
        let prefers_water = state.gilled;
        let prefers_air = state.winged && !state.gilled;
        let prefers_land = !prefers_water && !prefers_air;

        Self {
            ground,
            fly,
            swim,
            jump: ground && state.leap_strength > 0.25,
            has_owner: state.owner_id.is_some(),
            carry_items: state.carry_slots > 0,
            has_inventory: state.carry_slots > 1,
            can_sit: state.legs >= 2,
            vocalize: state.voice,
            prefers_land,
            prefers_water,
            prefers_air,
            small_body: state.body_mass < 10.0,
        }
    }
}

/// Capability predicate attached to a goal definition.
///
/// Data files reference these by keyword; an unrecognized keyword fails the
/// entry, not the load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityRequirement {
    /// Matches every profile
    #[default]
    Any,
    /// Ground locomotion without flight
    LandBound,
    /// Flight capable
    FlightOnly,
    /// Swim capable
    Aquatic,
    /// Bonded to an owner
    OwnedOnly,
    /// Able to pick up and hold items
    ItemHandling,
}

impl CapabilityRequirement {
    /// Checks the requirement against a profile.
    pub fn matches(self, profile: &CapabilityProfile) -> bool {
        match self {
            CapabilityRequirement::Any => true,
            CapabilityRequirement::LandBound => profile.ground && !profile.fly,
            CapabilityRequirement::FlightOnly => profile.fly,
            CapabilityRequirement::Aquatic => profile.swim,
            CapabilityRequirement::OwnedOnly => profile.has_owner,
            CapabilityRequirement::ItemHandling => profile.carry_items,
        }
    }
}
