//! Ephemeral Group Coordination
//!
//! Short-lived, capacity-bounded "open invitations" that let nearby agents
//! opportunistically join a shared behavior window. Many independently
//! scheduled agents publish, query, and join invites around the same tick, so
//! the bucket map sits behind a read-write lock and each invite guards its
//! follower set with its own mutex. Every operation is non-blocking; an
//! invite past its window silently stops accepting joins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agent_context::WorldPos;

use crate::config::InviteConfig;

/// Defaults applied when a publish supplies non-positive radius, capacity, or
/// window values.
#[derive(Debug, Clone, Copy)]
pub struct InvitePolicy {
    pub radius: f32,
    pub capacity: usize,
    pub window_ticks: u64,
}

impl From<&InviteConfig> for InvitePolicy {
    fn from(config: &InviteConfig) -> Self {
        Self {
            radius: config.default_radius,
            capacity: config.default_capacity,
            window_ticks: config.default_window_ticks,
        }
    }
}

impl Default for InvitePolicy {
    fn default() -> Self {
        Self::from(&InviteConfig::default())
    }
}

/// A published, joinable behavior window.
///
/// The follower set is the only mutable state; it is guarded by a per-invite
/// mutex so the capacity check and the insertion happen atomically. An invite
/// never exceeds its capacity and never admits the same follower twice.
#[derive(Debug)]
pub struct OpenInvite {
    pub session_id: Uuid,
    pub initiator_id: String,
    pub behavior_id: String,
    pub world_key: String,
    pub position: WorldPos,
    pub created_tick: u64,
    pub window_ticks: u64,
    pub radius: f32,
    pub capacity: usize,
    followers: Mutex<Vec<String>>,
}

impl OpenInvite {
    /// Whether the join window has closed.
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_sub(self.created_tick) > self.window_ticks
    }

    /// Whether another follower still fits.
    pub fn has_capacity(&self) -> bool {
        self.followers.lock().expect("invite lock poisoned").len() < self.capacity
    }

    /// Whether the agent already joined this invite.
    pub fn has_follower(&self, agent_id: &str) -> bool {
        self.followers
            .lock()
            .expect("invite lock poisoned")
            .iter()
            .any(|f| f == agent_id)
    }

    pub fn follower_count(&self) -> usize {
        self.followers.lock().expect("invite lock poisoned").len()
    }

    /// Joined followers in join order.
    pub fn followers(&self) -> Vec<String> {
        self.followers.lock().expect("invite lock poisoned").clone()
    }

    /// Atomically checks capacity and uniqueness, then records the follower.
    ///
    /// This is the only mutation an invite supports. Returns false when the
    /// invite is full or the agent already joined.
    fn try_add_follower(&self, agent_id: &str) -> bool {
        let mut followers = self.followers.lock().expect("invite lock poisoned");
        if followers.len() >= self.capacity {
            return false;
        }
        if followers.iter().any(|f| f == agent_id) {
            return false;
        }
        followers.push(agent_id.to_string());
        true
    }
}

/// One agent's membership facts, as seen by group formation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub agent_id: String,
    pub owner_id: Option<String>,
}

impl GroupMember {
    pub fn new(agent_id: impl Into<String>, owner_id: Option<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            owner_id,
        }
    }
}

/// Agents sharing an owner, formed for a group-coordinated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerGroup {
    pub owner_id: String,
    pub member_ids: Vec<String>,
}

/// Manages open invites, bucketed by behavior identity.
///
/// Shared across agents behind an [`Arc`]; all methods take `&self`.
#[derive(Debug, Default)]
pub struct GroupCoordinator {
    policy: InvitePolicy,
    buckets: RwLock<HashMap<String, Vec<Arc<OpenInvite>>>>,
}

impl GroupCoordinator {
    pub fn new(policy: InvitePolicy) -> Self {
        Self {
            policy,
            buckets: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> InvitePolicy {
        self.policy
    }

    /// Publishes an invite, replacing any existing one from the same
    /// initiator for the same behavior. Non-positive radius, capacity, or
    /// window values fall back to the policy defaults.
    #[allow(clippy::too_many_arguments)]
    pub fn publish_open_invite(
        &self,
        initiator_id: &str,
        behavior_id: &str,
        world_key: &str,
        position: WorldPos,
        now: u64,
        radius: f32,
        capacity: usize,
        window_ticks: u64,
    ) -> Arc<OpenInvite> {
        let invite = Arc::new(OpenInvite {
            session_id: Uuid::new_v4(),
            initiator_id: initiator_id.to_string(),
            behavior_id: behavior_id.to_string(),
            world_key: world_key.to_string(),
            position,
            created_tick: now,
            window_ticks: if window_ticks > 0 {
                window_ticks
            } else {
                self.policy.window_ticks
            },
            radius: if radius > 0.0 {
                radius
            } else {
                self.policy.radius
            },
            capacity: if capacity > 0 {
                capacity
            } else {
                self.policy.capacity
            },
            followers: Mutex::new(Vec::new()),
        });

        let mut buckets = self.buckets.write().expect("bucket lock poisoned");
        let bucket = buckets.entry(behavior_id.to_string()).or_default();
        bucket.retain(|existing| existing.initiator_id != initiator_id);
        bucket.push(Arc::clone(&invite));
        invite
    }

    /// Finds the first joinable invite for a behavior near the asking agent.
    ///
    /// Expired, full, already-joined, self-initiated, cross-world, and
    /// out-of-range invites are filtered out.
    pub fn find_nearby_open_invite(
        &self,
        behavior_id: &str,
        agent_id: &str,
        world_key: &str,
        position: &WorldPos,
        now: u64,
    ) -> Option<Arc<OpenInvite>> {
        // Clone the arc list so iteration never holds the bucket lock
        let candidates: Vec<Arc<OpenInvite>> = {
            let buckets = self.buckets.read().expect("bucket lock poisoned");
            buckets.get(behavior_id).cloned().unwrap_or_default()
        };

        candidates.into_iter().find(|invite| {
            !invite.is_expired(now)
                && invite.has_capacity()
                && !invite.has_follower(agent_id)
                && invite.initiator_id != agent_id
                && invite.world_key == world_key
                && invite.position.distance_to(position) <= invite.radius
        })
    }

    /// Attempts to join an invite. Best-effort: every failure is an ordinary
    /// `false`.
    ///
    /// Expiry, world, initiator liveness, and range are re-validated before
    /// the atomic capacity-and-uniqueness check, since conditions can shift
    /// between finding an invite and joining it.
    pub fn try_join_open_invite<F>(
        &self,
        invite: &OpenInvite,
        agent_id: &str,
        world_key: &str,
        position: &WorldPos,
        now: u64,
        is_alive: F,
    ) -> bool
    where
        F: Fn(&str) -> bool,
    {
        if invite.is_expired(now) {
            return false;
        }
        if invite.world_key != world_key {
            return false;
        }
        if invite.initiator_id == agent_id {
            return false;
        }
        if !is_alive(&invite.initiator_id) {
            return false;
        }
        if invite.position.distance_to(position) > invite.radius {
            return false;
        }
        invite.try_add_follower(agent_id)
    }

    /// Removes expired invites and invites whose initiator is gone. Safe to
    /// call redundantly; returns how many invites were reaped.
    pub fn cleanup_expired_invites<F>(&self, now: u64, is_alive: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let mut buckets = self.buckets.write().expect("bucket lock poisoned");
        let mut reaped = 0;
        for bucket in buckets.values_mut() {
            let before = bucket.len();
            bucket.retain(|invite| !invite.is_expired(now) && is_alive(&invite.initiator_id));
            reaped += before - bucket.len();
        }
        buckets.retain(|_, bucket| !bucket.is_empty());
        if reaped > 0 {
            tracing::debug!("reaped {} expired or orphaned invites", reaped);
        }
        reaped
    }

    /// Groups members by owner identity (first-seen order) and returns the
    /// first owner group with more than one member.
    pub fn form_owner_group(&self, members: &[GroupMember]) -> Option<OwnerGroup> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for member in members {
            let Some(owner_id) = &member.owner_id else {
                continue;
            };
            match groups.iter_mut().find(|(owner, _)| owner == owner_id) {
                Some((_, ids)) => ids.push(member.agent_id.clone()),
                None => groups.push((owner_id.clone(), vec![member.agent_id.clone()])),
            }
        }
        groups
            .into_iter()
            .find(|(_, ids)| ids.len() > 1)
            .map(|(owner_id, member_ids)| OwnerGroup {
                owner_id,
                member_ids,
            })
    }

    /// Total invites currently held, across all behaviors.
    pub fn open_invite_count(&self) -> usize {
        self.buckets
            .read()
            .expect("bucket lock poisoned")
            .values()
            .map(|bucket| bucket.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_coordinator() -> GroupCoordinator {
        GroupCoordinator::new(InvitePolicy::default())
    }

    fn always_alive(_: &str) -> bool {
        true
    }

    #[test]
    fn test_publish_normalizes_nonpositive_values() {
        let coordinator = make_coordinator();
        let invite = coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            WorldPos::default(),
            1000,
            0.0,
            0,
            0,
        );

        let policy = coordinator.policy();
        assert_eq!(invite.radius, policy.radius);
        assert_eq!(invite.capacity, policy.capacity);
        assert_eq!(invite.window_ticks, policy.window_ticks);
    }

    #[test]
    fn test_publish_replaces_previous_invite() {
        let coordinator = make_coordinator();
        let first = coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            WorldPos::default(),
            1000,
            8.0,
            2,
            60,
        );
        let second = coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            WorldPos::default(),
            1010,
            8.0,
            2,
            60,
        );

        assert_eq!(coordinator.open_invite_count(), 1);
        assert_ne!(first.session_id, second.session_id);

        let found = coordinator
            .find_nearby_open_invite("group_romp", "agent_pip", "overworld", &WorldPos::default(), 1010)
            .unwrap();
        assert_eq!(found.session_id, second.session_id);
    }

    #[test]
    fn test_publish_same_initiator_different_behavior_coexists() {
        let coordinator = make_coordinator();
        coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            WorldPos::default(),
            1000,
            8.0,
            2,
            60,
        );
        coordinator.publish_open_invite(
            "agent_momo",
            "group_howl",
            "overworld",
            WorldPos::default(),
            1000,
            8.0,
            2,
            60,
        );

        assert_eq!(coordinator.open_invite_count(), 2);
    }

    #[test]
    fn test_invite_lifecycle() {
        let coordinator = make_coordinator();
        let invite = coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            WorldPos::default(),
            1000,
            8.0,
            2,
            60,
        );
        let near = WorldPos::new(2.0, 0.0, 0.0);

        // Two distinct agents fit
        assert!(coordinator.try_join_open_invite(&invite, "agent_pip", "overworld", &near, 1000, always_alive));
        assert_eq!(invite.follower_count(), 1);
        assert!(coordinator.try_join_open_invite(&invite, "agent_juno", "overworld", &near, 1030, always_alive));
        assert_eq!(invite.follower_count(), 2);

        // Third join fails on capacity
        assert!(!invite.has_capacity());
        assert!(!coordinator.try_join_open_invite(&invite, "agent_rex", "overworld", &near, 1030, always_alive));

        // Past the window, expiry rejects regardless of capacity
        assert!(invite.is_expired(1061));
        assert!(!coordinator.try_join_open_invite(&invite, "agent_rex", "overworld", &near, 1061, always_alive));

        // Initiators never join their own invite
        assert!(!coordinator.try_join_open_invite(&invite, "agent_momo", "overworld", &near, 1030, always_alive));
    }

    #[test]
    fn test_join_rejects_duplicate_follower() {
        let coordinator = make_coordinator();
        let invite = coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            WorldPos::default(),
            1000,
            8.0,
            3,
            60,
        );
        let near = WorldPos::default();

        assert!(coordinator.try_join_open_invite(&invite, "agent_pip", "overworld", &near, 1000, always_alive));
        assert!(!coordinator.try_join_open_invite(&invite, "agent_pip", "overworld", &near, 1001, always_alive));
        assert_eq!(invite.follower_count(), 1);
    }

    #[test]
    fn test_join_rejects_cross_world_and_range_and_dead_initiator() {
        let coordinator = make_coordinator();
        let invite = coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            WorldPos::default(),
            1000,
            8.0,
            2,
            60,
        );

        let far = WorldPos::new(50.0, 0.0, 0.0);
        assert!(!coordinator.try_join_open_invite(&invite, "agent_pip", "overworld", &far, 1000, always_alive));

        let near = WorldPos::default();
        assert!(!coordinator.try_join_open_invite(&invite, "agent_pip", "the_depths", &near, 1000, always_alive));

        assert!(!coordinator.try_join_open_invite(&invite, "agent_pip", "overworld", &near, 1000, |_| false));

        assert_eq!(invite.follower_count(), 0);
    }

    #[test]
    fn test_find_filters_candidates() {
        let coordinator = make_coordinator();
        let origin = WorldPos::default();
        coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            origin,
            1000,
            8.0,
            2,
            60,
        );

        // Self-initiated
        assert!(coordinator
            .find_nearby_open_invite("group_romp", "agent_momo", "overworld", &origin, 1000)
            .is_none());
        // Cross-world
        assert!(coordinator
            .find_nearby_open_invite("group_romp", "agent_pip", "the_depths", &origin, 1000)
            .is_none());
        // Out of range
        let far = WorldPos::new(20.0, 0.0, 0.0);
        assert!(coordinator
            .find_nearby_open_invite("group_romp", "agent_pip", "overworld", &far, 1000)
            .is_none());
        // Expired
        assert!(coordinator
            .find_nearby_open_invite("group_romp", "agent_pip", "overworld", &origin, 1100)
            .is_none());
        // Unknown behavior
        assert!(coordinator
            .find_nearby_open_invite("group_howl", "agent_pip", "overworld", &origin, 1000)
            .is_none());

        // A near, live, open invite is found
        assert!(coordinator
            .find_nearby_open_invite("group_romp", "agent_pip", "overworld", &origin, 1000)
            .is_some());
    }

    #[test]
    fn test_find_skips_already_joined() {
        let coordinator = make_coordinator();
        let origin = WorldPos::default();
        let invite = coordinator.publish_open_invite(
            "agent_momo",
            "group_romp",
            "overworld",
            origin,
            1000,
            8.0,
            3,
            60,
        );
        coordinator.try_join_open_invite(&invite, "agent_pip", "overworld", &origin, 1000, always_alive);

        assert!(coordinator
            .find_nearby_open_invite("group_romp", "agent_pip", "overworld", &origin, 1000)
            .is_none());
        assert!(coordinator
            .find_nearby_open_invite("group_romp", "agent_juno", "overworld", &origin, 1000)
            .is_some());
    }

    #[test]
    fn test_cleanup_reaps_expired_and_orphaned() {
        let coordinator = make_coordinator();
        let origin = WorldPos::default();
        coordinator.publish_open_invite(
            "agent_momo", "group_romp", "overworld", origin, 1000, 8.0, 2, 60,
        );
        coordinator.publish_open_invite(
            "agent_gone", "group_romp", "overworld", origin, 1050, 8.0, 2, 60,
        );
        coordinator.publish_open_invite(
            "agent_juno", "group_howl", "overworld", origin, 1050, 8.0, 2, 60,
        );

        // First invite expired at 1070; agent_gone's initiator is dead
        let reaped = coordinator.cleanup_expired_invites(1070, |id| id != "agent_gone");
        assert_eq!(reaped, 2);
        assert_eq!(coordinator.open_invite_count(), 1);

        // Redundant sweep is a no-op
        assert_eq!(coordinator.cleanup_expired_invites(1070, always_alive), 0);
    }

    #[test]
    fn test_form_owner_group() {
        let coordinator = make_coordinator();
        let members = vec![
            GroupMember::new("agent_a", Some("owner_u".to_string())),
            GroupMember::new("agent_b", Some("owner_u".to_string())),
            GroupMember::new("agent_c", Some("owner_v".to_string())),
        ];

        let group = coordinator.form_owner_group(&members).unwrap();
        assert_eq!(group.owner_id, "owner_u");
        assert_eq!(group.member_ids, vec!["agent_a", "agent_b"]);
    }

    #[test]
    fn test_form_owner_group_requires_two_members() {
        let coordinator = make_coordinator();
        let members = vec![
            GroupMember::new("agent_a", Some("owner_u".to_string())),
            GroupMember::new("agent_c", Some("owner_v".to_string())),
            GroupMember::new("agent_stray", None),
        ];

        assert!(coordinator.form_owner_group(&members).is_none());
        assert!(coordinator.form_owner_group(&[]).is_none());
    }

    #[test]
    fn test_form_owner_group_skips_singleton_owners() {
        let coordinator = make_coordinator();
        let members = vec![
            GroupMember::new("agent_a", Some("owner_u".to_string())),
            GroupMember::new("agent_b", Some("owner_v".to_string())),
            GroupMember::new("agent_c", Some("owner_v".to_string())),
        ];

        // owner_u has one member; the first group with more than one wins
        let group = coordinator.form_owner_group(&members).unwrap();
        assert_eq!(group.owner_id, "owner_v");
        assert_eq!(group.member_ids, vec!["agent_b", "agent_c"]);
    }
}
