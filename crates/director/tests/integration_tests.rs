//! Integration tests for the behavior director.
//!
//! These tests drive the full pipeline end-to-end: catalog loading, goal
//! suggestion, plan resolution with caching, variant selection, and group
//! coordination.

use std::sync::Arc;

use agent_context::{fixtures, GoalCategory, Mood, MoodBlend, WorldPos};
use director::{AdaptiveDirector, GroupCoordinator, InvitePolicy};
use std::fs;
use tempfile::tempdir;

const GOALS_JSON: &str = r#"[
    {"id": "greet_owner", "category": "social", "priority": 0.8,
     "factory": "follow_owner", "requirement": "owned_only",
     "cooldown": {"min_ticks": 100, "max_ticks": 1200}},
    {"id": "chase_tail", "category": "play", "priority": 0.5, "factory": "wander"},
    {"id": "group_romp", "category": "play", "priority": 0.6, "factory": "wander"},
    {"id": "nap", "category": "rest", "priority": 0.4, "factory": "nap",
     "energy_range": {"min": 0.0, "max": 0.4}},
    {"id": "soar", "category": "explore", "priority": 0.9, "factory": "wander",
     "requirement": "flight_only"}
]"#;

const PLANS_JSON: &str = r#"{
    "fragments": [
        {"id": "approach_owner", "display_name": "Approach the owner", "expected_ticks": 60},
        {"id": "circle_spot", "expected_ticks": 40},
        {"id": "settle_down", "expected_ticks": 200},
        {"id": "rally", "expected_ticks": 30}
    ],
    "plans": [
        {"id": "plan_greet", "goal_id": "greet_owner", "steps": [
            "approach_owner",
            {"fragment": "settle_down", "variants": ["tail_wag"], "tags": ["greeting"]}
        ]},
        {"id": "plan_romp", "goal_id": "group_romp", "requires_group": true,
         "steps": ["rally", "circle_spot"]},
        {"id": "plan_nap", "goal_id": "nap", "steps": ["circle_spot", "settle_down"]}
    ]
}"#;

fn make_director() -> AdaptiveDirector {
    let mut director = AdaptiveDirector::with_defaults();
    assert_eq!(director.reload_goals(GOALS_JSON).unwrap(), 0);
    assert_eq!(director.reload_plans(PLANS_JSON).unwrap(), 0);
    director
}

/// Full pipeline: catalogs in, ranked decision with resolved steps out.
#[test]
fn test_full_decision_pipeline() {
    let mut director = make_director();
    let ctx = fixtures::baseline_context(1000);

    let decision = director.decide(&ctx);

    let suggestion = decision.suggestion.expect("expected a winning suggestion");
    assert_eq!(suggestion.goal_id, "greet_owner");
    assert!(suggestion.score > 0.0);

    let resolution = decision.resolution.expect("greet_owner has a plan bound");
    assert_eq!(resolution.plan_id, "plan_greet");
    assert_eq!(resolution.steps.len(), 2);
    // Preferred pool entry matches a social goal with the owner nearby
    let greeting = resolution.steps[1].variant.as_ref().unwrap();
    assert_eq!(greeting.variant_id, "tail_wag");
    assert_eq!(greeting.presentation, "wag_fast");
}

/// Score law and ordering hold through the public suggestion surface.
#[test]
fn test_suggestions_obey_score_law() {
    let director = make_director();
    let ctx = fixtures::baseline_context(1000);

    let suggestions = director.suggest(&ctx);
    assert!(suggestions.len() >= 2);

    for suggestion in &suggestions {
        assert!(
            (suggestion.score - suggestion.desirability * suggestion.feasibility).abs() < 1e-6
        );
    }
    for pair in suggestions.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    // The flight-gated goal never appears for a land agent
    assert!(suggestions.iter().all(|s| s.goal_id != "soar"));
}

/// Two snapshots differing only in fine momentum share one cached
/// resolution; a mood-level change forces an independent one.
#[test]
fn test_signature_determinism_across_decisions() {
    let mut director = make_director();

    let mut a = fixtures::baseline_context(1000);
    a.momentum = 0.50;
    let first = director.decide(&a).resolution.unwrap();

    let mut b = a.clone();
    b.momentum = 0.52;
    let second = director.decide(&b).resolution.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let mut c = a.clone();
    c.mood = MoodBlend::single(Mood::Drowsy, 0.9);
    let third = director.decide(&c).resolution.unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_ne!(first.signature, third.signature);
}

/// A goal without a plan yields a decision with a null resolution, and the
/// runner-up suggestion is not consulted.
#[test]
fn test_missing_plan_is_not_retried() {
    let mut director = make_director();
    let mut ctx = fixtures::baseline_context(1000);
    // chase_tail has no plan; make it win over the planned goals
    ctx.owner = None;
    ctx.nature.set(GoalCategory::Play, 1.8);
    ctx.energy = 0.9;
    // A fresh group_romp run keeps the higher-priority planned goal behind
    ctx.history.record("group_romp", 990);

    let decision = director.decide(&ctx);
    assert_eq!(decision.suggestion.as_ref().unwrap().goal_id, "chase_tail");
    assert!(decision.resolution.is_none());

    // The ranked list still contains a resolvable runner-up that was skipped
    let suggestions = director.suggest(&ctx);
    assert!(suggestions.iter().skip(1).any(|s| s.goal_id == "group_romp"));
}

/// A group-coordinated plan forms the owner group from compatible nearby
/// agents.
#[test]
fn test_group_plan_resolution() {
    let mut director = make_director();
    let mut ctx = fixtures::baseline_context(1000);
    // Push group_romp to the top
    ctx.owner = Some(agent_context::OwnerPresence::new("owner_ana", 2.0));
    ctx.nature.set(GoalCategory::Play, 1.6);
    ctx.history.record("greet_owner", 990);

    let decision = director.decide(&ctx);
    assert_eq!(decision.suggestion.as_ref().unwrap().goal_id, "group_romp");

    let resolution = decision.resolution.unwrap();
    let group = resolution.group.as_ref().expect("same-owner pair nearby");
    assert_eq!(group.owner_id, "owner_ana");
    assert_eq!(group.member_ids, vec!["agent_pip", "agent_momo"]);
}

/// Invite lifecycle across the shared coordinator: capacity, expiry, and
/// self-join rules.
#[test]
fn test_invite_lifecycle_through_coordinator() {
    let director = make_director();
    let coordinator = Arc::clone(director.coordinator());
    let origin = WorldPos::default();

    let invite = coordinator.publish_open_invite(
        "agent_momo",
        "group_romp",
        "overworld",
        origin,
        1000,
        8.0,
        2,
        60,
    );

    let found = coordinator
        .find_nearby_open_invite("group_romp", "agent_pip", "overworld", &origin, 1000)
        .unwrap();
    assert_eq!(found.session_id, invite.session_id);

    assert!(coordinator.try_join_open_invite(&invite, "agent_pip", "overworld", &origin, 1000, |_| true));
    assert!(coordinator.try_join_open_invite(&invite, "agent_juno", "overworld", &origin, 1030, |_| true));
    assert!(!coordinator.try_join_open_invite(&invite, "agent_rex", "overworld", &origin, 1030, |_| true));
    assert!(!coordinator.try_join_open_invite(&invite, "agent_rex", "overworld", &origin, 1061, |_| true));
    assert!(!coordinator.try_join_open_invite(&invite, "agent_momo", "overworld", &origin, 1030, |_| true));
    assert_eq!(invite.follower_count(), 2);

    // The director's sweep reaps it once expired
    assert_eq!(director.cleanup(1061, |_| true), 1);
    assert_eq!(coordinator.open_invite_count(), 0);
}

/// Concurrent joins on one invite never exceed capacity and never admit a
/// duplicate.
#[tokio::test]
async fn test_concurrent_joins_respect_capacity() {
    let coordinator = Arc::new(GroupCoordinator::new(InvitePolicy::default()));
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

    let mut handles = Vec::new();
    for i in 0..16 {
        let coordinator = Arc::clone(&coordinator);
        let invite = Arc::clone(&invite);
        handles.push(tokio::spawn(async move {
            let agent_id = format!("agent_{:02}", i / 2); // every id attempted twice
            coordinator.try_join_open_invite(
                &invite,
                &agent_id,
                "overworld",
                &WorldPos::default(),
                1000,
                |_| true,
            )
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 3);
    assert_eq!(invite.follower_count(), 3);
    let followers = invite.followers();
    let mut deduped = followers.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), followers.len());
}

/// Config loaded from disk drives the planner cache bound.
#[test]
fn test_config_from_file_drives_cache_capacity() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("director.toml");
    fs::write(
        &path,
        r#"
            [planner]
            cache_capacity = 2

            [invites]
            default_capacity = 6
        "#,
    )
    .expect("Failed to write config");

    let mut director = AdaptiveDirector::from_config_file(&path).unwrap();
    director.reload_goals(GOALS_JSON).unwrap();
    director.reload_plans(PLANS_JSON).unwrap();

    assert_eq!(director.config().planner.cache_capacity, 2);
    assert_eq!(director.config().invites.default_capacity, 6);
    // Unspecified sections keep their defaults
    assert_eq!(director.config().scoring.variety_mid_ticks, 300);

    // Capacity 6 flows into normalized invite publishes
    let invite = director.coordinator().publish_open_invite(
        "agent_momo",
        "group_romp",
        "overworld",
        WorldPos::default(),
        1000,
        8.0,
        0,
        60,
    );
    assert_eq!(invite.capacity, 6);
}

/// Catalog reloads drop bad entries individually and replace wholesale.
#[test]
fn test_catalog_reload_degrades_per_entry() {
    let mut director = make_director();

    let skipped = director
        .reload_goals(
            r#"[
                {"id": "patrol", "category": "work", "priority": 0.6, "factory": "patrol"},
                {"id": "mind_read", "category": "work", "priority": 0.6,
                 "factory": "patrol", "requirement": "telepathic"},
                {"id": "summon", "category": "work", "priority": 0.6, "factory": "summon_meteor"}
            ]"#,
        )
        .unwrap();

    assert_eq!(skipped, 2);
    assert_eq!(director.goals().len(), 1);
    assert!(director.goals().get("patrol").is_some());
    assert!(director.goals().get("greet_owner").is_none());
}

/// Repeated decisions with identical snapshots are fully reproducible.
#[test]
fn test_decisions_are_deterministic() {
    let mut director_a = make_director();
    let mut director_b = make_director();
    let ctx = fixtures::baseline_context(1000);

    let a = director_a.decide(&ctx);
    let b = director_b.decide(&ctx);

    let sa = a.suggestion.unwrap();
    let sb = b.suggestion.unwrap();
    assert_eq!(sa.goal_id, sb.goal_id);
    assert_eq!(sa.score, sb.score);

    let ra = a.resolution.unwrap();
    let rb = b.resolution.unwrap();
    assert_eq!(ra.signature, rb.signature);
    assert_eq!(ra.steps, rb.steps);
}
