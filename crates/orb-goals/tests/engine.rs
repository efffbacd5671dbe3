mod common;

use orb_core::Vec3;
use orb_goals::{Goal, GoalEngine, GoalKind, GoalStatus, MAX_PRIORITY};
use orb_perception::{FeatureKind, OrbMemory, PerceptionData, TerrainFeature};
use proptest::prelude::*;

fn kinds(goals: &[Goal]) -> Vec<GoalKind> {
    goals.iter().map(|g| g.kind).collect()
}

#[test]
fn evaluation_drops_finished_and_expired_goals() {
    let engine = GoalEngine::default();
    let mut done = Goal::new(GoalKind::Build, 9, 0);
    done.status = GoalStatus::Completed;
    let mut failed = Goal::new(GoalKind::Gather, 9, 0);
    failed.status = GoalStatus::Failed;
    let expired = Goal::new(GoalKind::Investigate, 9, 0).expiring_at(500);
    let fresh = Goal::new(GoalKind::Investigate, 2, 0).expiring_at(5_000);
    let idle = Goal::new(GoalKind::Idle, 1, 0);

    let out = engine.evaluate_goals(
        vec![done, failed, expired, fresh, idle],
        &PerceptionData::default(),
        &OrbMemory::new(0.5),
        1_000,
    );

    assert_eq!(kinds(&out), vec![GoalKind::Investigate, GoalKind::Idle]);
}

#[test]
fn situational_nudges_are_applied_and_clamped() {
    let engine = GoalEngine::default();
    let mut perception = PerceptionData::default();
    perception.player.distance = 20.0;
    perception.player.visible = true;
    perception.terrain_features.push(TerrainFeature {
        kind: FeatureKind::Tree,
        position: Vec3::new(3.0, 0.0, 3.0),
        distance: 4.0,
    });
    let memory = OrbMemory::new(0.8);

    let goals = vec![
        Goal::new(GoalKind::FollowPlayer, 9, 0),
        Goal::new(GoalKind::Explore, 3, 0),
        Goal::new(GoalKind::Observe, 4, 0),
        Goal::new(GoalKind::Idle, 1, 0),
    ];
    let out = engine.evaluate_goals(goals, &perception, &memory, 0);

    let effective: Vec<(GoalKind, u8, u8)> = out
        .iter()
        .map(|g| (g.kind, g.priority, g.effective_priority))
        .collect();
    assert_eq!(
        effective,
        vec![
            (GoalKind::FollowPlayer, 9, 10),
            (GoalKind::Observe, 4, 5),
            (GoalKind::Explore, 3, 4),
            (GoalKind::Idle, 1, 0),
        ]
    );
}

#[test]
fn nudges_do_not_accumulate_across_evaluations() {
    let engine = GoalEngine::default();
    let mut perception = PerceptionData::default();
    perception.player.visible = true;
    let memory = OrbMemory::new(0.5);

    let mut goals = vec![Goal::new(GoalKind::Observe, 4, 0)];
    for _ in 0..5 {
        goals = engine.evaluate_goals(goals, &perception, &memory, 0);
    }
    assert_eq!(goals[0].priority, 4);
    assert_eq!(goals[0].effective_priority, 5);
}

#[test]
fn ties_keep_insertion_order() {
    let engine = GoalEngine::default();
    let a = Goal::new(GoalKind::Investigate, 5, 0);
    let b = Goal::new(GoalKind::Build, 5, 0);
    let c = Goal::new(GoalKind::Gather, 5, 0);
    let ids = vec![a.id, b.id, c.id];

    let out = engine.evaluate_goals(
        vec![a, b, c],
        &PerceptionData::default(),
        &OrbMemory::new(0.5),
        0,
    );
    assert_eq!(out.iter().map(|g| g.id).collect::<Vec<_>>(), ids);
}

#[test]
fn default_goals_depend_on_curiosity() {
    let engine = GoalEngine::default();

    let curious = engine.default_goals(&OrbMemory::new(0.6), 0);
    assert_eq!(
        kinds(&curious),
        vec![GoalKind::Idle, GoalKind::Explore, GoalKind::Observe]
    );
    assert_eq!(
        curious.iter().map(|g| g.priority).collect::<Vec<_>>(),
        vec![1, 3, 4]
    );

    let calm = engine.default_goals(&OrbMemory::new(0.5), 0);
    assert_eq!(kinds(&calm), vec![GoalKind::Idle, GoalKind::Observe]);
}

#[test]
fn selection_skips_suspended_goals() {
    let engine = GoalEngine::default();
    let mut parked = Goal::new(GoalKind::Build, 8, 0);
    parked.status = GoalStatus::Suspended;
    let idle = Goal::new(GoalKind::Idle, 1, 0);
    let idle_id = idle.id;

    assert_eq!(engine.select_active(&[parked, idle]), Some(idle_id));
    assert_eq!(engine.select_active(&[]), None);
}

#[test]
fn every_kind_has_a_behavior() {
    let engine = GoalEngine::default();
    for kind in GoalKind::ALL {
        assert!(engine.behavior(kind).is_some(), "{kind}");
    }
}

fn arb_goal() -> impl Strategy<Value = Goal> {
    (0usize..7, 0u8..=15, 0usize..5, prop::option::of(0u64..2_000)).prop_map(
        |(kind, priority, status, expires)| {
            let mut goal = Goal::new(GoalKind::ALL[kind], 0, 0);
            goal.priority = priority;
            goal.status = [
                GoalStatus::Pending,
                GoalStatus::Active,
                GoalStatus::Completed,
                GoalStatus::Failed,
                GoalStatus::Suspended,
            ][status];
            goal.expires_at_ms = expires;
            goal
        },
    )
}

proptest! {
    #[test]
    fn evaluation_is_sorted_clamped_and_live(
        goals in prop::collection::vec(arb_goal(), 0..16),
        player_distance in 0.0f32..40.0,
        visible in any::<bool>(),
        curiosity in 0.0f32..1.0,
        feature in any::<bool>(),
    ) {
        let engine = GoalEngine::default();
        let mut perception = PerceptionData::default();
        perception.player.distance = player_distance;
        perception.player.visible = visible;
        if feature {
            perception.terrain_features.push(TerrainFeature {
                kind: FeatureKind::Water,
                position: Vec3::ZERO,
                distance: 1.0,
            });
        }
        let memory = OrbMemory::new(curiosity);
        let now = 1_000;

        let out = engine.evaluate_goals(goals, &perception, &memory, now);

        for pair in out.windows(2) {
            prop_assert!(pair[0].effective_priority >= pair[1].effective_priority);
        }
        for goal in &out {
            prop_assert!(goal.effective_priority <= MAX_PRIORITY);
            prop_assert!(!goal.status.is_terminal());
            prop_assert!(!goal.is_expired(now));
        }
    }
}
