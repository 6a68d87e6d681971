//! Property tests for the deterministic parts of the simulation

use glam::Vec2;
use neon_bullseye::consts::SIM_DT;
use neon_bullseye::settings::PatternSettings;
use neon_bullseye::sim::trajectory::{self, LaunchParameters};
use neon_bullseye::sim::{
    Contact, ContactOutcome, Motion, PatternEngine, Projectile, ProjectileId, Roster, RoundHooks, TargetId,
    TargetSpec, pattern_length_for_round,
};
use proptest::prelude::*;

/// Hooks that only remember the pause flag
#[derive(Default)]
struct Quiet {
    paused: bool,
}

impl RoundHooks for Quiet {
    fn add_score(&mut self, _points: u32) {}
    fn arrow_shot(&mut self) {}
    fn target_hit(&mut self) {}
    fn pattern_completed(&mut self) {}
    fn pattern_failed(&mut self) {}
    fn handle_pattern_hit(&mut self, _target: TargetId) {}
    fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }
    fn is_game_paused(&self) -> bool {
        self.paused
    }
    fn is_game_started(&self) -> bool {
        true
    }
}

fn roster(n: usize) -> Roster {
    let specs: Vec<TargetSpec> = (0..n)
        .map(|i| TargetSpec::new(Vec2::new(2.0 + i as f32, 0.0), Motion::Static))
        .collect();
    Roster::new(&specs, 100, 500, 10)
}

proptest! {
    #[test]
    fn trajectory_starts_at_origin(
        speed in 0.1f32..60.0,
        gravity in 0.0f32..30.0,
        angle in -90.0f32..90.0,
        ox in -10.0f32..10.0,
        oy in -10.0f32..10.0,
    ) {
        let params = LaunchParameters::new(speed, gravity, angle).unwrap();
        let origin = Vec2::new(ox, oy);
        prop_assert_eq!(trajectory::position_at(&params, origin, 0.0), origin);
    }

    #[test]
    fn trajectory_is_deterministic(
        speed in 0.1f32..60.0,
        gravity in 0.0f32..30.0,
        angle in -90.0f32..90.0,
        t in 0.0f32..10.0,
    ) {
        let params = LaunchParameters::new(speed, gravity, angle).unwrap();
        let a = trajectory::position_at(&params, Vec2::ZERO, t);
        let b = trajectory::position_at(&params, Vec2::ZERO, t);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn pattern_is_unique_and_clamped(seed in any::<u64>(), targets in 1usize..10, round in 0u32..20) {
        let settings = PatternSettings::default();
        let mut roster = roster(targets);
        let mut engine = PatternEngine::new(settings.clone(), seed);
        let mut hooks = Quiet::default();

        let length = engine.start_round(round, &mut roster, &mut hooks).unwrap();
        let wanted = pattern_length_for_round(&settings, round);
        prop_assert_eq!(length, wanted.min(targets));
        prop_assert_eq!(engine.sequence().len(), length);

        let mut seen = engine.sequence().to_vec();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), length);
        prop_assert!(engine.sequence().iter().all(|id| roster.get(*id).is_some()));
    }

    #[test]
    fn pattern_length_grows_monotonically(growth in 0.0f32..3.0, initial in 1usize..6, max in 1usize..12) {
        let settings = PatternSettings {
            initial_targets: initial,
            max_targets: max.max(initial),
            growth_per_round: growth,
            ..PatternSettings::default()
        };
        let mut last = 0;
        for round in 0..30 {
            let length = pattern_length_for_round(&settings, round);
            prop_assert!(length >= last);
            prop_assert!(length <= settings.max_targets);
            last = length;
        }
    }

    #[test]
    fn terminal_arrow_ignores_everything(
        speed in 1.0f32..40.0,
        angle in -60.0f32..60.0,
        stick in any::<bool>(),
        ticks in 1usize..50,
    ) {
        let roster = roster(1);
        let params = LaunchParameters::new(speed, 9.8, angle).unwrap();
        let mut arrow = Projectile::launch(ProjectileId(1), params, Vec2::ZERO, 10.0);
        arrow.tick(SIM_DT);

        let first = if stick { Contact::Target(TargetId(1)) } else { Contact::Boundary };
        let outcome = arrow.on_contact(first, &roster);
        prop_assert_ne!(outcome, ContactOutcome::Ignored);

        let phase = arrow.phase;
        let position = arrow.position;
        for _ in 0..ticks {
            prop_assert!(!arrow.tick(SIM_DT));
        }
        prop_assert_eq!(arrow.on_contact(Contact::Boundary, &roster), ContactOutcome::Ignored);
        prop_assert_eq!(arrow.on_contact(Contact::Target(TargetId(1)), &roster), ContactOutcome::Ignored);
        prop_assert_eq!(arrow.phase, phase);
        prop_assert_eq!(arrow.position, position);
    }
}
