//! Neon Bullseye headless runner
//!
//! Plays a full seeded game with a simple autopilot and logs what happens.
//!
//! Usage:
//!   neon-bullseye [settings.json] [--seed <seed>]
//!   RUST_LOG=debug neon-bullseye

use std::path::PathBuf;

use clap::Parser;
use neon_bullseye::consts::SIM_DT;
use neon_bullseye::sim::trajectory::solve_launch_angle;
use neon_bullseye::sim::{
    GameEvent, GamePhase, GameState, PatternPhase, TargetId, TargetState, TickInput, TurretCommand, contact, tick,
};
use neon_bullseye::{Settings, SimError};

#[derive(Parser)]
#[command(name = "neon-bullseye")]
#[command(about = "Play a seeded Neon Bullseye game with an autopilot")]
struct Args {
    /// Settings JSON file (defaults are used when omitted)
    settings: Option<PathBuf>,
    /// Seed for pattern generation
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,
}

/// Give up if a game somehow never ends
const MAX_TICKS: u64 = 200_000;
/// Launch speed the autopilot charges up to
const AUTOPILOT_SPEED: f32 = 20.0;

/// Aims at the next target it wants and fires one arrow at a time
#[derive(Default)]
struct Autopilot {
    aimed_at: Option<TargetId>,
}

impl Autopilot {
    fn plan(&mut self, state: &GameState) -> Result<TickInput, SimError> {
        let mut input = TickInput::default();
        match state.session.phase {
            GamePhase::RoundOver => {
                input.next_round = true;
                return Ok(input);
            }
            GamePhase::Playing => {}
            _ => return Ok(input),
        }
        if !state.session.accepts_input() {
            return Ok(input);
        }

        let turret = &state.turret;
        if turret.charging {
            let wanted = AUTOPILOT_SPEED.min(turret.max_charge());
            if turret.charge >= wanted {
                input.commands.push(TurretCommand::Release);
            }
            return Ok(input);
        }
        if state.flying_count() > 0 || !state.session.has_ammo() {
            return Ok(input);
        }

        let Some(target) = self.choose_target(state) else {
            return Ok(input);
        };
        let Some(angle) = self.aim(state, target)? else {
            log::debug!("Target {} out of reach", target.0);
            return Ok(input);
        };
        self.aimed_at = Some(target);
        input.commands.push(TurretCommand::AimAt(angle));
        input.commands.push(TurretCommand::BeginCharge);
        Ok(input)
    }

    /// Next pattern target if the sequence is being verified, else any live target
    fn choose_target(&self, state: &GameState) -> Option<TargetId> {
        if state.pattern.phase() == PatternPhase::AwaitingInput {
            let next = state.pattern.sequence().get(state.pattern.progress().len()).copied();
            if next.is_some_and(|id| state.roster.state(id) == Some(TargetState::Active)) {
                return next;
            }
        }
        state
            .roster
            .iter()
            .find(|t| t.state() == TargetState::Active)
            .map(|t| t.id)
    }

    fn aim(&self, state: &GameState, target: TargetId) -> Result<Option<f32>, SimError> {
        let goal = state.roster.require(target)?.pose().position;
        let gravity = state.settings.projectile.gravity;
        let speed = AUTOPILOT_SPEED.min(state.turret.max_charge());
        let (min, max) = state.turret.angle_limits();

        // Solve from the pivot, then refine from the muzzle at that angle
        let Some(rough) = solve_launch_angle(speed, gravity, state.turret.position, goal, false) else {
            return Ok(None);
        };
        let muzzle = state.turret.muzzle_at(rough);
        let angle = solve_launch_angle(speed, gravity, muzzle, goal, false);
        Ok(angle.filter(|a| (min..=max).contains(a)))
    }
}

fn run(settings: Settings, seed: u64) -> Result<(), SimError> {
    let mut state = GameState::new(settings, seed)?;
    state.start_game()?;
    let mut pilot = Autopilot::default();

    while state.time_ticks < MAX_TICKS && state.session.phase != GamePhase::GameOver {
        let input = pilot.plan(&state)?;
        tick(&mut state, &input, SIM_DT);

        for (projectile, contact) in contact::detect(&state) {
            state.apply_contact(projectile, contact);
        }

        for event in state.drain_events() {
            match event {
                GameEvent::TargetHit { target, kind, points } => {
                    log::info!("Hit target {} ({:?}) +{}", target.0, kind, points);
                }
                GameEvent::PatternCompleted | GameEvent::PatternFailed | GameEvent::AttemptsExhausted => {
                    log::info!("{:?} (attempts left {})", event, state.pattern.attempts_remaining());
                }
                other => log::debug!("{:?}", other),
            }
        }
    }

    if state.session.phase != GamePhase::GameOver {
        log::warn!("Stopped after {} ticks without finishing", state.time_ticks);
    }
    let s = &state.session;
    println!(
        "score {} | rounds {} | arrows {} | hits {} | patterns {} completed / {} failed (last target {:?})",
        s.score,
        s.round_index + 1,
        s.arrows_shot,
        s.targets_hit,
        s.patterns_completed,
        s.patterns_failed,
        pilot.aimed_at.map(|t| t.0),
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Neon Bullseye (headless) starting...");

    let settings = match &args.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };
    log::info!("Game initialized with seed: {}", args.seed);

    if let Err(e) = run(settings, args.seed) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
