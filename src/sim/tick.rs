//! Fixed timestep simulation tick
//!
//! Order within a tick: turret input, arrow flight, target motion and
//! flash resets, pattern reveal, target activation, round-end check.

use serde::{Deserialize, Serialize};

use super::round::RoundHooks;
use super::state::{GameEvent, GamePhase, GameState};
use super::turret::TurretCommand;
use crate::error::SimError;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Turret commands, applied in order
    pub commands: Vec<TurretCommand>,
    /// Pause toggle
    pub pause: bool,
    /// Start the next round once the current one is over
    pub next_round: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.session.phase {
            GamePhase::Playing => {
                state.session.pause_game();
                return;
            }
            GamePhase::Paused => state.session.resume_game(),
            _ => {}
        }
    }

    match state.session.phase {
        GamePhase::Paused | GamePhase::GameOver => return,
        GamePhase::RoundOver => {
            if input.next_round {
                if let Err(e) = state.next_round() {
                    log::error!("Could not start round {}: {}", state.session.round_index + 2, e);
                }
            }
            return;
        }
        GamePhase::Playing => {}
    }

    if !state.session.is_game_started() {
        return;
    }

    state.time_ticks += 1;
    let time_secs = state.time_ticks as f32 * dt;

    // Turret input is dropped while the pattern reveal holds the round
    if state.session.accepts_input() {
        for &command in &input.commands {
            let Some(speed) = state.turret.apply(command, dt) else {
                continue;
            };
            let gravity = state.settings.projectile.gravity;
            let angle = state.turret.angle;
            let origin = state.turret.muzzle();
            match state.launch(speed, gravity, angle, origin) {
                Ok(_) => {}
                Err(SimError::OutOfAmmo) => log::debug!("Out of arrows; shot discarded"),
                Err(e) => log::warn!("Launch rejected: {e}"),
            }
        }
        state.turret.tick(dt);
    }

    // Arrow flight
    for projectile in &mut state.projectiles {
        if projectile.tick(dt) {
            state.session.push_event(GameEvent::ArrowExpired {
                projectile: projectile.id,
            });
        }
    }
    state.dispose_expired();

    // Targets move, flashes run out, stuck arrows ride along
    state.roster.tick(time_secs);
    for projectile in &mut state.projectiles {
        projectile.follow_anchor(&state.roster);
    }

    state.pattern.tick(&mut state.roster, &mut state.session);

    if state.session.accepts_input() {
        state.roster.activate_idle();
    }

    if let Some(reason) = state.session.round_end(state.flying_count()) {
        state.end_round(reason);
    }
}
