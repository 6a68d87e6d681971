//! Game state and the hit dispatch that ties the subsystems together
//!
//! `GameState` owns every collaborator explicitly: the roster, the pattern
//! engine, the session (round controller) and the arrows in play. Nothing
//! is reached through globals.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pattern::PatternEngine;
use super::projectile::{Contact, ContactOutcome, Projectile, ProjectileId};
use super::round::{RoundEnd, RoundHooks, Session};
use super::target::{HitKind, Roster, TargetId};
use super::trajectory::LaunchParameters;
use super::turret::Turret;
use crate::Settings;
use crate::error::SimError;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Round in progress
    Playing,
    /// Simulation frozen by the player
    Paused,
    /// Round finished, waiting to start the next one
    RoundOver,
    /// All rounds played
    GameOver,
}

/// Things the host may want to show or play a sound for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    RoundStarted { round: u32, pattern_length: usize },
    ArrowLaunched { projectile: ProjectileId, params: LaunchParameters },
    ArrowStuck { projectile: ProjectileId, target: TargetId },
    ArrowExpired { projectile: ProjectileId },
    /// Score popup at the target
    TargetHit { target: TargetId, kind: HitKind, points: u32 },
    ScoreAdded { points: u32 },
    PatternHit { target: TargetId },
    PatternCompleted,
    PatternFailed,
    AttemptsExhausted,
    RoundOver { round: u32, reason: RoundEnd },
    GameOver { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub settings: Settings,
    pub session: Session,
    pub roster: Roster,
    pub pattern: PatternEngine,
    pub turret: Turret,
    /// Arrows in flight or stuck (sorted by id)
    pub projectiles: Vec<Projectile>,
    /// Simulation tick counter
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    /// Build a game from validated settings. No round is running yet.
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SimError> {
        settings.validate()?;
        Ok(Self {
            seed,
            session: Session::new(),
            roster: Roster::from_settings(&settings),
            pattern: PatternEngine::new(settings.pattern.clone(), seed),
            turret: Turret::new(settings.turret.clone()),
            projectiles: Vec::new(),
            time_ticks: 0,
            next_id: 1,
            settings,
        })
    }

    pub fn start_game(&mut self) -> Result<usize, SimError> {
        self.start_round(0)
    }

    /// Reset the field, refill ammo and begin the pattern reveal for `round_index`
    pub fn start_round(&mut self, round_index: u32) -> Result<usize, SimError> {
        self.projectiles.clear();
        self.roster.reset_all();
        self.turret.reset_charge();
        self.session.begin_round(round_index, self.settings.round.ammo_per_round);

        let pattern_length = self
            .pattern
            .start_round(round_index, &mut self.roster, &mut self.session)?;
        self.session.push_event(GameEvent::RoundStarted {
            round: round_index,
            pattern_length,
        });
        Ok(pattern_length)
    }

    /// Start the round after the one that just finished
    pub fn next_round(&mut self) -> Result<usize, SimError> {
        self.start_round(self.session.round_index + 1)
    }

    /// Stop the current round and decide whether the game is over
    pub fn end_round(&mut self, reason: RoundEnd) {
        let round = self.session.round_index;
        log::info!("Round {} over: {:?} (score {})", round + 1, reason, self.session.score);
        self.pattern.cancel(&mut self.roster, &mut self.session);
        self.turret.reset_charge();
        self.session.phase = GamePhase::RoundOver;
        self.session.push_event(GameEvent::RoundOver { round, reason });

        if round + 1 >= self.settings.round.max_rounds {
            self.session.end_game();
        }
    }

    fn next_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Launch an arrow. This is the only entry point aiming code needs.
    ///
    /// Refused while the round is not taking shots (reveal hold, pause,
    /// round or game over) and once the round's ammo is spent.
    pub fn launch(
        &mut self,
        speed: f32,
        gravity: f32,
        angle_degrees: f32,
        origin: Vec2,
    ) -> Result<ProjectileId, SimError> {
        if !self.session.accepts_input() {
            return Err(SimError::NotAcceptingInput);
        }
        if !self.session.has_ammo() {
            return Err(SimError::OutOfAmmo);
        }
        let params = LaunchParameters::new(speed, gravity, angle_degrees)?;
        let id = self.next_projectile_id();
        log::debug!(
            "Launching arrow {} speed={speed} angle={angle_degrees} gravity={gravity}",
            id.0
        );
        self.projectiles.push(Projectile::launch(
            id,
            params,
            origin,
            self.settings.projectile.max_lifetime_secs,
        ));
        self.session.arrow_shot();
        self.session.push_event(GameEvent::ArrowLaunched {
            projectile: id,
            params,
        });
        Ok(id)
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn flying_count(&self) -> usize {
        self.projectiles.iter().filter(|p| p.is_flying()).count()
    }

    /// Deliver a contact from the collision source to an arrow
    pub fn apply_contact(&mut self, id: ProjectileId, contact: Contact) -> ContactOutcome {
        let Some(projectile) = self.projectiles.iter_mut().find(|p| p.id == id) else {
            return ContactOutcome::Ignored;
        };
        let outcome = projectile.on_contact(contact, &self.roster);
        match outcome {
            ContactOutcome::Stuck(target) => {
                self.session.push_event(GameEvent::ArrowStuck {
                    projectile: id,
                    target,
                });
                self.dispatch_hit(target);
            }
            ContactOutcome::Expired => {
                self.session.push_event(GameEvent::ArrowExpired { projectile: id });
                self.dispose_expired();
            }
            ContactOutcome::Ignored => {}
        }
        outcome
    }

    /// Route a strike through the target state machine to scoring and
    /// pattern verification
    fn dispatch_hit(&mut self, target: TargetId) {
        let Some(report) = self.roster.handle_hit(target) else {
            return;
        };
        self.session.push_event(GameEvent::TargetHit {
            target,
            kind: report.kind,
            points: report.points,
        });
        self.session.target_hit();

        match report.kind {
            HitKind::Pattern => {
                self.session.handle_pattern_hit(target);
                self.pattern.register_player_hit(target, &mut self.session);
            }
            HitKind::Normal => {
                self.session.add_score(report.points);
                if self.pattern.accepts_input() {
                    self.pattern.register_player_hit(target, &mut self.session);
                }
            }
        }
    }

    pub(crate) fn dispose_expired(&mut self) {
        self.projectiles.retain(|p| !p.is_expired());
    }

    /// Take all events produced since the last drain. Nothing drains the
    /// queue automatically, so hosts should call this after every `tick`.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::pattern::PatternPhase;
    use crate::sim::target::TargetState;
    use crate::sim::tick::{TickInput, tick};

    fn fresh(settings: Settings) -> GameState {
        let mut state = GameState::new(settings, 42).unwrap();
        state.start_game().unwrap();
        state
    }

    /// A game past its first reveal, ready for shots
    fn game() -> GameState {
        let mut state = fresh(Settings::default());
        while state.pattern.phase() != PatternPhase::AwaitingInput {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state
    }

    #[test]
    fn test_start_game_holds_for_reveal() {
        let state = fresh(Settings::default());
        assert_eq!(state.pattern.phase(), PatternPhase::Displaying);
        assert!(state.session.is_game_paused());
        assert_eq!(state.session.ammo, 10);
    }

    #[test]
    fn test_launch_spends_ammo() {
        let mut state = game();
        let id = state.launch(10.0, 9.8, 30.0, Vec2::ZERO).unwrap();
        assert_eq!(state.session.ammo, 9);
        assert_eq!(state.flying_count(), 1);
        assert!(state.projectile(id).unwrap().is_flying());
        assert!(state.launch(-1.0, 9.8, 30.0, Vec2::ZERO).is_err());
        assert_eq!(state.session.ammo, 9);
    }

    #[test]
    fn test_launch_refused_during_reveal() {
        let mut state = fresh(Settings::default());
        assert!(matches!(
            state.launch(10.0, 9.8, 30.0, Vec2::ZERO),
            Err(SimError::NotAcceptingInput)
        ));
        assert_eq!(state.session.ammo, 10);
        assert_eq!(state.session.arrows_shot, 0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_launch_refused_when_out_of_ammo() {
        let mut settings = Settings::default();
        settings.round.ammo_per_round = 1;
        let mut state = fresh(settings);
        while state.pattern.phase() != PatternPhase::AwaitingInput {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        state.launch(10.0, 9.8, 30.0, Vec2::ZERO).unwrap();
        assert!(matches!(
            state.launch(10.0, 9.8, 30.0, Vec2::ZERO),
            Err(SimError::OutOfAmmo)
        ));
        assert_eq!(state.session.ammo, 0);
        assert_eq!(state.session.arrows_shot, 1);
        assert_eq!(state.projectiles.len(), 1);
    }

    #[test]
    fn test_launch_refused_after_round_over() {
        let mut state = game();
        state.end_round(RoundEnd::AmmoExhausted);
        assert!(matches!(
            state.launch(10.0, 9.8, 30.0, Vec2::ZERO),
            Err(SimError::NotAcceptingInput)
        ));
    }

    #[test]
    fn test_boundary_contact_disposes_arrow() {
        let mut state = game();
        let id = state.launch(10.0, 9.8, 30.0, Vec2::ZERO).unwrap();
        assert_eq!(state.apply_contact(id, Contact::Boundary), ContactOutcome::Expired);
        assert!(state.projectile(id).is_none());
        assert_eq!(state.apply_contact(id, Contact::Boundary), ContactOutcome::Ignored);
    }

    #[test]
    fn test_normal_hit_scores_once() {
        let mut state = game();
        let target = TargetId(1);
        assert_eq!(state.roster.state(target), Some(TargetState::Active));
        let a = state.launch(10.0, 9.8, 0.0, Vec2::ZERO).unwrap();
        let b = state.launch(10.0, 9.8, 0.0, Vec2::ZERO).unwrap();
        state.apply_contact(a, Contact::Target(target));
        state.apply_contact(b, Contact::Target(target));

        assert_eq!(state.session.score, 100);
        assert_eq!(state.session.targets_hit, 1);
        assert_eq!(state.roster.state(target), Some(TargetState::Hit));
        // Both arrows stay stuck in the target
        assert_eq!(state.projectiles.len(), 2);
        assert_eq!(state.projectile(b).unwrap().stuck_target(), Some(target));
    }

    #[test]
    fn test_idle_target_contact_scores_nothing() {
        let mut state = game();
        state.roster.reset_to_idle(TargetId(2));
        let a = state.launch(10.0, 9.8, 0.0, Vec2::ZERO).unwrap();
        state.apply_contact(a, Contact::Target(TargetId(2)));
        assert_eq!(state.session.score, 0);
        assert_eq!(state.session.targets_hit, 0);
    }
}
