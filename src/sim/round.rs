//! Round controller contract and the default session implementation
//!
//! The pattern engine and the hit dispatcher only talk to the round
//! through `RoundHooks`, so tests can substitute a recorder and hosts can
//! plug in their own bookkeeping.

use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase};
use super::target::TargetId;

/// Scoring / round collaborator consumed by the core
pub trait RoundHooks {
    fn add_score(&mut self, points: u32);
    fn arrow_shot(&mut self);
    fn target_hit(&mut self);
    fn pattern_completed(&mut self);
    fn pattern_failed(&mut self);
    /// The last pattern attempt of the round was spent
    fn attempts_exhausted(&mut self) {}
    fn handle_pattern_hit(&mut self, target: TargetId);
    /// Hold or release the display-time pause
    fn set_paused(&mut self, paused: bool);
    fn is_game_paused(&self) -> bool;
    fn is_game_started(&self) -> bool;
}

/// Why a round stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEnd {
    AmmoExhausted,
    AttemptsExhausted,
}

/// Score, ammo and phase for a whole game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub phase: GamePhase,
    /// Current round index (0-based)
    pub round_index: u32,
    pub score: u64,
    /// Arrows left this round
    pub ammo: u32,
    pub arrows_shot: u32,
    pub targets_hit: u32,
    pub pattern_hits: u32,
    pub patterns_completed: u32,
    pub patterns_failed: u32,
    /// Held by the pattern display
    input_hold: bool,
    started: bool,
    attempts_exhausted: bool,
    /// Pending events; hosts must drain these every frame or they pile up
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Playing,
            round_index: 0,
            score: 0,
            ammo: 0,
            arrows_shot: 0,
            targets_hit: 0,
            pattern_hits: 0,
            patterns_completed: 0,
            patterns_failed: 0,
            input_hold: false,
            started: false,
            attempts_exhausted: false,
            events: Vec::new(),
        }
    }

    /// Reset per-round counters and refill ammo
    pub fn begin_round(&mut self, round_index: u32, ammo: u32) {
        log::info!("Starting round {} with {} arrows", round_index + 1, ammo);
        self.round_index = round_index;
        self.ammo = ammo;
        self.input_hold = false;
        self.attempts_exhausted = false;
        self.started = true;
        self.phase = GamePhase::Playing;
    }

    /// Why the round should stop now, if it should.
    ///
    /// Running out of ammo only ends the round once no arrow is still
    /// airborne, so the last shot can still score.
    pub fn round_end(&self, arrows_in_flight: usize) -> Option<RoundEnd> {
        if self.attempts_exhausted {
            Some(RoundEnd::AttemptsExhausted)
        } else if self.ammo == 0 && arrows_in_flight == 0 {
            Some(RoundEnd::AmmoExhausted)
        } else {
            None
        }
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo > 0
    }

    /// Player input and target activation are allowed
    pub fn accepts_input(&self) -> bool {
        self.started && !self.input_hold && self.phase == GamePhase::Playing
    }

    /// Freeze the whole simulation
    pub fn pause_game(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            log::info!("Game paused");
        }
    }

    pub fn resume_game(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            log::info!("Game resumed");
        }
    }

    pub fn end_game(&mut self) {
        self.phase = GamePhase::GameOver;
        log::info!("Game over - final score {}", self.score);
        self.events.push(GameEvent::GameOver { score: self.score });
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last drain.
    ///
    /// The queue is unbounded; call this once per tick (or frame).
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl RoundHooks for Session {
    fn add_score(&mut self, points: u32) {
        self.score += u64::from(points);
        self.events.push(GameEvent::ScoreAdded { points });
    }

    fn arrow_shot(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
        self.arrows_shot += 1;
    }

    fn target_hit(&mut self) {
        self.targets_hit += 1;
    }

    fn pattern_completed(&mut self) {
        self.patterns_completed += 1;
        log::info!("Pattern completed in round {}", self.round_index + 1);
        self.events.push(GameEvent::PatternCompleted);
    }

    fn pattern_failed(&mut self) {
        self.patterns_failed += 1;
        log::info!("Pattern failed in round {}", self.round_index + 1);
        self.events.push(GameEvent::PatternFailed);
    }

    fn attempts_exhausted(&mut self) {
        self.attempts_exhausted = true;
        self.events.push(GameEvent::AttemptsExhausted);
    }

    fn handle_pattern_hit(&mut self, target: TargetId) {
        self.pattern_hits += 1;
        self.events.push(GameEvent::PatternHit { target });
    }

    fn set_paused(&mut self, paused: bool) {
        self.input_hold = paused;
    }

    fn is_game_paused(&self) -> bool {
        self.input_hold || self.phase == GamePhase::Paused
    }

    fn is_game_started(&self) -> bool {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_end_waits_for_last_arrow() {
        let mut s = Session::new();
        s.begin_round(0, 1);
        s.arrow_shot();
        assert_eq!(s.ammo, 0);
        assert_eq!(s.round_end(1), None);
        assert_eq!(s.round_end(0), Some(RoundEnd::AmmoExhausted));
    }

    #[test]
    fn test_attempts_exhausted_ends_round() {
        let mut s = Session::new();
        s.begin_round(0, 5);
        s.attempts_exhausted();
        assert_eq!(s.round_end(3), Some(RoundEnd::AttemptsExhausted));
        s.begin_round(1, 5);
        assert_eq!(s.round_end(0), None);
    }

    #[test]
    fn test_pause_hold_blocks_input() {
        let mut s = Session::new();
        assert!(!s.accepts_input());
        s.begin_round(0, 5);
        assert!(s.accepts_input());
        s.set_paused(true);
        assert!(s.is_game_paused());
        assert!(!s.accepts_input());
        s.set_paused(false);
        s.pause_game();
        assert!(s.is_game_paused());
        s.resume_game();
        assert!(s.accepts_input());
    }

    #[test]
    fn test_hooks_record_events() {
        let mut s = Session::new();
        s.begin_round(0, 5);
        s.add_score(100);
        s.target_hit();
        s.pattern_completed();
        assert_eq!(s.score, 100);
        assert_eq!(s.targets_hit, 1);
        let events = s.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::ScoreAdded { points: 100 }, GameEvent::PatternCompleted]
        );
        assert!(s.drain_events().is_empty());
    }
}
