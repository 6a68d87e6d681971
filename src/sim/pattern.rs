//! Pattern (sequence challenge) engine
//!
//! Each round a random sequence of distinct targets is revealed one at a
//! time; the player then has to strike them in the same order. The reveal
//! is a cursor advanced once per simulation tick:
//!
//! ```text
//! LeadIn -> Showing(0) -> Gap(0) -> Showing(1) -> ... -> Gap(n-1) -> Tail
//! ```
//!
//! Unless hits are allowed during the reveal, the round is held paused
//! from `start_round` until the tail delay elapses.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::round::RoundHooks;
use super::target::{Roster, TargetId, TargetState};
use crate::error::SimError;
use crate::settings::PatternSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternPhase {
    /// No pattern running (before the first round, or resolved)
    Idle,
    /// Sequence is being revealed
    Displaying,
    /// Reveal finished, verifying player hits
    AwaitingInput,
}

/// Result of verifying one player hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Correct so far; `matched` targets of the sequence done
    Progress { matched: usize },
    Completed,
    Mismatch { attempts_remaining: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayStep {
    LeadIn,
    Showing(usize),
    Gap(usize),
    Tail,
}

#[derive(Debug, Clone, Copy)]
struct DisplayCursor {
    step: DisplayStep,
    remaining: u32,
}

/// Sequence length for a round: grows with the round index, capped at the max
pub fn pattern_length_for_round(settings: &PatternSettings, round_index: u32) -> usize {
    // `as usize` saturates, so a huge product must not overflow the add
    let growth = (round_index as f32 * settings.growth_per_round).floor() as usize;
    settings.initial_targets.saturating_add(growth).min(settings.max_targets)
}

/// Per-round sequence generation, reveal and verification
#[derive(Debug, Clone)]
pub struct PatternEngine {
    settings: PatternSettings,
    rng: Pcg32,
    phase: PatternPhase,
    sequence: Vec<TargetId>,
    progress: Vec<TargetId>,
    attempts_remaining: u32,
    round_index: u32,
    cursor: Option<DisplayCursor>,
    /// This engine currently holds the round paused
    holding_pause: bool,
    /// Sequence completed before the reveal finished
    resolved_early: bool,
}

impl PatternEngine {
    pub fn new(settings: PatternSettings, seed: u64) -> Self {
        Self {
            attempts_remaining: settings.attempts,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            phase: PatternPhase::Idle,
            sequence: Vec::new(),
            progress: Vec::new(),
            round_index: 0,
            cursor: None,
            holding_pause: false,
            resolved_early: false,
        }
    }

    pub fn phase(&self) -> PatternPhase {
        self.phase
    }

    pub fn sequence(&self) -> &[TargetId] {
        &self.sequence
    }

    pub fn progress(&self) -> &[TargetId] {
        &self.progress
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    pub fn round_index(&self) -> u32 {
        self.round_index
    }

    pub fn is_displaying(&self) -> bool {
        self.cursor.is_some()
    }

    /// Target currently lit by the reveal, if any
    pub fn showing(&self) -> Option<TargetId> {
        match self.cursor?.step {
            DisplayStep::Showing(i) => self.sequence.get(i).copied(),
            _ => None,
        }
    }

    /// Player hits are being verified right now
    pub fn accepts_input(&self) -> bool {
        match self.phase {
            PatternPhase::AwaitingInput => true,
            PatternPhase::Displaying => self.settings.allow_hits_during_display && !self.resolved_early,
            PatternPhase::Idle => false,
        }
    }

    /// Generate a new sequence and begin revealing it.
    ///
    /// Any reveal still running from an earlier round is cancelled first.
    /// Returns the sequence length.
    pub fn start_round<H: RoundHooks + ?Sized>(
        &mut self,
        round_index: u32,
        roster: &mut Roster,
        hooks: &mut H,
    ) -> Result<usize, SimError> {
        if self.cursor.is_some() {
            log::warn!("Round {} started while a reveal was running; cancelling it", round_index + 1);
            self.cancel(roster, hooks);
        }

        self.round_index = round_index;
        self.sequence.clear();
        self.progress.clear();
        self.attempts_remaining = self.settings.attempts;
        self.resolved_early = false;
        self.phase = PatternPhase::Idle;

        let available = roster.ids();
        if available.is_empty() {
            log::error!("No targets in roster; pattern round {} cannot start", round_index + 1);
            return Err(SimError::EmptyRoster);
        }

        let wanted = pattern_length_for_round(&self.settings, round_index);
        let length = wanted.min(available.len());
        if length < wanted {
            log::warn!(
                "Pattern length {} exceeds roster of {}; clamping",
                wanted,
                available.len()
            );
        }

        self.sequence = self.sample(available, length);
        log::info!(
            "Round {} pattern: {:?}",
            round_index + 1,
            self.sequence.iter().map(|t| t.0).collect::<Vec<_>>()
        );

        self.phase = PatternPhase::Displaying;
        if !self.settings.allow_hits_during_display {
            hooks.set_paused(true);
            self.holding_pause = true;
        }
        self.cursor = Some(DisplayCursor {
            step: DisplayStep::LeadIn,
            remaining: self.settings.lead_in_ticks(),
        });
        Ok(length)
    }

    /// Pick `count` targets uniformly, removing each pick from the pool
    fn sample(&mut self, mut pool: Vec<TargetId>, count: usize) -> Vec<TargetId> {
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count && !pool.is_empty() {
            let index = self.rng.random_range(0..pool.len());
            picked.push(pool.remove(index));
        }
        picked
    }

    /// Advance the reveal by one tick
    pub fn tick<H: RoundHooks + ?Sized>(&mut self, roster: &mut Roster, hooks: &mut H) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        cursor.remaining = cursor.remaining.saturating_sub(1);

        while let Some(cursor) = self.cursor {
            if cursor.remaining > 0 {
                break;
            }
            self.advance(cursor.step, roster, hooks);
        }
    }

    fn advance<H: RoundHooks + ?Sized>(&mut self, step: DisplayStep, roster: &mut Roster, hooks: &mut H) {
        let next = match step {
            DisplayStep::LeadIn if self.sequence.is_empty() => Some(DisplayCursor {
                step: DisplayStep::Tail,
                remaining: self.settings.tail_ticks(),
            }),
            DisplayStep::LeadIn => Some(self.show(0, roster)),
            DisplayStep::Showing(i) => {
                let target = self.sequence[i];
                // Still lit means the player never struck it
                if roster.state(target) == Some(TargetState::Pattern) {
                    roster.reset_to_idle(target);
                }
                Some(DisplayCursor {
                    step: DisplayStep::Gap(i),
                    remaining: self.settings.gap_ticks(),
                })
            }
            DisplayStep::Gap(i) if i + 1 < self.sequence.len() => Some(self.show(i + 1, roster)),
            DisplayStep::Gap(_) => Some(DisplayCursor {
                step: DisplayStep::Tail,
                remaining: self.settings.tail_ticks(),
            }),
            DisplayStep::Tail => None,
        };

        self.cursor = next;
        if next.is_none() {
            self.finish_display(hooks);
        }
    }

    fn show(&mut self, index: usize, roster: &mut Roster) -> DisplayCursor {
        let target = self.sequence[index];
        roster.enter_pattern(target);
        log::debug!("Showing pattern target {} ({}/{})", target.0, index + 1, self.sequence.len());
        DisplayCursor {
            step: DisplayStep::Showing(index),
            remaining: self.settings.display_ticks(),
        }
    }

    fn finish_display<H: RoundHooks + ?Sized>(&mut self, hooks: &mut H) {
        self.release_pause(hooks);
        self.phase = if self.resolved_early {
            PatternPhase::Idle
        } else {
            PatternPhase::AwaitingInput
        };
        log::debug!("Pattern reveal finished; phase {:?}", self.phase);
    }

    fn release_pause<H: RoundHooks + ?Sized>(&mut self, hooks: &mut H) {
        if self.holding_pause {
            hooks.set_paused(false);
            self.holding_pause = false;
        }
    }

    /// Abort a running reveal (e.g. the round ended externally)
    pub fn cancel<H: RoundHooks + ?Sized>(&mut self, roster: &mut Roster, hooks: &mut H) {
        if let Some(target) = self.showing() {
            if roster.state(target) == Some(TargetState::Pattern) {
                roster.reset_to_idle(target);
            }
        }
        if self.cursor.take().is_some() {
            log::debug!("Pattern reveal cancelled");
        }
        self.release_pause(hooks);
        self.progress.clear();
        self.phase = PatternPhase::Idle;
    }

    /// Verify one player hit against the sequence.
    ///
    /// Returns `None` when hits are not being verified right now.
    pub fn register_player_hit<H: RoundHooks + ?Sized>(
        &mut self,
        target: TargetId,
        hooks: &mut H,
    ) -> Option<Verdict> {
        if !self.accepts_input() {
            log::trace!("Pattern input from target {} ignored in {:?}", target.0, self.phase);
            return None;
        }

        self.progress.push(target);
        let index = self.progress.len() - 1;
        debug_assert!(index < self.sequence.len(), "progress outgrew the sequence");

        if self.sequence.get(index) != Some(&target) {
            self.progress.clear();
            let had_attempts = self.attempts_remaining > 0;
            self.attempts_remaining = self.attempts_remaining.saturating_sub(1);
            hooks.pattern_failed();
            if had_attempts && self.attempts_remaining == 0 {
                log::info!("Pattern attempts exhausted in round {}", self.round_index + 1);
                hooks.attempts_exhausted();
            }
            return Some(Verdict::Mismatch {
                attempts_remaining: self.attempts_remaining,
            });
        }

        if self.progress.len() == self.sequence.len() {
            hooks.pattern_completed();
            hooks.add_score(self.settings.bonus);
            self.progress.clear();
            if self.cursor.is_some() {
                self.resolved_early = true;
            } else {
                self.phase = PatternPhase::Idle;
            }
            return Some(Verdict::Completed);
        }

        debug_assert!(self.sequence.starts_with(&self.progress));
        Some(Verdict::Progress {
            matched: self.progress.len(),
        })
    }
}
