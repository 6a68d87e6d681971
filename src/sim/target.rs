//! Targets and their state machine
//!
//! ```text
//! Idle --activate--> Active --hit--> Hit --flash elapsed--> Idle
//!   any --enter_pattern--> Pattern --hit--> Hit
//!                          Pattern --reset_to_idle--> Idle
//! ```
//!
//! `Pattern` is only ever entered through the pattern engine. A contact on
//! an idle target, or a second contact on a target that is already lit,
//! scores nothing.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::schedule::Timers;
use crate::Settings;
use crate::consts::TARGET_RADIUS;
use crate::error::SimError;

/// Stable handle for a target in the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetState {
    /// Inert, contacts are ignored
    #[default]
    Idle,
    /// Live and scorable
    Active,
    /// Just struck, flashing until the auto-reset fires
    Hit,
    /// Lit as part of a pattern reveal
    Pattern,
}

/// How a target moves around its home position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Static,
    /// Vertical sine bob
    Bob { speed: f32, height: f32 },
    /// Pendulum tilt around the home position
    Swing { amplitude_deg: f32, speed: f32 },
}

fn default_radius() -> f32 {
    TARGET_RADIUS
}

/// Level placement for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub position: Vec2,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub motion: Motion,
}

impl TargetSpec {
    pub fn new(position: Vec2, motion: Motion) -> Self {
        Self {
            position,
            radius: TARGET_RADIUS,
            motion,
        }
    }
}

/// Position and tilt of a target's reference frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    /// Rotation in radians
    pub tilt: f32,
}

impl Pose {
    /// Express a world point in this frame
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        Vec2::from_angle(-self.tilt).rotate(world - self.position)
    }

    /// Map a point in this frame back to world space
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.tilt).rotate(local)
    }
}

/// Score class of an accepted hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    Normal,
    Pattern,
}

/// What a target reports when a hit is accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    pub target: TargetId,
    pub kind: HitKind,
    /// Base score for normal hits, pattern bonus for pattern hits
    pub points: u32,
}

/// A single target
#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub home: Vec2,
    pub radius: f32,
    pub motion: Motion,
    pose: Pose,
    state: TargetState,
}

impl Target {
    pub fn new(id: TargetId, spec: &TargetSpec) -> Self {
        Self {
            id,
            home: spec.position,
            radius: spec.radius,
            motion: spec.motion,
            pose: Pose {
                position: spec.position,
                tilt: 0.0,
            },
            state: TargetState::Idle,
        }
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn is_hit(&self) -> bool {
        self.state == TargetState::Hit
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Consume a strike; returns the score class if it counted
    fn handle_hit(&mut self) -> Option<HitKind> {
        let kind = match self.state {
            TargetState::Pattern => HitKind::Pattern,
            TargetState::Active => HitKind::Normal,
            TargetState::Idle | TargetState::Hit => return None,
        };
        self.state = TargetState::Hit;
        Some(kind)
    }

    fn activate(&mut self) -> bool {
        if self.state == TargetState::Idle {
            self.state = TargetState::Active;
            true
        } else {
            false
        }
    }

    fn update_motion(&mut self, time_secs: f32) {
        match self.motion {
            Motion::Static => {}
            Motion::Bob { speed, height } => {
                self.pose.position = self.home + Vec2::Y * (time_secs * speed).sin() * height;
            }
            Motion::Swing {
                amplitude_deg,
                speed,
            } => {
                self.pose.tilt = amplitude_deg.to_radians() * (time_secs * speed).sin();
            }
        }
    }
}

/// Every target in the level plus their pending flash resets
#[derive(Debug, Clone)]
pub struct Roster {
    targets: BTreeMap<TargetId, Target>,
    flash_timers: Timers<TargetId>,
    base_score: u32,
    pattern_bonus: u32,
    hit_flash_ticks: u32,
}

impl Roster {
    pub fn new(specs: &[TargetSpec], base_score: u32, pattern_bonus: u32, hit_flash_ticks: u32) -> Self {
        let targets = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let id = TargetId(i as u32 + 1);
                (id, Target::new(id, spec))
            })
            .collect();
        Self {
            targets,
            flash_timers: Timers::new(),
            base_score,
            pattern_bonus,
            hit_flash_ticks,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.layout,
            settings.target.base_score,
            settings.pattern.bonus,
            settings.target.hit_flash_ticks(),
        )
    }

    /// All target ids in ascending order
    pub fn ids(&self) -> Vec<TargetId> {
        self.targets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(&id)
    }

    /// Like `get`, for callers that treat a missing target as a setup error
    pub fn require(&self, id: TargetId) -> Result<&Target, SimError> {
        self.targets.get(&id).ok_or(SimError::UnknownTarget(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn state(&self, id: TargetId) -> Option<TargetState> {
        self.targets.get(&id).map(Target::state)
    }

    /// Ticks until the flash on `id` ends, if one is pending
    pub fn flash_remaining(&self, id: TargetId) -> Option<u64> {
        self.flash_timers.remaining(id)
    }

    /// Deliver a strike to `id`. Accepted hits put the target in `Hit`
    /// and schedule its return to `Idle`.
    pub fn handle_hit(&mut self, id: TargetId) -> Option<HitReport> {
        let Some(target) = self.targets.get_mut(&id) else {
            log::debug!("Hit on unknown target {}", id.0);
            return None;
        };
        let Some(kind) = target.handle_hit() else {
            log::trace!("Target {} ignored hit in {:?}", id.0, target.state);
            return None;
        };
        self.flash_timers.schedule(id, self.hit_flash_ticks);

        let points = match kind {
            HitKind::Normal => self.base_score,
            HitKind::Pattern => self.pattern_bonus,
        };
        Some(HitReport {
            target: id,
            kind,
            points,
        })
    }

    /// Cancel any pending flash reset and force `Idle`
    pub fn reset_to_idle(&mut self, id: TargetId) -> bool {
        let Some(target) = self.targets.get_mut(&id) else {
            return false;
        };
        self.flash_timers.cancel(id);
        target.state = TargetState::Idle;
        true
    }

    /// Light `id` as a pattern target regardless of its current state.
    /// Only the pattern engine lights targets.
    pub(crate) fn enter_pattern(&mut self, id: TargetId) -> bool {
        let Some(target) = self.targets.get_mut(&id) else {
            return false;
        };
        self.flash_timers.cancel(id);
        target.state = TargetState::Pattern;
        true
    }

    /// Make an idle target scorable
    pub fn activate(&mut self, id: TargetId) -> bool {
        self.targets.get_mut(&id).is_some_and(Target::activate)
    }

    /// Activate every idle target; returns how many changed
    pub fn activate_idle(&mut self) -> usize {
        self.targets
            .values_mut()
            .map(|t| t.activate())
            .filter(|&changed| changed)
            .count()
    }

    /// Everything back to idle, no pending resets
    pub fn reset_all(&mut self) {
        self.flash_timers.clear();
        for target in self.targets.values_mut() {
            target.state = TargetState::Idle;
        }
    }

    /// Advance motion and flash timers by one tick
    pub fn tick(&mut self, time_secs: f32) {
        for target in self.targets.values_mut() {
            target.update_motion(time_secs);
        }
        for id in self.flash_timers.advance() {
            if let Some(target) = self.targets.get_mut(&id) {
                if target.state == TargetState::Hit {
                    target.state = TargetState::Idle;
                }
            }
        }
    }
}
