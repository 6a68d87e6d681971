//! Game balance and level layout
//!
//! Loaded from JSON; every section falls back to its defaults so partial
//! files only need to name the values they change.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SimError;
use crate::secs_to_ticks;
use crate::sim::{Motion, TargetSpec};

/// Projectile flight tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    /// Downward acceleration applied to arrows (units/s²)
    pub gravity: f32,
    /// Seconds in flight before an arrow expires
    pub max_lifetime_secs: f32,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_lifetime_secs: ARROW_MAX_LIFETIME,
        }
    }
}

/// Target scoring and feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    /// Points for striking an active target
    pub base_score: u32,
    /// Seconds a struck target stays in `Hit` before going idle
    pub hit_flash_secs: f32,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            base_score: TARGET_BASE_SCORE,
            hit_flash_secs: HIT_FLASH_SECS,
        }
    }
}

impl TargetSettings {
    pub fn hit_flash_ticks(&self) -> u32 {
        secs_to_ticks(self.hit_flash_secs)
    }
}

/// Pattern (sequence challenge) tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Sequence length in round 0
    pub initial_targets: usize,
    /// Upper bound on sequence length
    pub max_targets: usize,
    /// Extra targets per round (floored)
    pub growth_per_round: f32,
    /// Wrong sequences allowed per round
    pub attempts: u32,
    /// Bonus for a pattern-target hit and for a completed sequence
    pub bonus: u32,
    /// Delay before the first target lights up
    pub lead_in_secs: f32,
    /// How long each target stays lit
    pub display_interval_secs: f32,
    /// Dark gap between two lit targets
    pub gap_secs: f32,
    /// Buffer after the last target before input opens
    pub tail_secs: f32,
    /// Let the player shoot while the sequence is still being shown
    pub allow_hits_during_display: bool,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            initial_targets: PATTERN_INITIAL_TARGETS,
            max_targets: PATTERN_MAX_TARGETS,
            growth_per_round: PATTERN_GROWTH_PER_ROUND,
            attempts: PATTERN_ATTEMPTS,
            bonus: PATTERN_BONUS,
            lead_in_secs: 1.5,
            display_interval_secs: 1.5,
            gap_secs: 0.3,
            tail_secs: 0.5,
            allow_hits_during_display: false,
        }
    }
}

impl PatternSettings {
    pub fn lead_in_ticks(&self) -> u32 {
        secs_to_ticks(self.lead_in_secs)
    }

    pub fn display_ticks(&self) -> u32 {
        secs_to_ticks(self.display_interval_secs)
    }

    pub fn gap_ticks(&self) -> u32 {
        secs_to_ticks(self.gap_secs)
    }

    pub fn tail_ticks(&self) -> u32 {
        secs_to_ticks(self.tail_secs)
    }
}

/// Turret (crossbow) handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretSettings {
    /// Rail x position and starting height
    pub position: Vec2,
    /// Vertical rail speed (units/s)
    pub vertical_speed: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Rotation speed (degrees/s)
    pub rotation_speed: f32,
    pub min_angle: f32,
    pub max_angle: f32,
    /// Launch speed cap reached by holding the trigger
    pub max_charge: f32,
    /// Launch speed gained per second of charging
    pub charge_rate: f32,
    /// Distance from the pivot to the arrow spawn point
    pub muzzle_length: f32,
}

impl Default for TurretSettings {
    fn default() -> Self {
        Self {
            position: Vec2::new(-8.0, 0.0),
            vertical_speed: 5.0,
            min_y: -4.0,
            max_y: 4.0,
            rotation_speed: 100.0,
            min_angle: -60.0,
            max_angle: 60.0,
            max_charge: 50.0,
            charge_rate: 15.0,
            muzzle_length: 1.0,
        }
    }
}

/// Round lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundSettings {
    /// Arrows granted at the start of every round
    pub ammo_per_round: u32,
    /// Game ends after this many rounds
    pub max_rounds: u32,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            ammo_per_round: 10,
            max_rounds: 5,
        }
    }
}

/// Axis-aligned play area; arrows leaving it expire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            min: Vec2::new(-10.0, -6.0),
            max: Vec2::new(14.0, 12.0),
        }
    }
}

impl Arena {
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Complete game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub projectile: ProjectileSettings,
    pub target: TargetSettings,
    pub pattern: PatternSettings,
    pub turret: TurretSettings,
    pub round: RoundSettings,
    pub arena: Arena,
    /// Target placements for the level
    pub layout: Vec<TargetSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            projectile: ProjectileSettings::default(),
            target: TargetSettings::default(),
            pattern: PatternSettings::default(),
            turret: TurretSettings::default(),
            round: RoundSettings::default(),
            arena: Arena::default(),
            layout: default_layout(),
        }
    }
}

/// Five targets spread across the right half of the arena
fn default_layout() -> Vec<TargetSpec> {
    vec![
        TargetSpec::new(Vec2::new(4.0, -2.0), Motion::Static),
        TargetSpec::new(Vec2::new(6.0, 2.0), Motion::Bob { speed: 2.0, height: 1.5 }),
        TargetSpec::new(Vec2::new(8.0, -1.0), Motion::Static),
        TargetSpec::new(
            Vec2::new(10.0, 3.0),
            Motion::Swing {
                amplitude_deg: 45.0,
                speed: 2.0,
            },
        ),
        TargetSpec::new(Vec2::new(11.0, 0.0), Motion::Bob { speed: 1.0, height: 1.0 }),
    ]
}

impl Settings {
    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value that the simulation relies on being in range
    pub fn validate(&self) -> Result<(), SimError> {
        fn check(ok: bool, name: &'static str, value: f32, expected: &'static str) -> Result<(), SimError> {
            if ok {
                Ok(())
            } else {
                Err(SimError::InvalidSetting {
                    name,
                    value,
                    expected,
                })
            }
        }

        let p = &self.projectile;
        check(p.gravity >= 0.0, "projectile.gravity", p.gravity, ">= 0")?;
        check(
            p.max_lifetime_secs > 0.0,
            "projectile.max_lifetime_secs",
            p.max_lifetime_secs,
            "> 0",
        )?;

        let t = &self.target;
        check(t.hit_flash_secs >= 0.0, "target.hit_flash_secs", t.hit_flash_secs, ">= 0")?;

        let pat = &self.pattern;
        check(
            pat.initial_targets >= 1,
            "pattern.initial_targets",
            pat.initial_targets as f32,
            ">= 1",
        )?;
        check(
            pat.max_targets >= pat.initial_targets,
            "pattern.max_targets",
            pat.max_targets as f32,
            ">= pattern.initial_targets",
        )?;
        check(
            pat.growth_per_round.is_finite() && pat.growth_per_round >= 0.0,
            "pattern.growth_per_round",
            pat.growth_per_round,
            "finite and >= 0",
        )?;
        for (name, secs) in [
            ("pattern.lead_in_secs", pat.lead_in_secs),
            ("pattern.display_interval_secs", pat.display_interval_secs),
            ("pattern.gap_secs", pat.gap_secs),
            ("pattern.tail_secs", pat.tail_secs),
        ] {
            check(secs >= 0.0, name, secs, ">= 0")?;
        }

        let tur = &self.turret;
        check(tur.min_y <= tur.max_y, "turret.min_y", tur.min_y, "<= turret.max_y")?;
        check(
            tur.min_angle <= tur.max_angle,
            "turret.min_angle",
            tur.min_angle,
            "<= turret.max_angle",
        )?;
        check(tur.max_charge > 0.0, "turret.max_charge", tur.max_charge, "> 0")?;
        check(tur.charge_rate > 0.0, "turret.charge_rate", tur.charge_rate, "> 0")?;

        check(
            self.round.ammo_per_round >= 1,
            "round.ammo_per_round",
            self.round.ammo_per_round as f32,
            ">= 1",
        )?;
        check(
            self.round.max_rounds >= 1,
            "round.max_rounds",
            self.round.max_rounds as f32,
            ">= 1",
        )?;
        check(
            self.arena.min.cmplt(self.arena.max).all(),
            "arena.min",
            self.arena.min.x,
            "< arena.max on both axes",
        )?;
        for spec in &self.layout {
            check(spec.radius > 0.0, "layout.radius", spec.radius, "> 0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.layout.len(), 5);
        assert_eq!(settings.target.hit_flash_ticks(), 10);
        assert_eq!(settings.pattern.display_ticks(), 75);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings =
            Settings::from_json(r#"{ "pattern": { "attempts": 5 }, "round": { "ammo_per_round": 3 } }"#)
                .unwrap();
        assert_eq!(settings.pattern.attempts, 5);
        assert_eq!(settings.pattern.initial_targets, PATTERN_INITIAL_TARGETS);
        assert_eq!(settings.round.ammo_per_round, 3);
        assert_eq!(settings.round.max_rounds, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Settings::from_json(r#"{ "pattern": { "initial_targets": 4, "max_targets": 2 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidSetting {
                name: "pattern.max_targets",
                ..
            }
        ));

        let err = Settings::from_json(r#"{ "projectile": { "gravity": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidSetting { .. }));
    }

    #[test]
    fn test_zero_ammo_rejected() {
        let err = Settings::from_json(r#"{ "round": { "ammo_per_round": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidSetting {
                name: "round.ammo_per_round",
                ..
            }
        ));
    }

    #[test]
    fn test_huge_growth_accepted_non_finite_rejected() {
        let settings = Settings::from_json(r#"{ "pattern": { "growth_per_round": 1e30 } }"#).unwrap();
        let mut state = crate::sim::GameState::new(settings, 1).unwrap();
        assert_eq!(state.start_round(0).unwrap(), 3);
        assert_eq!(state.start_round(1).unwrap(), 5);

        let mut settings = Settings::default();
        settings.pattern.growth_per_round = f32::INFINITY;
        assert!(matches!(
            settings.validate(),
            Err(SimError::InvalidSetting {
                name: "pattern.growth_per_round",
                ..
            })
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_layout() {
        let settings = Settings::default();
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.layout, settings.layout);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }

    #[test]
    fn test_arena_contains() {
        let arena = Arena::default();
        assert!(arena.contains(Vec2::ZERO));
        assert!(!arena.contains(Vec2::new(0.0, -7.0)));
    }
}
