//! Neon Bullseye - gameplay core of a ballistic target-shooting arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trajectories, targets, pattern rounds)
//! - `settings`: Data-driven game balance loaded from JSON
//! - `error`: Configuration and setup errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz, one physics step)
    pub const SIM_DT: f32 = 1.0 / 50.0;

    /// Downward gravity magnitude (units/s²)
    pub const GRAVITY: f32 = 9.81;
    /// Arrows are disposed after this many seconds in flight
    pub const ARROW_MAX_LIFETIME: f32 = 10.0;

    /// Score for hitting an active target
    pub const TARGET_BASE_SCORE: u32 = 100;
    /// Score for a pattern hit / completed pattern
    pub const PATTERN_BONUS: u32 = 500;
    /// Seconds a struck target stays lit before returning to idle
    pub const HIT_FLASH_SECS: f32 = 0.2;
    /// Target collision radius
    pub const TARGET_RADIUS: f32 = 0.5;

    /// Pattern defaults
    pub const PATTERN_INITIAL_TARGETS: usize = 3;
    pub const PATTERN_MAX_TARGETS: usize = 8;
    pub const PATTERN_GROWTH_PER_ROUND: f32 = 0.5;
    pub const PATTERN_ATTEMPTS: u32 = 3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for an angle in degrees (0° = +x, positive = counter-clockwise/up)
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians())
}

/// Heading of a velocity vector in radians
#[inline]
pub fn heading_of(velocity: Vec2) -> f32 {
    velocity.y.atan2(velocity.x)
}

/// Convert a duration in seconds to whole simulation ticks (at least one)
#[inline]
pub fn secs_to_ticks(secs: f32) -> u32 {
    ((secs / consts::SIM_DT).round() as u32).max(1)
}
