//! Closed-form ballistic trajectories
//!
//! Angle convention used everywhere in the crate: 0° points along +x
//! (horizontal forward), positive angles rotate upward. No physics
//! integrator is involved; position and velocity are exact functions of
//! the launch parameters and the time since launch.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::{direction_from_degrees, heading_of};

/// Immutable description of a shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchParameters {
    /// Launch speed (units/s, > 0)
    pub speed: f32,
    /// Downward acceleration (units/s², >= 0)
    pub gravity: f32,
    /// Launch angle in degrees
    pub angle_degrees: f32,
}

impl LaunchParameters {
    pub fn new(speed: f32, gravity: f32, angle_degrees: f32) -> Result<Self, SimError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(SimError::InvalidLaunch {
                field: "speed",
                value: speed,
            });
        }
        if !(gravity.is_finite() && gravity >= 0.0) {
            return Err(SimError::InvalidLaunch {
                field: "gravity",
                value: gravity,
            });
        }
        if !angle_degrees.is_finite() {
            return Err(SimError::InvalidLaunch {
                field: "angle_degrees",
                value: angle_degrees,
            });
        }
        Ok(Self {
            speed,
            gravity,
            angle_degrees,
        })
    }

    /// Velocity at t = 0
    #[inline]
    pub fn initial_velocity(&self) -> Vec2 {
        direction_from_degrees(self.angle_degrees) * self.speed
    }
}

/// Position at `t` seconds after launch from `origin`
pub fn position_at(params: &LaunchParameters, origin: Vec2, t: f32) -> Vec2 {
    let v0 = params.initial_velocity();
    Vec2::new(
        origin.x + v0.x * t,
        origin.y + v0.y * t - 0.5 * params.gravity * t * t,
    )
}

/// Instantaneous velocity at `t` seconds after launch
pub fn velocity_at(params: &LaunchParameters, t: f32) -> Vec2 {
    let v0 = params.initial_velocity();
    Vec2::new(v0.x, v0.y - params.gravity * t)
}

/// Facing direction (radians) at `t`
pub fn heading_at(params: &LaunchParameters, t: f32) -> f32 {
    heading_of(velocity_at(params, t))
}

/// Time and position of the highest point, if the shot rises at all
pub fn apex(params: &LaunchParameters, origin: Vec2) -> Option<(f32, Vec2)> {
    let vy = params.initial_velocity().y;
    if vy <= 0.0 || params.gravity <= 0.0 {
        return None;
    }
    let t = vy / params.gravity;
    Some((t, position_at(params, origin, t)))
}

/// Sample the flight path for a trajectory preview overlay
pub fn sample_path(params: &LaunchParameters, origin: Vec2, step: f32, count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| position_at(params, origin, i as f32 * step))
        .collect()
}

/// Launch angle (degrees) that carries a shot of `speed` from `origin`
/// through `target`, or `None` when the target is out of range.
///
/// `high_arc` picks the lobbed solution instead of the flat one.
pub fn solve_launch_angle(
    speed: f32,
    gravity: f32,
    origin: Vec2,
    target: Vec2,
    high_arc: bool,
) -> Option<f32> {
    let d = target - origin;
    if speed <= 0.0 || d.x.abs() < f32::EPSILON {
        return None;
    }
    if gravity <= 0.0 {
        return Some(heading_of(d).to_degrees());
    }

    let v2 = speed * speed;
    let disc = v2 * v2 - gravity * (gravity * d.x * d.x + 2.0 * d.y * v2);
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let num = if high_arc { v2 + root } else { v2 - root };
    Some(num.atan2(gravity * d.x).to_degrees())
}
