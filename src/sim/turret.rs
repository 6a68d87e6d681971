//! Crossbow turret: rail movement, aiming and hold-to-charge
//!
//! The turret never spawns arrows itself. `apply` returns the launch speed
//! when a charged shot is released and the caller decides whether it fires.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::direction_from_degrees;
use crate::settings::TurretSettings;

/// Discrete input for one tick, consumed in order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TurretCommand {
    /// Move along the rail; axis in [-1, 1]
    MoveVertical(f32),
    /// Rotate; axis in [-1, 1], positive raises the aim
    Rotate(f32),
    /// Point straight at an angle (degrees), e.g. from a mouse
    AimAt(f32),
    BeginCharge,
    Release,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turret {
    /// Pivot position
    pub position: Vec2,
    /// Aim in degrees (0 = +x, positive = up)
    pub angle: f32,
    /// Current launch speed accumulated by charging
    pub charge: f32,
    pub charging: bool,
    settings: TurretSettings,
}

impl Turret {
    pub fn new(settings: TurretSettings) -> Self {
        Self {
            position: settings.position,
            angle: 0.0_f32.clamp(settings.min_angle, settings.max_angle),
            charge: 0.0,
            charging: false,
            settings,
        }
    }

    /// Arrow spawn point at the tip of the crossbow
    pub fn muzzle(&self) -> Vec2 {
        self.muzzle_at(self.angle)
    }

    pub fn muzzle_at(&self, angle: f32) -> Vec2 {
        self.position + direction_from_degrees(angle) * self.settings.muzzle_length
    }

    pub fn angle_limits(&self) -> (f32, f32) {
        (self.settings.min_angle, self.settings.max_angle)
    }

    pub fn max_charge(&self) -> f32 {
        self.settings.max_charge
    }

    /// Apply one command; returns the launch speed when a shot is released
    pub fn apply(&mut self, command: TurretCommand, dt: f32) -> Option<f32> {
        let s = &self.settings;
        match command {
            TurretCommand::MoveVertical(axis) => {
                let y = self.position.y + axis.clamp(-1.0, 1.0) * s.vertical_speed * dt;
                self.position.y = y.clamp(s.min_y, s.max_y);
            }
            TurretCommand::Rotate(axis) => {
                let angle = self.angle + axis.clamp(-1.0, 1.0) * s.rotation_speed * dt;
                self.angle = angle.clamp(s.min_angle, s.max_angle);
            }
            TurretCommand::AimAt(angle) => {
                self.angle = angle.clamp(s.min_angle, s.max_angle);
            }
            TurretCommand::BeginCharge => {
                if !self.charging {
                    self.charging = true;
                    self.charge = 0.0;
                }
            }
            TurretCommand::Release => {
                if !self.charging {
                    return None;
                }
                let speed = self.charge;
                self.reset_charge();
                if speed > 0.0 {
                    return Some(speed);
                }
            }
        }
        None
    }

    /// Build up charge while the trigger is held
    pub fn tick(&mut self, dt: f32) {
        if self.charging {
            self.charge = (self.charge + self.settings.charge_rate * dt).min(self.settings.max_charge);
        }
    }

    pub fn reset_charge(&mut self) {
        self.charging = false;
        self.charge = 0.0;
    }
}
