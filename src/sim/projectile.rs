//! Arrow lifecycle: flight, sticking into a target, expiry
//!
//! Flight is evaluated from the closed-form trajectory each tick rather
//! than integrated, so an arrow's position only depends on its launch
//! parameters and how long it has been airborne.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::target::{Roster, TargetId};
use super::trajectory::{self, LaunchParameters};

/// Stable handle for an in-flight or stuck arrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

/// What an arrow touched, as reported by the collision source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Target(TargetId),
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectilePhase {
    Flying,
    /// Embedded in a target; `offset` and `heading` are in the target's frame
    Stuck {
        target: TargetId,
        offset: Vec2,
        heading: f32,
    },
    /// Out of play, ready for disposal
    Expired,
}

/// Result of delivering a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Arrow stuck; the target should now receive a hit
    Stuck(TargetId),
    Expired,
    /// Arrow was not flying (or the target is unknown)
    Ignored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: ProjectileId,
    pub params: LaunchParameters,
    pub origin: Vec2,
    pub position: Vec2,
    /// Position at the previous tick (for swept contact tests)
    pub prev_position: Vec2,
    pub velocity: Vec2,
    /// Facing angle in radians
    pub heading: f32,
    /// Seconds since launch
    pub elapsed: f32,
    pub phase: ProjectilePhase,
    max_lifetime: f32,
}

impl Projectile {
    /// Fire a new arrow from `origin`
    pub fn launch(id: ProjectileId, params: LaunchParameters, origin: Vec2, max_lifetime: f32) -> Self {
        let velocity = params.initial_velocity();
        Self {
            id,
            params,
            origin,
            position: origin,
            prev_position: origin,
            velocity,
            heading: crate::heading_of(velocity),
            elapsed: 0.0,
            phase: ProjectilePhase::Flying,
            max_lifetime,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.phase == ProjectilePhase::Flying
    }

    pub fn is_expired(&self) -> bool {
        self.phase == ProjectilePhase::Expired
    }

    pub fn stuck_target(&self) -> Option<TargetId> {
        match self.phase {
            ProjectilePhase::Stuck { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Advance flight by `dt`. Returns true when the arrow expired this tick.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_flying() {
            return false;
        }
        self.elapsed += dt;
        self.prev_position = self.position;
        self.position = trajectory::position_at(&self.params, self.origin, self.elapsed);
        self.velocity = trajectory::velocity_at(&self.params, self.elapsed);
        self.heading = crate::heading_of(self.velocity);

        if self.elapsed > self.max_lifetime {
            self.phase = ProjectilePhase::Expired;
            return true;
        }
        false
    }

    /// React to a contact. Only a flying arrow reacts; later contacts are
    /// ignored so a single impact is never processed twice.
    pub fn on_contact(&mut self, contact: Contact, roster: &Roster) -> ContactOutcome {
        if !self.is_flying() {
            return ContactOutcome::Ignored;
        }
        match contact {
            Contact::Target(id) => {
                let Some(target) = roster.get(id) else {
                    log::debug!("Arrow {} touched unknown target {}", self.id.0, id.0);
                    return ContactOutcome::Ignored;
                };
                let pose = target.pose();
                self.velocity = Vec2::ZERO;
                self.phase = ProjectilePhase::Stuck {
                    target: id,
                    offset: pose.to_local(self.position),
                    heading: crate::normalize_angle(self.heading - pose.tilt),
                };
                ContactOutcome::Stuck(id)
            }
            Contact::Boundary => {
                self.phase = ProjectilePhase::Expired;
                ContactOutcome::Expired
            }
        }
    }

    /// Keep a stuck arrow attached to its (possibly moving) target
    pub fn follow_anchor(&mut self, roster: &Roster) {
        if let ProjectilePhase::Stuck {
            target,
            offset,
            heading,
        } = self.phase
        {
            if let Some(t) = roster.get(target) {
                let pose = t.pose();
                self.position = pose.to_world(offset);
                self.heading = crate::normalize_angle(heading + pose.tilt);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::target::{Motion, TargetSpec};

    fn arrow(speed: f32, angle: f32) -> Projectile {
        let params = LaunchParameters::new(speed, 9.8, angle).unwrap();
        Projectile::launch(ProjectileId(1), params, Vec2::ZERO, 10.0)
    }

    fn roster() -> Roster {
        Roster::new(
            &[TargetSpec::new(Vec2::new(5.0, 0.0), Motion::Static)],
            100,
            500,
            10,
        )
    }

    #[test]
    fn test_tick_follows_trajectory() {
        let mut a = arrow(10.0, 45.0);
        for _ in 0..10 {
            a.tick(0.1);
        }
        let expected = trajectory::position_at(&a.params, Vec2::ZERO, a.elapsed);
        assert!((a.position - expected).length() < 1e-5);
        assert!((a.heading - crate::heading_of(a.velocity)).abs() < 1e-6);
        assert!(a.is_flying());
    }

    #[test]
    fn test_expires_after_lifetime() {
        let params = LaunchParameters::new(10.0, 0.0, 0.0).unwrap();
        let mut a = Projectile::launch(ProjectileId(1), params, Vec2::ZERO, 1.0);
        for _ in 0..4 {
            assert!(!a.tick(0.25));
        }
        // elapsed == 1.0 is not yet past the lifetime
        assert!(a.tick(0.25));
        assert!(a.is_expired());
    }

    #[test]
    fn test_target_contact_sticks() {
        let r = roster();
        let mut a = arrow(10.0, 0.0);
        a.tick(0.45);
        assert_eq!(a.on_contact(Contact::Target(TargetId(1)), &r), ContactOutcome::Stuck(TargetId(1)));
        assert_eq!(a.velocity, Vec2::ZERO);
        assert_eq!(a.stuck_target(), Some(TargetId(1)));

        let pos = a.position;
        a.tick(0.5);
        assert_eq!(a.position, pos);
        assert_eq!(a.on_contact(Contact::Boundary, &r), ContactOutcome::Ignored);
        assert_eq!(a.stuck_target(), Some(TargetId(1)));
    }

    #[test]
    fn test_boundary_contact_expires() {
        let r = roster();
        let mut a = arrow(10.0, -45.0);
        a.tick(0.2);
        assert_eq!(a.on_contact(Contact::Boundary, &r), ContactOutcome::Expired);
        assert!(a.is_expired());
        assert_eq!(a.on_contact(Contact::Target(TargetId(1)), &r), ContactOutcome::Ignored);
        assert!(!a.tick(0.2));
    }

    #[test]
    fn test_unknown_target_ignored() {
        let r = roster();
        let mut a = arrow(10.0, 0.0);
        assert_eq!(a.on_contact(Contact::Target(TargetId(42)), &r), ContactOutcome::Ignored);
        assert!(a.is_flying());
    }

    #[test]
    fn test_stuck_arrow_rides_moving_target() {
        let mut r = Roster::new(
            &[TargetSpec::new(Vec2::new(5.0, 0.0), Motion::Bob { speed: 1.0, height: 1.0 })],
            100,
            500,
            10,
        );
        let mut a = arrow(10.0, 0.0);
        a.tick(0.45);
        a.on_contact(Contact::Target(TargetId(1)), &r);
        let before = a.position;

        r.tick(std::f32::consts::FRAC_PI_2);
        a.follow_anchor(&r);
        assert!((a.position.y - (before.y + 1.0)).abs() < 1e-4);
        assert!((a.position.x - before.x).abs() < 1e-4);
    }
}
