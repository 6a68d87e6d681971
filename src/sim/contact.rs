//! Narrow-phase contact probe for hosts without a physics engine
//!
//! Sweeps each flying arrow along the segment it covered during the last
//! tick and reports the earliest target circle it crossed, or the play-area
//! boundary if it left the arena. The simulation never calls this on its
//! own; contacts are always delivered through `GameState::apply_contact`.

use glam::Vec2;

use super::projectile::{Contact, ProjectileId};
use super::state::GameState;
use super::target::Roster;
use crate::settings::Arena;

/// Parameter along `a -> b` of the point closest to a circle, if the
/// segment passes within `radius` of `center`
pub fn segment_circle_contact(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let d = b - a;
    let len_sq = d.length_squared();
    let t = if len_sq > f32::EPSILON {
        ((center - a).dot(d) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + d * t;
    (closest.distance_squared(center) <= radius * radius).then_some(t)
}

/// First contact for an arrow that moved from `from` to `to`
pub fn probe(from: Vec2, to: Vec2, roster: &Roster, arena: &Arena) -> Option<Contact> {
    let mut best: Option<(f32, Contact)> = None;
    for target in roster.iter() {
        let center = target.pose().position;
        if let Some(t) = segment_circle_contact(from, to, center, target.radius) {
            if best.is_none_or(|(bt, _)| t < bt) {
                best = Some((t, Contact::Target(target.id)));
            }
        }
    }
    if let Some((_, contact)) = best {
        return Some(contact);
    }
    (!arena.contains(to)).then_some(Contact::Boundary)
}

/// Contacts for every flying arrow in the game
pub fn detect(state: &GameState) -> Vec<(ProjectileId, Contact)> {
    state
        .projectiles
        .iter()
        .filter(|p| p.is_flying())
        .filter_map(|p| {
            probe(p.prev_position, p.position, &state.roster, &state.settings.arena)
                .map(|contact| (p.id, contact))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::target::{Motion, TargetId, TargetSpec};

    fn roster() -> Roster {
        Roster::new(
            &[
                TargetSpec::new(Vec2::new(5.0, 0.0), Motion::Static),
                TargetSpec::new(Vec2::new(3.0, 0.0), Motion::Static),
            ],
            100,
            500,
            10,
        )
    }

    #[test]
    fn test_segment_circle_contact() {
        assert!(segment_circle_contact(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(5.0, 0.4), 0.5).is_some());
        assert!(segment_circle_contact(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(5.0, 0.6), 0.5).is_none());
        // Degenerate segment
        assert!(segment_circle_contact(Vec2::ONE, Vec2::ONE, Vec2::ONE, 0.1).is_some());
    }

    #[test]
    fn test_probe_picks_earliest_target() {
        let r = roster();
        let contact = probe(Vec2::ZERO, Vec2::new(6.0, 0.0), &r, &Arena::default());
        assert_eq!(contact, Some(Contact::Target(TargetId(2))));
    }

    #[test]
    fn test_probe_tunnelling_caught() {
        // Jumps over the target in a single tick
        let r = roster();
        let contact = probe(Vec2::new(4.0, 0.0), Vec2::new(6.0, 0.0), &r, &Arena::default());
        assert_eq!(contact, Some(Contact::Target(TargetId(1))));
    }

    #[test]
    fn test_probe_boundary() {
        let r = roster();
        let arena = Arena::default();
        assert_eq!(
            probe(Vec2::new(0.0, -5.5), Vec2::new(0.0, -6.5), &r, &arena),
            Some(Contact::Boundary)
        );
        assert_eq!(probe(Vec2::ZERO, Vec2::new(0.0, 1.0), &r, &arena), None);
    }
}
