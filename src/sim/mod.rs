//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod contact;
pub mod pattern;
pub mod projectile;
pub mod round;
pub mod schedule;
pub mod state;
pub mod target;
pub mod tick;
pub mod trajectory;
pub mod turret;

pub use pattern::{PatternEngine, PatternPhase, Verdict, pattern_length_for_round};
pub use projectile::{Contact, ContactOutcome, Projectile, ProjectileId, ProjectilePhase};
pub use round::{RoundEnd, RoundHooks, Session};
pub use schedule::Timers;
pub use state::{GameEvent, GamePhase, GameState};
pub use target::{HitKind, HitReport, Motion, Pose, Roster, Target, TargetId, TargetSpec, TargetState};
pub use tick::{TickInput, tick};
pub use trajectory::LaunchParameters;
pub use turret::{Turret, TurretCommand};
