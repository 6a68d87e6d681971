//! Error types for the gameplay core
//!
//! Invalid-state calls (ticking a stuck arrow, hitting an idle target) are
//! never errors; they are ignored where they happen. Only configuration and
//! construction problems surface as `SimError`.

use std::fmt;

use crate::sim::TargetId;

/// Errors surfaced by constructors, loaders and round setup
#[derive(Debug)]
pub enum SimError {
    /// A round was started with no targets to sample from
    EmptyRoster,
    /// Launch parameters outside their valid range
    InvalidLaunch {
        field: &'static str,
        value: f32,
    },
    /// A settings value outside its valid range
    InvalidSetting {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
    /// A target id that is not part of the roster
    UnknownTarget(TargetId),
    /// Launch attempted with no arrows left this round
    OutOfAmmo,
    /// Launch attempted while the round is held, paused or over
    NotAcceptingInput,
    /// Settings JSON could not be parsed
    Config(serde_json::Error),
    /// Settings file could not be read
    Io(std::io::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyRoster => write!(f, "no targets available for pattern sampling"),
            SimError::InvalidLaunch { field, value } => {
                write!(f, "invalid launch parameter {field} = {value}")
            }
            SimError::InvalidSetting {
                name,
                value,
                expected,
            } => write!(f, "invalid setting {name} = {value} (expected {expected})"),
            SimError::UnknownTarget(id) => write!(f, "unknown target {}", id.0),
            SimError::OutOfAmmo => write!(f, "no arrows left this round"),
            SimError::NotAcceptingInput => write!(f, "round is not accepting shots"),
            SimError::Config(e) => write!(f, "settings parse error: {e}"),
            SimError::Io(e) => write!(f, "settings read error: {e}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            SimError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Config(e)
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}
