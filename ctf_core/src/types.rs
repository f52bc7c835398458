// ctf_core/src/types.rs

use nalgebra::{Point2 as NaPoint2, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Core Type Aliases ---
pub type Point2 = NaPoint2<f64>;
pub type Vec2 = Vector2<f64>;

// --- Core Identifiers ---

/// Stable identifier of an agent inside an `Arena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::component::Component))]
pub struct AgentHandle(pub u64);

/// Stable identifier of a flag inside an `Arena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::component::Component))]
pub struct FlagHandle(pub u64);

impl fmt::Display for AgentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}

impl fmt::Display for FlagHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flag#{}", self.0)
    }
}

// --- Teams ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(bevy_ecs::component::Component))]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Red, Team::Blue];

    pub fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => write!(f, "Red"),
            Team::Blue => write!(f, "Blue"),
        }
    }
}

/// Which half of the field, split at the centre line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// `x < center_x`
    West,
    /// `x > center_x`
    East,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::West => Side::East,
            Side::East => Side::West,
        }
    }

    /// +1 for East, -1 for West. Pointing "deeper" into this side along X.
    pub fn sign(self) -> f64 {
        match self {
            Side::West => -1.0,
            Side::East => 1.0,
        }
    }
}
