// ctf_core/src/prelude.rs

// --- Core Abstractions (the decision seam) ---
pub use crate::brain::{AgentSnapshot, ArenaView, Brain, Decision, Steering};

// --- Core Data Structures ---
pub use crate::agent::{Agent, AgentState, Control};
pub use crate::arena::Arena;
pub use crate::events::GameEvent;
pub use crate::field::Field;
pub use crate::flag::{Flag, FlagStatus};
pub use crate::geometry::Bounds;
pub use crate::player::{PlayerController, PlayerInput};
pub use crate::prison::Prison;
pub use crate::rules::{MatchOutcome, MatchRules, Scoreboard, WinReason};
pub use crate::setup::{AgentSpec, ArenaBuilder};
pub use crate::types::{AgentHandle, FlagHandle, Point2, Side, Team, Vec2};

// --- Concrete Brains ---
pub use crate::brain::{Defender, Patroller, Raider, Sentry};

// --- Errors ---
pub use crate::error::SetupError;
