// ctf_core/src/lib.rs

//! Engine-free gameplay core for a capture-the-flag arena.
//!
//! Everything here is plain data plus deterministic stepping; the Bevy
//! application in `ctf_sim` only drives `Arena::step` and reports on it.

pub mod agent;
pub mod arena;
pub mod brain;
pub mod error;
pub mod events;
pub mod field;
pub mod flag;
pub mod geometry;
pub mod player;
pub mod prelude;
pub mod prison;
pub mod rules;
pub mod setup;
pub mod types;

pub use error::SetupError;
