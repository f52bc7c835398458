// ctf_sim/src/simulation/core/events.rs
use bevy::prelude::Event;
// Import the pure data enum from the core library
use ctf_core::events::GameEvent;

// This is the Bevy-specific event. It can derive `Event`.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct BevyGameEvent(pub GameEvent);
