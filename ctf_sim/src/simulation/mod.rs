// ctf_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod plugins;
