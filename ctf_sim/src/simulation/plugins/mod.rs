// ctf_sim/src/simulation/plugins/mod.rs

pub mod arena;
pub mod match_flow;
pub mod player;
