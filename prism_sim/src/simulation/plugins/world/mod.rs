// prism_sim/src/simulation/plugins/world/mod.rs

pub mod scene;
pub mod spawner;
