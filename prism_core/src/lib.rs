// prism_core/src/lib.rs

// This file defines the public modules of your library.
pub mod acceptance;
pub mod config;
pub mod error;
pub mod generator;
pub mod messages;
pub mod mirror;
pub mod noise;
pub mod pipeline;
pub mod prelude;
pub mod reflectivity;
pub mod scan;
pub mod scene;
pub mod types;
