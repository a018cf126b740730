// prism_core/src/scan/mod.rs

//! The sensor's fixed scan pattern and how it is split across ticks.

pub mod grid;
pub mod section;

pub use grid::RayGrid;
pub use section::{ScanSection, ScanSectioner};
