//! Track Profile - Application Library
//!
//! Wires the core pipeline from `track-profile-lib` to its outputs: a map document with
//! one polyline per recording group and a speed/altitude chart indexed by distance.

pub mod logging;
pub mod pipeline;
pub mod render;
pub mod settings;

pub use pipeline::{RunReport, run};
pub use settings::Settings;
