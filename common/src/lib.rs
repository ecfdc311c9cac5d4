//! Common utilities for the simulation front-ends
//!
//! Window and GPU setup plus the 2D camera shared by the visualizations.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
