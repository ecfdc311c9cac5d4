//! Quantum Tunneling Lab
//!
//! An interactive tunneling experiment built around a closed-form
//! transmission model:
//!
//! - **Probability model**: `T = exp(-C·L·√(V₀-E))` below the barrier, certainty above it
//! - **Feedback**: rule-based coaching messages chosen from the attempt outcome
//! - **Attempt driver**: ready → traveling → success/failed, one random trial per attempt
//! - **Scene**: colored shapes for the barrier and particle, consumed by the renderer

pub mod config;
pub mod driver;
pub mod error;
pub mod feedback;
pub mod params;
pub mod probability;
pub mod scene;
pub mod renderer;
pub mod ui;

pub use config::{AnimationConfig, FeedbackThresholds, Scenario, ValueRange};
pub use driver::{AttemptDriver, AttemptOutcome, FrameHandle, FrameOutcome, Particle, ParticleStatus};
pub use error::{AttemptError, ConfigError, ParameterError};
pub use feedback::{select_feedback, Feedback, FeedbackCategory, FeedbackKind};
pub use params::SimulationParameters;
pub use probability::{transmission_probability, PredictionBand, Regime, TransmissionModel};

/// Scenario constants of the classic single-barrier setup
pub mod constants {
    /// Barrier height V₀ (arbitrary energy units)
    pub const BARRIER_POTENTIAL: f32 = 10.0;

    /// Decay scaling constant C
    pub const SCALING_CONSTANT: f32 = 0.5;

    /// Slider limits for particle energy
    pub const ENERGY_MIN: f32 = 0.0;
    pub const ENERGY_MAX: f32 = 20.0;

    /// Slider limits for barrier width
    pub const WIDTH_MIN: f32 = 1.0;
    pub const WIDTH_MAX: f32 = 10.0;

    /// Step used by keyboard nudges and sliders
    pub const PARAMETER_STEP: f32 = 0.5;
}
