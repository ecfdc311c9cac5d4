//! Scenario configuration
//!
//! Every fixed constant of the experiment lives here: the barrier, the
//! decay constant, slider ranges, the feedback thresholds and the
//! animation geometry. Compiled defaults reproduce the classic setup; a
//! TOML file may override any subset of fields.
//!
//! Resolution order (highest priority first):
//! 1. File named by `TUNNELING_LAB_CONFIG`
//! 2. `tunneling_lab.toml` in the working directory
//! 3. Compiled defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ConfigError;
use crate::probability::TransmissionModel;

/// Environment variable naming an explicit scenario file
pub const CONFIG_ENV_VAR: &str = "TUNNELING_LAB_CONFIG";

/// Scenario file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tunneling_lab.toml";

/// Inclusive numeric range backing a slider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Hand-tuned cut-offs used by the feedback selector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackThresholds {
    /// Successes above this probability are praised as expected
    pub high_probability: f32,
    /// Successes below this probability are called lucky
    pub lucky_probability: f32,
    /// Failures below this probability get targeted advice
    pub advice_probability: f32,
    /// Widths above this are "too thick"
    pub thick_barrier_width: f32,
    /// Energies below this are "too low"
    pub low_energy: f32,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            high_probability: 0.8,
            lucky_probability: 0.2,
            advice_probability: 0.1,
            thick_barrier_width: 7.0,
            low_energy: 4.0,
        }
    }
}

/// Canvas geometry and particle motion, in pixels and pixels per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Rest position of the particle, left of the barrier
    pub start_x: f32,
    pub particle_radius: f32,
    pub particle_speed: f32,
    /// Reflected particles travel back at this fraction of `particle_speed`
    pub reflection_speed_ratio: f32,
    /// Pixels drawn per unit of barrier width L
    pub barrier_width_scale: f32,
    /// Height of the particle's center above the bottom edge
    pub ground_offset: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 400.0,
            start_x: 50.0,
            particle_radius: 10.0,
            particle_speed: 4.0,
            reflection_speed_ratio: 0.5,
            barrier_width_scale: 20.0,
            ground_offset: 20.0,
        }
    }
}

impl AnimationConfig {
    /// Horizontal center of the barrier
    pub fn barrier_center(&self) -> f32 {
        self.canvas_width / 2.0
    }

    /// Left and right faces of a barrier of width `l`, in pixels
    pub fn barrier_span(&self, l: f32) -> (f32, f32) {
        let half = l * self.barrier_width_scale / 2.0;
        (self.barrier_center() - half, self.barrier_center() + half)
    }

    /// Vertical position of the particle's center
    pub fn ground_y(&self) -> f32 {
        self.ground_offset
    }
}

/// Complete description of one tunneling experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Barrier height V₀
    pub barrier_potential: f32,
    /// Decay constant C
    pub scaling_constant: f32,
    pub energy_range: ValueRange,
    pub width_range: ValueRange,
    pub initial_energy: f32,
    pub initial_width: f32,
    pub thresholds: FeedbackThresholds,
    pub animation: AnimationConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            barrier_potential: constants::BARRIER_POTENTIAL,
            scaling_constant: constants::SCALING_CONSTANT,
            energy_range: ValueRange::new(constants::ENERGY_MIN, constants::ENERGY_MAX),
            width_range: ValueRange::new(constants::WIDTH_MIN, constants::WIDTH_MAX),
            initial_energy: 5.0,
            initial_width: 3.0,
            thresholds: FeedbackThresholds::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// Where the active scenario came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl Scenario {
    /// The transmission model fixed by this scenario
    pub fn model(&self) -> TransmissionModel {
        TransmissionModel::new(self.barrier_potential, self.scaling_constant)
    }

    /// Parse a scenario from TOML text; missing fields keep their defaults
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let scenario: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Apply the resolution order described in the module docs
    pub fn resolve() -> Result<(Self, ConfigSource), ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::resolve_from(explicit.as_deref(), Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Resolution with the lookup locations passed in
    pub fn resolve_from(
        explicit: Option<&Path>,
        fallback: &Path,
    ) -> Result<(Self, ConfigSource), ConfigError> {
        if let Some(path) = explicit {
            // An explicitly named file must exist
            let scenario = Self::load(path)?;
            return Ok((scenario, ConfigSource::File(path.to_path_buf())));
        }
        if fallback.exists() {
            let scenario = Self::load(fallback)?;
            return Ok((scenario, ConfigSource::File(fallback.to_path_buf())));
        }
        Ok((Self::default(), ConfigSource::Defaults))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.barrier_potential.is_finite() && self.barrier_potential > 0.0) {
            return Err(invalid("barrier_potential", "must be a positive number"));
        }
        if !(self.scaling_constant.is_finite() && self.scaling_constant >= 0.0) {
            return Err(invalid("scaling_constant", "must be a non-negative number"));
        }
        check_range("energy_range", &self.energy_range)?;
        check_range("width_range", &self.width_range)?;
        if !self.energy_range.contains(self.initial_energy) {
            return Err(invalid("initial_energy", "must lie inside energy_range"));
        }
        if !self.width_range.contains(self.initial_width) {
            return Err(invalid("initial_width", "must lie inside width_range"));
        }

        let t = &self.thresholds;
        for (field, value) in [
            ("thresholds.high_probability", t.high_probability),
            ("thresholds.lucky_probability", t.lucky_probability),
            ("thresholds.advice_probability", t.advice_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
        }
        for (field, value) in [
            ("thresholds.thick_barrier_width", t.thick_barrier_width),
            ("thresholds.low_energy", t.low_energy),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }
        if t.lucky_probability > t.high_probability {
            return Err(invalid(
                "thresholds.lucky_probability",
                "must not exceed thresholds.high_probability",
            ));
        }

        let a = &self.animation;
        for (field, value) in [
            ("animation.canvas_width", a.canvas_width),
            ("animation.canvas_height", a.canvas_height),
            ("animation.particle_radius", a.particle_radius),
            ("animation.particle_speed", a.particle_speed),
            ("animation.reflection_speed_ratio", a.reflection_speed_ratio),
            ("animation.barrier_width_scale", a.barrier_width_scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, "must be a positive number"));
            }
        }
        for (field, value) in [
            ("animation.start_x", a.start_x),
            ("animation.ground_offset", a.ground_offset),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }
        // Written negated so a NaN barrier edge also fails
        if !(a.start_x + a.particle_radius < a.barrier_span(self.width_range.max).0) {
            return Err(invalid(
                "animation.start_x",
                "particle must start left of the widest barrier",
            ));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, range: &ValueRange) -> Result<(), ConfigError> {
    if !(range.min.is_finite() && range.max.is_finite()) {
        return Err(invalid(field, "bounds must be finite"));
    }
    if range.min < 0.0 {
        return Err(invalid(field, "lower bound must be non-negative"));
    }
    if range.min > range.max {
        return Err(invalid(field, "lower bound exceeds upper bound"));
    }
    Ok(())
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Validation {
        field,
        message: message.to_string(),
    }
}
