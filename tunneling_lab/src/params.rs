//! User-controlled simulation parameters

use crate::config::Scenario;
use crate::error::ParameterError;

/// Particle energy E and barrier width L, as set by the sliders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    pub energy: f32,
    pub barrier_width: f32,
}

impl SimulationParameters {
    /// Validated constructor: both values must be finite and non-negative
    pub fn new(energy: f32, barrier_width: f32) -> Result<Self, ParameterError> {
        check("energy", energy)?;
        check("barrier width", barrier_width)?;
        Ok(Self {
            energy,
            barrier_width,
        })
    }

    /// Starting values matching the initial slider positions. Goes through
    /// [`Self::new`] so an unvalidated scenario cannot smuggle in NaN.
    pub fn initial(scenario: &Scenario) -> Result<Self, ParameterError> {
        Self::new(scenario.initial_energy, scenario.initial_width)
            .map(|params| params.clamped_to(scenario))
    }

    /// Snap both values into the scenario's slider ranges
    pub fn clamped_to(self, scenario: &Scenario) -> Self {
        Self {
            energy: scenario.energy_range.clamp(self.energy),
            barrier_width: scenario.width_range.clamp(self.barrier_width),
        }
    }

    /// Shift energy by `delta`, staying inside the slider range
    pub fn nudge_energy(&mut self, delta: f32, scenario: &Scenario) {
        self.energy = scenario.energy_range.clamp(self.energy + delta);
    }

    /// Shift barrier width by `delta`, staying inside the slider range
    pub fn nudge_width(&mut self, delta: f32, scenario: &Scenario) {
        self.barrier_width = scenario.width_range.clamp(self.barrier_width + delta);
    }
}

fn check(name: &'static str, value: f32) -> Result<(), ParameterError> {
    if !value.is_finite() {
        return Err(ParameterError::NotFinite { name, value });
    }
    if value < 0.0 {
        return Err(ParameterError::Negative { name, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_negative_and_non_finite() {
        assert!(SimulationParameters::new(5.0, 3.0).is_ok());
        assert_eq!(
            SimulationParameters::new(-1.0, 3.0),
            Err(ParameterError::Negative { name: "energy", value: -1.0 })
        );
        assert!(matches!(
            SimulationParameters::new(5.0, f32::NAN),
            Err(ParameterError::NotFinite { name: "barrier width", .. })
        ));
        assert!(matches!(
            SimulationParameters::new(f32::INFINITY, 1.0),
            Err(ParameterError::NotFinite { name: "energy", .. })
        ));
    }

    #[test]
    fn test_nudges_stay_in_range() {
        let scenario = Scenario::default();
        let mut params = SimulationParameters::new(19.8, 1.2).unwrap();

        params.nudge_energy(0.5, &scenario);
        params.nudge_width(-0.5, &scenario);

        assert_eq!(params.energy, 20.0);
        assert_eq!(params.barrier_width, 1.0);
    }

    #[test]
    fn test_initial_values_inside_ranges() {
        let scenario = Scenario::default();
        let params = SimulationParameters::initial(&scenario).unwrap();
        assert!(scenario.energy_range.contains(params.energy));
        assert!(scenario.width_range.contains(params.barrier_width));
    }

    #[test]
    fn test_initial_rejects_non_finite_scenario() {
        let mut scenario = Scenario::default();
        scenario.initial_energy = f32::NAN;
        assert!(matches!(
            SimulationParameters::initial(&scenario),
            Err(ParameterError::NotFinite { name: "energy", .. })
        ));

        let mut scenario = Scenario::default();
        scenario.initial_width = f32::INFINITY;
        assert!(matches!(
            SimulationParameters::initial(&scenario),
            Err(ParameterError::NotFinite { name: "barrier width", .. })
        ));
    }

    #[test]
    fn test_initial_clamps_out_of_range_scenario() {
        let mut scenario = Scenario::default();
        scenario.initial_energy = 30.0;
        let params = SimulationParameters::initial(&scenario).unwrap();
        assert_eq!(params.energy, scenario.energy_range.max);
    }
}
