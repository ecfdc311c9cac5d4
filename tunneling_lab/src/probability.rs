//! Closed-form transmission probability
//!
//! Simplified WKB-style estimate for a rectangular barrier:
//! certainty when the particle clears the barrier classically,
//! exponential suppression `exp(-C·L·√(V₀-E))` otherwise.

use crate::params::SimulationParameters;

/// Probability that a particle of energy `energy` crosses a barrier of
/// height `barrier_potential` and width `width`.
///
/// Always in `[0, 1]`. `energy >= barrier_potential` yields exactly `1.0`.
pub fn transmission_probability(
    energy: f32,
    width: f32,
    barrier_potential: f32,
    scaling_constant: f32,
) -> f32 {
    if energy >= barrier_potential {
        return 1.0;
    }

    // V₀ - E > 0 on this branch
    let deficit = barrier_potential - energy;
    let exponent = -scaling_constant * width * deficit.sqrt();

    exponent.exp().clamp(0.0, 1.0)
}

/// Whether a parameter pair is above or below the barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    /// E ≥ V₀: the particle passes with certainty
    Classical,
    /// E < V₀: passage only by tunneling
    Tunneling,
}

/// Coarse reading of a tunneling probability for the prediction overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionBand {
    /// T < 0.3
    Unlikely,
    /// 0.3 ≤ T < 0.7
    Even,
    /// T ≥ 0.7
    Likely,
}

impl PredictionBand {
    pub fn from_probability(probability: f32) -> Self {
        if probability < 0.3 {
            PredictionBand::Unlikely
        } else if probability < 0.7 {
            PredictionBand::Even
        } else {
            PredictionBand::Likely
        }
    }

    /// Overlay text color (red, amber, green)
    pub fn color(&self) -> [u8; 3] {
        match self {
            PredictionBand::Unlikely => [0xef, 0x44, 0x44],
            PredictionBand::Even => [0xfc, 0xd3, 0x4d],
            PredictionBand::Likely => [0x10, 0xb9, 0x81],
        }
    }
}

/// Barrier height V₀ and decay constant C of a scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransmissionModel {
    pub barrier_potential: f32,
    pub scaling_constant: f32,
}

impl TransmissionModel {
    pub fn new(barrier_potential: f32, scaling_constant: f32) -> Self {
        Self {
            barrier_potential,
            scaling_constant,
        }
    }

    pub fn probability(&self, params: &SimulationParameters) -> f32 {
        transmission_probability(
            params.energy,
            params.barrier_width,
            self.barrier_potential,
            self.scaling_constant,
        )
    }

    pub fn regime(&self, params: &SimulationParameters) -> Regime {
        if params.energy >= self.barrier_potential {
            Regime::Classical
        } else {
            Regime::Tunneling
        }
    }

    /// Overlay prediction, absent in the classical regime
    pub fn prediction(&self, params: &SimulationParameters) -> Option<(u32, PredictionBand)> {
        match self.regime(params) {
            Regime::Classical => None,
            Regime::Tunneling => {
                let p = self.probability(params);
                Some((rounded_percent(p), PredictionBand::from_probability(p)))
            }
        }
    }
}

/// "12.34%" style readout with `decimals` fractional digits
pub fn format_percent(probability: f32, decimals: usize) -> String {
    format!("{:.*}%", decimals, probability * 100.0)
}

/// Probability as a whole percentage, rounded half away from zero
pub fn rounded_percent(probability: f32) -> u32 {
    (probability * 100.0).round() as u32
}
