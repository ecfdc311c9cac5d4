//! Tutor feedback for a finished attempt
//!
//! A fixed decision table over the attempt outcome, the computed
//! probability and a handful of thresholds. No state, no randomness.

use crate::config::FeedbackThresholds;
use crate::params::SimulationParameters;
use crate::probability::{format_percent, rounded_percent, TransmissionModel};

/// Display category of a feedback message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCategory {
    Success,
    Caution,
    Failure,
}

impl FeedbackCategory {
    /// Text color used by the control panel
    pub fn color(&self) -> [u8; 3] {
        match self {
            FeedbackCategory::Success => [0x4a, 0xde, 0x80],
            FeedbackCategory::Caution => [0xfa, 0xcc, 0x15],
            FeedbackCategory::Failure => [0xf8, 0x71, 0x71],
        }
    }
}

/// Which rule produced the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    ClassicalCertainty,
    HighProbability,
    LuckyShot,
    Tunneled,
    BarrierTooThick,
    EnergyTooLow,
    GeneralAdvice,
}

impl FeedbackKind {
    pub fn category(&self) -> FeedbackCategory {
        match self {
            FeedbackKind::ClassicalCertainty
            | FeedbackKind::HighProbability
            | FeedbackKind::Tunneled => FeedbackCategory::Success,
            FeedbackKind::LuckyShot => FeedbackCategory::Caution,
            FeedbackKind::BarrierTooThick
            | FeedbackKind::EnergyTooLow
            | FeedbackKind::GeneralAdvice => FeedbackCategory::Failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub category: FeedbackCategory,
    pub message: String,
    /// Transmission probability the decision was based on
    pub probability: f32,
}

/// Choose the tutor message for an attempt with parameters `params`
/// that did (`succeeded`) or did not cross the barrier.
pub fn select_feedback(
    params: &SimulationParameters,
    model: &TransmissionModel,
    thresholds: &FeedbackThresholds,
    succeeded: bool,
) -> Feedback {
    let e = params.energy;
    let l = params.barrier_width;
    let v0 = model.barrier_potential;

    if e >= v0 {
        let message = format!(
            "That was a classical success! Since your energy (E = {e}) was greater than the \
             barrier height (V₀ = {v0}), you passed through with 100% certainty. Try setting E \
             lower than V₀ to observe true quantum tunneling!"
        );
        return build(FeedbackKind::ClassicalCertainty, message, 1.0);
    }

    let p = model.probability(params);

    let (kind, message) = if succeeded {
        if p > thresholds.high_probability {
            (
                FeedbackKind::HighProbability,
                format!(
                    "Success! Your probability was high ({}). Good job keeping the barrier \
                     width (L = {l}) low and energy (E = {e}) high!",
                    format_percent(p, 1)
                ),
            )
        } else if p < thresholds.lucky_probability {
            (
                FeedbackKind::LuckyShot,
                format!(
                    "A lucky shot! You succeeded despite a low probability ({}). Remember, \
                     quantum mechanics only gives us odds, not certainties.",
                    format_percent(p, 1)
                ),
            )
        } else {
            (
                FeedbackKind::Tunneled,
                format!(
                    "Tunneling successful! Your parameters (E = {e}, L = {l}) gave you a {}% \
                     chance. That's the power of quantum mechanics!",
                    rounded_percent(p)
                ),
            )
        }
    } else if l > thresholds.thick_barrier_width && p < thresholds.advice_probability {
        (
            FeedbackKind::BarrierTooThick,
            format!(
                "Reflection! The barrier is too thick (L = {l}). Tunneling probability \
                 decreases exponentially with width. Try reducing the Barrier Width (L)."
            ),
        )
    } else if e < thresholds.low_energy && p < thresholds.advice_probability {
        (
            FeedbackKind::EnergyTooLow,
            format!(
                "Reflection! Your particle energy (E = {e}) is very low compared to the barrier \
                 height (V₀ = {v0}). Try increasing the Particle Energy (E) significantly."
            ),
        )
    } else {
        (
            FeedbackKind::GeneralAdvice,
            "Reflection occurred. To increase your odds, try simultaneously increasing Energy (E) \
             and decreasing Width (L)."
                .to_string(),
        )
    };

    build(kind, message, p)
}

fn build(kind: FeedbackKind, message: String, probability: f32) -> Feedback {
    Feedback {
        kind,
        category: kind.category(),
        message,
        probability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn model() -> TransmissionModel {
        TransmissionModel::new(10.0, 0.5)
    }

    fn feedback(e: f32, l: f32, succeeded: bool) -> Feedback {
        let params = SimulationParameters::new(e, l).unwrap();
        select_feedback(&params, &model(), &FeedbackThresholds::default(), succeeded)
    }

    #[test]
    fn test_classical_success() {
        for l in [1.0, 5.0, 10.0] {
            for succeeded in [true, false] {
                let fb = feedback(12.0, l, succeeded);
                assert_eq!(fb.kind, FeedbackKind::ClassicalCertainty);
                assert_eq!(fb.category, FeedbackCategory::Success);
                assert_eq!(fb.probability, 1.0);
            }
        }
        assert!(feedback(10.0, 3.0, false).message.contains("classical success"));
    }

    #[test]
    fn test_high_probability_success() {
        // p = exp(-0.5·0.5·1) ≈ 0.78 is not high enough
        assert_eq!(feedback(9.0, 0.5, true).kind, FeedbackKind::Tunneled);

        // p = exp(-0.5·0.4·1) ≈ 0.82
        let fb = feedback(9.0, 0.4, true);
        assert_eq!(fb.kind, FeedbackKind::HighProbability);
        assert_eq!(fb.category, FeedbackCategory::Success);
        assert!(fb.message.contains("81.9%"), "{}", fb.message);
    }

    #[test]
    fn test_lucky_shot() {
        let fb = feedback(5.0, 5.0, true);
        assert_eq!(fb.kind, FeedbackKind::LuckyShot);
        assert_eq!(fb.category, FeedbackCategory::Caution);
        assert!(fb.message.contains("0.4%"), "{}", fb.message);
    }

    #[test]
    fn test_generic_success() {
        // p ≈ 0.6065
        let fb = feedback(9.0, 1.0, true);
        assert_eq!(fb.kind, FeedbackKind::Tunneled);
        assert_eq!(fb.category, FeedbackCategory::Success);
        assert!(fb.message.contains("61% chance"), "{}", fb.message);
    }

    #[test]
    fn test_barrier_too_thick_needs_low_probability() {
        // E=3, L=8: p = exp(-0.5·8·√7) ≈ 2.5e-5
        let fb = feedback(3.0, 8.0, false);
        assert_eq!(fb.kind, FeedbackKind::BarrierTooThick);
        assert_eq!(fb.category, FeedbackCategory::Failure);

        // Width alone is not enough: E=9.99, L=8 gives p ≈ 0.67
        let fb = feedback(9.99, 8.0, false);
        assert!(fb.probability >= 0.1);
        assert_eq!(fb.kind, FeedbackKind::GeneralAdvice);
    }

    #[test]
    fn test_thick_barrier_with_loose_threshold() {
        let params = SimulationParameters::new(3.0, 8.0).unwrap();
        let thresholds = FeedbackThresholds {
            advice_probability: 0.0,
            ..FeedbackThresholds::default()
        };
        let fb = select_feedback(&params, &model(), &thresholds, false);
        assert_eq!(fb.kind, FeedbackKind::GeneralAdvice);
    }

    #[test]
    fn test_energy_too_low() {
        // L=5 is not thick, p = exp(-0.5·5·√7) ≈ 0.0013
        let fb = feedback(3.0, 5.0, false);
        assert_eq!(fb.kind, FeedbackKind::EnergyTooLow);
        assert_eq!(fb.category, FeedbackCategory::Failure);
        assert!(fb.message.contains("E = 3"), "{}", fb.message);
    }

    #[test]
    fn test_general_advice() {
        let fb = feedback(9.0, 1.0, false);
        assert_eq!(fb.kind, FeedbackKind::GeneralAdvice);
        assert_eq!(fb.category, FeedbackCategory::Failure);
    }

    proptest! {
        #[test]
        fn success_never_reports_failure(e in 0.0..20.0f32, l in 1.0..10.0f32) {
            let fb = feedback(e, l, true);
            prop_assert_ne!(fb.category, FeedbackCategory::Failure);
        }

        #[test]
        fn failure_below_barrier_is_failure(e in 0.0..9.99f32, l in 1.0..10.0f32) {
            let fb = feedback(e, l, false);
            prop_assert_eq!(fb.category, FeedbackCategory::Failure);
        }

        #[test]
        fn deterministic(e in 0.0..20.0f32, l in 1.0..10.0f32, succeeded: bool) {
            prop_assert_eq!(feedback(e, l, succeeded), feedback(e, l, succeeded));
        }
    }
}
