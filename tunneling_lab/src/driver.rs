//! Attempt driver
//!
//! Owns the particle and advances it one frame at a time:
//!
//! ```text
//! Ready ──arm──▶ Traveling ──reaches far face──▶ Success
//!                    │
//!                    └──reflected back to start──▶ Failed
//! ```
//!
//! The single random trial happens when the particle first touches the
//! barrier. Each scheduled frame carries a [`FrameHandle`]; only the most
//! recently scheduled handle is honored, so a cancelled attempt can never
//! advance the particle again.

use log::{debug, info, warn};
use rand::Rng;

use crate::config::Scenario;
use crate::error::AttemptError;
use crate::feedback::{select_feedback, Feedback};
use crate::params::SimulationParameters;

/// Source of uniform samples in `[0, 1)`
pub trait UniformSource {
    fn next_uniform(&mut self) -> f32;
}

/// Adapter from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> UniformSource for RngSource<R> {
    fn next_uniform(&mut self) -> f32 {
        self.0.gen::<f32>()
    }
}

impl RngSource<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        RngSource(rand::thread_rng())
    }
}

/// Replays a fixed list of samples, then repeats the last one
#[derive(Debug, Clone)]
pub struct SequenceSource {
    samples: Vec<f32>,
    next: usize,
}

impl SequenceSource {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples, next: 0 }
    }

    /// Number of samples drawn so far
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl UniformSource for SequenceSource {
    fn next_uniform(&mut self) -> f32 {
        let value = match self.samples.get(self.next) {
            Some(v) => *v,
            None => self.samples.last().copied().unwrap_or(0.0),
        };
        self.next += 1;
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleStatus {
    Ready,
    Traveling,
    Success,
    Failed,
}

/// Particle state in canvas coordinates (pixels, y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Horizontal velocity in pixels per frame
    pub vx: f32,
    /// Set once the trial has been drawn for this attempt
    pub tunneling: bool,
    pub status: ParticleStatus,
}

impl Particle {
    fn at_start(scenario: &Scenario) -> Self {
        Self {
            x: scenario.animation.start_x,
            y: scenario.animation.ground_y(),
            vx: 0.0,
            tunneling: false,
            status: ParticleStatus::Ready,
        }
    }
}

/// Identifies one scheduled frame of one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle {
    pub attempt: u64,
    pub sequence: u64,
}

/// Result of a finished attempt
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub attempt: u64,
    pub succeeded: bool,
    /// Probability the trial was drawn against
    pub probability: f32,
    /// The uniform sample that decided the trial
    pub roll: f32,
    pub feedback: Feedback,
}

/// What a call to [`AttemptDriver::on_frame`] did
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Handle was not the pending frame; nothing changed
    Stale,
    /// Particle moved and the next frame is scheduled
    Continue(FrameHandle),
    /// Attempt ended; no frame is pending
    Finished(AttemptOutcome),
}

/// Trial drawn at the barrier face
#[derive(Debug, Clone, Copy)]
struct Trial {
    probability: f32,
    roll: f32,
}

pub struct AttemptDriver {
    scenario: Scenario,
    particle: Particle,
    attempt: u64,
    next_sequence: u64,
    pending: Option<FrameHandle>,
    trial: Option<Trial>,
    trials_drawn: u64,
    last_outcome: Option<AttemptOutcome>,
}

impl AttemptDriver {
    pub fn new(scenario: Scenario) -> Self {
        let particle = Particle::at_start(&scenario);
        Self {
            scenario,
            particle,
            attempt: 0,
            next_sequence: 0,
            pending: None,
            trial: None,
            trials_drawn: 0,
            last_outcome: None,
        }
    }

    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    pub fn status(&self) -> ParticleStatus {
        self.particle.status
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Identifier of the current (or most recent) attempt; 0 before the first
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// The frame the driver is waiting for, if any
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Total random trials drawn since construction
    pub fn trials_drawn(&self) -> u64 {
        self.trials_drawn
    }

    pub fn last_outcome(&self) -> Option<&AttemptOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_in_transit(&self) -> bool {
        self.particle.status == ParticleStatus::Traveling
    }

    /// Whether a new attempt may be armed without cancelling one
    pub fn can_arm(&self) -> bool {
        !self.is_in_transit()
    }

    /// Start a new attempt, refusing while one is in transit
    pub fn arm(&mut self) -> Result<FrameHandle, AttemptError> {
        if self.is_in_transit() {
            warn!("attempt {} still in transit, ignoring arm", self.attempt);
            return Err(AttemptError::InTransit);
        }
        Ok(self.launch())
    }

    /// Cancel whatever is in flight and start a new attempt
    pub fn restart(&mut self) -> FrameHandle {
        self.cancel();
        self.launch()
    }

    /// Drop the pending frame and return the particle to rest.
    /// Safe to call in any state, any number of times.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            debug!("cancelled frame {:?}", handle);
        }
        self.trial = None;
        self.particle = Particle::at_start(&self.scenario);
    }

    fn launch(&mut self) -> FrameHandle {
        self.attempt += 1;
        self.trial = None;
        self.particle = Particle {
            vx: self.scenario.animation.particle_speed,
            status: ParticleStatus::Traveling,
            ..Particle::at_start(&self.scenario)
        };
        info!("attempt {} launched", self.attempt);
        self.schedule()
    }

    fn schedule(&mut self) -> FrameHandle {
        let handle = FrameHandle {
            attempt: self.attempt,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.pending = Some(handle);
        handle
    }

    /// Advance one frame. `params` are read live, so slider changes
    /// mid-flight move the barrier faces like the canvas does.
    pub fn on_frame<S: UniformSource>(
        &mut self,
        handle: FrameHandle,
        params: &SimulationParameters,
        source: &mut S,
    ) -> FrameOutcome {
        if self.pending != Some(handle) {
            return FrameOutcome::Stale;
        }
        self.pending = None;

        let anim = self.scenario.animation;
        let (barrier_left, barrier_right) = anim.barrier_span(params.barrier_width);

        self.particle.x += self.particle.vx;

        if self.particle.tunneling {
            let vx = self.particle.vx;
            if vx > 0.0 && self.particle.x >= barrier_right {
                return FrameOutcome::Finished(self.finish(true, params));
            }
            if vx < 0.0 && self.particle.x <= anim.start_x {
                self.particle.x = anim.start_x;
                return FrameOutcome::Finished(self.finish(false, params));
            }
        } else if self.particle.vx > 0.0
            && self.particle.x + anim.particle_radius >= barrier_left
        {
            self.draw_trial(params, source);
        }

        FrameOutcome::Continue(self.schedule())
    }

    fn draw_trial<S: UniformSource>(&mut self, params: &SimulationParameters, source: &mut S) {
        let probability = self.scenario.model().probability(params);
        let roll = source.next_uniform();
        self.trials_drawn += 1;

        let speed = self.scenario.animation.particle_speed;
        self.particle.tunneling = true;
        self.particle.vx = if roll <= probability {
            speed
        } else {
            -speed * self.scenario.animation.reflection_speed_ratio
        };
        self.trial = Some(Trial { probability, roll });

        debug!(
            "attempt {}: roll {:.4} against T = {:.4}",
            self.attempt, roll, probability
        );
    }

    fn finish(&mut self, succeeded: bool, params: &SimulationParameters) -> AttemptOutcome {
        self.particle.vx = 0.0;
        self.particle.tunneling = false;
        self.particle.status = if succeeded {
            ParticleStatus::Success
        } else {
            ParticleStatus::Failed
        };

        let trial = self.trial.take();
        let (probability, roll) = match trial {
            Some(t) => (t.probability, t.roll),
            None => (self.scenario.model().probability(params), 0.0),
        };
        let feedback = select_feedback(
            params,
            &self.scenario.model(),
            &self.scenario.thresholds,
            succeeded,
        );

        info!(
            "attempt {} {} (T = {:.4})",
            self.attempt,
            if succeeded { "tunneled" } else { "reflected" },
            probability
        );

        let outcome = AttemptOutcome {
            attempt: self.attempt,
            succeeded,
            probability,
            roll,
            feedback,
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{FeedbackCategory, FeedbackKind};

    fn params(e: f32, l: f32) -> SimulationParameters {
        SimulationParameters::new(e, l).unwrap()
    }

    /// Feed frames until the attempt finishes
    fn run_to_end<S: UniformSource>(
        driver: &mut AttemptDriver,
        mut handle: FrameHandle,
        params: &SimulationParameters,
        source: &mut S,
    ) -> AttemptOutcome {
        for _ in 0..10_000 {
            match driver.on_frame(handle, params, source) {
                FrameOutcome::Continue(next) => handle = next,
                FrameOutcome::Finished(outcome) => return outcome,
                FrameOutcome::Stale => panic!("pending frame reported stale"),
            }
        }
        panic!("attempt never finished");
    }

    #[test]
    fn test_starts_ready() {
        let driver = AttemptDriver::new(Scenario::default());
        assert_eq!(driver.status(), ParticleStatus::Ready);
        assert_eq!(driver.particle().x, 50.0);
        assert!(driver.pending_frame().is_none());
        assert!(driver.can_arm());
    }

    #[test]
    fn test_low_roll_tunnels() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let mut source = SequenceSource::new(vec![0.1]);
        let p = params(9.0, 1.0);

        let handle = driver.arm().unwrap();
        assert_eq!(driver.status(), ParticleStatus::Traveling);

        let outcome = run_to_end(&mut driver, handle, &p, &mut source);

        assert!(outcome.succeeded);
        assert_eq!(outcome.roll, 0.1);
        assert!((outcome.probability - 0.6065).abs() < 1e-3);
        assert_eq!(outcome.feedback.kind, FeedbackKind::Tunneled);
        assert_eq!(driver.status(), ParticleStatus::Success);
        // Left on the far side of the barrier
        let (_, right) = Scenario::default().animation.barrier_span(1.0);
        assert!(driver.particle().x >= right);
        assert_eq!(driver.particle().vx, 0.0);
        assert!(driver.pending_frame().is_none());
        assert_eq!(source.drawn(), 1);
    }

    #[test]
    fn test_high_roll_reflects_to_start() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let mut source = SequenceSource::new(vec![0.9]);
        let p = params(9.0, 1.0);

        let handle = driver.arm().unwrap();
        let outcome = run_to_end(&mut driver, handle, &p, &mut source);

        assert!(!outcome.succeeded);
        assert_eq!(outcome.feedback.category, FeedbackCategory::Failure);
        assert_eq!(driver.status(), ParticleStatus::Failed);
        assert_eq!(driver.particle().x, 50.0);
        assert_eq!(source.drawn(), 1);
    }

    #[test]
    fn test_roll_equal_to_probability_succeeds() {
        let mut driver = AttemptDriver::new(Scenario::default());
        // E = V₀ gives T = 1; the largest sample still passes
        let mut source = SequenceSource::new(vec![0.999_999]);
        let p = params(10.0, 4.0);

        let handle = driver.arm().unwrap();
        let outcome = run_to_end(&mut driver, handle, &p, &mut source);
        assert!(outcome.succeeded);
        assert_eq!(outcome.feedback.kind, FeedbackKind::ClassicalCertainty);
    }

    #[test]
    fn test_reflection_is_slower() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let mut source = SequenceSource::new(vec![0.99]);
        let p = params(2.0, 8.0);

        let mut handle = driver.arm().unwrap();
        while !driver.particle().tunneling {
            match driver.on_frame(handle, &p, &mut source) {
                FrameOutcome::Continue(next) => handle = next,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(driver.particle().vx, -2.0);
    }

    #[test]
    fn test_one_trial_per_attempt() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let mut source = SequenceSource::new(vec![0.9, 0.1, 0.5]);
        let p = params(9.0, 1.0);

        for expected in [false, true, true] {
            let handle = driver.arm().unwrap();
            let outcome = run_to_end(&mut driver, handle, &p, &mut source);
            assert_eq!(outcome.succeeded, expected);
        }
        assert_eq!(driver.trials_drawn(), 3);
        assert_eq!(source.drawn(), 3);
        assert_eq!(driver.attempt(), 3);
    }

    #[test]
    fn test_arm_refused_in_transit() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let first = driver.arm().unwrap();

        assert_eq!(driver.arm(), Err(AttemptError::InTransit));
        assert!(!driver.can_arm());
        // Refusal leaves the first frame pending
        assert_eq!(driver.pending_frame(), Some(first));
    }

    #[test]
    fn test_restart_mid_flight_leaves_single_frame() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let mut source = SequenceSource::new(vec![0.9, 0.1]);
        let p = params(9.0, 1.0);

        let mut old = driver.arm().unwrap();
        // Get past the barrier face so the first trial is drawn
        while !driver.particle().tunneling {
            match driver.on_frame(old, &p, &mut source) {
                FrameOutcome::Continue(next) => old = next,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(driver.trials_drawn(), 1);

        let fresh = driver.restart();
        assert_ne!(old, fresh);
        assert_eq!(driver.pending_frame(), Some(fresh));
        assert_eq!(driver.particle().x, 50.0);
        assert!(!driver.particle().tunneling);

        // The cancelled attempt's frame is inert
        let before = *driver.particle();
        assert_eq!(driver.on_frame(old, &p, &mut source), FrameOutcome::Stale);
        assert_eq!(*driver.particle(), before);
        assert_eq!(driver.pending_frame(), Some(fresh));

        let outcome = run_to_end(&mut driver, fresh, &p, &mut source);
        assert!(outcome.succeeded);
        assert_eq!(outcome.attempt, 2);
        assert_eq!(driver.trials_drawn(), 2);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let handle = driver.arm().unwrap();

        driver.cancel();
        driver.cancel();

        assert_eq!(driver.status(), ParticleStatus::Ready);
        assert!(driver.pending_frame().is_none());
        let mut source = SequenceSource::new(vec![0.5]);
        assert_eq!(
            driver.on_frame(handle, &params(5.0, 5.0), &mut source),
            FrameOutcome::Stale
        );
        assert!(driver.can_arm());
    }

    #[test]
    fn test_rearm_after_finish() {
        let mut driver = AttemptDriver::new(Scenario::default());
        let mut source = SequenceSource::new(vec![0.9]);
        let p = params(5.0, 5.0);

        let handle = driver.arm().unwrap();
        run_to_end(&mut driver, handle, &p, &mut source);
        assert_eq!(driver.status(), ParticleStatus::Failed);
        assert!(driver.last_outcome().is_some());

        let again = driver.arm().unwrap();
        assert_eq!(driver.status(), ParticleStatus::Traveling);
        assert_eq!(driver.pending_frame(), Some(again));
    }

    #[test]
    fn test_rng_source_in_unit_interval() {
        let mut source = RngSource::thread();
        for _ in 0..1000 {
            let r = source.next_uniform();
            assert!((0.0..1.0).contains(&r));
        }
    }
}
