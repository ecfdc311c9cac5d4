//! Frame contents for the tunneling canvas
//!
//! Turns driver state and slider values into plain colored shapes in
//! canvas pixels (origin bottom-left, y up). The renderer uploads these
//! as-is; labels are drawn by the UI layer.

use crate::config::Scenario;
use crate::driver::{Particle, ParticleStatus};
use crate::params::SimulationParameters;

/// Ground strip color (#1f2937)
pub const GROUND_COLOR: [f32; 4] = [0.122, 0.161, 0.216, 1.0];
/// Translucent blue barrier
pub const BARRIER_COLOR: [f32; 4] = [0.231, 0.510, 0.965, 0.5];
pub const OUTLINE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Particle fill by attempt status
pub fn status_color(status: ParticleStatus) -> [f32; 4] {
    match status {
        // #10b981
        ParticleStatus::Success => [0.063, 0.725, 0.506, 1.0],
        // #ef4444
        ParticleStatus::Failed => [0.937, 0.267, 0.267, 1.0],
        // #fcd34d
        ParticleStatus::Ready | ParticleStatus::Traveling => [0.988, 0.827, 0.302, 1.0],
    }
}

/// Axis-aligned filled rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
    pub color: [f32; 4],
}

impl Rect {
    pub fn center(&self) -> [f32; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    pub fn half_extents(&self) -> [f32; 2] {
        [
            (self.max[0] - self.min[0]) / 2.0,
            (self.max[1] - self.min[1]) / 2.0,
        ]
    }
}

/// Filled disk with an outline ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub center: [f32; 2],
    pub radius: f32,
    pub fill: [f32; 4],
    pub outline: [f32; 4],
    /// Outline thickness in pixels
    pub outline_width: f32,
}

/// Text anchored at a canvas position, centered horizontally
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    /// Drawn in order: ground, then barrier
    pub rects: Vec<Rect>,
    pub particle: Disk,
    pub labels: Vec<Label>,
}

pub fn build_scene(particle: &Particle, params: &SimulationParameters, scenario: &Scenario) -> Scene {
    let anim = &scenario.animation;
    let ground_top = anim.ground_y() - anim.particle_radius;
    let (left, right) = anim.barrier_span(params.barrier_width);

    let ground = Rect {
        min: [0.0, 0.0],
        max: [anim.canvas_width, ground_top.max(0.0)],
        color: GROUND_COLOR,
    };
    let barrier = Rect {
        min: [left, anim.ground_y()],
        max: [right, anim.canvas_height],
        color: BARRIER_COLOR,
    };

    let particle = Disk {
        center: [particle.x, particle.y],
        radius: anim.particle_radius,
        fill: status_color(particle.status),
        outline: OUTLINE_COLOR,
        outline_width: 2.0,
    };

    let labels = vec![
        Label {
            text: format!("Potential Barrier (V₀={})", scenario.barrier_potential),
            position: [anim.barrier_center(), anim.canvas_height - 30.0],
        },
        Label {
            text: format!("Width L={}", params.barrier_width),
            position: [anim.barrier_center(), anim.ground_y() + 10.0],
        },
    ];

    Scene {
        width: anim.canvas_width,
        height: anim.canvas_height,
        rects: vec![ground, barrier],
        particle,
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::AttemptDriver;

    #[test]
    fn test_barrier_tracks_width() {
        let scenario = Scenario::default();
        let driver = AttemptDriver::new(scenario.clone());

        let narrow = build_scene(driver.particle(), &SimulationParameters::new(5.0, 2.0).unwrap(), &scenario);
        let wide = build_scene(driver.particle(), &SimulationParameters::new(5.0, 8.0).unwrap(), &scenario);

        let barrier = narrow.rects[1];
        assert_eq!(barrier.min[0], 380.0);
        assert_eq!(barrier.max[0], 420.0);
        assert_eq!(barrier.center()[0], 400.0);
        assert_eq!(wide.rects[1].half_extents()[0], 80.0);
        assert_eq!(wide.labels[1].text, "Width L=8");
    }

    #[test]
    fn test_particle_color_follows_status() {
        let scenario = Scenario::default();
        let params = SimulationParameters::new(5.0, 2.0).unwrap();
        let mut particle = *AttemptDriver::new(scenario.clone()).particle();

        for status in [
            ParticleStatus::Ready,
            ParticleStatus::Traveling,
            ParticleStatus::Success,
            ParticleStatus::Failed,
        ] {
            particle.status = status;
            let scene = build_scene(&particle, &params, &scenario);
            assert_eq!(scene.particle.fill, status_color(status));
        }
        assert_ne!(
            status_color(ParticleStatus::Success),
            status_color(ParticleStatus::Failed)
        );
    }

    #[test]
    fn test_labels_name_barrier() {
        let scenario = Scenario::default();
        let particle = *AttemptDriver::new(scenario.clone()).particle();
        let scene = build_scene(&particle, &SimulationParameters::new(5.0, 2.5).unwrap(), &scenario);
        assert_eq!(scene.labels[0].text, "Potential Barrier (V₀=10)");
        assert_eq!(scene.labels[1].text, "Width L=2.5");
        assert_eq!(scene.particle.center, [50.0, 20.0]);
    }
}
