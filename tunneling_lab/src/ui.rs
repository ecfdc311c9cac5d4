//! egui overlay: control panel, theory sidebar and canvas labels

use egui::{Color32, Context, FontFamily, FontId, Pos2, RichText};

use crate::config::Scenario;
use crate::driver::AttemptDriver;
use crate::params::SimulationParameters;
use crate::probability::{format_percent, Regime};
use crate::scene::Scene;

/// Formulas of the model, shown as (name, formula) rows
pub const MODEL_FORMULAS: &[(&str, &str)] = &[
    ("Transmission", "T = e^(-C·L·√(V₀-E))"),
    ("Classical limit", "E ≥ V₀  ⇒  T = 1"),
    ("Energy deficit", "ΔV = V₀ - E"),
    ("Attempt", "r ~ U[0,1),  pass ⇔ r ≤ T"),
];

const PENDING_MESSAGE: &str = "Analyzing parameters and initiating attempt...";
const IDLE_MESSAGE: &str = "Set the energy and barrier width, then launch a particle at the barrier.";

/// What the user asked for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlResponse {
    pub attempt_requested: bool,
    pub params_changed: bool,
}

/// Live breakdown of the transmission formula for the current sliders.
/// Rows for ΔV and the exponent are omitted in the classical regime.
pub fn formula_breakdown(
    params: &SimulationParameters,
    scenario: &Scenario,
) -> Vec<(&'static str, String)> {
    let model = scenario.model();
    let mut rows = vec![
        ("V₀", format!("{}", scenario.barrier_potential)),
        ("C", format!("{}", scenario.scaling_constant)),
        ("E", format!("{}", params.energy)),
        ("L", format!("{}", params.barrier_width)),
    ];
    if let Regime::Tunneling = model.regime(params) {
        let deficit = scenario.barrier_potential - params.energy;
        let exponent = -scenario.scaling_constant * params.barrier_width * deficit.sqrt();
        rows.push(("ΔV", format!("{:.2}", deficit)));
        rows.push(("exponent", format!("{:.3}", exponent)));
    }
    rows.push(("T", format_percent(model.probability(params), 2)));
    rows
}

/// Right-hand panel: model formulas plus the numbers currently plugged in
pub fn draw_theory_sidebar(ctx: &Context, params: &SimulationParameters, scenario: &Scenario) {
    let heading = Color32::from_rgb(255, 200, 100);
    let symbol = Color32::from_rgb(150, 255, 150);

    egui::SidePanel::right("theory_panel")
        .min_width(240.0)
        .max_width(320.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new("Quantum Tunneling").color(Color32::from_rgb(100, 200, 255)));
            });
            ui.separator();

            ui.label(RichText::new("Model").strong().color(heading));
            egui::Grid::new("model_formulas")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    for (name, formula) in MODEL_FORMULAS {
                        ui.label(RichText::new(*name).color(Color32::LIGHT_GRAY));
                        ui.label(
                            RichText::new(*formula)
                                .font(FontId::new(15.0, FontFamily::Monospace))
                                .color(Color32::from_rgb(200, 220, 255)),
                        );
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            ui.separator();
            ui.label(RichText::new("Current values").strong().color(heading));
            egui::Grid::new("formula_breakdown")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (name, value) in formula_breakdown(params, scenario) {
                        ui.label(
                            RichText::new(name)
                                .color(symbol)
                                .font(FontId::new(14.0, FontFamily::Monospace)),
                        );
                        ui.label(RichText::new(value).font(FontId::new(14.0, FontFamily::Monospace)));
                        ui.end_row();
                    }
                });
        });
}

/// Sliders, readouts, attempt button and tutor feedback
pub fn draw_control_panel(
    ctx: &Context,
    params: &mut SimulationParameters,
    scenario: &Scenario,
    driver: &AttemptDriver,
) -> ControlResponse {
    let mut response = ControlResponse::default();
    let model = scenario.model();

    egui::TopBottomPanel::bottom("controls")
        .resizable(false)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let energy = ui.add(
                    egui::Slider::new(
                        &mut params.energy,
                        scenario.energy_range.min..=scenario.energy_range.max,
                    )
                    .step_by(crate::constants::PARAMETER_STEP as f64)
                    .text("Particle Energy (E)"),
                );
                ui.separator();
                let width = ui.add(
                    egui::Slider::new(
                        &mut params.barrier_width,
                        scenario.width_range.min..=scenario.width_range.max,
                    )
                    .step_by(crate::constants::PARAMETER_STEP as f64)
                    .text("Barrier Width (L)"),
                );
                response.params_changed = energy.changed() || width.changed();
            });

            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Tunneling probability:");
                ui.label(
                    RichText::new(format_percent(model.probability(params), 2))
                        .strong()
                        .font(FontId::new(18.0, FontFamily::Monospace)),
                );
                ui.separator();

                match model.prediction(params) {
                    Some((percent, band)) => {
                        let [r, g, b] = band.color();
                        ui.label(
                            RichText::new(format!("Predicted Tunnel Probability: {}%", percent))
                                .color(Color32::from_rgb(r, g, b)),
                        );
                    }
                    None => {
                        ui.label(RichText::new("Classical regime: E ≥ V₀").color(Color32::GRAY));
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let button = egui::Button::new(RichText::new("Attempt Tunnel").strong());
                    if ui.add_enabled(driver.can_arm(), button).clicked() {
                        response.attempt_requested = true;
                    }
                });
            });

            ui.add_space(4.0);
            ui.separator();
            draw_feedback(ui, driver);
            ui.add_space(6.0);
        });

    response
}

fn draw_feedback(ui: &mut egui::Ui, driver: &AttemptDriver) {
    let text = if driver.is_in_transit() {
        RichText::new(PENDING_MESSAGE).color(Color32::from_gray(220))
    } else if let Some(outcome) = driver.last_outcome() {
        let [r, g, b] = outcome.feedback.category.color();
        RichText::new(outcome.feedback.message.as_str()).color(Color32::from_rgb(r, g, b))
    } else {
        RichText::new(IDLE_MESSAGE).color(Color32::from_gray(220))
    };
    ui.label(text.italics());
}

/// Fill the remaining space with the canvas labels and return the area
/// (in points) the canvas should be rendered into
pub fn draw_canvas_overlay(ctx: &Context, scene: &Scene) -> egui::Rect {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let area = ui.max_rect();
            let painter = ui.painter();
            for label in &scene.labels {
                let pos = canvas_to_screen(area, scene.width, scene.height, label.position);
                painter.text(
                    pos,
                    egui::Align2::CENTER_CENTER,
                    &label.text,
                    FontId::proportional(16.0),
                    Color32::WHITE,
                );
            }
            area
        })
        .inner
}

/// Map a canvas point (y up) into `area`, letterboxed to keep proportions
pub fn canvas_to_screen(area: egui::Rect, width: f32, height: f32, point: [f32; 2]) -> Pos2 {
    let scale = (area.width() / width).min(area.height() / height);
    let offset_x = area.center().x - width * scale / 2.0;
    let offset_y = area.center().y - height * scale / 2.0;
    Pos2::new(
        offset_x + point[0] * scale,
        offset_y + (height - point[1]) * scale,
    )
}
