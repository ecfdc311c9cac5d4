//! Quantum Tunneling Lab
//!
//! Fire a particle at a potential barrier and see whether it tunnels.
//!
//! Controls:
//! - Space/Enter: Attempt (ignored while a particle is in flight)
//! - R: Restart the attempt, cancelling any particle in flight
//! - Up/Down: Adjust particle energy
//! - Left/Right: Adjust barrier width

use common::{Camera2D, GraphicsContext};
use log::{debug, error, info, warn};
use tunneling_lab::config::ConfigSource;
use tunneling_lab::constants::PARAMETER_STEP;
use tunneling_lab::driver::{AttemptDriver, FrameHandle, FrameOutcome, RngSource};
use tunneling_lab::renderer::{TunnelingRenderer, Viewport};
use tunneling_lab::scene::build_scene;
use tunneling_lab::ui::{
    draw_canvas_overlay, draw_control_panel, draw_theory_sidebar, ControlResponse,
};
use tunneling_lab::{Scenario, SimulationParameters};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: TunnelingRenderer,
    camera: Camera2D,
    egui: EguiState,
    scenario: Scenario,
    params: SimulationParameters,
    driver: AttemptDriver,
    rng: RngSource<rand::rngs::ThreadRng>,
    /// Frame the driver is waiting on; fed back on the next redraw
    frame: Option<FrameHandle>,
}

impl App {
    fn new(ctx: GraphicsContext, scenario: Scenario) -> Self {
        let renderer = TunnelingRenderer::new(&ctx, 8);
        let camera = Camera2D::framing(
            scenario.animation.canvas_width,
            scenario.animation.canvas_height,
            ctx.aspect_ratio(),
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &ctx.device,
            ctx.config.format,
            None,
            1,
        );

        let params = SimulationParameters::initial(&scenario).unwrap_or_else(|e| {
            warn!("{}; starting from the lower slider bounds", e);
            SimulationParameters {
                energy: scenario.energy_range.min,
                barrier_width: scenario.width_range.min,
            }
        });
        let driver = AttemptDriver::new(scenario.clone());

        Self {
            ctx,
            renderer,
            camera,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
            scenario,
            params,
            driver,
            rng: RngSource::thread(),
            frame: None,
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
    }

    /// One animation step for the pending frame, if any
    fn update(&mut self) {
        let Some(handle) = self.frame.take() else {
            return;
        };
        match self.driver.on_frame(handle, &self.params, &mut self.rng) {
            FrameOutcome::Continue(next) => self.frame = Some(next),
            FrameOutcome::Finished(outcome) => {
                info!("{:?}: {}", outcome.feedback.category, outcome.feedback.message);
            }
            FrameOutcome::Stale => debug!("dropped stale frame {:?}", handle),
        }
    }

    fn attempt(&mut self) {
        match self.driver.arm() {
            Ok(handle) => self.frame = Some(handle),
            Err(e) => warn!("{}", e),
        }
    }

    fn restart(&mut self) {
        self.frame = Some(self.driver.restart());
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let scene = build_scene(self.driver.particle(), &self.params, &self.scenario);

        // Build egui UI first: panels decide where the canvas goes
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let mut controls = ControlResponse::default();
        let mut canvas_area = egui::Rect::NOTHING;
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            draw_theory_sidebar(ctx, &self.params, &self.scenario);
            controls = draw_control_panel(ctx, &mut self.params, &self.scenario, &self.driver);
            canvas_area = draw_canvas_overlay(ctx, &scene);
        });

        if controls.params_changed {
            debug!(
                "parameters: E = {}, L = {}, T = {:.4}",
                self.params.energy,
                self.params.barrier_width,
                self.scenario.model().probability(&self.params)
            );
        }
        if controls.attempt_requested {
            self.attempt();
        }

        let ppp = full_output.pixels_per_point;
        let surface_w = self.ctx.size.width as f32;
        let surface_h = self.ctx.size.height as f32;
        let x = (canvas_area.min.x * ppp).clamp(0.0, surface_w);
        let y = (canvas_area.min.y * ppp).clamp(0.0, surface_h);
        let viewport = Viewport {
            x,
            y,
            width: (canvas_area.width() * ppp).clamp(0.0, surface_w - x),
            height: (canvas_area.height() * ppp).clamp(0.0, surface_h - y),
        };
        self.camera.update_aspect_ratio(viewport.aspect_ratio());
        self.camera.fit(scene.width, scene.height);
        self.renderer.update_camera(&self.ctx.queue, &self.camera);
        self.renderer.update_scene(&self.ctx.queue, &scene);

        self.egui.state.handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self.egui.ctx.tessellate(full_output.shapes, ppp);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui.renderer.update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: ppp,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view, viewport);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space | KeyCode::Enter => self.attempt(),
            KeyCode::KeyR => self.restart(),
            KeyCode::ArrowUp => self.params.nudge_energy(PARAMETER_STEP, &self.scenario),
            KeyCode::ArrowDown => self.params.nudge_energy(-PARAMETER_STEP, &self.scenario),
            KeyCode::ArrowRight => self.params.nudge_width(PARAMETER_STEP, &self.scenario),
            KeyCode::ArrowLeft => self.params.nudge_width(-PARAMETER_STEP, &self.scenario),
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

fn load_scenario() -> Scenario {
    match Scenario::resolve() {
        Ok((scenario, ConfigSource::File(path))) => {
            info!("loaded scenario from {}", path.display());
            scenario
        }
        Ok((scenario, ConfigSource::Defaults)) => {
            info!("using default scenario");
            scenario
        }
        Err(e) => {
            warn!("{}; falling back to default scenario", e);
            Scenario::default()
        }
    }
}

fn main() {
    let (ctx, event_loop) = match pollster::block_on(GraphicsContext::new(
        "Quantum Tunneling Lab",
        1280,
        720,
    )) {
        Ok(pair) => pair,
        Err(e) => {
            error!("failed to initialise graphics: {}", e);
            std::process::exit(1);
        }
    };

    let scenario = load_scenario();
    let mut app = App::new(ctx, scenario);

    let result = event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.handle_window_event(event);

                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(size) => app.resize(*size),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(key),
                                state,
                                ..
                            },
                        ..
                    } if !consumed => app.handle_key(*key, *state),
                    WindowEvent::RedrawRequested => {
                        app.update();
                        match app.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("GPU out of memory");
                                elwt.exit();
                            }
                            Err(e) => error!("Render error: {:?}", e),
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    });

    if let Err(e) = result {
        error!("Event loop error: {}", e);
    }
}
