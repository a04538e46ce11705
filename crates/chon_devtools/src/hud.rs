//! Game HUD and debug overlay rendered via egui on top of the scene.
//!
//! Integration pattern: egui requires a three-phase render split because
//! `egui_wgpu::Renderer::render()` needs a `RenderPass<'static>`, while
//! `begin_render_pass` borrows the encoder. The phases are:
//!
//!   1. `prepare()` -- run egui UI logic, produce tessellated primitives
//!   2. `upload()`  -- upload textures and update GPU buffers (borrows encoder mutably)
//!   3. `paint()`   -- render into a new render pass with `forget_lifetime()`
//!   4. `cleanup()` -- free textures egui no longer references
//!
//! The score/health HUD is always shown; the debug section (frame timing,
//! draw calls) is toggled with F3. egui event handling stays active so the
//! overlay buttons can intercept clicks.

use chon_core::time::FrameClock;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct HudStats {
    pub score: u32,
    pub health: i32,
    pub max_health: i32,
    pub item_count: u32,
    pub paused: bool,
    pub game_over: bool,
    pub draw_calls: u32,
    pub sprite_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct HudActions {
    /// User clicked the pause/resume button
    pub toggle_pause: bool,
    /// User clicked the restart button
    pub restart: bool,
}

pub struct HudOverlay {
    pub egui_ctx: egui::Context,
    pub egui_winit_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,
    pub debug_visible: bool,
}

impl HudOverlay {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window: &Window,
    ) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_winit_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);

        Self {
            egui_ctx,
            egui_winit_state,
            egui_renderer,
            debug_visible: false,
        }
    }

    pub fn handle_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_winit_state.on_window_event(window, event);
        response.consumed
    }

    pub fn toggle_debug(&mut self) {
        self.debug_visible = !self.debug_visible;
        log::info!(
            "Debug overlay: {}",
            if self.debug_visible { "ON" } else { "OFF" }
        );
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        clock: &FrameClock,
        stats: &HudStats,
    ) -> (
        Vec<egui::ClippedPrimitive>,
        egui::TexturesDelta,
        HudActions,
    ) {
        let mut actions = HudActions::default();
        let raw_input = self.egui_winit_state.take_egui_input(window);
        let debug_visible = self.debug_visible;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Chon")
                .default_pos([10.0, 10.0])
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Score: {}", stats.score));
                    ui.label(format!("Health: {}/{}", stats.health, stats.max_health));
                    ui.label(format!("Falling items: {}", stats.item_count));

                    ui.separator();
                    ui.horizontal(|ui| {
                        let pause_label = if stats.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_label).clicked() {
                            actions.toggle_pause = true;
                        }
                        if ui.button("Restart").clicked() {
                            actions.restart = true;
                        }
                    });
                    if stats.paused {
                        ui.label("\u{23f8} PAUSED");
                    }
                    if stats.game_over {
                        ui.label("\u{2620} GAME OVER -- press R to restart");
                    }

                    if debug_visible {
                        ui.separator();
                        ui.label(format!("FPS: {:.1}", clock.smoothed_fps));
                        ui.label(format!("Frame time: {:.2} ms", clock.smoothed_frame_time_ms));
                        ui.label(format!("Steps this frame: {}", clock.steps_this_frame));
                        ui.label(format!("Total steps: {}", clock.fixed_step_count));
                        ui.label(format!("Draw calls: {}", stats.draw_calls));
                        ui.label(format!("Sprites: {}", stats.sprite_count));
                    }
                });
        });

        self.egui_winit_state
            .handle_platform_output(window, full_output.platform_output);

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        (primitives, full_output.textures_delta, actions)
    }

    /// Upload textures and update buffers. Call before creating the egui render pass.
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor);
    }

    /// Render into an existing render pass. Call after `upload()`.
    pub fn paint(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures that egui no longer needs. Call after rendering.
    pub fn cleanup(&mut self, textures_delta: &egui::TexturesDelta) {
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}
