//! Chon: The Learning Game -- main loop and application entry point.
//!
//! Architecture: winit drives the event loop via `ApplicationHandler`. All
//! simulation runs inside `RedrawRequested` using a **fixed-timestep** model
//! (see `FrameClock`):
//!
//!   1. `begin_frame()` -- measure wall-clock delta, feed accumulator
//!   2. `while should_step()` -- consume fixed-dt slices driving `GameSession`
//!   3. Rebuild the sprite mesh (background, items, agents, health bar)
//!   4. Upload the camera uniform, issue draw calls, composite the egui HUD
//!
//! The simulation itself lives in `session` and is fully headless; this file
//! only maps raw input to a `FrameIntent` and draws the result. The game
//! config JSON is watched via mtime polling and re-applied at frame
//! boundaries.

mod agent;
mod config;
mod environment;
mod item;
mod mesh;
#[cfg(test)]
mod replay;
mod session;
mod spawner;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wgpu::util::DeviceExt;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use chon_core::input::{InputState, Key};
use chon_core::time::FrameClock;
use chon_devtools::{HudOverlay, HudStats};
use chon_platform::window::PlatformConfig;
use chon_render::{Camera2D, GpuContext, SpritePipeline, SpriteVertex, Texture};
use config::{load_config_from_path, FileWatcher, GameConfig};
use mesh::{QuadSpec, SpriteMesh};
use session::{FrameIntent, GameSession, Phase};

const CONFIG_PATH: &str = "assets/config/game.json";
const WHITE_ASSET: &str = "__white";

struct GpuSpriteTexture {
    bind_group: wgpu::BindGroup,
}

/// All mutable engine state. Constructed lazily in
/// `ApplicationHandler::resumed` once the window and GPU surface exist.
struct EngineState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    input: InputState,
    camera: Camera2D,
    sprite_pipeline: SpritePipeline,
    hud: HudOverlay,

    config_path: PathBuf,
    config_watcher: FileWatcher,
    session: GameSession,
    rng: StdRng,
    textures: HashMap<Arc<str>, GpuSpriteTexture>,

    // The sprite mesh is rebuilt on the CPU each simulated frame, then
    // streamed into these GPU buffers. Buffers grow (power-of-two) but
    // never shrink.
    mesh: SpriteMesh,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    mesh_vertex_capacity: usize,
    mesh_index_capacity: usize,
}

impl EngineState {
    fn new(window: Arc<Window>, config: GameConfig) -> Self {
        let gpu = GpuContext::new(window.clone());
        let clock = FrameClock::new();
        let input = InputState::new();
        let sprite_pipeline = SpritePipeline::new(&gpu.device, gpu.surface_format);
        let hud = HudOverlay::new(&gpu.device, gpu.surface_format, &window);

        let config_path = PathBuf::from(CONFIG_PATH);
        let config_watcher = FileWatcher::new(config_path.clone());
        let camera = Camera2D::new(config.world.width, config.world.height);
        let session = GameSession::new(config);

        let camera_uniform = camera.build_uniform();
        let camera_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[camera_uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group =
            sprite_pipeline.create_camera_bind_group(&gpu.device, &camera_buffer);
        let vertex_buffer = create_vertex_buffer(&gpu.device, 1);
        let index_buffer = create_index_buffer(&gpu.device, 1);

        let mut state = Self {
            window,
            gpu,
            clock,
            input,
            camera,
            sprite_pipeline,
            hud,
            config_path,
            config_watcher,
            session,
            rng: StdRng::from_entropy(),
            textures: HashMap::new(),
            mesh: SpriteMesh::new(),
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            mesh_vertex_capacity: 0,
            mesh_index_capacity: 0,
        };

        // Startup order matters: load textures before building the first mesh.
        state.ensure_textures();
        state.rebuild_world_mesh();
        state.upload_mesh();
        state
    }

    fn reload_config(&mut self) {
        match load_config_from_path(&self.config_path) {
            Ok(config) => {
                self.camera = Camera2D::new(config.world.width, config.world.height);
                let camera_uniform = self.camera.build_uniform();
                self.gpu.queue.write_buffer(
                    &self.camera_buffer,
                    0,
                    bytemuck::cast_slice(&[camera_uniform]),
                );
                self.session.apply_config(config);
                self.ensure_textures();
                log::info!("Config reloaded: {}", self.config_path.display());
            }
            Err(err) => {
                log::error!("Config reload failed: {err}");
            }
        }
    }

    /// Every texture the current config references, paired with the solid
    /// fallback color used when the PNG is missing or unreadable. The game
    /// stays playable without any asset files.
    fn texture_slots(&self) -> Vec<(String, [u8; 4])> {
        let tex = &self.session.config().textures;
        vec![
            (tex.background.clone(), [58, 74, 96, 255]),
            (tex.pause.clone(), [24, 24, 32, 255]),
            (tex.protagonist.clone(), [235, 90, 90, 255]),
            (tex.enemy.clone(), [120, 90, 200, 255]),
            (tex.hazard.clone(), [40, 40, 40, 255]),
            (tex.collectible.clone(), [240, 200, 60, 255]),
        ]
    }

    fn ensure_textures(&mut self) {
        for (path, fallback) in self.texture_slots() {
            if self.textures.contains_key(path.as_str()) {
                continue;
            }
            let texture = self.load_texture_or_fallback(&path, fallback);
            let bind_group = self
                .sprite_pipeline
                .create_texture_bind_group(&self.gpu.device, &texture);
            self.textures
                .insert(Arc::from(path), GpuSpriteTexture { bind_group });
        }

        if !self.textures.contains_key(WHITE_ASSET) {
            let texture = Texture::from_rgba8(
                &self.gpu.device,
                &self.gpu.queue,
                &[255, 255, 255, 255],
                1,
                1,
                "white",
            );
            let bind_group = self
                .sprite_pipeline
                .create_texture_bind_group(&self.gpu.device, &texture);
            self.textures
                .insert(Arc::from(WHITE_ASSET), GpuSpriteTexture { bind_group });
        }
    }

    fn load_texture_or_fallback(&self, path: &str, fallback: [u8; 4]) -> Texture {
        match std::fs::read(path) {
            Ok(bytes) => match Texture::from_bytes(&self.gpu.device, &self.gpu.queue, &bytes, path)
            {
                Ok(texture) => return texture,
                Err(err) => log::warn!("{err}. Falling back to solid color."),
            },
            Err(err) => {
                log::warn!("Failed to read texture '{path}': {err}. Falling back to solid color.")
            }
        }
        Texture::from_rgba8(&self.gpu.device, &self.gpu.queue, &fallback, 1, 1, path)
    }

    fn rebuild_world_mesh(&mut self) {
        self.mesh.clear();
        let env = &self.session.env;
        let textures = &self.session.config().textures;
        let white = [1.0f32, 1.0, 1.0, 1.0];

        self.mesh.push_quad(QuadSpec {
            texture_key: &textures.background,
            x: 0.0,
            y: 0.0,
            width: env.width,
            height: env.height,
            color: white,
        });

        for item in &env.items {
            self.mesh.push_quad(QuadSpec {
                texture_key: &item.texture_key,
                x: item.aabb.pos.x,
                y: item.aabb.pos.y,
                width: item.aabb.size.x,
                height: item.aabb.size.y,
                color: white,
            });
        }

        for enemy in &env.agents {
            self.mesh.push_quad(QuadSpec {
                texture_key: &textures.enemy,
                x: enemy.aabb.pos.x,
                y: enemy.aabb.pos.y,
                width: enemy.aabb.size.x,
                height: enemy.aabb.size.y,
                color: white,
            });
        }

        self.mesh.push_quad(QuadSpec {
            texture_key: &textures.protagonist,
            x: env.protagonist.aabb.pos.x,
            y: env.protagonist.aabb.pos.y,
            width: env.protagonist.aabb.size.x,
            height: env.protagonist.aabb.size.y,
            color: white,
        });

        // Health bar along the bottom edge: dark backing, red fill.
        let bar_w = 300.0;
        let bar_h = 16.0;
        let bar_x = 20.0;
        let bar_y = env.height - bar_h - 14.0;
        let fraction =
            (env.protagonist.health.max(0) as f32) / (env.protagonist.max_health.max(1) as f32);
        self.mesh.push_quad(QuadSpec {
            texture_key: WHITE_ASSET,
            x: bar_x - 2.0,
            y: bar_y - 2.0,
            width: bar_w + 4.0,
            height: bar_h + 4.0,
            color: [0.05, 0.05, 0.05, 0.85],
        });
        self.mesh.push_quad(QuadSpec {
            texture_key: WHITE_ASSET,
            x: bar_x,
            y: bar_y,
            width: bar_w * fraction,
            height: bar_h,
            color: [0.85, 0.15, 0.15, 0.95],
        });

        if self.session.paused || self.session.phase == Phase::GameOver {
            self.mesh.push_quad(QuadSpec {
                texture_key: WHITE_ASSET,
                x: 0.0,
                y: 0.0,
                width: env.width,
                height: env.height,
                color: [0.0, 0.0, 0.0, 0.55],
            });
        }
        if self.session.paused {
            let pause_w = 512.0;
            let pause_h = 256.0;
            self.mesh.push_quad(QuadSpec {
                texture_key: &textures.pause,
                x: (env.width - pause_w) * 0.5,
                y: (env.height - pause_h) * 0.5,
                width: pause_w,
                height: pause_h,
                color: white,
            });
        }
    }

    fn upload_mesh(&mut self) {
        self.ensure_mesh_capacity(self.mesh.vertices.len(), self.mesh.indices.len());
        if !self.mesh.vertices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.vertex_buffer,
                0,
                bytemuck::cast_slice(&self.mesh.vertices),
            );
        }
        if !self.mesh.indices.is_empty() {
            self.gpu.queue.write_buffer(
                &self.index_buffer,
                0,
                bytemuck::cast_slice(&self.mesh.indices),
            );
        }
    }

    fn ensure_mesh_capacity(&mut self, vertex_count: usize, index_count: usize) {
        let needed_vertices = vertex_count.max(1);
        if needed_vertices > self.mesh_vertex_capacity {
            self.mesh_vertex_capacity = needed_vertices.next_power_of_two();
            self.vertex_buffer = create_vertex_buffer(&self.gpu.device, self.mesh_vertex_capacity);
        }

        let needed_indices = index_count.max(1);
        if needed_indices > self.mesh_index_capacity {
            self.mesh_index_capacity = needed_indices.next_power_of_two();
            self.index_buffer = create_index_buffer(&self.gpu.device, self.mesh_index_capacity);
        }
    }

    fn frame_intent(&self) -> FrameIntent {
        let mut move_x = 0.0;
        let mut move_y = 0.0;
        if self.input.is_held(Key::Left) || self.input.is_held(Key::A) {
            move_x -= 1.0;
        }
        if self.input.is_held(Key::Right) || self.input.is_held(Key::D) {
            move_x += 1.0;
        }
        if self.input.is_held(Key::Up) || self.input.is_held(Key::W) {
            move_y -= 1.0;
        }
        if self.input.is_held(Key::Down) || self.input.is_held(Key::S) {
            move_y += 1.0;
        }
        FrameIntent {
            move_x,
            move_y,
            pause_pressed: self.input.is_just_pressed(Key::P),
            restart_pressed: self.input.is_just_pressed(Key::R),
        }
    }
}

struct App {
    platform: PlatformConfig,
    initial_config: GameConfig,
    state: Option<EngineState>,
}

impl App {
    fn new() -> Self {
        // The config file is optional; defaults keep the game playable.
        let initial_config = match load_config_from_path(std::path::Path::new(CONFIG_PATH)) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("{err}. Using default config.");
                GameConfig::default()
            }
        };
        let platform = PlatformConfig {
            width: initial_config.world.width as u32,
            height: initial_config.world.height as u32,
            ..Default::default()
        };
        Self {
            platform,
            initial_config,
            state: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = chon_platform::window::create_window(event_loop, &self.platform);
        log::info!(
            "Window created: {}x{}",
            self.platform.width,
            self.platform.height
        );
        self.state = Some(EngineState::new(window, self.initial_config.clone()));
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state.hud.handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(engine_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(engine_key),
                            ElementState::Released => state.input.key_up(engine_key),
                        }
                    }
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                // Config hot reload happens at the frame boundary, never
                // between fixed steps.
                if state.config_watcher.should_reload() {
                    state.reload_config();
                }

                // Fixed-step simulation phase. Input is sampled once per
                // frame; edge-triggered presses feed only the first step, so
                // a 2-step frame cannot toggle pause twice.
                state.clock.begin_frame();
                let mut intent = state.frame_intent();
                while state.clock.should_step() {
                    if state.clock.steps_this_frame == 1 {
                        if state.input.is_just_pressed(Key::Escape) {
                            event_loop.exit();
                            return;
                        }
                        if state.input.is_just_pressed(Key::F3) {
                            state.hud.toggle_debug();
                        }
                    }

                    let dt = state.clock.fixed_dt as f32;
                    state.session.step(intent, dt, &mut state.rng);
                    intent = intent.held_only();
                }

                if state.clock.steps_this_frame > 0 || state.mesh.sprite_count() == 0 {
                    state.rebuild_world_mesh();
                    state.upload_mesh();
                }

                // Render phase reads finalized simulation state from this frame.
                let Some((output, view)) = state.gpu.begin_frame() else {
                    return;
                };

                let stats = HudStats {
                    score: state.session.env.score,
                    health: state.session.env.protagonist.health,
                    max_health: state.session.env.protagonist.max_health,
                    item_count: state.session.env.items.len() as u32,
                    paused: state.session.paused,
                    game_over: state.session.phase == Phase::GameOver,
                    draw_calls: state.mesh.draw_calls.len() as u32,
                    sprite_count: state.mesh.sprite_count() as u32,
                };
                let (egui_primitives, egui_textures_delta, hud_actions) =
                    state.hud.prepare(&state.window, &state.clock, &stats);

                if hud_actions.toggle_pause && state.session.phase == Phase::Running {
                    state.session.toggle_pause();
                }
                if hud_actions.restart {
                    state.session.restart();
                }

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.gpu.size.0, state.gpu.size.1],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let mut encoder =
                    state
                        .gpu
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Render Encoder"),
                        });

                {
                    let clear_color = wgpu::Color {
                        r: 0.1,
                        g: 0.12,
                        b: 0.16,
                        a: 1.0,
                    };
                    let mut last_bound_texture_key: Option<&Arc<str>> = None;
                    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Scene Render Pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(clear_color),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });

                    render_pass.set_pipeline(&state.sprite_pipeline.render_pipeline);
                    render_pass.set_bind_group(0, &state.camera_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, state.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(state.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

                    for draw in &state.mesh.draw_calls {
                        if let Some(texture) = state.textures.get(&draw.texture_key) {
                            let need_rebind = match last_bound_texture_key {
                                Some(last) => **last != *draw.texture_key,
                                None => true,
                            };
                            if need_rebind {
                                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                                last_bound_texture_key = Some(&draw.texture_key);
                            }
                            render_pass.draw_indexed(
                                draw.index_start..(draw.index_start + draw.index_count),
                                0,
                                0..1,
                            );
                        }
                    }
                }

                state.hud.upload(
                    &state.gpu.device,
                    &state.gpu.queue,
                    &mut encoder,
                    &egui_primitives,
                    &egui_textures_delta,
                    &screen_descriptor,
                );

                {
                    let mut egui_pass = encoder
                        .begin_render_pass(&wgpu::RenderPassDescriptor {
                            label: Some("HUD Render Pass"),
                            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                view: &view,
                                resolve_target: None,
                                ops: wgpu::Operations {
                                    load: wgpu::LoadOp::Load,
                                    store: wgpu::StoreOp::Store,
                                },
                            })],
                            depth_stencil_attachment: None,
                            ..Default::default()
                        })
                        .forget_lifetime();

                    state
                        .hud
                        .paint(&mut egui_pass, &egui_primitives, &screen_descriptor);
                }

                state.hud.cleanup(&egui_textures_delta);

                state.gpu.queue.submit(std::iter::once(encoder.finish()));
                output.present();

                // Only clear edge-triggered input (just_pressed / just_released)
                // after at least one fixed step consumed it. Otherwise a press
                // that lands on a frame with 0 simulation steps is silently lost.
                if state.clock.steps_this_frame > 0 {
                    state.input.end_frame();
                }
            }

            _ => {}
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertex_capacity: usize) -> wgpu::Buffer {
    let byte_len = (vertex_capacity * std::mem::size_of::<SpriteVertex>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Vertex Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, index_capacity: usize) -> wgpu::Buffer {
    let byte_len = (index_capacity * std::mem::size_of::<u32>()).max(1) as u64;
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Index Buffer"),
        size: byte_len,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::KeyR => Some(Key::R),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Chon: The Learning Game starting...");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app).expect("Event loop error");
}
