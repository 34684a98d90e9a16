use std::sync::Arc;
use std::time::Duration;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::AssetBundle;
use crate::audio::MusicPlayer;
use crate::backdrop::Backdrop;
use crate::config::Config;
use crate::debug::{DebugOverlay, HudSnapshot};
use crate::input::{InputState, Key};
use crate::render::instance::SpriteInstance;
use crate::render::GpuState;
use crate::sprite::animation::AnimationController;
use crate::viewport::{Viewport, LOGICAL_HEIGHT, LOGICAL_WIDTH};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;

const WINDOW_TITLE: &str = "space.exe";

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    /// Decoded assets, held until the GPU and overlay take them on `resumed`.
    assets: Option<AssetBundle>,

    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    debug: Option<DebugOverlay>,
    viewport: Viewport,

    controller: AnimationController,
    input: InputState,
    backdrop: Backdrop,

    // Kept alive for the lifetime of the app; dropping it stops playback.
    _music: Option<MusicPlayer>,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    tick_count: u64,

    // Reusable instance buffer (avoid per-frame allocation)
    instance_buf: Vec<SpriteInstance>,
}

impl App {
    fn new(config: &Config, assets: AssetBundle, music: Option<MusicPlayer>) -> Self {
        Self {
            assets: Some(assets),
            window: None,
            gpu: None,
            debug: None,
            viewport: Viewport::new(LOGICAL_WIDTH, LOGICAL_HEIGHT),
            controller: AnimationController::new(
                config.keys,
                config.anchor_mode,
                config.initial_ticks_per_frame,
            ),
            input: InputState::new(),
            backdrop: Backdrop::new(fastrand::Rng::new()),
            _music: music,
            last_frame_time: None,
            accumulator: 0.0,
            tick_count: 0,
            instance_buf: Vec::with_capacity(3),
        }
    }

    /// Run fixed-timestep ticks. Returns how many ran.
    fn run_fixed_update(&mut self, dt: f64) -> u32 {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        let mut ticks = 0;
        while self.accumulator >= TICK_RATE {
            self.input.advance_tick();
            self.controller.tick(&self.input);

            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
            ticks += 1;
        }
        ticks
    }

    /// Advance the animation for this draw and build the quads, back to front.
    fn build_instances(&mut self) {
        let cmd = self.controller.render(self.input.cursor());
        if cmd.row_advanced {
            self.backdrop.reroll();
        }

        self.instance_buf.clear();
        let Some(gpu) = &self.gpu else {
            return;
        };
        let bg = &gpu.textures.background;
        let sheet = gpu.textures.sheet(cmd.character);
        self.instance_buf.push(SpriteInstance::image(bg.width, bg.height));
        self.instance_buf
            .push(SpriteInstance::fill(self.backdrop.fill_color()));
        self.instance_buf
            .push(SpriteInstance::from_draw_command(&cmd, sheet.width, sheet.height));
    }

    fn render_frame(&mut self) {
        let (Some(window), Some(gpu), Some(debug)) =
            (&self.window, &mut self.gpu, &mut self.debug)
        else {
            return;
        };

        gpu.update_instances(&self.instance_buf);

        let Some(mut frame) = gpu.begin_frame() else {
            return;
        };

        gpu.draw_scene(
            &mut frame.encoder,
            &frame.view,
            &self.viewport,
            self.controller.character(),
        );

        let hud = HudSnapshot {
            debug_visible: self.controller.debug_visible(),
            cursor_label: self.controller.cursor_label(),
        };
        let (primitives, textures_delta, screen_descriptor) =
            debug.run_frame(window, &self.viewport, &hud);

        let extra_cmd_bufs = debug.prepare_egui(
            &gpu.device,
            &gpu.queue,
            &mut frame.encoder,
            &primitives,
            &textures_delta,
            &screen_descriptor,
        );

        {
            let mut pass = GpuState::begin_egui_pass(&mut frame.encoder, &frame.view);
            debug.render_egui(&mut pass, &primitives, &screen_descriptor);
        }

        gpu.finish_frame(frame.encoder, frame.output, extra_cmd_bufs);
        debug.free_textures(&textures_delta);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(assets) = self.assets.take() else {
            return;
        };

        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(LOGICAL_WIDTH, LOGICAL_HEIGHT))
            .with_resizable(false);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        window.set_cursor_visible(false);

        let size = window.inner_size();
        self.viewport.resize(size.width, size.height);
        log::info!(
            "Window created: {}x{} (scale factor {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );

        // Initialize wgpu + pipeline, upload the images
        let gpu = GpuState::new(window.clone(), &assets);
        log::info!("wgpu + sprite pipeline initialized");

        let debug = DebugOverlay::new(&window, &gpu, assets.font);
        self.gpu = Some(gpu);
        self.debug = Some(debug);

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);

        self.window = Some(window);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // The overlay is display-only; egui sees events but never claims them.
        if let (Some(window), Some(debug)) = (&self.window, &mut self.debug) {
            debug.on_window_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.viewport.resize(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = Key::from_key_code(code) else {
                    return;
                };
                match event.state {
                    ElementState::Pressed if key == Key::Escape => {
                        log::info!("ESC pressed, exiting");
                        event_loop.exit();
                    }
                    ElementState::Pressed => self.input.key_down(key),
                    ElementState::Released => self.input.key_up(key),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .set_cursor(self.viewport.to_logical(position.x, position.y));
            }
            WindowEvent::RedrawRequested => {
                // --- Timing ---
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();

                    // Fixed timestep sim
                    let ticks = self.run_fixed_update(dt);

                    if let Some(debug) = &mut self.debug {
                        debug.record_frame(dt, ticks);
                    }
                }
                self.last_frame_time = Some(now);

                // --- Advance the animation, build quads ---
                self.build_instances();

                // --- Render ---
                self.render_frame();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("Shutting down after {} ticks", self.tick_count);
    }
}

/// Entry point: load config and assets, start the music, run the event loop.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    log::info!("Loading assets from {}", config.assets_dir.display());

    let mut assets = AssetBundle::load(&config.assets_dir)?;
    let music = MusicPlayer::start(
        std::mem::take(&mut assets.music),
        config.music_volume,
        Duration::from_secs_f64(config.music_loop_secs),
    )?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(&config, assets, music);
    event_loop.run_app(&mut app)?;
    Ok(())
}
