pub mod ring;
pub mod stats;

use std::sync::Arc;

use winit::window::Window;

use self::stats::RateStats;
use crate::render::GpuState;
use crate::viewport::Viewport;

/// Family name the instructions font is registered under.
const INSTRUCTIONS_FONT: &str = "balsamiq";
/// 26pt at 80 DPI, in logical pixels.
const INSTRUCTIONS_SIZE: f32 = 26.0 * 80.0 / 72.0;
const INSTRUCTIONS_POS: egui::Vec2 = egui::vec2(15.0, 50.0);
const INSTRUCTIONS: &str = "←: Kalm\n→: Gotta Go Fast\nSpace: Switch character";

const DEBUG_TEXT_SIZE: f32 = 12.0;
const DEBUG_LINE_HEIGHT: f32 = 15.0;

/// What the overlay needs from the animation each frame.
pub struct HudSnapshot<'a> {
    pub debug_visible: bool,
    pub cursor_label: &'a str,
}

/// Text overlay powered by egui: the always-on instructions banner, plus the
/// cursor/FPS/TPS lines while debug is toggled on.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub stats: RateStats,
}

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState, font: Vec<u8>) -> Self {
        let egui_ctx = egui::Context::default();
        install_fonts(&egui_ctx, font);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            stats: RateStats::new(),
        }
    }

    /// Record a drawn frame and the ticks that ran before it.
    pub fn record_frame(&mut self, dt: f64, ticks: u32) {
        self.stats.record(dt, ticks);
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(
        &mut self,
        window: &Window,
        event: &winit::event::WindowEvent,
    ) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        response.consumed
    }

    /// Run the egui frame and produce paint output.
    /// Returns (clipped_primitives, textures_delta, screen_descriptor).
    pub fn run_frame(
        &mut self,
        window: &Window,
        viewport: &Viewport,
        hud: &HudSnapshot<'_>,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        // One egui point per logical pixel, whatever the window size.
        let native_ppp = window.scale_factor() as f32;
        self.egui_ctx.set_zoom_factor(viewport.scale() / native_ppp);

        let raw_input = self.egui_state.take_egui_input(window);

        let origin = viewport.scaled_origin();
        let ui_state = UiSnapshot {
            origin: egui::pos2(origin.x, origin.y),
            debug_visible: hud.debug_visible,
            cursor_label: hud.cursor_label.to_owned(),
            fps: self.stats.fps,
            tps: self.stats.tps,
        };

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &ui_state);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let (screen_w, screen_h) = viewport.physical_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

/// Register the instructions font as its own family, falling back to the
/// built-in proportional fonts for glyphs it lacks (the arrows).
fn install_fonts(ctx: &egui::Context, font: Vec<u8>) {
    ctx.set_fonts(font_definitions(font));
}

fn font_definitions(font: Vec<u8>) -> egui::FontDefinitions {
    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(
        INSTRUCTIONS_FONT.to_owned(),
        Arc::new(egui::FontData::from_owned(font)),
    );

    let mut family = vec![INSTRUCTIONS_FONT.to_owned()];
    if let Some(fallback) = fonts.families.get(&egui::FontFamily::Proportional) {
        family.extend(fallback.iter().cloned());
    }
    fonts
        .families
        .insert(egui::FontFamily::Name(INSTRUCTIONS_FONT.into()), family);
    fonts
}

/// Debug lines in draw order: cursor, FPS, TPS.
fn debug_lines(cursor_label: &str, fps: f64, tps: f64) -> [String; 3] {
    [
        cursor_label.to_owned(),
        format!("FPS: {fps:.2}"),
        format!("TPS: {tps:.2}"),
    ]
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw (avoids borrow conflicts with egui_ctx)
// ---------------------------------------------------------------------------

struct UiSnapshot {
    origin: egui::Pos2,
    debug_visible: bool,
    cursor_label: String,
    fps: f64,
    tps: f64,
}

fn draw_ui(ctx: &egui::Context, s: &UiSnapshot) {
    egui::Area::new(egui::Id::new("instructions"))
        .fixed_pos(s.origin + INSTRUCTIONS_POS)
        .interactable(false)
        .show(ctx, |ui| {
            ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
            ui.label(
                egui::RichText::new(INSTRUCTIONS)
                    .font(egui::FontId::new(
                        INSTRUCTIONS_SIZE,
                        egui::FontFamily::Name(INSTRUCTIONS_FONT.into()),
                    ))
                    .color(egui::Color32::WHITE),
            );
        });

    if !s.debug_visible {
        return;
    }

    for (i, line) in debug_lines(&s.cursor_label, s.fps, s.tps).iter().enumerate() {
        egui::Area::new(egui::Id::new(("debug_line", i)))
            .fixed_pos(s.origin + egui::vec2(0.0, i as f32 * DEBUG_LINE_HEIGHT))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.style_mut().wrap_mode = Some(egui::TextWrapMode::Extend);
                ui.label(
                    egui::RichText::new(line)
                        .monospace()
                        .size(DEBUG_TEXT_SIZE)
                        .color(egui::Color32::WHITE),
                );
            });
    }
}
