use glam::{Affine2, Vec2};
use serde::Deserialize;

use super::{Character, SourceRect, COLS, FRAME_HEIGHT, FRAME_WIDTH, ROWS};
use crate::input::{Bindings, InputState};

/// Scale the sprite starts each row-cycle at.
pub const BASE_SCALE: f64 = 0.8;
/// Amount the scale shrinks every drawn frame.
pub const SCALE_STEP: f64 = 0.0033;
/// Fastest animation: advance a column every tick.
pub const MIN_TICKS_PER_FRAME: u32 = 1;
/// Slowest animation.
pub const MAX_TICKS_PER_FRAME: u32 = 8;
pub const DEFAULT_TICKS_PER_FRAME: u32 = 6;
/// Ticks the debug key must be held (half a second at 60 TPS) to toggle the overlay.
pub const DEBUG_HOLD_TICKS: u32 = 30;

/// How the sprite is anchored relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    /// Offset by `frame * trunc(scale)`. While the scale is below 1.0 the
    /// offset is zero and the frame's top-left corner sits on the cursor.
    #[default]
    Truncated,
    /// Offset by `frame * scale`, keeping the frame's bottom-right corner on
    /// the cursor as it shrinks.
    Fractional,
}

/// Sheet traversal state. `column` and `row` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    pub column: u32,
    pub row: u32,
    pub ticks_per_frame: u32,
    /// Incremented every tick, checked against `ticks_per_frame` every draw.
    pub frame_counter: u64,
    pub scale: f64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            column: 1,
            row: 1,
            ticks_per_frame: DEFAULT_TICKS_PER_FRAME,
            frame_counter: 0,
            scale: BASE_SCALE,
        }
    }
}

/// Everything the renderer needs to draw the character this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub character: Character,
    pub source: SourceRect,
    pub scale: f32,
    /// Screen position of the frame's top-left corner, logical pixels.
    pub translate: Vec2,
    /// The animation moved on to the next row this frame.
    pub row_advanced: bool,
}

impl DrawCommand {
    /// Frame-local pixels to screen pixels: scale, then translate.
    pub fn transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(Vec2::splat(self.scale), 0.0, self.translate)
    }
}

/// Drives the cursor-following sprite: per-tick input handling and per-frame
/// sheet stepping.
pub struct AnimationController {
    state: AnimationState,
    character: Character,
    debug_visible: bool,
    cursor_label: String,
    bindings: Bindings,
    anchor: AnchorMode,
}

impl AnimationController {
    pub fn new(bindings: Bindings, anchor: AnchorMode, ticks_per_frame: u32) -> Self {
        Self {
            state: AnimationState {
                ticks_per_frame: ticks_per_frame.clamp(MIN_TICKS_PER_FRAME, MAX_TICKS_PER_FRAME),
                ..AnimationState::default()
            },
            character: Character::default(),
            debug_visible: false,
            cursor_label: String::new(),
            bindings,
            anchor,
        }
    }

    /// One fixed logical tick. At most one control fires per tick.
    pub fn tick(&mut self, input: &InputState) {
        let b = self.bindings;

        if input.is_just_pressed(b.speed_up) {
            if self.state.ticks_per_frame > MIN_TICKS_PER_FRAME {
                self.state.ticks_per_frame -= 1;
                log::debug!("Ticks per frame: {}", self.state.ticks_per_frame);
            }
        } else if input.is_just_pressed(b.slow_down) {
            if self.state.ticks_per_frame < MAX_TICKS_PER_FRAME {
                self.state.ticks_per_frame += 1;
                log::debug!("Ticks per frame: {}", self.state.ticks_per_frame);
            }
        } else if input.is_just_pressed(b.switch_character) {
            self.character = self.character.toggled();
            log::debug!("Character: {}", self.character.label());
        } else if input.press_duration(b.debug) == DEBUG_HOLD_TICKS {
            self.debug_visible = !self.debug_visible;
            log::debug!("Debug overlay: {}", if self.debug_visible { "ON" } else { "OFF" });
        }

        if self.debug_visible {
            self.cursor_label = cursor_label(input.cursor());
        }

        self.state.frame_counter += 1;
    }

    /// Step the sheet and build this frame's draw command.
    pub fn render(&mut self, cursor: Vec2) -> DrawCommand {
        let s = &mut self.state;
        let mut row_advanced = false;

        // Counter resets to ticks_per_frame, not zero: a draw
        // with no tick in between advances again.
        if s.frame_counter % u64::from(s.ticks_per_frame) == 0 {
            s.column += 1;
            s.frame_counter = u64::from(s.ticks_per_frame);
        }
        if s.column > COLS {
            s.column = 1;
            s.row += 1;
            row_advanced = true;
        }
        if s.row > ROWS {
            s.row = 1;
            s.scale = BASE_SCALE;
        }

        let source = SourceRect::for_cell(s.column, s.row);
        let (x, y) = (cursor.x as i64, cursor.y as i64);
        let translate = match self.anchor {
            AnchorMode::Truncated => {
                let k = s.scale.trunc() as i64;
                Vec2::new(
                    (x - i64::from(FRAME_WIDTH) * k) as f32,
                    (y - i64::from(FRAME_HEIGHT) * k) as f32,
                )
            }
            AnchorMode::Fractional => Vec2::new(
                (x as f64 - f64::from(FRAME_WIDTH) * s.scale) as f32,
                (y as f64 - f64::from(FRAME_HEIGHT) * s.scale) as f32,
            ),
        };
        let scale = s.scale as f32;
        s.scale -= SCALE_STEP;

        DrawCommand {
            character: self.character,
            source,
            scale,
            translate,
            row_advanced,
        }
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn character(&self) -> Character {
        self.character
    }

    pub fn debug_visible(&self) -> bool {
        self.debug_visible
    }

    /// `X:<x>,Y:<y>` as of the last tick with the overlay on.
    pub fn cursor_label(&self) -> &str {
        &self.cursor_label
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new(Bindings::default(), AnchorMode::default(), DEFAULT_TICKS_PER_FRAME)
    }
}

fn cursor_label(cursor: Vec2) -> String {
    format!("X:{},Y:{}", cursor.x as i32, cursor.y as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    fn tap(ctrl: &mut AnimationController, input: &mut InputState, key: Key) {
        input.key_down(key);
        input.advance_tick();
        ctrl.tick(input);
        input.key_up(key);
        input.advance_tick();
        ctrl.tick(input);
    }

    fn idle_tick(ctrl: &mut AnimationController, input: &mut InputState) {
        input.advance_tick();
        ctrl.tick(input);
    }

    #[test]
    fn speed_up_clamps_at_one() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        assert_eq!(ctrl.state().ticks_per_frame, 6);
        for _ in 0..10 {
            tap(&mut ctrl, &mut input, Key::Right);
            assert!(ctrl.state().ticks_per_frame >= MIN_TICKS_PER_FRAME);
        }
        assert_eq!(ctrl.state().ticks_per_frame, 1);
    }

    #[test]
    fn slow_down_clamps_at_eight() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        for _ in 0..10 {
            tap(&mut ctrl, &mut input, Key::Left);
            assert!(ctrl.state().ticks_per_frame <= MAX_TICKS_PER_FRAME);
        }
        assert_eq!(ctrl.state().ticks_per_frame, 8);
    }

    #[test]
    fn holding_speed_up_only_counts_once() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        input.key_down(Key::Right);
        for _ in 0..20 {
            idle_tick(&mut ctrl, &mut input);
        }
        assert_eq!(ctrl.state().ticks_per_frame, 5);
    }

    #[test]
    fn initial_speed_is_clamped() {
        let ctrl = AnimationController::new(Bindings::default(), AnchorMode::Truncated, 40);
        assert_eq!(ctrl.state().ticks_per_frame, MAX_TICKS_PER_FRAME);
        let ctrl = AnimationController::new(Bindings::default(), AnchorMode::Truncated, 0);
        assert_eq!(ctrl.state().ticks_per_frame, MIN_TICKS_PER_FRAME);
    }

    #[test]
    fn switching_character_twice_restores_it() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        assert_eq!(ctrl.character(), Character::Ame);
        tap(&mut ctrl, &mut input, Key::Space);
        assert_eq!(ctrl.character(), Character::Kfc);
        tap(&mut ctrl, &mut input, Key::Space);
        assert_eq!(ctrl.character(), Character::Ame);
    }

    #[test]
    fn first_matching_control_wins() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.key_down(Key::Space);
        idle_tick(&mut ctrl, &mut input);
        assert_eq!(ctrl.state().ticks_per_frame, 5);
        assert_eq!(ctrl.character(), Character::Ame);
    }

    #[test]
    fn debug_toggles_once_on_the_thirtieth_tick() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        input.key_down(Key::F4);
        for _ in 1..DEBUG_HOLD_TICKS {
            idle_tick(&mut ctrl, &mut input);
            assert!(!ctrl.debug_visible());
        }
        idle_tick(&mut ctrl, &mut input);
        assert!(ctrl.debug_visible());
        for _ in 0..100 {
            idle_tick(&mut ctrl, &mut input);
        }
        assert!(ctrl.debug_visible());

        input.key_up(Key::F4);
        idle_tick(&mut ctrl, &mut input);
        input.key_down(Key::F4);
        for _ in 0..DEBUG_HOLD_TICKS {
            idle_tick(&mut ctrl, &mut input);
        }
        assert!(!ctrl.debug_visible());
    }

    #[test]
    fn short_debug_hold_does_nothing() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        input.key_down(Key::F4);
        for _ in 0..29 {
            idle_tick(&mut ctrl, &mut input);
        }
        input.key_up(Key::F4);
        for _ in 0..10 {
            idle_tick(&mut ctrl, &mut input);
        }
        assert!(!ctrl.debug_visible());
    }

    #[test]
    fn cursor_label_tracks_only_while_debug_is_on() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        input.set_cursor(Vec2::new(12.7, 34.2));
        idle_tick(&mut ctrl, &mut input);
        assert_eq!(ctrl.cursor_label(), "");

        input.key_down(Key::F4);
        for _ in 0..DEBUG_HOLD_TICKS {
            idle_tick(&mut ctrl, &mut input);
        }
        assert_eq!(ctrl.cursor_label(), "X:12,Y:34");

        input.set_cursor(Vec2::new(100.0, 200.0));
        idle_tick(&mut ctrl, &mut input);
        assert_eq!(ctrl.cursor_label(), "X:100,Y:200");
    }

    #[test]
    fn column_advances_every_ticks_per_frame() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        let mut columns = Vec::new();
        for _ in 0..18 {
            idle_tick(&mut ctrl, &mut input);
            columns.push(ctrl.render(Vec2::ZERO).source.left / FRAME_WIDTH + 1);
        }
        // Counter hits 6 on the 6th tick, then 12 six ticks later, and so on.
        assert_eq!(&columns[..5], &[1, 1, 1, 1, 1]);
        assert_eq!(columns[5], 2);
        assert_eq!(columns[10], 2);
        assert_eq!(columns[11], 3);
        assert_eq!(columns[17], 4);
    }

    #[test]
    fn draw_without_tick_advances_again() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        for _ in 0..6 {
            idle_tick(&mut ctrl, &mut input);
        }
        ctrl.render(Vec2::ZERO);
        assert_eq!(ctrl.state().column, 2);
        ctrl.render(Vec2::ZERO);
        assert_eq!(ctrl.state().column, 3);
    }

    #[test]
    fn wrap_at_last_cell_resets_row_and_scale() {
        let mut ctrl = AnimationController::default();
        ctrl.state = AnimationState {
            column: 6,
            row: 4,
            ticks_per_frame: 6,
            frame_counter: 12,
            scale: 0.4,
        };
        let cmd = ctrl.render(Vec2::new(10.0, 20.0));
        assert_eq!(ctrl.state().column, 1);
        assert_eq!(ctrl.state().row, 1);
        assert!(cmd.row_advanced);
        assert_eq!(cmd.source, SourceRect::for_cell(1, 1));
        assert!((cmd.scale - 0.8).abs() < 1e-6);
        assert!((ctrl.state().scale - (BASE_SCALE - SCALE_STEP)).abs() < 1e-12);
    }

    #[test]
    fn column_wrap_moves_to_next_row() {
        let mut ctrl = AnimationController::default();
        ctrl.state.column = 6;
        ctrl.state.row = 2;
        ctrl.state.frame_counter = 6;
        let cmd = ctrl.render(Vec2::ZERO);
        assert!(cmd.row_advanced);
        assert_eq!((ctrl.state().column, ctrl.state().row), (1, 3));
        assert_eq!(cmd.source, SourceRect::for_cell(1, 3));
    }

    #[test]
    fn grid_bounds_hold_over_a_long_run() {
        let mut ctrl = AnimationController::default();
        let mut input = InputState::new();
        tap(&mut ctrl, &mut input, Key::Right);
        tap(&mut ctrl, &mut input, Key::Right);
        let mut wraps = 0;
        for i in 0..5000 {
            idle_tick(&mut ctrl, &mut input);
            let before = ctrl.state().scale;
            let cmd = ctrl.render(Vec2::ZERO);
            let s = ctrl.state();
            assert!((1..=COLS).contains(&s.column), "column {} at {i}", s.column);
            assert!((1..=ROWS).contains(&s.row), "row {} at {i}", s.row);
            if cmd.source == SourceRect::for_cell(1, 1) && cmd.row_advanced {
                wraps += 1;
            } else {
                assert!((f64::from(cmd.scale) - before).abs() < 1e-6);
            }
        }
        assert!(wraps > 0);
    }

    #[test]
    fn scale_shrinks_by_a_fixed_step_per_draw() {
        let mut ctrl = AnimationController::default();
        let mut prev = ctrl.render(Vec2::ZERO).scale;
        for _ in 0..10 {
            let next = ctrl.render(Vec2::ZERO).scale;
            assert!(next < prev);
            assert!((f64::from(prev - next) - SCALE_STEP).abs() < 1e-5);
            prev = next;
        }
    }

    #[test]
    fn truncated_anchor_puts_top_left_on_cursor() {
        let mut ctrl = AnimationController::default();
        let cmd = ctrl.render(Vec2::new(300.9, 200.2));
        assert_eq!(cmd.translate, Vec2::new(300.0, 200.0));

        ctrl.state.scale = 1.5;
        let cmd = ctrl.render(Vec2::new(1000.0, 800.0));
        assert_eq!(cmd.translate, Vec2::new(250.0, 80.0));
    }

    #[test]
    fn fractional_anchor_puts_bottom_right_on_cursor() {
        let mut ctrl = AnimationController::new(Bindings::default(), AnchorMode::Fractional, 6);
        let cmd = ctrl.render(Vec2::new(640.0, 600.0));
        assert!((cmd.translate.x - (640.0 - 750.0 * 0.8)).abs() < 1e-3);
        assert!((cmd.translate.y - (600.0 - 720.0 * 0.8)).abs() < 1e-3);
        let corner = cmd
            .transform()
            .transform_point2(Vec2::new(FRAME_WIDTH as f32, FRAME_HEIGHT as f32));
        assert!((corner - Vec2::new(640.0, 600.0)).length() < 1e-2);
    }

    #[test]
    fn transform_scales_then_translates() {
        let cmd = DrawCommand {
            character: Character::Ame,
            source: SourceRect::for_cell(1, 1),
            scale: 0.5,
            translate: Vec2::new(10.0, 20.0),
            row_advanced: false,
        };
        let p = cmd.transform().transform_point2(Vec2::new(100.0, 40.0));
        assert_eq!(p, Vec2::new(60.0, 40.0));
    }
}
