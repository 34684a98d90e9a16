//! Keyboard and cursor state, sampled once per fixed tick.
//!
//! Window events only record the raw up/down state. `advance_tick()` turns that
//! into per-key held durations, counted in ticks: a key pressed this tick has
//! duration 1, a key held for half a second has duration 30. A press that is
//! released before the next tick still counts as a one-tick press so fast taps
//! are never lost.

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::Deserialize;
use winit::keyboard::KeyCode;

/// Keys the toy reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Key {
    Left,
    Right,
    Space,
    F4,
    Escape,
}

impl Key {
    pub const ALL: [Key; 5] = [Key::Left, Key::Right, Key::Space, Key::F4, Key::Escape];

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::ArrowLeft => Some(Key::Left),
            KeyCode::ArrowRight => Some(Key::Right),
            KeyCode::Space => Some(Key::Space),
            KeyCode::F4 => Some(Key::F4),
            KeyCode::Escape => Some(Key::Escape),
            _ => None,
        }
    }
}

/// Which key drives which animation control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Bindings {
    pub speed_up: Key,
    pub slow_down: Key,
    pub switch_character: Key,
    pub debug: Key,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            speed_up: Key::Right,
            slow_down: Key::Left,
            switch_character: Key::Space,
            debug: Key::F4,
        }
    }
}

pub struct InputState {
    /// Physical state from window events.
    down: HashSet<Key>,
    /// Keys that went down since the last tick, even if already released.
    pressed_since_tick: HashSet<Key>,
    /// Consecutive ticks each key has been held.
    durations: HashMap<Key, u32>,
    /// Cursor in logical screen pixels.
    cursor: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            down: HashSet::new(),
            pressed_since_tick: HashSet::new(),
            durations: HashMap::new(),
            cursor: Vec2::ZERO,
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.down.insert(key) {
            self.pressed_since_tick.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.down.remove(&key);
    }

    pub fn set_cursor(&mut self, pos: Vec2) {
        self.cursor = pos;
    }

    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Sample the raw key state into held durations. Call once per tick,
    /// before anything queries the input.
    pub fn advance_tick(&mut self) {
        for key in Key::ALL {
            let active = self.down.contains(&key) || self.pressed_since_tick.contains(&key);
            let duration = self.durations.entry(key).or_insert(0);
            *duration = if active { duration.saturating_add(1) } else { 0 };
        }
        self.pressed_since_tick.clear();
    }

    /// Ticks `key` has been continuously held, including the current one.
    pub fn press_duration(&self, key: Key) -> u32 {
        self.durations.get(&key).copied().unwrap_or(0)
    }

    /// True only on the first tick of a press.
    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.press_duration(key) == 1
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.press_duration(key) > 0
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
