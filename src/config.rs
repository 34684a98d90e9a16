use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::input::Bindings;
use crate::sprite::animation::{
    AnchorMode, DEFAULT_TICKS_PER_FRAME, MAX_TICKS_PER_FRAME, MIN_TICKS_PER_FRAME,
};

/// Settings file looked up in the working directory.
const CONFIG_FILE: &str = "spacetoy.json";
/// Overrides the settings file path.
const CONFIG_ENV: &str = "SPACETOY_CONFIG";
/// Overrides `assets_dir`.
const ASSETS_ENV: &str = "SPACETOY_ASSETS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime settings. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding `font/`, `music/` and `images/`.
    pub assets_dir: PathBuf,
    /// Music volume, 0.0 (mute) to 1.0.
    pub music_volume: f32,
    /// Length of the looped music window in seconds.
    pub music_loop_secs: f64,
    pub anchor_mode: AnchorMode,
    pub initial_ticks_per_frame: u32,
    pub keys: Bindings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            music_volume: 1.0,
            // 32 * 44100 bytes of 16-bit stereo PCM.
            music_loop_secs: 8.0,
            anchor_mode: AnchorMode::Truncated,
            initial_ticks_per_frame: DEFAULT_TICKS_PER_FRAME,
            keys: Bindings::default(),
        }
    }
}

impl Config {
    /// Load from `$SPACETOY_CONFIG`, else `./spacetoy.json` if it exists,
    /// else defaults. `$SPACETOY_ASSETS` overrides the asset directory.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = explicit.or_else(|| {
            let p = PathBuf::from(CONFIG_FILE);
            p.exists().then_some(p)
        });
        let assets = std::env::var_os(ASSETS_ENV).map(PathBuf::from);
        Self::load_from(path.as_deref(), assets)
    }

    pub fn load_from(path: Option<&Path>, assets_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
                log::info!("Loaded config from {}", path.display());
                config
            }
            None => Self::default(),
        };

        if let Some(dir) = assets_override {
            config.assets_dir = dir;
        }
        config.sanitize();
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Clamp out-of-range values, warning about each one.
    fn sanitize(&mut self) {
        if !(0.0..=1.0).contains(&self.music_volume) {
            let v = if self.music_volume.is_nan() { 1.0 } else { self.music_volume.clamp(0.0, 1.0) };
            log::warn!("music_volume {} out of range, using {}", self.music_volume, v);
            self.music_volume = v;
        }
        if self.music_loop_secs.is_nan() || self.music_loop_secs < 1.0 {
            log::warn!("music_loop_secs {} too short, using 1.0", self.music_loop_secs);
            self.music_loop_secs = 1.0;
        }
        let tpf = self
            .initial_ticks_per_frame
            .clamp(MIN_TICKS_PER_FRAME, MAX_TICKS_PER_FRAME);
        if tpf != self.initial_ticks_per_frame {
            log::warn!(
                "initial_ticks_per_frame {} out of range, using {}",
                self.initial_ticks_per_frame,
                tpf
            );
            self.initial_ticks_per_frame = tpf;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    #[test]
    fn empty_object_is_default() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_override() {
        let config = Config::from_json(
            r#"{ "anchor_mode": "fractional", "keys": { "debug": "Escape" } }"#,
        )
        .unwrap();
        assert_eq!(config.anchor_mode, AnchorMode::Fractional);
        assert_eq!(config.keys.debug, Key::Escape);
        assert_eq!(config.keys.speed_up, Key::Right);
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(Config::from_json(r#"{ "window_title": "x" }"#).is_err());
        assert!(Config::from_json(r#"{ "keys": { "jump": "Space" } }"#).is_err());
    }

    #[test]
    fn sanitize_clamps() {
        let mut config = Config::from_json(
            r#"{ "music_volume": 3.0, "music_loop_secs": 0.0, "initial_ticks_per_frame": 20 }"#,
        )
        .unwrap();
        config.sanitize();
        assert_eq!(config.music_volume, 1.0);
        assert_eq!(config.music_loop_secs, 1.0);
        assert_eq!(config.initial_ticks_per_frame, MAX_TICKS_PER_FRAME);
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::load_from(None, None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn assets_override_wins() {
        let config = Config::load_from(None, Some(PathBuf::from("/tmp/space-assets"))).unwrap();
        assert_eq!(config.assets_dir, PathBuf::from("/tmp/space-assets"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load_from(Some(Path::new("/nonexistent/spacetoy.json")), None).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
