//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "cubefield";
const CONFIG_FILE: &str = "config.ron";

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Cube field and animation settings.
    pub simulation: SimulationConfig,
    /// God rays, background and lighting settings.
    pub effects: EffectsConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Cube field and animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cubes baked into the shared vertex buffer.
    pub cube_count: u32,
    /// Seed for cube randomization. `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
    /// Animation age at startup, in seconds.
    pub initial_age: f32,
    /// Camera orbit speed in radians per second.
    pub rotation_speed: f32,
    /// Camera angle at startup. `None` picks a random angle.
    pub initial_camera_angle: Option<f32>,
}

/// Post-processing and lighting configuration.
///
/// Every field maps onto a named uniform or toggle and can be changed at
/// runtime by reloading the config file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    /// Render the volumetric light (god rays) post-process.
    pub god_rays_enabled: bool,
    /// Render the parallax background layer.
    pub background_enabled: bool,
    /// Color of the animated light disk and point light (RGB in 0..1).
    pub light_color: [f32; 3],
    /// Clear color of the main frame (RGB in 0..1).
    pub clear_color: [f32; 3],
    /// Blur tap spacing in target pixels.
    pub blur_radius_px: f32,
    /// Final multiplier applied to accumulated light streaks.
    pub exposure: f32,
    /// Per-sample illumination decay of the radial streak pass.
    pub decay: f32,
    /// Fraction of the pixel-to-light vector covered by the streak samples.
    pub density: f32,
    /// Weight of each streak sample.
    pub weight: f32,
    /// Upper clamp of the streak output.
    pub clamp: f32,
    /// Coefficient applied to streaks when combining with the scene.
    pub additive_coefficient: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Periodically log frame count and FPS.
    pub log_frame_stats: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Cubefield".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cube_count: 10_000,
            seed: None,
            initial_age: 60.0,
            rotation_speed: std::f32::consts::PI * 0.05,
            initial_camera_angle: None,
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            god_rays_enabled: true,
            background_enabled: true,
            light_color: [0.8, 0.6, 0.5],
            // 0x001B1B
            clear_color: [0.0, 27.0 / 255.0, 27.0 / 255.0],
            blur_radius_px: 3.0,
            exposure: 0.6,
            decay: 0.9,
            density: 0.8,
            weight: 0.75,
            clamp: 1.0,
            additive_coefficient: 1.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_frame_stats: false,
        }
    }
}

/// Resolve the platform configuration directory for the simulation.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join(APP_NAME))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("cube_count: 10000"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), simulation: (cube_count: 500))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.simulation.cube_count, 500);
        assert_eq!(config.effects, EffectsConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_effects_match_reference_values() {
        let effects = EffectsConfig::default();
        assert!(effects.god_rays_enabled);
        assert!(effects.background_enabled);
        assert_eq!(effects.light_color, [0.8, 0.6, 0.5]);
        assert_eq!(effects.exposure, 0.6);
        assert_eq!(effects.decay, 0.9);
        assert_eq!(effects.density, 0.8);
        assert_eq!(effects.weight, 0.75);
        assert_eq!(effects.blur_radius_px, 3.0);
        assert!((effects.clear_color[1] - 0.10588).abs() < 1e-4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.simulation.cube_count = 2500;
        config.simulation.seed = Some(7);
        config.effects.god_rays_enabled = false;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.effects.exposure = 0.9;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.effects.exposure), Some(0.9));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
