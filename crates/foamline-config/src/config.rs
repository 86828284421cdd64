//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Water surface appearance (the live-editable parameter surface).
    pub water: WaterConfig,
    /// Camera placement and clipping planes.
    pub camera: CameraConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Global scene fog.
    pub fog: FogConfig,
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

/// Water surface configuration.
///
/// Colors are `0xRRGGBB` sRGB integers; RON accepts hex literals, so
/// `foam_color: 0xffffff` is valid in a hand-edited file.
///
/// The colors and the threshold are re-read while running. The flow fields
/// are read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WaterConfig {
    /// Color blended in where the water meets geometry.
    pub foam_color: u32,
    /// Base color of open water.
    pub water_color: u32,
    /// Depth difference (view-space units) below which a fragment is foam.
    /// Clamped into `[0.1, 1.0]` when applied.
    pub threshold: f32,
    /// Scale of the flow-texture displacement added to the depth difference.
    /// Startup only.
    pub distortion_strength: f32,
    /// Scroll speed of the flow texture in UV units per second. Startup only.
    pub flow_speed: f32,
    /// Optional tileable distortion texture. A procedural pattern is used when unset.
    /// Startup only.
    pub flow_texture: Option<PathBuf>,
}

/// Camera configuration. Near and far are fixed for the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Eye position in world space.
    pub position: [f32; 3],
    /// Point the camera looks at.
    pub target: [f32; 3],
}

/// How scene depth reaches the water shader.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DepthPacking {
    /// Sample the hardware depth texture when the adapter supports it.
    #[default]
    Auto,
    /// Always pack depth into the capture target's color channels.
    Packed,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Depth source selection policy, applied once at startup.
    pub depth_packing: DepthPacking,
    /// Background clear color (`0xRRGGBB`, sRGB).
    pub background_color: u32,
}

/// Linear fog shared by the scene and the water surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FogConfig {
    /// Whether fog is applied.
    pub enabled: bool,
    /// Fog color (`0xRRGGBB`, sRGB).
    pub color: u32,
    /// Distance at which fog starts.
    pub near: f32,
    /// Distance at which fog is fully opaque.
    pub far: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Log frame statistics every N frames (0 = never).
    pub frame_stats_interval: u64,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Foamline".to_string(),
        }
    }
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            foam_color: 0xffffff,
            water_color: 0x14c6a5,
            threshold: 0.1,
            distortion_strength: 1.0,
            flow_speed: 0.05,
            flow_texture: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 70.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 7.0, 10.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            depth_packing: DepthPacking::Auto,
            background_color: 0x1e485e,
        }
    }
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            color: 0x1e485e,
            near: 10.0,
            far: 60.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            frame_stats_interval: 0,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(ConfigError::read(&config_path))?;
            let config: Config =
                ron::from_str(&contents).map_err(ConfigError::parse(&config_path))?;
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
        std::fs::create_dir_all(config_dir).map_err(ConfigError::write(config_dir))?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized = ron::ser::to_string_pretty(self, pretty)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::write(&config_path))?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents =
            std::fs::read_to_string(&config_path).map_err(ConfigError::read(&config_path))?;
        let new_config: Config =
            ron::from_str(&contents).map_err(ConfigError::parse(&config_path))?;

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
        assert!(ron_str.contains("threshold:"));
        assert!(ron_str.contains("depth_packing: Auto"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_hex_color_literals_parse() {
        let ron_str = "(water: (foam_color: 0xff0000, water_color: 0x0000ff))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.water.foam_color, 0xff0000);
        assert_eq!(config.water.water_color, 0x0000ff);
        // Unspecified water fields keep their defaults
        assert_eq!(config.water.threshold, WaterConfig::default().threshold);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), water: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.fog, FogConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_camera_matches_scene_framing() {
        let camera = CameraConfig::default();
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 100.0);
        assert_eq!(camera.position, [0.0, 7.0, 10.0]);
    }

    #[test]
    fn test_packed_depth_variant_parses() {
        let config: Config = ron::from_str("(render: (depth_packing: Packed))").unwrap();
        assert_eq!(config.render.depth_packing, DepthPacking::Packed);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.water.threshold = 0.4;
        config.water.flow_texture = Some(PathBuf::from("textures/dudv.png"));
        config.fog.enabled = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.water.foam_color = 0x00ff00;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().water.foam_color, 0x00ff00);
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

    #[test]
    fn test_reload_of_broken_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "(water: (threshold: ))").unwrap();

        let err = Config::default().reload(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Some(path.as_path()));
    }
}
