use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::cache::DEFAULT_LIMIT;
use crate::caster::MAX_RANGE;
use crate::camera::{
    CameraConfig, DEFAULT_FOCAL_LENGTH, DEFAULT_RANGE, DEFAULT_RESOLUTION, focal_length_for_fov,
};
use crate::environment::{DEFAULT_AMBIENT_LIGHT, DEFAULT_THUNDER_VOLUME, Rain, Thunder};
use crate::error::ConfigError;
use crate::grid::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::input::DEFAULT_MOUSE_SENSITIVITY;
use crate::player::{DEFAULT_HEALTH, DEFAULT_RUN_FACTOR, DEFAULT_SPEED};

/// Engine settings, read from TOML. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub window: WindowConfig,
    pub camera: CameraSection,
    pub caching: CachingConfig,
    pub map: MapConfig,
    pub player: PlayerConfig,
    pub environment: EnvironmentConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    /// Internal framebuffer height; width follows the window aspect.
    pub internal_height: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "gridcast".to_string(),
            width: 800.0,
            height: 600.0,
            internal_height: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSection {
    pub resolution: usize,
    pub focal_length: f64,
    pub range: f64,
    /// Horizontal field of view in degrees; replaces `focal_length` when set.
    pub fov: Option<f64>,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            focal_length: DEFAULT_FOCAL_LENGTH,
            range: DEFAULT_RANGE,
            fov: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CachingConfig {
    pub frame_memo: bool,
    pub ray_memo: bool,
    pub parallel: bool,
    pub limit: usize,
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            frame_memo: true,
            ray_memo: false,
            parallel: true,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub width: usize,
    pub height: usize,
    pub density: f64,
    pub seed: u64,
    /// Wall off the outer ring of cells.
    pub border: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            density: 0.3,
            seed: 0,
            border: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    pub x: f64,
    pub y: f64,
    pub direction: f64,
    pub speed: f64,
    pub run_factor: f64,
    pub health: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            x: 16.5,
            y: 16.5,
            direction: std::f64::consts::PI * 0.3,
            speed: DEFAULT_SPEED,
            run_factor: DEFAULT_RUN_FACTOR,
            health: DEFAULT_HEALTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub ambient_light: f64,
    pub rain_amount: Option<f64>,
    pub thunder_seed: Option<f64>,
    pub thunder_volume: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            ambient_light: DEFAULT_AMBIENT_LIGHT,
            rain_amount: None,
            thunder_seed: None,
            thunder_volume: DEFAULT_THUNDER_VOLUME,
        }
    }
}

impl EnvironmentConfig {
    pub fn rain(&self) -> Option<Rain> {
        self.rain_amount.map(|amount| Rain {
            amount,
            disabled: false,
        })
    }

    pub fn thunder(&self) -> Option<Thunder> {
        self.thunder_seed.map(|seed| Thunder {
            volume: self.thunder_volume,
            seed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub mouse_sensitivity: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            mouse_sensitivity: DEFAULT_MOUSE_SENSITIVITY,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution == 0 {
            return Err(invalid("camera.resolution", "must be at least 1"));
        }
        if !(self.camera.focal_length.is_finite() && self.camera.focal_length > 0.0) {
            return Err(invalid("camera.focal_length", "must be a positive number"));
        }
        if !(0.0..=MAX_RANGE).contains(&self.camera.range) {
            return Err(invalid("camera.range", format!("must lie in [0, {MAX_RANGE}]")));
        }
        if let Some(fov) = self.camera.fov {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(invalid("camera.fov", format!("{fov} is outside (0, 180)")));
            }
        }
        if self.map.width == 0 || self.map.height == 0 {
            return Err(invalid("map", "width and height must be positive"));
        }
        if !(0.0..=1.0).contains(&self.map.density) {
            return Err(invalid("map.density", "must lie in [0, 1]"));
        }
        if let Some(amount) = self.environment.rain_amount {
            if !(0.0..=100.0).contains(&amount) {
                return Err(invalid("environment.rain_amount", format!("{amount} is outside [0, 100]")));
            }
        }
        if !(self.environment.ambient_light > 0.0) {
            return Err(invalid("environment.ambient_light", "must be positive"));
        }
        if self.window.internal_height == 0 {
            return Err(invalid("window.internal_height", "must be at least 1"));
        }
        Ok(())
    }

    pub fn camera_config(&self) -> CameraConfig {
        let focal_length = self
            .camera
            .fov
            .map_or(self.camera.focal_length, focal_length_for_fov);
        CameraConfig {
            resolution: self.camera.resolution,
            focal_length,
            range: self.camera.range,
            frame_memo: self.caching.frame_memo,
            ray_memo: self.caching.ray_memo,
            parallel: self.caching.parallel,
            cache_limit: self.caching.limit,
        }
    }
}
