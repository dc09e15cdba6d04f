//! Tunables of the first person controller, loaded from `assets/controller.json`.

use std::{fmt, fs, io, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

pub const CONFIG_PATH: &str = "assets/controller.json";

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "could not read controller config: {err}"),
            ConfigError::Parse(err) => write!(f, "invalid controller config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Resource, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Hide and lock the cursor at startup. Off unless the config asks for it.
    pub lock_cursor: bool,
    pub camera: CameraConfig,
    pub movement: MovementConfig,
    pub sound: SoundConfig,
    pub wall_walk: WallWalkConfig,
    pub spherical: SphericalConfig,
    pub inside_sphere: InsideSphereConfig,
    pub spherical_world: SphericalWorldConfig,
    pub shooting: ShootingConfig,
}

impl ControllerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load the config at `path`, falling back to the defaults when it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded controller config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("{err}, using default controller config");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub mouse_sensitivity: f32,
    /// Lower values give sharper stops. 0.1 feels natural.
    pub rotation_smooth_time: f32,
    /// `[min, max]` tilt in degrees, positive looks down.
    pub tilt_range: [f32; 2],
    /// Pointer deltas with a larger magnitude are dropped for the frame.
    pub spurious_delta_threshold: f32,
    /// Converts raw mouse motion into pointer axis units.
    pub pointer_scale: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            mouse_sensitivity: 10.,
            rotation_smooth_time: 0.1,
            tilt_range: [-40., 40.],
            spurious_delta_threshold: 5.,
            pointer_scale: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub movement_smooth_time: f32,
    pub jump_force: f32,
    pub allow_jumping: bool,
    /// Use a single long ground probe, which keeps contact on steep ground.
    pub slopes: bool,
    pub gravity_force: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        MovementConfig {
            walk_speed: 5.,
            sprint_speed: 7.5,
            movement_smooth_time: 0.1,
            jump_force: 10.,
            allow_jumping: true,
            slopes: false,
            gravity_force: 20.,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    pub footstep_volume: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig {
            enabled: false,
            footstep_volume: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct WallWalkConfig {
    pub enabled: bool,
    pub gravity_rotation_speed: f32,
    pub detection_range: f32,
}

impl Default for WallWalkConfig {
    fn default() -> Self {
        WallWalkConfig {
            enabled: false,
            gravity_rotation_speed: 4.,
            detection_range: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SphericalConfig {
    pub enabled: bool,
    /// The body is a model standing on the planet surface rather than a point at its pole.
    pub is_model: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsideSphereConfig {
    pub enabled: bool,
    pub radius: f32,
}

impl Default for InsideSphereConfig {
    fn default() -> Self {
        InsideSphereConfig {
            enabled: false,
            radius: 5.,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SphericalWorldConfig {
    pub enabled: bool,
    pub x_axis: f32,
    pub y_axis: f32,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShootingConfig {
    pub enabled: bool,
    pub projectile_speed: f32,
}

impl Default for ShootingConfig {
    fn default() -> Self {
        ShootingConfig {
            enabled: false,
            projectile_speed: 20.,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ControllerConfig::from_json(
            r#"{ "movement": { "walk_speed": 4.0 }, "wall_walk": { "enabled": true } }"#,
        )
        .unwrap();
        assert_eq!(config.movement.walk_speed, 4.);
        assert_eq!(config.movement.sprint_speed, 7.5);
        assert!(config.wall_walk.enabled);
        assert_eq!(config.wall_walk.detection_range, 1.5);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ControllerConfig::from_json("{ movement: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        assert!(matches!(
            ControllerConfig::load("does/not/exist.json"),
            Err(ConfigError::Io(_))
        ));
        assert_eq!(
            ControllerConfig::load_or_default("does/not/exist.json"),
            ControllerConfig::default()
        );
    }

    #[test]
    fn cursor_stays_free_unless_asked() {
        assert!(!ControllerConfig::default().lock_cursor);
        assert!(!ControllerConfig::from_json("{}").unwrap().lock_cursor);
        assert!(ControllerConfig::from_json(r#"{ "lock_cursor": true }"#).unwrap().lock_cursor);
    }
}
