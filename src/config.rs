//! Viewer configuration
//!
//! Read once at startup from JSON. Resolution order:
//! - `$BEVYORBITS_CONFIG` if set
//! - `<platform config dir>/bevyorbits/config.json` if present
//! - built-in defaults
//!
//! Missing fields fall back to their defaults, so a config file only needs the
//! keys it wants to override.

use bevy::prelude::*;
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "BEVYORBITS_CONFIG";

#[derive(Resource, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Local catalog file, used when `catalog_url` is unset.
    pub catalog_path: PathBuf,
    /// Remote catalog; downloaded in the background and cached on disk.
    pub catalog_url: Option<String>,
    pub cache_expiration_days: i64,
    /// Globe radius in scene units.
    pub globe_radius: f32,
    pub initial_camera_distance: f32,
    pub time_scale: f32,
    pub scale: SceneScaleConfig,
    pub picking: PickingConfig,
    pub camera: CameraConfig,
    pub orbit_path_points: usize,
    /// Catalog query (id or name) to select once positions arrive.
    pub select_on_start: Option<String>,
    /// File this config was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("assets/catalog.json"),
            catalog_url: None,
            cache_expiration_days: 1,
            globe_radius: 100.0,
            initial_camera_distance: 800.0,
            time_scale: 1.0,
            scale: SceneScaleConfig::default(),
            picking: PickingConfig::default(),
            camera: CameraConfig::default(),
            orbit_path_points: 100,
            select_on_start: None,
            source: None,
        }
    }
}

/// Instance size as a function of camera distance.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SceneScaleConfig {
    pub reference_distance: f32,
    pub radius_at_reference: f32,
    pub min: f32,
    pub max: f32,
    pub epsilon: f32,
}

impl Default for SceneScaleConfig {
    fn default() -> Self {
        Self {
            reference_distance: 800.0,
            radius_at_reference: 0.6,
            min: 0.2,
            max: 1.5,
            epsilon: 1e-4,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub reference_distance: f32,
    /// Pick radius (scene units) when the camera sits at `reference_distance`.
    pub radius_at_reference: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            reference_distance: 800.0,
            radius_at_reference: 4.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Height above the tracked object for nadir framing, scene units.
    pub nadir_offset: f32,
    /// Height above the tracked object when a selection is first framed.
    pub select_offset: f32,
    pub nadir_lerp: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            nadir_offset: 50.0,
            select_offset: 80.0,
            nadir_lerp: 0.1,
        }
    }
}

impl ViewerConfig {
    /// Load from an explicit file.
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let contents = fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the config file (env var, then platform dir) and load it,
    /// falling back to defaults when none exists or it fails to parse.
    ///
    /// Runs before the log subscriber exists, so a parse failure is returned
    /// alongside the defaults for the caller to report.
    pub fn load() -> (Self, Option<String>) {
        let Some(path) = Self::resolve_path() else {
            return (Self::default(), None);
        };
        match Self::from_file(&path) {
            Ok(mut config) => {
                config.source = Some(path);
                (config, None)
            }
            Err(e) => (
                Self::default(),
                Some(format!("{} unusable ({}), using defaults", path.display(), e)),
            ),
        }
    }

    fn resolve_path() -> Option<PathBuf> {
        if let Ok(p) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(p));
        }
        let proj_dirs = ProjectDirs::from("", "", "bevyorbits")?;
        let path = proj_dirs.config_dir().join("config.json");
        path.exists().then_some(path)
    }
}
