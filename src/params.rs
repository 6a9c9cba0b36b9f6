/*
 * Banner Parameters Module
 *
 * This module defines the tunable constants of the banner: the star field
 * population and its pointer interaction, and the timing constants of the
 * 3D scene. Every field has a default so a config file only needs to
 * mention what it overrides.
 */

use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

// Environment variable that points at an alternative config file
pub const CONFIG_ENV: &str = "BANNER_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "banner.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BannerParams {
    pub particles: ParticleParams,
    pub scene: SceneParams,
}

// Star field settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    pub population: usize,
    pub palette: Vec<u32>,
    pub mouse_distance: f32,
    pub radius: f32,
    pub max_radius: f32,
    pub growth_step: f32,
    pub canvas_height: f32,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            population: 1200,
            palette: vec![
                0x4c1a22, 0x4c1a23, 0x5d6268, 0x1f2e37, 0x474848,
                0x542619, 0xead8cf, 0x4c241f, 0xd6b9b1, 0x964a47,
            ],
            mouse_distance: 50.0,
            radius: 0.5,
            max_radius: 1.5,
            growth_step: 1.0,
            canvas_height: 626.0,
        }
    }
}

// 3D scene settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    /// Side of the square logical viewport used both for the 3D surface and
    /// for pointer normalisation. Never follows window resizes.
    pub logical_viewport: f32,
    /// Milliseconds to hue-turns factor for the recolor sweep.
    pub hue_time_scale: f64,
    pub fly_time_scale: f64,
    pub wing_phase_step: f32,
    pub show_debug: bool,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            logical_viewport: 600.0,
            hue_time_scale: 0.00005,
            fly_time_scale: 0.0001,
            wing_phase_step: 0.5,
            show_debug: false,
        }
    }
}

impl BannerParams {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let params: BannerParams = toml::from_str(source)?;
        params.particles.validate()?;
        Ok(params)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    // Resolve the config file: env override first, then the working directory.
    // A missing default file is not an error, a missing override is.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            log::info!("Loading banner config from {path}");
            return Self::from_file(Path::new(&path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            log::info!("Loading banner config from {DEFAULT_CONFIG_FILE}");
            Self::from_file(default_path)
        } else {
            log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
            Ok(Self::default())
        }
    }

    // Ranges for the tuning sliders
    pub fn get_mouse_distance_range() -> std::ops::RangeInclusive<f32> {
        0.0..=300.0
    }

    pub fn get_max_radius_range() -> std::ops::RangeInclusive<f32> {
        0.5..=10.0
    }
}

impl ParticleParams {
    // Spawning draws from the palette and grows radii up to the maximum
    pub fn validate(&self) -> Result<()> {
        use crate::error::BannerError;

        if self.palette.is_empty() {
            return Err(BannerError::Config("particles.palette must not be empty".into()));
        }
        if self.max_radius < self.radius {
            return Err(BannerError::Config(format!(
                "particles.max_radius ({}) is smaller than particles.radius ({})",
                self.max_radius, self.radius
            )));
        }
        Ok(())
    }
}
