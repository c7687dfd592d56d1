use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WorldConfig {
    #[serde(default = "default_size")]
    pub size_x: i32,
    #[serde(default = "default_size")]
    pub size_y: i32,
    #[serde(default = "default_size")]
    pub size_z: i32,
    #[serde(default)]
    pub seed: i32,
    /// Light passes allowed per frame before the rest is deferred.
    #[serde(default = "default_max_light_passes")]
    pub max_light_passes: usize,
    #[serde(default)]
    pub terrain: TerrainConfig,
    /// World coordinates of light blocks placed after terrain.
    #[serde(default)]
    pub lights: Vec<[i32; 3]>,
}

/// Largest world edge, in chunks.
pub const MAX_WORLD_SIZE: i32 = 256;

fn default_size() -> i32 {
    3
}
fn default_max_light_passes() -> usize {
    64
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            size_x: default_size(),
            size_y: default_size(),
            size_z: default_size(),
            seed: 0,
            max_light_passes: default_max_light_passes(),
            terrain: TerrainConfig::default(),
            lights: Vec::new(),
        }
    }
}

impl WorldConfig {
    /// Empty world of the given size in chunks.
    pub fn with_size(size_x: i32, size_y: i32, size_z: i32) -> Self {
        Self {
            size_x,
            size_y,
            size_z,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.size_x < 1 || self.size_y < 1 || self.size_z < 1 {
            return Err(format!(
                "world size must be at least 1 chunk per axis, got {}x{}x{}",
                self.size_x, self.size_y, self.size_z
            )
            .into());
        }
        if self.size_x.max(self.size_y).max(self.size_z) > MAX_WORLD_SIZE {
            return Err(format!(
                "world size is capped at {} chunks per axis, got {}x{}x{}",
                MAX_WORLD_SIZE, self.size_x, self.size_y, self.size_z
            )
            .into());
        }
        if self.max_light_passes == 0 {
            return Err("max_light_passes must be positive".into());
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TerrainMode {
    #[default]
    Empty,
    Flat,
    Noise,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TerrainConfig {
    #[serde(default)]
    pub mode: TerrainMode,
    /// Ground surface height in voxels; the top solid layer is `height - 1`.
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    /// Maximum deviation of the noise surface from `height`.
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
}

fn default_height() -> i32 {
    4
}
fn default_frequency() -> f32 {
    0.05
}
fn default_amplitude() -> f32 {
    4.0
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            mode: TerrainMode::Empty,
            height: default_height(),
            frequency: default_frequency(),
            amplitude: default_amplitude(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<WorldConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: WorldConfig = toml::from_str(&s)?;
    cfg.validate()?;
    Ok(cfg)
}
