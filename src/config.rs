use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use cubefield_blocks::BlockType;
use cubefield_physics::PhysicsParams;
use cubefield_world::WorldConfig;

/// Everything the headless driver needs; an empty file is a valid config.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub physics: PhysicsParams,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default = "default_frames")]
    pub frames: u32,
    /// Simulated wall-clock time per rendered frame, in seconds.
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,
    /// Chunks farther than this from the eye are culled.
    #[serde(default = "default_view_distance")]
    pub view_distance: f32,
    #[serde(default)]
    pub edits: Vec<ScriptedEdit>,
}

fn default_frames() -> u32 {
    300
}
fn default_frame_dt() -> f32 {
    1.0 / 60.0
}
fn default_view_distance() -> f32 {
    64.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            physics: PhysicsParams::default(),
            player: PlayerConfig::default(),
            frames: default_frames(),
            frame_dt: default_frame_dt(),
            view_distance: default_view_distance(),
            edits: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PlayerConfig {
    #[serde(default = "default_spawn")]
    pub spawn: [f32; 3],
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_width")]
    pub depth: f32,
}

fn default_spawn() -> [f32; 3] {
    [8.0, 24.0, 8.0]
}
fn default_mass() -> f32 {
    70.0
}
fn default_width() -> f32 {
    0.6
}
fn default_height() -> f32 {
    1.8
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: default_spawn(),
            mass: default_mass(),
            width: default_width(),
            height: default_height(),
            depth: default_width(),
        }
    }
}

/// A block edit replayed on a given frame.
///
/// `at` edits a fixed world voxel. Otherwise `look` casts a ray from the
/// player: air breaks the voxel hit, anything else is placed in front of it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ScriptedEdit {
    pub frame: u32,
    pub block: BlockType,
    #[serde(default)]
    pub at: Option<[i32; 3]>,
    #[serde(default)]
    pub look: Option<[f32; 3]>,
    #[serde(default = "default_reach")]
    pub reach: f32,
}

fn default_reach() -> f32 {
    8.0
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        self.world.validate()?;
        if self.physics.timestep <= 0.0 || !self.physics.timestep.is_finite() {
            return Err("physics.timestep must be positive".into());
        }
        if self.frame_dt < 0.0 || !self.frame_dt.is_finite() {
            return Err("frame_dt must not be negative".into());
        }
        if self.player.mass <= 0.0 || !self.player.mass.is_finite() {
            return Err("player.mass must be positive".into());
        }
        for e in &self.edits {
            if e.at.is_none() && e.look.is_none() {
                return Err(format!("edit on frame {} needs `at` or `look`", e.frame).into());
            }
            if e.reach <= 0.0 || !e.reach.is_finite() {
                return Err(format!("edit on frame {}: reach must be positive", e.frame).into());
            }
        }
        Ok(())
    }
}

pub fn load_app_config(path: &Path) -> Result<AppConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&s)?;
    cfg.validate()?;
    Ok(cfg)
}
