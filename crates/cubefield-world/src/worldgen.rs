use fastnoise_lite::{FastNoiseLite, NoiseType};

use cubefield_blocks::BlockType;

use crate::config::{TerrainConfig, TerrainMode};

/// Column-based terrain sampler for the flat and noise stubs.
pub struct TerrainGen {
    mode: TerrainMode,
    height: i32,
    amplitude: f32,
    noise: Option<FastNoiseLite>,
}

impl TerrainGen {
    pub fn new(cfg: &TerrainConfig, seed: i32) -> Self {
        let noise = (cfg.mode == TerrainMode::Noise).then(|| {
            let mut n = FastNoiseLite::with_seed(seed);
            n.set_noise_type(Some(NoiseType::OpenSimplex2));
            n.set_frequency(Some(cfg.frequency));
            n
        });
        Self {
            mode: cfg.mode,
            height: cfg.height,
            amplitude: cfg.amplitude,
            noise,
        }
    }

    /// Surface height of the column at `(x, z)`: voxels with `y < h` are solid.
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        match (self.mode, &self.noise) {
            (TerrainMode::Empty, _) => 0,
            (TerrainMode::Noise, Some(n)) => {
                let h = n.get_noise_2d(x as f32, z as f32);
                self.height + (h * self.amplitude).round() as i32
            }
            _ => self.height,
        }
    }

    #[inline]
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        Self::column_block(self.column_height(x, z), y)
    }

    /// Block at height `y` in a column whose surface is `h`.
    #[inline]
    pub fn column_block(h: i32, y: i32) -> BlockType {
        if y < h - 1 {
            BlockType::Stone
        } else if y == h - 1 {
            BlockType::Grass
        } else {
            BlockType::Air
        }
    }
}
