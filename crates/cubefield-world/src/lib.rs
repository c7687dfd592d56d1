//! The chunk grid: coordinate mapping, edits, light scheduling, and the
//! per-frame mesh/draw passes.
#![forbid(unsafe_code)]

use cubefield_blocks::{Block, BlockType};
use cubefield_chunk::{
    CHUNK_SIZE, CHUNK_SIZE_I32, Chunk, ChunkNeighbors, MeshBackend, build_chunk_mesh,
};
use cubefield_geom::{Aabb, Face, Vec3};
use cubefield_lighting::{
    LightNode, LightQueueFull, LightVolume, PropagationStats, propagate, seed_emitter,
};

pub mod config;
mod coord;
pub mod raycast;
pub mod worldgen;

pub use config::{
    MAX_WORLD_SIZE, TerrainConfig, TerrainMode, WorldConfig, load_config_from_path,
};
pub use coord::{ChunkCoord, LocalCoord, split_voxel};
pub use raycast::{MAX_RAY_DISTANCE, RayHit, raycast_first_hit};
pub use worldgen::TerrainGen;

/// Outcome of one light fixpoint run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightPassStats {
    pub passes: usize,
    pub chunks_updated: usize,
    /// False when the pass cap was hit with border work still pending.
    pub converged: bool,
    pub propagation: PropagationStats,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldUpdateStats {
    pub relit: bool,
    pub light: LightPassStats,
    pub meshes_rebuilt: usize,
    pub mesh_failures: usize,
}

pub struct World {
    config: WorldConfig,
    size_x: i32,
    size_y: i32,
    size_z: i32,
    chunks: Vec<Chunk>,
    needs_relight: bool,
    // off while a relight recomputes everything; dirtiness is diffed afterwards
    track_light_dirty: bool,
}

impl World {
    /// Builds the chunk grid, fills terrain and places configured lights.
    /// Light is computed on the first [`World::update`] (or an explicit [`World::relight`]).
    /// Each axis is clamped to `1..=MAX_WORLD_SIZE` chunks.
    pub fn new(config: WorldConfig) -> Self {
        let clamp = |n: i32| n.clamp(1, MAX_WORLD_SIZE);
        let (size_x, size_y, size_z) = (
            clamp(config.size_x),
            clamp(config.size_y),
            clamp(config.size_z),
        );
        if (size_x, size_y, size_z) != (config.size_x, config.size_y, config.size_z) {
            log::warn!(
                "world size {}x{}x{} clamped to {}x{}x{}",
                config.size_x,
                config.size_y,
                config.size_z,
                size_x,
                size_y,
                size_z
            );
        }
        let terrain = TerrainGen::new(&config.terrain, config.seed);
        let count = (size_x * size_y * size_z) as usize;
        let mut chunks = Vec::with_capacity(count);
        for cx in 0..size_x {
            for cy in 0..size_y {
                for cz in 0..size_z {
                    let (ox, oy, oz) = ChunkCoord::new(cx, cy, cz).origin_voxel();
                    chunks.push(Chunk::from_fn(|x, y, z| {
                        terrain.block_at(ox + x as i32, oy + y as i32, oz + z as i32)
                    }));
                }
            }
        }
        let mut world = Self {
            config,
            size_x,
            size_y,
            size_z,
            chunks,
            needs_relight: true,
            track_light_dirty: true,
        };
        let lights = world.config.lights.clone();
        for [x, y, z] in lights {
            if !world.set_block(x, y, z, BlockType::Light)
                && world.world_to_chunk(x, y, z).is_none()
            {
                log::warn!("configured light ({}, {}, {}) is outside the world", x, y, z);
            }
        }
        log::info!(
            "world {}x{}x{} chunks ({} voxels), terrain {:?}, {} lights",
            size_x,
            size_y,
            size_z,
            count * CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE,
            world.config.terrain.mode,
            world.config.lights.len()
        );
        world
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Grid size in chunks.
    #[inline]
    pub fn size_chunks(&self) -> (i32, i32, i32) {
        (self.size_x, self.size_y, self.size_z)
    }

    /// Grid size in voxels.
    #[inline]
    pub fn size_voxels(&self) -> (i32, i32, i32) {
        (
            self.size_x * CHUNK_SIZE_I32,
            self.size_y * CHUNK_SIZE_I32,
            self.size_z * CHUNK_SIZE_I32,
        )
    }

    #[inline]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn needs_relight(&self) -> bool {
        self.needs_relight
    }

    #[inline]
    pub fn contains_chunk(&self, c: ChunkCoord) -> bool {
        (0..self.size_x).contains(&c.cx)
            && (0..self.size_y).contains(&c.cy)
            && (0..self.size_z).contains(&c.cz)
    }

    /// Flat index `(cx*size_y + cy)*size_z + cz`.
    #[inline]
    pub fn chunk_index(&self, c: ChunkCoord) -> Option<usize> {
        if !self.contains_chunk(c) {
            return None;
        }
        Some(((c.cx * self.size_y + c.cy) * self.size_z + c.cz) as usize)
    }

    #[inline]
    pub fn chunk_coord_of(&self, index: usize) -> ChunkCoord {
        let i = index as i32;
        let cz = i % self.size_z;
        let cy = (i / self.size_z) % self.size_y;
        let cx = i / (self.size_z * self.size_y);
        ChunkCoord::new(cx, cy, cz)
    }

    #[inline]
    pub fn chunk(&self, c: ChunkCoord) -> Option<&Chunk> {
        self.chunk_index(c).map(|i| &self.chunks[i])
    }

    #[inline]
    pub fn chunk_mut(&mut self, c: ChunkCoord) -> Option<&mut Chunk> {
        self.chunk_index(c).map(move |i| &mut self.chunks[i])
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkCoord, &Chunk)> + '_ {
        self.chunks
            .iter()
            .enumerate()
            .map(move |(i, c)| (self.chunk_coord_of(i), c))
    }

    /// Chunk and local coordinate of a world voxel; `None` outside the world.
    #[inline]
    pub fn world_to_chunk(&self, x: i32, y: i32, z: i32) -> Option<(ChunkCoord, LocalCoord)> {
        let (c, l) = split_voxel(x, y, z);
        self.contains_chunk(c).then_some((c, l))
    }

    #[inline]
    fn locate(&self, x: i32, y: i32, z: i32) -> Option<(usize, LocalCoord)> {
        let (c, l) = self.world_to_chunk(x, y, z)?;
        self.chunk_index(c).map(|i| (i, l))
    }

    /// Voxel at a world coordinate; air outside the world.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        match self.locate(x, y, z) {
            Some((i, l)) => self.chunks[i].get_block(l.lx, l.ly, l.lz),
            None => Block::AIR,
        }
    }

    #[inline]
    pub fn block_type(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.get_block(x, y, z).block_type
    }

    #[inline]
    pub fn light_level(&self, x: i32, y: i32, z: i32) -> u8 {
        self.get_block(x, y, z).light
    }

    /// Places a block. Marks the owning chunk and every chunk sharing the
    /// voxel's faces dirty and schedules a relight. No-op outside the world.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, t: BlockType) -> bool {
        let Some((i, l)) = self.locate(x, y, z) else {
            return false;
        };
        if !self.chunks[i].set_block(l.lx, l.ly, l.lz, t) {
            return false;
        }
        self.mark_dirty_around(x, y, z);
        self.needs_relight = true;
        true
    }

    /// Dirties the voxel's chunk plus any chunk across one of its faces.
    fn mark_dirty_around(&mut self, x: i32, y: i32, z: i32) {
        let Some((home, _)) = self.locate(x, y, z) else {
            return;
        };
        self.chunks[home].dirty = true;
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            if let Some((i, _)) = self.locate(x + dx, y + dy, z + dz) {
                if i != home {
                    self.chunks[i].dirty = true;
                }
            }
        }
    }

    /// Chunk across `face` of `c`, if it exists.
    pub fn neighbor(&self, c: ChunkCoord, face: Face) -> Option<&Chunk> {
        let (dx, dy, dz) = face.delta();
        self.chunk(c.offset(dx, dy, dz))
    }

    pub fn neighbors(&self, c: ChunkCoord) -> ChunkNeighbors<'_> {
        let mut out = ChunkNeighbors::none();
        for face in Face::ALL {
            if let Some(n) = self.neighbor(c, face) {
                out = out.with(face, n);
            }
        }
        out
    }

    /// World-space box covered by a chunk's voxels.
    pub fn chunk_aabb(&self, c: ChunkCoord) -> Aabb {
        let (ox, oy, oz) = c.origin_voxel();
        let min = Vec3::new(ox as f32 - 0.5, oy as f32 - 0.5, oz as f32 - 0.5);
        Aabb::new(min, min + Vec3::splat(CHUNK_SIZE as f32))
    }

    /// Queues every emitting voxel in its chunk's light queue.
    pub fn seed_lights(&mut self) -> usize {
        let mut seeded = 0;
        for i in 0..self.chunks.len() {
            let emitters: Vec<_> = self.chunks[i].emitters().collect();
            if emitters.is_empty() {
                continue;
            }
            let (ox, oy, oz) = self.chunk_coord_of(i).origin_voxel();
            let mut queue = std::mem::take(&mut self.chunks[i].queue);
            for (x, y, z) in emitters {
                let (wx, wy, wz) = (ox + x as i32, oy + y as i32, oz + z as i32);
                match seed_emitter(self, &mut queue, wx, wy, wz) {
                    Ok(true) => seeded += 1,
                    Ok(false) => {}
                    Err(e) => log::warn!("light seed ({}, {}, {}) dropped: {}", wx, wy, wz, e),
                }
            }
            self.chunks[i].queue = queue;
        }
        seeded
    }

    #[inline]
    fn has_light_work(&self, i: usize) -> bool {
        let c = &self.chunks[i];
        c.active || !c.queue.is_empty() || !c.border.is_empty()
    }

    /// One light pass over a chunk: pull relayed border nodes into the
    /// active queue, then drain it.
    pub fn update_chunk_light(&mut self, index: usize) -> PropagationStats {
        let mut stats = PropagationStats::default();
        if index >= self.chunks.len() {
            return stats;
        }
        let mut queue = std::mem::take(&mut self.chunks[index].queue);
        let mut border = std::mem::take(&mut self.chunks[index].border);
        if let Err(e) = queue.append(&mut border) {
            stats.dropped += border.len();
            log::warn!(
                "chunk {:?}: {} border light nodes dropped: {}",
                self.chunk_coord_of(index),
                border.len(),
                e
            );
            border.clear();
        }
        self.chunks[index].border = border;
        self.chunks[index].active = false;
        stats.merge(propagate(self, index, &mut queue));
        self.chunks[index].queue = queue;
        stats
    }

    /// Repeats light passes until no chunk has pending work or the pass cap
    /// is reached. Work left over at the cap stays queued for the next frame.
    pub fn update_lighting(&mut self) -> LightPassStats {
        let mut out = LightPassStats::default();
        while out.passes < self.config.max_light_passes {
            let mut did_work = false;
            for i in 0..self.chunks.len() {
                if !self.has_light_work(i) {
                    continue;
                }
                did_work = true;
                out.chunks_updated += 1;
                let stats = self.update_chunk_light(i);
                out.propagation.merge(stats);
            }
            if !did_work {
                out.converged = true;
                break;
            }
            out.passes += 1;
        }
        if !out.converged {
            out.converged = (0..self.chunks.len()).all(|i| !self.has_light_work(i));
        }
        if out.converged {
            log::debug!(
                "light converged in {} passes ({} chunk updates, {} raised, {} relayed)",
                out.passes,
                out.chunks_updated,
                out.propagation.raised,
                out.propagation.relayed
            );
        } else {
            log::warn!(
                "light did not converge within {} passes; continuing next frame",
                self.config.max_light_passes
            );
        }
        out
    }

    /// Recomputes all light from scratch and dirties exactly the chunks whose
    /// meshes see a changed level.
    pub fn relight(&mut self) -> LightPassStats {
        let before: Vec<Vec<u8>> = self
            .chunks
            .iter()
            .map(|c| c.blocks().iter().map(|b| b.light).collect())
            .collect();
        for c in &mut self.chunks {
            c.clear_light();
        }
        self.needs_relight = false;
        self.track_light_dirty = false;
        let seeded = self.seed_lights();
        let stats = self.update_lighting();
        self.track_light_dirty = true;

        for i in 0..self.chunks.len() {
            let (ox, oy, oz) = self.chunk_coord_of(i).origin_voxel();
            let changed: Vec<usize> = self.chunks[i]
                .blocks()
                .iter()
                .zip(&before[i])
                .enumerate()
                .filter(|(_, (b, old))| b.light != **old)
                .map(|(j, _)| j)
                .collect();
            for j in changed {
                let x = (j / (CHUNK_SIZE * CHUNK_SIZE)) as i32;
                let y = ((j / CHUNK_SIZE) % CHUNK_SIZE) as i32;
                let z = (j % CHUNK_SIZE) as i32;
                self.mark_dirty_around(ox + x, oy + y, oz + z);
            }
        }
        log::debug!("relight: {} emitters, {} passes", seeded, stats.passes);
        stats
    }

    /// Brings light up to date and rebuilds every dirty chunk mesh.
    /// A chunk whose mesh fails to build keeps its old mesh and stays dirty.
    pub fn update(&mut self, backend: &mut dyn MeshBackend) -> WorldUpdateStats {
        let mut stats = WorldUpdateStats::default();
        if self.needs_relight {
            stats.relit = true;
            stats.light = self.relight();
        } else if (0..self.chunks.len()).any(|i| self.has_light_work(i)) {
            stats.light = self.update_lighting();
        }

        for i in 0..self.chunks.len() {
            if !self.chunks[i].dirty {
                continue;
            }
            let coord = self.chunk_coord_of(i);
            let built = build_chunk_mesh(&self.chunks[i], &self.neighbors(coord));
            match built {
                Ok(mesh) => {
                    log::debug!(
                        "chunk {:?}: rebuilt mesh ({} faces)",
                        coord,
                        mesh.face_count()
                    );
                    self.chunks[i].apply_mesh(mesh, backend);
                    stats.meshes_rebuilt += 1;
                }
                Err(e) => {
                    log::warn!("chunk {:?}: mesh rebuild failed: {}", coord, e);
                    stats.mesh_failures += 1;
                }
            }
        }
        stats
    }

    /// Culls every chunk with `is_visible` and draws the visible ones.
    /// Dirty chunks are skipped until their mesh is rebuilt.
    pub fn draw(
        &mut self,
        backend: &mut dyn MeshBackend,
        is_visible: impl Fn(&Aabb) -> bool,
    ) -> usize {
        let mut drawn = 0;
        for i in 0..self.chunks.len() {
            let coord = self.chunk_coord_of(i);
            let aabb = self.chunk_aabb(coord);
            let (ox, oy, oz) = coord.origin_voxel();
            let chunk = &mut self.chunks[i];
            chunk.visible = is_visible(&aabb);
            if !chunk.visible || chunk.dirty {
                continue;
            }
            if chunk.draw(backend, Vec3::new(ox as f32, oy as f32, oz as f32)) {
                drawn += 1;
            }
        }
        drawn
    }

    /// Releases every chunk's backend buffers.
    pub fn unload(&mut self, backend: &mut dyn MeshBackend) {
        for c in &mut self.chunks {
            c.unload(backend);
        }
        log::info!("world unloaded ({} chunks)", self.chunks.len());
    }

    /// First solid voxel along a ray.
    pub fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<RayHit> {
        raycast_first_hit(origin, dir, max_dist, |x, y, z| {
            self.block_type(x, y, z).is_solid()
        })
    }
}

impl LightVolume for World {
    type Region = usize;

    fn region_of(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        self.locate(x, y, z).map(|(i, _)| i)
    }

    fn block(&self, x: i32, y: i32, z: i32) -> Block {
        self.get_block(x, y, z)
    }

    fn set_light(&mut self, x: i32, y: i32, z: i32, level: u8) {
        let Some((i, l)) = self.locate(x, y, z) else {
            return;
        };
        if self.chunks[i].set_light(l.lx, l.ly, l.lz, level) && self.track_light_dirty {
            self.mark_dirty_around(x, y, z);
        }
    }

    fn relay(&mut self, region: usize, node: LightNode) -> Result<(), LightQueueFull> {
        let chunk = &mut self.chunks[region];
        chunk.active = true;
        chunk.border.push(node)
    }
}
