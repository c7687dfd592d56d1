//! Chunk voxel storage, per-chunk light queues, and CPU meshing.

use std::fmt;

use cubefield_blocks::{Block, BlockType};
use cubefield_geom::Vec3;
use cubefield_lighting::LightQueue;

pub mod backend;
pub mod mesh;

pub use backend::{HeadlessBackend, MeshBackend, MeshHandle, UploadedMesh};
pub use mesh::{
    ChunkMesh, ChunkNeighbors, MeshError, Vertex, build_chunk_mesh, build_chunk_mesh_into,
};

/// Voxels per chunk edge.
pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// A `CHUNK_SIZE^3` cube of voxels plus everything derived from it.
///
/// Voxels live in one contiguous allocation indexed x-major (see [`Chunk::index`]).
/// `queue` is the active light frontier; `border` collects nodes relayed in
/// from neighboring chunks until the next light pass drains them.
pub struct Chunk {
    blocks: Vec<Block>,
    pub queue: LightQueue,
    pub border: LightQueue,
    mesh: ChunkMesh,
    handle: Option<MeshHandle>,
    /// Mesh is stale and must be rebuilt before drawing.
    pub dirty: bool,
    /// Result of the last visibility test; recomputed every frame.
    pub visible: bool,
    /// Border light work is pending.
    pub active: bool,
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("non_air", &self.blocks.iter().filter(|b| !b.is_air()).count())
            .field("queued", &self.queue.len())
            .field("border", &self.border.len())
            .field("faces", &self.mesh.face_count())
            .field("handle", &self.handle)
            .field("dirty", &self.dirty)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .finish()
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    /// All-air chunk that still needs its first mesh.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::AIR; CHUNK_VOLUME],
            queue: LightQueue::new(),
            border: LightQueue::new(),
            mesh: ChunkMesh::new(),
            handle: None,
            dirty: true,
            visible: false,
            active: false,
        }
    }

    /// Builds a chunk by sampling `fill` at every local coordinate.
    pub fn from_fn(mut fill: impl FnMut(usize, usize, usize) -> BlockType) -> Self {
        let mut chunk = Self::new();
        for x in 0..CHUNK_SIZE {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    chunk.blocks[Self::index(x, y, z)] = Block::new(fill(x, y, z));
                }
            }
        }
        chunk
    }

    /// Flat index `x*S^2 + y*S + z`.
    #[inline]
    pub const fn index(x: usize, y: usize, z: usize) -> usize {
        (x * CHUNK_SIZE + y) * CHUNK_SIZE + z
    }

    #[inline]
    pub fn in_bounds(x: i32, y: i32, z: i32) -> bool {
        (0..CHUNK_SIZE_I32).contains(&x)
            && (0..CHUNK_SIZE_I32).contains(&y)
            && (0..CHUNK_SIZE_I32).contains(&z)
    }

    #[inline]
    fn checked_index(x: i32, y: i32, z: i32) -> Option<usize> {
        if Self::in_bounds(x, y, z) {
            Some(Self::index(x as usize, y as usize, z as usize))
        } else {
            None
        }
    }

    /// Voxel at a local coordinate; air outside the chunk.
    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Block {
        match Self::checked_index(x, y, z) {
            Some(i) => self.blocks[i],
            None => Block::AIR,
        }
    }

    #[inline]
    pub fn block_type(&self, x: i32, y: i32, z: i32) -> BlockType {
        self.get_block(x, y, z).block_type
    }

    /// Replaces the voxel's type and resets its light. Out of range is a no-op.
    /// Returns true when the stored type changed.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, t: BlockType) -> bool {
        let Some(i) = Self::checked_index(x, y, z) else {
            return false;
        };
        let changed = self.blocks[i].block_type != t;
        self.blocks[i] = Block::new(t);
        changed
    }

    #[inline]
    pub fn light_level(&self, x: i32, y: i32, z: i32) -> u8 {
        self.get_block(x, y, z).light
    }

    /// Returns true when the stored level changed.
    pub fn set_light(&mut self, x: i32, y: i32, z: i32, level: u8) -> bool {
        let Some(i) = Self::checked_index(x, y, z) else {
            return false;
        };
        let changed = self.blocks[i].light != level;
        self.blocks[i].light = level;
        changed
    }

    /// Zeroes every light level and drops queued light work.
    /// Returns true when any level changed.
    pub fn clear_light(&mut self) -> bool {
        let mut changed = false;
        for b in &mut self.blocks {
            changed |= b.light != 0;
            b.light = 0;
        }
        self.queue.clear();
        self.border.clear();
        self.active = false;
        changed
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Local coordinates of every light-emitting voxel, in index order.
    pub fn emitters(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.block_type.emission() > 0)
            .map(|(i, _)| {
                let x = i / (CHUNK_SIZE * CHUNK_SIZE);
                let y = (i / CHUNK_SIZE) % CHUNK_SIZE;
                let z = i % CHUNK_SIZE;
                (x, y, z)
            })
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| !b.is_air())
    }

    #[inline]
    pub fn is_all_air(&self) -> bool {
        !self.has_non_air()
    }

    #[inline]
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    #[inline]
    pub fn handle(&self) -> Option<MeshHandle> {
        self.handle
    }

    /// Installs a freshly built mesh, uploads it and clears `dirty`.
    pub fn apply_mesh(&mut self, mesh: ChunkMesh, backend: &mut dyn MeshBackend) {
        let handle = backend.upload_mesh(self.handle, &mesh.vertices, &mesh.indices);
        self.handle = Some(handle);
        self.mesh = mesh;
        self.dirty = false;
    }

    /// Rebuilds and uploads this chunk's mesh from its own voxels and `neighbors`.
    /// On error the previous mesh stays in place and the chunk stays dirty.
    pub fn update_mesh(
        &mut self,
        neighbors: &ChunkNeighbors<'_>,
        backend: &mut dyn MeshBackend,
    ) -> Result<(), MeshError> {
        let mesh = build_chunk_mesh(self, neighbors)?;
        self.apply_mesh(mesh, backend);
        Ok(())
    }

    /// Issues a draw when an uploaded, non-empty mesh exists.
    pub fn draw(&self, backend: &mut dyn MeshBackend, origin: Vec3) -> bool {
        match self.handle {
            Some(h) if !self.mesh.is_empty() => {
                backend.draw_indexed(h, self.mesh.index_count(), origin);
                true
            }
            _ => false,
        }
    }

    /// Releases the backend buffers and the CPU mesh.
    pub fn unload(&mut self, backend: &mut dyn MeshBackend) {
        if let Some(h) = self.handle.take() {
            backend.release(h);
        }
        self.mesh = ChunkMesh::new();
        self.dirty = true;
        self.visible = false;
    }
}
