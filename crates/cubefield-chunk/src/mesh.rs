//! Face-culled chunk meshing.

use std::fmt;

use bytemuck::{Pod, Zeroable};
use cubefield_blocks::{Block, BlockType, MAX_LIGHT, tile_uv_rect};
use cubefield_geom::Face;

use crate::{CHUNK_SIZE_I32, Chunk};

/// One mesh vertex as uploaded to the backend.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    /// Baked light in `[0, 1]`.
    pub light: f32,
}

impl Vertex {
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
    /// `(byte offset, component count)` for position, uv and light.
    pub const ATTRIBUTES: [(usize, usize); 3] = [(0, 3), (12, 2), (20, 1)];
}

/// Corner offsets from the voxel center, per face in `Face::ALL` order.
/// Each quad winds so that `0,1,2` and `2,3,0` face outward.
const FACE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // +X
    [[0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5], [0.5, -0.5, -0.5]],
    // -X
    [[-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5]],
    // +Y
    [[0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5]],
    // -Y
    [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]],
    // +Z
    [[0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5]],
    // -Z
    [[-0.5, 0.5, -0.5], [0.5, 0.5, -0.5], [0.5, -0.5, -0.5], [-0.5, -0.5, -0.5]],
];

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// Growing a mesh buffer to `requested` elements failed.
    AllocationFailed { requested: usize },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::AllocationFailed { requested } => {
                write!(f, "mesh buffer allocation failed ({} elements)", requested)
            }
        }
    }
}

impl std::error::Error for MeshError {}

/// CPU-side vertex and index buffers for one chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Vertex buffer as raw bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Appends one quad for `face` of the voxel centered at `center`.
    /// Nothing is written when either buffer cannot grow.
    pub fn add_face(
        &mut self,
        face: Face,
        center: [f32; 3],
        block_type: BlockType,
        light: f32,
    ) -> Result<(), MeshError> {
        self.vertices
            .try_reserve(4)
            .map_err(|_| MeshError::AllocationFailed {
                requested: self.vertices.len() + 4,
            })?;
        self.indices
            .try_reserve(6)
            .map_err(|_| MeshError::AllocationFailed {
                requested: self.indices.len() + 6,
            })?;

        let base = self.vertices.len() as u32;
        let uvs = tile_uv_rect(block_type).corners();
        for (corner, uv) in FACE_CORNERS[face.index()].iter().zip(uvs) {
            self.vertices.push(Vertex {
                position: [
                    center[0] + corner[0],
                    center[1] + corner[1],
                    center[2] + corner[2],
                ],
                uv,
                light,
            });
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        Ok(())
    }
}

/// The up-to-six chunks sharing a face with the one being meshed.
#[derive(Clone, Copy, Default)]
pub struct ChunkNeighbors<'a> {
    faces: [Option<&'a Chunk>; 6],
}

impl<'a> ChunkNeighbors<'a> {
    /// No neighbors: every outside voxel reads as air.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, face: Face, chunk: &'a Chunk) -> Self {
        self.faces[face.index()] = Some(chunk);
        self
    }

    #[inline]
    pub fn get(&self, face: Face) -> Option<&'a Chunk> {
        self.faces[face.index()]
    }

    pub fn count_loaded(&self) -> usize {
        self.faces.iter().filter(|c| c.is_some()).count()
    }
}

/// Voxel one step along `face` from local `(x, y, z)`, reading into the
/// neighbor chunk past the edge. Missing neighbors read as air.
fn neighbor_block(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors<'_>,
    x: i32,
    y: i32,
    z: i32,
    face: Face,
) -> Block {
    let (dx, dy, dz) = face.delta();
    let (nx, ny, nz) = (x + dx, y + dy, z + dz);
    if Chunk::in_bounds(nx, ny, nz) {
        return chunk.get_block(nx, ny, nz);
    }
    match neighbors.get(face) {
        Some(n) => n.get_block(
            nx.rem_euclid(CHUNK_SIZE_I32),
            ny.rem_euclid(CHUNK_SIZE_I32),
            nz.rem_euclid(CHUNK_SIZE_I32),
        ),
        None => Block::AIR,
    }
}

/// Rebuilds `out` from scratch. On error `out` holds a partial mesh.
pub fn build_chunk_mesh_into(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors<'_>,
    out: &mut ChunkMesh,
) -> Result<(), MeshError> {
    out.clear();
    for x in 0..CHUNK_SIZE_I32 {
        for y in 0..CHUNK_SIZE_I32 {
            for z in 0..CHUNK_SIZE_I32 {
                let here = chunk.get_block(x, y, z);
                if here.is_air() {
                    continue;
                }
                let center = [x as f32, y as f32, z as f32];
                for face in Face::ALL {
                    let nb = neighbor_block(chunk, neighbors, x, y, z, face);
                    if nb.block_type == here.block_type {
                        continue;
                    }
                    let light = nb.light as f32 / MAX_LIGHT as f32;
                    out.add_face(face, center, here.block_type, light)?;
                }
            }
        }
    }
    Ok(())
}

pub fn build_chunk_mesh(
    chunk: &Chunk,
    neighbors: &ChunkNeighbors<'_>,
) -> Result<ChunkMesh, MeshError> {
    let mut mesh = ChunkMesh::new();
    build_chunk_mesh_into(chunk, neighbors, &mut mesh)?;
    Ok(mesh)
}
