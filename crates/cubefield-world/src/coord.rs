use serde::Deserialize;

use cubefield_chunk::CHUNK_SIZE_I32;

/// Chunk position in the world grid, in chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    /// World coordinate of local voxel `(0, 0, 0)`.
    #[inline]
    pub fn origin_voxel(self) -> (i32, i32, i32) {
        (
            self.cx * CHUNK_SIZE_I32,
            self.cy * CHUNK_SIZE_I32,
            self.cz * CHUNK_SIZE_I32,
        )
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

/// Voxel position inside a chunk, each axis in `0..CHUNK_SIZE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalCoord {
    pub lx: i32,
    pub ly: i32,
    pub lz: i32,
}

impl LocalCoord {
    #[inline]
    pub const fn new(lx: i32, ly: i32, lz: i32) -> Self {
        Self { lx, ly, lz }
    }
}

/// Splits a world voxel coordinate into chunk and local parts.
/// Works for negative coordinates; bounds are the caller's concern.
#[inline]
pub fn split_voxel(x: i32, y: i32, z: i32) -> (ChunkCoord, LocalCoord) {
    (
        ChunkCoord::new(
            x.div_euclid(CHUNK_SIZE_I32),
            y.div_euclid(CHUNK_SIZE_I32),
            z.div_euclid(CHUNK_SIZE_I32),
        ),
        LocalCoord::new(
            x.rem_euclid(CHUNK_SIZE_I32),
            y.rem_euclid(CHUNK_SIZE_I32),
            z.rem_euclid(CHUNK_SIZE_I32),
        ),
    )
}
