//! Tile lookup into the single 16x16 block texture atlas.

use crate::types::BlockType;

pub const ATLAS_TILES_PER_ROW: u32 = 16;
pub const ATLAS_TILE_SIZE: f32 = 1.0 / ATLAS_TILES_PER_ROW as f32;
/// Inset applied to every tile edge so bilinear sampling never reads a neighbor tile.
pub const ATLAS_UV_EPSILON: f32 = 0.001;

/// Atlas tile `(column, row)` for a block type. Row 0 of the image is the top row,
/// so rows count down from 15.
#[inline]
pub fn atlas_tile(t: BlockType) -> (u32, u32) {
    let ord = t.ordinal() as u32;
    let tile_x = ord % ATLAS_TILES_PER_ROW;
    let tile_y = (ATLAS_TILES_PER_ROW - 1) - ord / ATLAS_TILES_PER_ROW;
    (tile_x, tile_y)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// Corner UVs in quad winding order.
    #[inline]
    pub fn corners(&self) -> [[f32; 2]; 4] {
        [
            [self.u0, self.v0],
            [self.u1, self.v0],
            [self.u1, self.v1],
            [self.u0, self.v1],
        ]
    }
}

pub fn tile_uv_rect(t: BlockType) -> UvRect {
    let (tx, ty) = atlas_tile(t);
    let u0 = tx as f32 * ATLAS_TILE_SIZE + ATLAS_UV_EPSILON;
    let v0 = ty as f32 * ATLAS_TILE_SIZE + ATLAS_UV_EPSILON;
    let span = ATLAS_TILE_SIZE - 2.0 * ATLAS_UV_EPSILON;
    UvRect {
        u0,
        v0,
        u1: u0 + span,
        v1: v0 + span,
    }
}
