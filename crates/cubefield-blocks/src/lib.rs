//! Block types, per-voxel data, and texture atlas tile math.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod types;

pub use atlas::{UvRect, atlas_tile, tile_uv_rect};
pub use types::{Block, BlockType, MAX_LIGHT};
