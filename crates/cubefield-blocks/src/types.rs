use serde::Deserialize;

/// Brightest light level a voxel can hold.
pub const MAX_LIGHT: u8 = 15;

/// Closed set of voxel materials. The ordinal doubles as the atlas tile index.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    Air = 0,
    Light = 1,
    Glass = 2,
    Grass = 3,
    Stone = 4,
}

impl BlockType {
    pub const ALL: [BlockType; 5] = [
        BlockType::Air,
        BlockType::Light,
        BlockType::Glass,
        BlockType::Grass,
        BlockType::Stone,
    ];

    #[inline]
    pub fn from_u8(v: u8) -> Option<BlockType> {
        BlockType::ALL.get(v as usize).copied()
    }

    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Light passes through this voxel.
    ///
    /// Light blocks count as transparent: they hold their own emission and let
    /// neighboring light through, while still being solid for meshing and collision.
    #[inline]
    pub fn is_transparent(self) -> bool {
        matches!(self, BlockType::Air | BlockType::Glass | BlockType::Light)
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        !self.is_transparent()
    }

    /// Anything but air produces faces and collides.
    #[inline]
    pub fn is_solid(self) -> bool {
        self != BlockType::Air
    }

    #[inline]
    pub fn emission(self) -> u8 {
        match self {
            BlockType::Light => MAX_LIGHT,
            _ => 0,
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            BlockType::Air => "air",
            BlockType::Light => "light",
            BlockType::Glass => "glass",
            BlockType::Grass => "grass",
            BlockType::Stone => "stone",
        }
    }
}

/// A single voxel: its material and the light level propagation computed for it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    pub block_type: BlockType,
    pub light: u8,
}

impl Block {
    pub const AIR: Block = Block {
        block_type: BlockType::Air,
        light: 0,
    };

    #[inline]
    pub const fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            light: 0,
        }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        self.block_type == BlockType::Air
    }
}

impl From<BlockType> for Block {
    fn from(t: BlockType) -> Self {
        Block::new(t)
    }
}
