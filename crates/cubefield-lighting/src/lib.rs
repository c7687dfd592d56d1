//! Voxel light propagation: a ring-buffer frontier and a 6-connected flood fill
//! that relays across region (chunk) borders.
#![forbid(unsafe_code)]

use cubefield_blocks::Block;
use cubefield_geom::Face;

mod queue;

pub use queue::{
    LIGHT_QUEUE_CAPACITY, LIGHT_QUEUE_INITIAL_CAPACITY, LightNode, LightQueue, LightQueueFull,
};

/// Storage the flood fill runs over. Coordinates are world-space.
///
/// A region is the unit that owns a queue pair (a chunk, in the world).
/// Nodes that step into another region are handed to [`LightVolume::relay`]
/// instead of the local queue.
pub trait LightVolume {
    type Region: Copy + Eq;

    /// Region holding the voxel, or `None` when it lies outside the volume.
    fn region_of(&self, x: i32, y: i32, z: i32) -> Option<Self::Region>;

    /// Voxel at the coordinate; outside the volume this is air.
    fn block(&self, x: i32, y: i32, z: i32) -> Block;

    fn set_light(&mut self, x: i32, y: i32, z: i32, level: u8);

    /// Queue `node` on `region`'s border queue and flag that region for another pass.
    fn relay(&mut self, region: Self::Region, node: LightNode) -> Result<(), LightQueueFull>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropagationStats {
    pub popped: usize,
    pub raised: usize,
    pub relayed: usize,
    pub dropped: usize,
}

impl PropagationStats {
    pub fn merge(&mut self, other: PropagationStats) {
        self.popped += other.popped;
        self.raised += other.raised;
        self.relayed += other.relayed;
        self.dropped += other.dropped;
    }
}

/// Sets an emitting voxel to its emission level and queues it.
/// Returns false when the voxel does not emit.
pub fn seed_emitter<V: LightVolume>(
    vol: &mut V,
    queue: &mut LightQueue,
    x: i32,
    y: i32,
    z: i32,
) -> Result<bool, LightQueueFull> {
    let emission = vol.block(x, y, z).block_type.emission();
    if emission == 0 {
        return Ok(false);
    }
    vol.set_light(x, y, z, emission);
    queue.push(LightNode::new(x, y, z, emission))?;
    Ok(true)
}

/// Drains `queue` breadth-first, raising transparent neighbors to `light - 1`.
///
/// Opaque neighbors are forced to 0 and never enqueued. A neighbor in a region
/// other than `home` is raised in place and relayed to that region.
pub fn propagate<V: LightVolume>(
    vol: &mut V,
    home: V::Region,
    queue: &mut LightQueue,
) -> PropagationStats {
    let mut stats = PropagationStats::default();
    while let Some(node) = queue.pop() {
        stats.popped += 1;
        let next = node.light.saturating_sub(1);
        for face in Face::ALL {
            let (dx, dy, dz) = face.delta();
            let (nx, ny, nz) = (node.x + dx, node.y + dy, node.z + dz);
            let Some(region) = vol.region_of(nx, ny, nz) else {
                continue;
            };
            let neighbor = vol.block(nx, ny, nz);
            if !neighbor.block_type.is_transparent() {
                if neighbor.light != 0 {
                    vol.set_light(nx, ny, nz, 0);
                }
                continue;
            }
            if next <= neighbor.light {
                continue;
            }
            vol.set_light(nx, ny, nz, next);
            stats.raised += 1;
            let out = LightNode::new(nx, ny, nz, next);
            let pushed = if region == home {
                queue.push(out)
            } else {
                stats.relayed += 1;
                vol.relay(region, out)
            };
            if let Err(e) = pushed {
                stats.dropped += 1;
                log::warn!(
                    "light node ({}, {}, {}) level {} dropped: {}",
                    nx,
                    ny,
                    nz,
                    next,
                    e
                );
            }
        }
    }
    stats
}
