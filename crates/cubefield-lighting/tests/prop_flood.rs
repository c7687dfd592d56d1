use std::collections::VecDeque;

use cubefield_blocks::{Block, BlockType, MAX_LIGHT};
use cubefield_lighting::{LightNode, LightQueue, LightQueueFull, LightVolume, propagate, seed_emitter};
use proptest::prelude::*;

const N: i32 = 8;

struct Grid {
    blocks: Vec<Block>,
}

fn idx(x: i32, y: i32, z: i32) -> usize {
    ((x * N + y) * N + z) as usize
}

fn inside(x: i32, y: i32, z: i32) -> bool {
    (0..N).contains(&x) && (0..N).contains(&y) && (0..N).contains(&z)
}

impl LightVolume for Grid {
    type Region = ();

    fn region_of(&self, x: i32, y: i32, z: i32) -> Option<()> {
        inside(x, y, z).then_some(())
    }

    fn block(&self, x: i32, y: i32, z: i32) -> Block {
        if inside(x, y, z) { self.blocks[idx(x, y, z)] } else { Block::AIR }
    }

    fn set_light(&mut self, x: i32, y: i32, z: i32, level: u8) {
        self.blocks[idx(x, y, z)].light = level;
    }

    fn relay(&mut self, _region: (), _node: LightNode) -> Result<(), LightQueueFull> {
        unreachable!("single region volume never relays")
    }
}

/// Reference: multi-source BFS distance through transparent cells.
fn expected_levels(blocks: &[Block]) -> Vec<u8> {
    let mut dist = vec![u32::MAX; blocks.len()];
    let mut q = VecDeque::new();
    for x in 0..N {
        for y in 0..N {
            for z in 0..N {
                if blocks[idx(x, y, z)].block_type.emission() > 0 {
                    dist[idx(x, y, z)] = 0;
                    q.push_back((x, y, z));
                }
            }
        }
    }
    while let Some((x, y, z)) = q.pop_front() {
        let d = dist[idx(x, y, z)];
        for (dx, dy, dz) in [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)] {
            let (nx, ny, nz) = (x + dx, y + dy, z + dz);
            if !inside(nx, ny, nz) {
                continue;
            }
            let i = idx(nx, ny, nz);
            if !blocks[i].block_type.is_transparent() || dist[i] != u32::MAX {
                continue;
            }
            dist[i] = d + 1;
            q.push_back((nx, ny, nz));
        }
    }
    dist.iter()
        .zip(blocks)
        .map(|(&d, b)| {
            if !b.block_type.is_transparent() || d == u32::MAX {
                0
            } else {
                (MAX_LIGHT as u32).saturating_sub(d) as u8
            }
        })
        .collect()
}

fn arb_grid() -> impl Strategy<Value = Vec<BlockType>> {
    let cell = prop_oneof![
        6 => Just(BlockType::Air),
        2 => Just(BlockType::Stone),
        1 => Just(BlockType::Glass),
        1 => Just(BlockType::Grass),
    ];
    prop::collection::vec(cell, (N * N * N) as usize)
}

fn flood(types: &[BlockType], sources: &[(i32, i32, i32)]) -> Grid {
    let mut g = Grid {
        blocks: types.iter().map(|t| Block::new(*t)).collect(),
    };
    for &(x, y, z) in sources {
        g.blocks[idx(x, y, z)] = Block::new(BlockType::Light);
    }
    let mut q = LightQueue::new();
    for &(x, y, z) in sources {
        seed_emitter(&mut g, &mut q, x, y, z).unwrap();
    }
    let stats = propagate(&mut g, (), &mut q);
    assert_eq!(stats.dropped, 0);
    g
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Light equals 15 minus the transparent-path distance to the nearest emitter
    #[test]
    fn flood_matches_reference_bfs(
        types in arb_grid(),
        sources in prop::collection::vec((0..N, 0..N, 0..N), 1..4),
    ) {
        let g = flood(&types, &sources);
        let expect = expected_levels(&g.blocks);
        for (i, b) in g.blocks.iter().enumerate() {
            prop_assert_eq!(b.light, expect[i], "voxel {}", i);
        }
    }

    // Opaque voxels stay dark and no level exceeds the maximum
    #[test]
    fn opaque_dark_and_bounded(
        types in arb_grid(),
        sources in prop::collection::vec((0..N, 0..N, 0..N), 1..4),
    ) {
        let g = flood(&types, &sources);
        for b in &g.blocks {
            prop_assert!(b.light <= MAX_LIGHT);
            if b.block_type.is_opaque() {
                prop_assert_eq!(b.light, 0);
            }
        }
    }

    // Re-running the fill on a settled grid changes nothing
    #[test]
    fn flood_is_idempotent(
        types in arb_grid(),
        sources in prop::collection::vec((0..N, 0..N, 0..N), 1..3),
    ) {
        let mut g = flood(&types, &sources);
        let before = g.blocks.clone();
        let mut q = LightQueue::new();
        for &(x, y, z) in &sources {
            seed_emitter(&mut g, &mut q, x, y, z).unwrap();
        }
        propagate(&mut g, (), &mut q);
        prop_assert_eq!(before, g.blocks);
    }
}
