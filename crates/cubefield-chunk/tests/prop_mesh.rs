use cubefield_blocks::{BlockType, MAX_LIGHT};
use cubefield_chunk::{CHUNK_SIZE, CHUNK_SIZE_I32, Chunk, ChunkMesh, ChunkNeighbors, build_chunk_mesh};
use cubefield_geom::Face;
use proptest::prelude::*;

fn arb_type() -> impl Strategy<Value = BlockType> {
    prop_oneof![
        5 => Just(BlockType::Air),
        2 => Just(BlockType::Stone),
        1 => Just(BlockType::Grass),
        1 => Just(BlockType::Glass),
        1 => Just(BlockType::Light),
    ]
}

// A sparse random fill keeps the grids interesting without 4096-element strategies.
fn arb_chunk() -> impl Strategy<Value = Chunk> {
    let n = CHUNK_SIZE_I32;
    prop::collection::vec(((0..n, 0..n, 0..n), arb_type(), 0u8..=MAX_LIGHT), 0..160).prop_map(
        |cells| {
            let mut c = Chunk::new();
            for ((x, y, z), t, light) in cells {
                c.set_block(x, y, z, t);
                c.set_light(x, y, z, light);
            }
            c
        },
    )
}

fn quad_centers(mesh: &ChunkMesh) -> Vec<[f32; 3]> {
    mesh.vertices
        .chunks(4)
        .map(|q| {
            let mut c = [0.0f32; 3];
            for v in q {
                for a in 0..3 {
                    c[a] += v.position[a] * 0.25;
                }
            }
            c
        })
        .collect()
}

/// Face centers a correct mesher must produce, in emission order.
fn expected_centers(chunk: &Chunk, east: Option<&Chunk>) -> Vec<[f32; 3]> {
    let mut out = Vec::new();
    for x in 0..CHUNK_SIZE_I32 {
        for y in 0..CHUNK_SIZE_I32 {
            for z in 0..CHUNK_SIZE_I32 {
                let here = chunk.block_type(x, y, z);
                if here == BlockType::Air {
                    continue;
                }
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                    let there = if Chunk::in_bounds(nx, ny, nz) {
                        chunk.block_type(nx, ny, nz)
                    } else if face == Face::PosX {
                        east.map_or(BlockType::Air, |e| e.block_type(0, ny, nz))
                    } else {
                        BlockType::Air
                    };
                    if there != here {
                        out.push([
                            x as f32 + dx as f32 * 0.5,
                            y as f32 + dy as f32 * 0.5,
                            z as f32 + dz as f32 * 0.5,
                        ]);
                    }
                }
            }
        }
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // A face is emitted iff the neighbor is air or a different type
    #[test]
    fn faces_match_exposure_rule(chunk in arb_chunk(), east in arb_chunk()) {
        let neighbors = ChunkNeighbors::none().with(Face::PosX, &east);
        let mesh = build_chunk_mesh(&chunk, &neighbors).unwrap();
        prop_assert_eq!(quad_centers(&mesh), expected_centers(&chunk, Some(&east)));
    }

    #[test]
    fn indices_are_valid(chunk in arb_chunk()) {
        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::none()).unwrap();
        prop_assert_eq!(mesh.index_count() * 2, mesh.vertex_count() * 3);
        let n = mesh.vertex_count() as u32;
        prop_assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn meshing_is_deterministic(chunk in arb_chunk()) {
        let a = build_chunk_mesh(&chunk, &ChunkNeighbors::none()).unwrap();
        let b = build_chunk_mesh(&chunk, &ChunkNeighbors::none()).unwrap();
        prop_assert_eq!(a.vertex_bytes(), b.vertex_bytes());
        prop_assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn baked_light_is_normalized(chunk in arb_chunk()) {
        let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::none()).unwrap();
        prop_assert!(mesh.vertices.iter().all(|v| (0.0..=1.0).contains(&v.light)));
    }
}

#[test]
fn stone_at_east_edge_faces_air_in_neighbor() {
    let last = CHUNK_SIZE_I32 - 1;
    let mut a = Chunk::new();
    a.set_block(last, 4, 4, BlockType::Stone);
    let b = Chunk::new();

    let mesh_a = build_chunk_mesh(&a, &ChunkNeighbors::none().with(Face::PosX, &b)).unwrap();
    let east_face = [last as f32 + 0.5, 4.0, 4.0];
    assert!(quad_centers(&mesh_a).contains(&east_face));

    // air contributes no faces regardless of its neighbor
    let mesh_b = build_chunk_mesh(&b, &ChunkNeighbors::none().with(Face::NegX, &a)).unwrap();
    assert!(mesh_b.is_empty());
}

#[test]
fn full_chunk_only_shows_its_shell() {
    let chunk = Chunk::from_fn(|_, _, _| BlockType::Stone);
    let mesh = build_chunk_mesh(&chunk, &ChunkNeighbors::none()).unwrap();
    assert_eq!(mesh.face_count(), 6 * CHUNK_SIZE * CHUNK_SIZE);
}
