use cubefield_blocks::BlockType;
use cubefield_geom::Vec3;
use cubefield_world::World;

use crate::config::ScriptedEdit;

/// Applies one scripted edit. Returns the voxel changed, if any.
pub fn apply_edit(world: &mut World, eye: Vec3, edit: &ScriptedEdit) -> Option<(i32, i32, i32)> {
    let target = match (edit.at, edit.look) {
        (Some([x, y, z]), _) => (x, y, z),
        (None, Some(dir)) => {
            let hit = world.raycast(eye, Vec3::from(dir), edit.reach)?;
            if edit.block == BlockType::Air {
                hit.block
            } else {
                hit.place
            }
        }
        (None, None) => return None,
    };
    let (x, y, z) = target;
    if world.set_block(x, y, z, edit.block) {
        log::info!(
            "frame {}: {} at ({}, {}, {})",
            edit.frame,
            edit.block.name(),
            x,
            y,
            z
        );
        Some(target)
    } else {
        log::debug!(
            "frame {}: edit at ({}, {}, {}) changed nothing",
            edit.frame,
            x,
            y,
            z
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_world::{TerrainMode, WorldConfig};

    fn flat() -> World {
        let mut cfg = WorldConfig::with_size(1, 1, 1);
        cfg.terrain.mode = TerrainMode::Flat;
        World::new(cfg)
    }

    fn edit(block: BlockType, at: Option<[i32; 3]>, look: Option<[f32; 3]>) -> ScriptedEdit {
        ScriptedEdit {
            frame: 0,
            block,
            at,
            look,
            reach: 8.0,
        }
    }

    #[test]
    fn fixed_target_is_set_directly() {
        let mut w = flat();
        let e = edit(BlockType::Glass, Some([2, 9, 2]), None);
        assert_eq!(apply_edit(&mut w, Vec3::ZERO, &e), Some((2, 9, 2)));
        assert_eq!(w.block_type(2, 9, 2), BlockType::Glass);
    }

    #[test]
    fn looking_down_breaks_then_places() {
        let mut w = flat();
        let eye = Vec3::new(5.0, 8.0, 5.0);
        let down = Some([0.0, -1.0, 0.0]);

        let broke = apply_edit(&mut w, eye, &edit(BlockType::Air, None, down));
        assert_eq!(broke, Some((5, 3, 5)));
        assert_eq!(w.block_type(5, 3, 5), BlockType::Air);

        let placed = apply_edit(&mut w, eye, &edit(BlockType::Light, None, down));
        assert_eq!(placed, Some((5, 3, 5)));
        assert_eq!(w.block_type(5, 3, 5), BlockType::Light);
    }

    #[test]
    fn out_of_reach_does_nothing() {
        let mut w = flat();
        let e = edit(BlockType::Stone, None, Some([0.0, 1.0, 0.0]));
        assert_eq!(apply_edit(&mut w, Vec3::new(5.0, 8.0, 5.0), &e), None);
    }
}
