use cubefield_geom::Vec3;
use cubefield_physics::Entity;
use cubefield_world::World;

use crate::config::PlayerConfig;

/// Simulation state mutated by the frame loop.
pub struct GameState {
    pub tick: u64,
    pub world: World,
    pub player: Entity,
}

impl GameState {
    pub fn new(world: World, player: &PlayerConfig) -> Self {
        let [x, y, z] = player.spawn;
        Self {
            tick: 0,
            world,
            player: Entity::new(
                Vec3::new(x, y, z),
                player.mass,
                player.width,
                player.height,
                player.depth,
            ),
        }
    }

    /// Eye position, a little below the top of the player's box.
    pub fn eye(&self, alpha: f32) -> Vec3 {
        let p = self.player.interpolated_position(alpha);
        p + Vec3::new(0.0, self.player.height * 0.4, 0.0)
    }
}
