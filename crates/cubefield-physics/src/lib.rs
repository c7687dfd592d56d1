//! Box-vs-voxel collision and a fixed-step rigid body for entities.
#![forbid(unsafe_code)]

use serde::Deserialize;

use cubefield_blocks::BlockType;
use cubefield_geom::{Aabb, Vec3};

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct PhysicsParams {
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Seconds per physics step.
    #[serde(default = "default_timestep")]
    pub timestep: f32,
    /// Fraction of horizontal speed removed each step.
    #[serde(default = "default_drag")]
    pub drag: f32,
    /// Horizontal speeds below this snap to zero.
    #[serde(default = "default_velocity_epsilon")]
    pub velocity_epsilon: f32,
    /// How far below the feet the ground probe reaches.
    #[serde(default = "default_ground_tolerance")]
    pub ground_tolerance: f32,
}

fn default_gravity() -> f32 {
    -9.81
}
fn default_timestep() -> f32 {
    1.0 / 60.0
}
fn default_drag() -> f32 {
    0.1
}
fn default_velocity_epsilon() -> f32 {
    0.01
}
fn default_ground_tolerance() -> f32 {
    0.05
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            timestep: default_timestep(),
            drag: default_drag(),
            velocity_epsilon: default_velocity_epsilon(),
            ground_tolerance: default_ground_tolerance(),
        }
    }
}

/// Read-only view of the voxel grid. Out-of-world coordinates must read as air.
pub trait VoxelQuery {
    fn block_type_at(&self, x: i32, y: i32, z: i32) -> BlockType;
}

impl<F> VoxelQuery for F
where
    F: Fn(i32, i32, i32) -> BlockType,
{
    #[inline]
    fn block_type_at(&self, x: i32, y: i32, z: i32) -> BlockType {
        self(x, y, z)
    }
}

/// Inclusive range of voxel centers a box can touch. Voxels are unit cubes
/// centered on integer coordinates, so touching a voxel's face is not overlap.
#[inline]
pub fn voxel_range(aabb: &Aabb) -> ([i32; 3], [i32; 3]) {
    let lo = |v: f32| (v + 0.5).floor() as i32;
    let hi = |v: f32| (v - 0.5).ceil() as i32;
    (
        [lo(aabb.min.x), lo(aabb.min.y), lo(aabb.min.z)],
        [hi(aabb.max.x), hi(aabb.max.y), hi(aabb.max.z)],
    )
}

/// True when any voxel the box touches is not air.
pub fn collides_with_voxels<Q: VoxelQuery + ?Sized>(aabb: &Aabb, query: &Q) -> bool {
    let (min, max) = voxel_range(aabb);
    for x in min[0]..=max[0] {
        for y in min[1]..=max[1] {
            for z in min[2]..=max[2] {
                if query.block_type_at(x, y, z) != BlockType::Air {
                    return true;
                }
            }
        }
    }
    false
}

/// Which contacts resolved during one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepContacts {
    pub landed: bool,
    pub hit_ceiling: bool,
    pub blocked_x: bool,
    pub blocked_z: bool,
}

/// A physics body whose collision box is centered on `position`.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub position: Vec3,
    /// Position at the start of the last step, for render interpolation.
    pub prev_position: Vec3,
    pub velocity: Vec3,
    /// Orientation in degrees; ignored by collision.
    pub rotation: Vec3,
    pub mass: f32,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub is_on_ground: bool,
    pub was_on_ground: bool,
}

impl Entity {
    pub fn new(position: Vec3, mass: f32, width: f32, height: f32, depth: f32) -> Self {
        Self {
            position,
            prev_position: position,
            velocity: Vec3::ZERO,
            rotation: Vec3::ZERO,
            mass,
            width,
            height,
            depth,
            is_on_ground: false,
            was_on_ground: false,
        }
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width * 0.5, self.height * 0.5, self.depth * 0.5)
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.aabb_at(self.position)
    }

    #[inline]
    pub fn aabb_at(&self, position: Vec3) -> Aabb {
        Aabb::from_center_half_extents(position, self.half_extents())
    }

    /// `v += force / mass`.
    pub fn apply_force(&mut self, force: Vec3) {
        if self.mass <= 0.0 {
            return;
        }
        self.velocity += force * (1.0 / self.mass);
    }

    /// Position blended between the last two steps.
    #[inline]
    pub fn interpolated_position(&self, alpha: f32) -> Vec3 {
        self.prev_position.lerp(self.position, alpha.clamp(0.0, 1.0))
    }

    #[inline]
    fn collides_at<Q: VoxelQuery + ?Sized>(&self, position: Vec3, query: &Q) -> bool {
        collides_with_voxels(&self.aabb_at(position), query)
    }

    /// Advances one fixed step, resolving Y first, then X, then Z.
    /// A blocked axis keeps its old coordinate and loses its velocity.
    pub fn update<Q: VoxelQuery + ?Sized>(
        &mut self,
        query: &Q,
        params: &PhysicsParams,
    ) -> StepContacts {
        let dt = params.timestep;
        let mut contacts = StepContacts::default();
        self.prev_position = self.position;

        if self.is_on_ground && !self.was_on_ground {
            self.velocity.y = 0.0;
        }
        if !self.is_on_ground {
            self.velocity.y += params.gravity * dt;
        }

        for axis in [0, 2] {
            let v = self.velocity.axis(axis);
            let mut next = v - params.drag * v;
            if next.signum() != v.signum() || next.abs() < params.velocity_epsilon {
                next = 0.0;
            }
            self.velocity.set_axis(axis, next);
        }

        let next_pos = self.position + self.velocity * dt;

        let probe = self.position - Vec3::new(0.0, params.ground_tolerance, 0.0);
        let touching_ground = self.collides_at(probe, query);

        let vertical = Vec3::new(self.position.x, next_pos.y, self.position.z);
        if self.collides_at(vertical, query) {
            if self.velocity.y < 0.0 {
                self.is_on_ground = true;
                contacts.landed = true;
            } else if self.velocity.y > 0.0 {
                contacts.hit_ceiling = true;
            }
            self.velocity.y = 0.0;
        } else {
            self.position.y = next_pos.y;
            self.is_on_ground = touching_ground && self.velocity.y <= 0.0;
        }
        self.was_on_ground = self.is_on_ground;

        for (axis, blocked) in [(0, &mut contacts.blocked_x), (2, &mut contacts.blocked_z)] {
            let old = self.position.axis(axis);
            self.position.set_axis(axis, next_pos.axis(axis));
            if self.collides_at(self.position, query) {
                self.position.set_axis(axis, old);
                self.velocity.set_axis(axis, 0.0);
                *blocked = true;
            }
        }

        if contacts.landed {
            log::debug!(
                "entity landed at ({:.2}, {:.2}, {:.2})",
                self.position.x,
                self.position.y,
                self.position.z
            );
        }
        contacts
    }
}

#[cfg(test)]
mod tests;
