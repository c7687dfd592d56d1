use super::*;

fn floor_at_zero(_x: i32, y: i32, _z: i32) -> BlockType {
    if y <= 0 { BlockType::Stone } else { BlockType::Air }
}

fn player_at(x: f32, y: f32, z: f32) -> Entity {
    Entity::new(Vec3::new(x, y, z), 70.0, 0.5, 2.0, 0.5)
}

#[test]
fn voxel_range_excludes_face_contact() {
    let bb = Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.5, 1.5, 1.5));
    assert_eq!(voxel_range(&bb), ([1, 1, 1], [1, 1, 1]));
    let bb = Aabb::new(Vec3::new(0.4, -0.6, 0.5), Vec3::new(1.6, 0.0, 0.6));
    assert_eq!(voxel_range(&bb), ([0, -1, 1], [2, 0, 1]));
}

#[test]
fn collision_ignores_air_and_counts_any_solid() {
    let bb = Aabb::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(1.5, 1.5, 1.5));
    assert!(!collides_with_voxels(&bb, &floor_at_zero));
    let lowered = bb.translated(Vec3::new(0.0, -0.01, 0.0));
    assert!(collides_with_voxels(&lowered, &floor_at_zero));
    let glass = |_: i32, _: i32, _: i32| BlockType::Glass;
    assert!(collides_with_voxels(&bb, &glass));
}

#[test]
fn apply_force_divides_by_mass() {
    let mut e = Entity::new(Vec3::ZERO, 2.0, 1.0, 1.0, 1.0);
    e.apply_force(Vec3::new(4.0, -2.0, 0.0));
    assert_eq!(e.velocity, Vec3::new(2.0, -1.0, 0.0));
}

#[test]
fn landing_freezes_above_floor() {
    // feet at 0.55, floor face at 0.5
    let mut e = player_at(0.0, 1.55, 0.0);
    e.velocity = Vec3::new(0.0, -5.0, 0.0);
    let c = e.update(&floor_at_zero, &PhysicsParams::default());
    assert!(c.landed);
    assert_eq!(e.velocity.y, 0.0);
    assert!(e.is_on_ground);
    assert_eq!(e.position.y, 1.55);
    assert!(!collides_with_voxels(&e.aabb(), &floor_at_zero));
}

#[test]
fn resting_entity_stays_grounded() {
    let params = PhysicsParams::default();
    let mut e = player_at(0.0, 1.5, 0.0);
    for _ in 0..120 {
        e.update(&floor_at_zero, &params);
    }
    assert!(e.is_on_ground);
    assert_eq!(e.position.y, 1.5);
    assert_eq!(e.velocity.y, 0.0);
}

#[test]
fn ceiling_stops_upward_motion() {
    let ceiling = |_: i32, y: i32, _: i32| {
        if y >= 3 { BlockType::Stone } else { BlockType::Air }
    };
    // top of the box at 2.45, ceiling face at 2.5
    let mut e = player_at(0.0, 1.45, 0.0);
    e.velocity = Vec3::new(0.0, 8.0, 0.0);
    let c = e.update(&ceiling, &PhysicsParams::default());
    assert!(c.hit_ceiling);
    assert!(!c.landed);
    assert_eq!(e.velocity.y, 0.0);
    assert_eq!(e.position.y, 1.45);
    assert!(!e.is_on_ground);
}

#[test]
fn wall_stops_x_while_z_commits() {
    let wall = |x: i32, _: i32, _: i32| {
        if x >= 3 { BlockType::Stone } else { BlockType::Air }
    };
    let mut e = player_at(2.2, 10.0, 0.0);
    e.velocity = Vec3::new(6.0, 0.0, 3.0);
    let c = e.update(&wall, &PhysicsParams::default());
    assert!(c.blocked_x);
    assert!(!c.blocked_z);
    assert_eq!(e.position.x, 2.2);
    assert_eq!(e.velocity.x, 0.0);
    assert!((e.position.z - 2.7 / 60.0).abs() < 1e-5);
    assert!((e.velocity.z - 2.7).abs() < 1e-5);
}

#[test]
fn drag_decays_and_snaps_to_zero() {
    let params = PhysicsParams::default();
    let mut e = player_at(0.0, 1.5, 0.0);
    e.velocity.x = 1.0;
    e.velocity.z = -0.011;
    e.update(&floor_at_zero, &params);
    assert!((e.velocity.x - 0.9).abs() < 1e-6);
    assert_eq!(e.velocity.z, 0.0);
}

#[test]
fn walking_off_a_ledge_falls() {
    let ledge = |x: i32, y: i32, _: i32| {
        if y <= 0 && x <= 0 { BlockType::Stone } else { BlockType::Air }
    };
    let params = PhysicsParams::default();
    let mut e = player_at(0.0, 1.5, 0.0);
    e.update(&ledge, &params);
    assert!(e.is_on_ground);
    e.position.x = 2.0;
    e.update(&ledge, &params);
    assert!(!e.is_on_ground);
    let y = e.position.y;
    e.update(&ledge, &params);
    assert!(e.position.y < y);
}

#[test]
fn step_records_previous_position_for_interpolation() {
    let mut e = player_at(0.0, 10.0, 0.0);
    e.update(&floor_at_zero, &PhysicsParams::default());
    assert_eq!(e.prev_position, Vec3::new(0.0, 10.0, 0.0));
    assert!(e.position.y < 10.0);
    assert_eq!(e.interpolated_position(0.0), e.prev_position);
    assert_eq!(e.interpolated_position(2.0), e.position);
}

#[test]
fn params_from_toml_keep_defaults() {
    let p: PhysicsParams = toml::from_str("gravity = -20.0").unwrap();
    assert_eq!(p.gravity, -20.0);
    assert_eq!(p.timestep, 1.0 / 60.0);
    assert_eq!(p.ground_tolerance, 0.05);
}
