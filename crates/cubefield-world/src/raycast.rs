use cubefield_geom::{Face, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Solid voxel that stopped the ray.
    pub block: (i32, i32, i32),
    /// Last empty voxel before the hit; where a placed block goes.
    pub place: (i32, i32, i32),
    /// Face of `block` the ray entered through. `None` when the ray starts inside it.
    pub face: Option<Face>,
    pub distance: f32,
}

/// Rays are cut off at this length whatever the caller asks for.
pub const MAX_RAY_DISTANCE: f32 = 4096.0;

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::MAX } else { 1.0 / v.abs() }
}

#[inline]
fn step_of(v: f32) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Voxel DDA over unit cubes centered on integer coordinates.
///
/// `max_dist` is clamped to [`MAX_RAY_DISTANCE`]; a NaN or negative distance never hits.
pub fn raycast_first_hit<F>(
    origin: Vec3,
    dir: Vec3,
    max_dist: f32,
    mut is_solid: F,
) -> Option<RayHit>
where
    F: FnMut(i32, i32, i32) -> bool,
{
    let len = dir.length();
    if !len.is_finite() || len < 1e-6 || max_dist.is_nan() || max_dist < 0.0 {
        return None;
    }
    let max_dist = max_dist.min(MAX_RAY_DISTANCE);
    let d = dir * (1.0 / len);
    // voxel v spans [v - 0.5, v + 0.5), so shift into floor space
    let o = origin + Vec3::splat(0.5);

    let mut cell = [o.x.floor() as i32, o.y.floor() as i32, o.z.floor() as i32];
    let mut step = [0i32; 3];
    let mut t_delta = [f32::MAX; 3];
    let mut t_max = [f32::MAX; 3];
    for a in 0..3 {
        let da = d.axis(a);
        let oa = o.axis(a);
        step[a] = step_of(da);
        let inv = inv_or_max(da);
        let frac = oa - oa.floor();
        if step[a] > 0 {
            t_delta[a] = inv;
            t_max[a] = (1.0 - frac) * inv;
        } else if step[a] < 0 {
            t_delta[a] = inv;
            t_max[a] = frac * inv;
        }
    }

    let mut prev = cell;
    let mut entered: Option<usize> = None;
    let mut t = 0.0f32;
    // a ray of length `max_dist` crosses at most this many cell boundaries
    let max_steps = (max_dist as usize + 1) * 3 + 3;
    for _ in 0..max_steps {
        if t > max_dist {
            break;
        }
        if is_solid(cell[0], cell[1], cell[2]) {
            let face = entered.and_then(|a| {
                let i = a * 2 + usize::from(step[a] > 0);
                Face::from_index(i)
            });
            return Some(RayHit {
                block: (cell[0], cell[1], cell[2]),
                place: (prev[0], prev[1], prev[2]),
                face,
                distance: t,
            });
        }
        prev = cell;
        let a = if t_max[0] < t_max[1] {
            if t_max[0] < t_max[2] { 0 } else { 2 }
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };
        if step[a] == 0 {
            break;
        }
        cell[a] += step[a];
        t = t_max[a];
        t_max[a] += t_delta[a];
        entered = Some(a);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_floor_from_above() {
        let down = Vec3::new(0.0, -1.0, 0.0);
        let hit = raycast_first_hit(Vec3::new(0.2, 5.0, -0.3), down, 10.0, |_, y, _| y <= 0).unwrap();
        assert_eq!(hit.block, (0, 0, 0));
        assert_eq!(hit.place, (0, 1, 0));
        assert_eq!(hit.face, Some(Face::PosY));
        assert!((hit.distance - 4.5).abs() < 1e-4);
    }

    #[test]
    fn hits_wall_along_negative_x() {
        let west = Vec3::new(-1.0, 0.0, 0.0);
        let hit = raycast_first_hit(Vec3::new(3.0, 0.0, 0.0), west, 10.0, |x, _, _| x == -2).unwrap();
        assert_eq!(hit.block, (-2, 0, 0));
        assert_eq!(hit.place, (-1, 0, 0));
        assert_eq!(hit.face, Some(Face::PosX));
    }

    #[test]
    fn misses_beyond_max_distance() {
        let hit = raycast_first_hit(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 3.0, |_, _, z| z == 10);
        assert!(hit.is_none());
    }

    #[test]
    fn unbounded_distance_is_clamped() {
        let down = Vec3::new(0.0, -1.0, 0.0);
        let hit = raycast_first_hit(Vec3::ZERO, down, f32::INFINITY, |_, y, _| y <= -5).unwrap();
        assert_eq!(hit.block, (0, -5, 0));
        assert!((hit.distance - 4.5).abs() < 1e-4);

        let beyond = MAX_RAY_DISTANCE as i32 + 10;
        let far = raycast_first_hit(Vec3::ZERO, down, f32::MAX, |_, y, _| y <= -beyond);
        assert!(far.is_none());
    }

    #[test]
    fn negative_or_nan_distance_is_none() {
        let down = Vec3::new(0.0, -1.0, 0.0);
        assert!(raycast_first_hit(Vec3::ZERO, down, -1.0, |_, _, _| true).is_none());
        assert!(raycast_first_hit(Vec3::ZERO, down, f32::NAN, |_, _, _| true).is_none());
    }

    #[test]
    fn zero_direction_is_none() {
        assert!(raycast_first_hit(Vec3::ZERO, Vec3::ZERO, 3.0, |_, _, _| true).is_none());
    }

    #[test]
    fn starting_inside_solid_has_no_face() {
        let hit =
            raycast_first_hit(Vec3::new(1.1, 1.0, 1.0), Vec3::UP, 3.0, |_, _, _| true).unwrap();
        assert_eq!(hit.block, (1, 1, 1));
        assert_eq!(hit.face, None);
    }
}
