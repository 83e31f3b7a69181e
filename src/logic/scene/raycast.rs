//! Ray casting against the ground plane and marker volumes.

use glam::{Vec2, Vec3};

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Horizontal square plane at `y = 0`, centered on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub half_extent: f32,
}

impl GroundPlane {
    pub fn new(extent: f32) -> Self {
        Self {
            half_extent: extent / 2.0,
        }
    }

    /// Intersection point with `y` exactly 0, or `None` when the ray runs
    /// parallel to the plane, points away from it, or lands off the plane.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let t = intersect_horizontal(ray, 0.0)?;
        let hit = ray.at(t);
        if hit.x.abs() > self.half_extent || hit.z.abs() > self.half_extent {
            return None;
        }
        Some(Vec3::new(hit.x, 0.0, hit.z))
    }
}

/// Distance along the ray to the plane `y = height`
pub fn intersect_horizontal(ray: &Ray, height: f32) -> Option<f32> {
    let denom = ray.direction.y;
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (height - ray.origin.y) / denom;
    (t > 0.0).then_some(t)
}

/// Nearest positive distance at which the ray enters a vertical capped
/// cylinder standing on `center` (x, z) between `y_min` and `y_max`.
pub fn intersect_vertical_cylinder(
    ray: &Ray,
    center: Vec2,
    radius: f32,
    y_min: f32,
    y_max: f32,
) -> Option<f32> {
    let mut nearest: Option<f32> = None;
    let mut consider = |t: f32| {
        if t > 0.0 && nearest.map_or(true, |n| t < n) {
            nearest = Some(t);
        }
    };

    // Side wall
    let ox = ray.origin.x - center.x;
    let oz = ray.origin.z - center.y;
    let (dx, dz) = (ray.direction.x, ray.direction.z);
    let a = dx * dx + dz * dz;
    if a > PARALLEL_EPSILON {
        let b = 2.0 * (ox * dx + oz * dz);
        let c = ox * ox + oz * oz - radius * radius;
        let disc = b * b - 4.0 * a * c;
        if disc >= 0.0 {
            let sqrt_disc = disc.sqrt();
            for t in [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)] {
                let y = ray.origin.y + ray.direction.y * t;
                if (y_min..=y_max).contains(&y) {
                    consider(t);
                }
            }
        }
    }

    // Caps
    for cap in [y_min, y_max] {
        if let Some(t) = intersect_horizontal(ray, cap) {
            let hit = ray.at(t);
            let (hx, hz) = (hit.x - center.x, hit.z - center.y);
            if hx * hx + hz * hz <= radius * radius {
                consider(t);
            }
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(origin: [f32; 3], direction: [f32; 3]) -> Ray {
        Ray::new(Vec3::from(origin), Vec3::from(direction)).unwrap()
    }

    #[test]
    fn test_ground_hit_has_zero_height() {
        let plane = GroundPlane::new(100.0);
        let r = ray([10.0, 20.0, 10.0], [-7.0, -20.0, -11.5]);

        let hit = plane.intersect(&r).unwrap();
        assert_eq!(hit.y, 0.0);
        assert!((hit.x - 3.0).abs() < 1e-4);
        assert!((hit.z - -1.5).abs() < 1e-4);
    }

    #[test]
    fn test_parallel_and_receding_rays_miss() {
        let plane = GroundPlane::new(100.0);
        assert_eq!(plane.intersect(&ray([0.0, 5.0, 0.0], [1.0, 0.0, 0.0])), None);
        assert_eq!(plane.intersect(&ray([0.0, 5.0, 0.0], [0.0, 1.0, 0.2])), None);
    }

    #[test]
    fn test_hit_outside_extent_misses() {
        let plane = GroundPlane::new(100.0);
        // Lands at x = 60
        assert_eq!(plane.intersect(&ray([60.0, 10.0, 0.0], [0.0, -1.0, 0.0])), None);
        assert!(plane.intersect(&ray([49.0, 10.0, 0.0], [0.0, -1.0, 0.0])).is_some());
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        assert!(Ray::new(Vec3::ONE, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_cylinder_top_and_side_hits() {
        let center = Vec2::new(2.0, 2.0);

        // Straight down onto the top cap
        let down = ray([2.1, 10.0, 2.0], [0.0, -1.0, 0.0]);
        let t = intersect_vertical_cylinder(&down, center, 0.3, 0.0, 0.2).unwrap();
        assert!((t - 9.8).abs() < 1e-4);

        // Horizontal into the side wall
        let side = ray([0.0, 0.1, 2.0], [1.0, 0.0, 0.0]);
        let t = intersect_vertical_cylinder(&side, center, 0.3, 0.0, 0.2).unwrap();
        assert!((t - 1.7).abs() < 1e-4);

        // Passes above
        let above = ray([0.0, 1.0, 2.0], [1.0, 0.0, 0.0]);
        assert_eq!(intersect_vertical_cylinder(&above, center, 0.3, 0.0, 0.2), None);

        // Misses to the side
        let wide = ray([3.0, 10.0, 3.0], [0.0, -1.0, 0.0]);
        assert_eq!(intersect_vertical_cylinder(&wide, center, 0.3, 0.0, 0.2), None);
    }
}
