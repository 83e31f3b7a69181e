//! Orbit-style camera used by the Scene Surface.
//!
//! Spherical coordinates around a ground target: `azimuth` around +Y,
//! `polar` measured down from +Y. Polar angle and distance stay inside the
//! configured limits after every control input.

use glam::{Mat4, Vec2, Vec3};

use super::raycast::Ray;
use crate::constants::{
    CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_MAX_DISTANCE, CAMERA_MAX_POLAR, CAMERA_MIN_DISTANCE,
    CAMERA_MIN_POLAR, CAMERA_NEAR, CAMERA_START,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self {
            min_polar: CAMERA_MIN_POLAR,
            max_polar: CAMERA_MAX_POLAR,
            min_distance: CAMERA_MIN_DISTANCE,
            max_distance: CAMERA_MAX_DISTANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    target: Vec3,
    radius: f32,
    azimuth: f32,
    polar: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    limits: OrbitLimits,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::from(CAMERA_START), Vec3::ZERO, OrbitLimits::default())
    }
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3, limits: OrbitLimits) -> Self {
        let offset = position - target;
        let radius = offset.length().max(f32::EPSILON);
        let azimuth = offset.x.atan2(offset.z);
        let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let mut camera = Self {
            target,
            radius,
            azimuth,
            polar,
            fov_y: CAMERA_FOV_DEG.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            limits,
        };
        camera.clamp();
        camera
    }

    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        self.target
            + Vec3::new(
                self.radius * sin_polar * sin_az,
                self.radius * cos_polar,
                self.radius * sin_polar * cos_az,
            )
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    /// Rotate around the target (radians)
    pub fn orbit(&mut self, delta_azimuth: f32, delta_polar: f32) {
        self.azimuth += delta_azimuth;
        self.polar += delta_polar;
        self.clamp();
    }

    /// Positive `delta` moves closer
    pub fn zoom(&mut self, delta: f32) {
        self.radius -= delta;
        self.clamp();
    }

    /// Slide target and camera together across the ground
    pub fn pan(&mut self, dx: f32, dz: f32) {
        self.target += Vec3::new(dx, 0.0, dz);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, aspect, self.near, self.far)
    }

    /// World ray from the eye through a point in normalized device
    /// coordinates (`-1..1`, +y up)
    pub fn ray_through(&self, ndc: Vec2, aspect: f32) -> Option<Ray> {
        let inverse = (self.projection_matrix(aspect) * self.view_matrix()).inverse();
        let far_point = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        let eye = self.position();
        Ray::new(eye, far_point - eye)
    }

    /// Screen position (NDC) of a world point, for tests and overlays
    pub fn project(&self, point: Vec3, aspect: f32) -> Vec2 {
        let clip = self.projection_matrix(aspect) * self.view_matrix();
        clip.project_point3(point).truncate()
    }

    fn clamp(&mut self) {
        self.polar = self.polar.clamp(self.limits.min_polar, self.limits.max_polar);
        self.radius = self.radius.clamp(self.limits.min_distance, self.limits.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_matches_start_position() {
        let camera = OrbitCamera::default();
        let pos = camera.position();
        assert!((pos - Vec3::new(25.0, 25.0, 25.0)).length() < 1e-3);
    }

    #[test]
    fn test_orbit_clamps_polar_angle() {
        let mut camera = OrbitCamera::default();

        camera.orbit(0.0, -3.0);
        assert!((camera.polar() - CAMERA_MIN_POLAR).abs() < 1e-6);

        camera.orbit(0.0, 3.0);
        assert!((camera.polar() - CAMERA_MAX_POLAR).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamps_distance() {
        let mut camera = OrbitCamera::default();

        camera.zoom(1000.0);
        assert_eq!(camera.distance(), CAMERA_MIN_DISTANCE);

        camera.zoom(-1000.0);
        assert_eq!(camera.distance(), CAMERA_MAX_DISTANCE);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = OrbitCamera::default();
        let ray = camera.ray_through(Vec2::ZERO, 16.0 / 9.0).unwrap();

        let to_target = (camera.target() - camera.position()).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn test_project_inverts_ray() {
        let camera = OrbitCamera::default();
        let aspect = 4.0 / 3.0;
        let ndc = camera.project(Vec3::new(3.0, 0.0, -1.5), aspect);

        let ray = camera.ray_through(ndc, aspect).unwrap();
        let expected = (Vec3::new(3.0, 0.0, -1.5) - camera.position()).normalize();
        assert!(ray.direction.dot(expected) > 0.9999);
    }

    #[test]
    fn test_pan_moves_target_on_ground() {
        let mut camera = OrbitCamera::default();
        let before = camera.position();
        camera.pan(2.0, -1.0);

        assert_eq!(camera.target(), Vec3::new(2.0, 0.0, -1.0));
        assert!((camera.position() - (before + Vec3::new(2.0, 0.0, -1.0))).length() < 1e-4);
    }
}
