/// Orbit camera and its projection parameters
use nalgebra::{Matrix4, Vector3};

use crate::error::{Error, Result};
use crate::transform::Transform;

/// Camera orbiting a target at a fixed radius.
///
/// The eye position is derived from the radius and two orbit angles and is
/// recomputed whenever it is asked for. The radius always stays inside
/// `[z_near, z_far]`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fov: f32,
    z_near: f32,
    z_far: f32,
    radius: f32,
    // Angle from the +y axis
    polar: f32,
    // Angle in the xz plane, measured from +x towards +z
    azimuth: f32,
}

impl Camera {
    pub const DEFAULT_Z_NEAR: f32 = 0.01;
    pub const DEFAULT_Z_FAR: f32 = 100.0;
    pub const DEFAULT_RADIUS: f32 = 5.0;

    pub fn new() -> Self {
        Self {
            target: Vector3::zeros(),
            up: Vector3::y(),
            aspect: 16.0 / 9.0,
            fov: std::f32::consts::FRAC_PI_2, // 90 degrees
            z_near: Self::DEFAULT_Z_NEAR,
            z_far: Self::DEFAULT_Z_FAR,
            radius: Self::DEFAULT_RADIUS,
            polar: std::f32::consts::PI / 2.3,
            azimuth: std::f32::consts::FRAC_PI_2,
        }
    }

    /// Eye position on the orbit sphere, in the camera's local frame.
    pub fn eye_position(&self) -> Vector3<f32> {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        Vector3::new(
            cos_azimuth * sin_polar,
            cos_polar,
            sin_azimuth * sin_polar,
        ) * self.radius
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Set the orbit radius, clamped to the clip planes. NaN is ignored.
    pub fn set_radius(&mut self, radius: f32) {
        if radius.is_nan() {
            return;
        }
        self.radius = radius.clamp(self.z_near, self.z_far);
    }

    /// Move the eye towards the target by `delta` (negative moves away)
    pub fn zoom(&mut self, delta: f32) {
        self.set_radius(self.radius - delta);
    }

    pub fn z_near(&self) -> f32 {
        self.z_near
    }

    pub fn z_far(&self) -> f32 {
        self.z_far
    }

    /// Set both clip planes. `z_far` is raised to `z_near` if it is smaller.
    ///
    /// Non-finite planes are rejected and leave the camera unchanged.
    pub fn set_clip_planes(&mut self, z_near: f32, z_far: f32) -> Result<()> {
        if !z_near.is_finite() || !z_far.is_finite() {
            return Err(Error::state(format!(
                "clip planes must be finite, got {} and {}",
                z_near, z_far
            )));
        }
        self.z_near = z_near;
        self.z_far = z_far.max(z_near);
        self.set_radius(self.radius);
        Ok(())
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Transform::view(&self.eye_position(), &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Transform::projection(self.fov, self.aspect, self.z_near, self.z_far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new();
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(camera.radius(), 5.0);
        assert_eq!(camera.z_near(), 0.01);
        assert_eq!(camera.z_far(), 100.0);
        assert_eq!(camera.up, Vector3::y());
    }

    #[test]
    fn test_eye_position_magnitude_matches_radius() {
        let mut camera = Camera::new();
        for radius in [0.5, 1.0, 5.0, 42.0] {
            camera.set_radius(radius);
            assert!((camera.eye_position().norm() - radius).abs() < 1e-4);
        }
    }

    #[test]
    fn test_default_eye_position() {
        let camera = Camera::new();
        let eye = camera.eye_position();
        let polar = std::f32::consts::PI / 2.3;
        // Azimuth of 90 degrees puts the eye in the yz plane
        assert!(eye.x.abs() < 1e-5);
        assert!((eye.y - 5.0 * polar.cos()).abs() < 1e-5);
        assert!((eye.z - 5.0 * polar.sin()).abs() < 1e-5);
    }

    #[test]
    fn test_radius_clamped_to_near() {
        let mut camera = Camera::new();
        camera.set_radius(0.0);
        assert_eq!(camera.radius(), camera.z_near());
        assert!((camera.eye_position().norm() - camera.z_near()).abs() < 1e-6);
    }

    #[test]
    fn test_radius_clamped_to_far() {
        let mut camera = Camera::new();
        camera.set_radius(1000.0);
        assert_eq!(camera.radius(), camera.z_far());
        assert!((camera.eye_position().norm() - camera.z_far()).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_moves_towards_target_and_clamps() {
        let mut camera = Camera::new();
        camera.zoom(1.5);
        assert!((camera.radius() - 3.5).abs() < 1e-6);

        camera.zoom(-2.0);
        assert!((camera.radius() - 5.5).abs() < 1e-6);

        camera.zoom(100.0);
        assert_eq!(camera.radius(), camera.z_near());
    }

    #[test]
    fn test_clip_planes_reclamp_radius() {
        let mut camera = Camera::new();
        camera.set_clip_planes(0.1, 2.0).unwrap();
        assert_eq!(camera.radius(), 2.0);

        camera.set_clip_planes(3.0, 1.0).unwrap();
        assert_eq!(camera.z_far(), 3.0);
        assert_eq!(camera.radius(), 3.0);
    }

    #[test]
    fn test_eye_position_is_idempotent() {
        let camera = Camera::new();
        assert_eq!(camera.eye_position(), camera.eye_position());
    }

    #[test]
    fn test_non_finite_clip_planes_are_rejected() {
        let mut camera = Camera::new();
        assert!(matches!(
            camera.set_clip_planes(f32::NAN, 10.0),
            Err(Error::State { .. })
        ));
        assert!(camera.set_clip_planes(0.1, f32::INFINITY).is_err());
        assert_eq!(camera.z_near(), Camera::DEFAULT_Z_NEAR);
        assert_eq!(camera.z_far(), Camera::DEFAULT_Z_FAR);
        assert_eq!(camera.radius(), Camera::DEFAULT_RADIUS);
    }

    #[test]
    fn test_nan_radius_is_ignored() {
        let mut camera = Camera::new();
        camera.set_radius(f32::NAN);
        camera.zoom(f32::NAN);
        assert_eq!(camera.radius(), Camera::DEFAULT_RADIUS);
    }

    #[test]
    fn test_default_view_matrix() {
        let camera = Camera::new();
        let view = camera.view_matrix();
        let eye = camera.eye_position();
        let row = |r: usize| Vector3::new(view[(r, 0)], view[(r, 1)], view[(r, 2)]);

        assert_relative_eq!(row(0), Vector3::x(), epsilon = 1e-6);
        // Up is used as given
        assert_eq!(row(1), camera.up);
        assert_relative_eq!(view[(1, 3)], -eye.y, epsilon = 1e-6);
        assert_relative_eq!(row(2), eye / Camera::DEFAULT_RADIUS, epsilon = 1e-6);
        assert_relative_eq!(view[(2, 3)], -Camera::DEFAULT_RADIUS, epsilon = 1e-5);
        assert_eq!(view[(3, 3)], 1.0);
    }
}
