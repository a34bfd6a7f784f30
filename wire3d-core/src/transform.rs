/// 3D transformation matrices and rotation state
///
/// All matrices act on column vectors (`m * v`). A chain applied as
/// model, then view, then projection, then viewport is therefore written
/// `viewport * projection * view * model`.
use nalgebra::{Matrix4, Vector3};

/// Model orientation as angles in radians, applied about x, then y, then z
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Add per-axis deltas, as produced by one drag step
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        *self = Self::new(self.x + dx, self.y + dy, self.z + dz);
    }
}

/// Transform builder for the model, view, projection and viewport stages
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    #[rustfmt::skip]
    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, offset.x,
            0.0, 1.0, 0.0, offset.y,
            0.0, 0.0, 1.0, offset.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Create a scale matrix
    #[rustfmt::skip]
    pub fn scale(factors: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new(
            factors.x, 0.0, 0.0, 0.0,
            0.0, factors.y, 0.0, 0.0,
            0.0, 0.0, factors.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_x(angle: f32) -> Matrix4<f32> {
        let (sin, cos) = angle.sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, cos, -sin, 0.0,
            0.0, sin, cos, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_y(angle: f32) -> Matrix4<f32> {
        let (sin, cos) = angle.sin_cos();
        Matrix4::new(
            cos, 0.0, sin, 0.0,
            0.0, 1.0, 0.0, 0.0,
            -sin, 0.0, cos, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[rustfmt::skip]
    pub fn rotation_z(angle: f32) -> Matrix4<f32> {
        let (sin, cos) = angle.sin_cos();
        Matrix4::new(
            cos, -sin, 0.0, 0.0,
            sin, cos, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Create a rotation matrix from a rotation state
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        // X, then Y, then Z intrinsic
        Self::rotation_x(rotation.x) * Self::rotation_y(rotation.y) * Self::rotation_z(rotation.z)
    }

    /// Create the model (object to world) matrix: scale first, translation last
    pub fn model(
        scale: &Vector3<f32>,
        rotation: &RotationState,
        translation: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(translation) * Self::rotation_matrix(rotation) * Self::scale(scale)
    }

    /// Create a right-handed look-at matrix.
    ///
    /// The `up` vector is used as the camera y axis as given; it is not
    /// re-orthogonalised against the forward and right axes, so the basis is
    /// only orthonormal when `up` is already perpendicular to `eye - target`.
    #[rustfmt::skip]
    pub fn view(eye: &Vector3<f32>, target: &Vector3<f32>, up: &Vector3<f32>) -> Matrix4<f32> {
        let z_axis = (eye - target).normalize();
        let x_axis = up.cross(&z_axis).normalize();
        let y_axis = *up;

        Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, -x_axis.dot(eye),
            y_axis.x, y_axis.y, y_axis.z, -y_axis.dot(eye),
            z_axis.x, z_axis.y, z_axis.z, -z_axis.dot(eye),
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Create a perspective projection matrix.
    ///
    /// `fov` is the vertical field of view in radians. The resulting `w` is the
    /// negated view-space `z`, i.e. the distance in front of the camera.
    #[rustfmt::skip]
    pub fn projection(fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Matrix4<f32> {
        let tan_half_fov = (fov / 2.0).tan();

        let m00 = 1.0 / (aspect * tan_half_fov);
        let m11 = 1.0 / tan_half_fov;
        let m22 = z_far / (z_near - z_far);
        let m23 = z_near * z_far / (z_near - z_far);

        Matrix4::new(
            m00, 0.0, 0.0, 0.0,
            0.0, m11, 0.0, 0.0,
            0.0, 0.0, m22, m23,
            0.0, 0.0, -1.0, 0.0,
        )
    }

    /// Create the projection to pixel-space matrix. Screen y grows downwards.
    #[rustfmt::skip]
    pub fn viewport(width: f32, height: f32, x_min: f32, y_min: f32) -> Matrix4<f32> {
        Matrix4::new(
            width / 2.0, 0.0, 0.0, x_min + width / 2.0,
            0.0, -height / 2.0, 0.0, y_min + height / 2.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_drag_steps_accumulate_into_one_rotation() {
        let mut rotation = RotationState::default();
        for _ in 0..4 {
            rotation.rotate(FRAC_PI_2 / 4.0, 0.0, -0.25);
        }
        assert_eq!(rotation.y, 0.0);
        assert_relative_eq!(
            Transform::rotation_matrix(&rotation),
            Transform::rotation_x(FRAC_PI_2) * Transform::rotation_z(-1.0),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_default_rotation_leaves_points_in_place() {
        let matrix = Transform::rotation_matrix(&RotationState::default());
        let point = Vector4::new(0.5, -2.0, 3.0, 1.0);
        assert_eq!(matrix * point, point);
    }

    #[test]
    fn test_translation_moves_points_not_directions() {
        let m = Transform::translation(&Vector3::new(1.0, 2.0, 3.0));
        let point = m * Vector4::new(1.0, 1.0, 1.0, 1.0);
        let direction = m * Vector4::new(1.0, 1.0, 1.0, 0.0);
        assert_relative_eq!(point, Vector4::new(2.0, 3.0, 4.0, 1.0));
        assert_relative_eq!(direction, Vector4::new(1.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotations_are_right_handed() {
        let x = Vector4::new(1.0, 0.0, 0.0, 1.0);
        let y = Vector4::new(0.0, 1.0, 0.0, 1.0);
        let z = Vector4::new(0.0, 0.0, 1.0, 1.0);

        assert_relative_eq!(Transform::rotation_z(FRAC_PI_2) * x, y, epsilon = 1e-6);
        assert_relative_eq!(Transform::rotation_x(FRAC_PI_2) * y, z, epsilon = 1e-6);
        assert_relative_eq!(Transform::rotation_y(FRAC_PI_2) * z, x, epsilon = 1e-6);
    }

    #[test]
    fn test_model_applies_scale_then_rotation_then_translation() {
        let model = Transform::model(
            &Vector3::new(2.0, 2.0, 2.0),
            &RotationState::new(0.0, 0.0, FRAC_PI_2),
            &Vector3::new(10.0, 0.0, 0.0),
        );
        let v = model * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // (1,0,0) -> scaled (2,0,0) -> rotated (0,2,0) -> translated (10,2,0)
        assert_relative_eq!(v, Vector4::new(10.0, 2.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_order_x_then_y_then_z() {
        let rotation = RotationState::new(0.3, -1.1, 2.0);
        let expected = Transform::rotation_x(0.3)
            * Transform::rotation_y(-1.1)
            * Transform::rotation_z(2.0);
        assert_relative_eq!(Transform::rotation_matrix(&rotation), expected);
    }

    #[test]
    fn test_view_moves_eye_to_origin() {
        let eye = Vector3::new(0.0, 0.0, 5.0);
        let view = Transform::view(&eye, &Vector3::zeros(), &Vector3::y());

        let at_eye = view * Vector4::new(0.0, 0.0, 5.0, 1.0);
        assert_relative_eq!(at_eye, Vector4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-6);

        // The target sits on the negative z axis in view space
        let at_target = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(at_target, Vector4::new(0.0, 0.0, -5.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_view_keeps_up_vector_unorthogonalised() {
        let eye = Vector3::new(0.0, 3.0, 4.0);
        let up = Vector3::new(0.0, 1.0, 0.0);
        let view = Transform::view(&eye, &Vector3::zeros(), &up);

        // Second row is exactly the supplied up vector
        assert_eq!(view[(1, 0)], 0.0);
        assert_eq!(view[(1, 1)], 1.0);
        assert_eq!(view[(1, 2)], 0.0);
        assert!((view[(1, 3)] + 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_projection_coefficients() {
        let (near, far) = (0.01, 100.0);
        let p = Transform::projection(FRAC_PI_2, 16.0 / 9.0, near, far);

        assert!((p[(0, 0)] - 9.0 / 16.0).abs() < 1e-6);
        assert!((p[(1, 1)] - 1.0).abs() < 1e-6);
        assert!((p[(2, 2)] - far / (near - far)).abs() < 1e-6);
        assert!((p[(2, 3)] - near * far / (near - far)).abs() < 1e-6);
        assert_eq!(p[(3, 2)], -1.0);
        assert_eq!(p[(3, 3)], 0.0);
    }

    #[test]
    fn test_projection_w_is_negated_view_z() {
        let p = Transform::projection(PI / 3.0, 1.0, 0.1, 10.0);
        let v = p * Vector4::new(0.5, 0.5, -4.0, 1.0);
        assert!((v.w - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_viewport_flips_y() {
        let vp = Transform::viewport(800.0, 600.0, 0.0, 0.0);
        let top_left = vp * Vector4::new(-1.0, 1.0, 0.5, 1.0);
        let bottom_right = vp * Vector4::new(1.0, -1.0, 0.5, 1.0);

        assert_relative_eq!(top_left, Vector4::new(0.0, 0.0, 0.5, 1.0));
        assert_relative_eq!(bottom_right, Vector4::new(800.0, 600.0, 0.5, 1.0));
        assert_eq!(vp[(1, 1)], -300.0);
    }

    #[test]
    fn test_viewport_offset() {
        let vp = Transform::viewport(100.0, 50.0, 10.0, 20.0);
        let center = vp * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(center, Vector4::new(60.0, 45.0, 0.0, 1.0));
    }
}
