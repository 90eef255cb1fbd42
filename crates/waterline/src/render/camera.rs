//! Camera state and per-frame camera matrix derivation
//!
//! The camera collaborator owns movement and input; the renderer only reads
//! a [`CameraState`] snapshot each frame and derives two matrices from it:
//! the inverse-view matrix of the real camera, and the inverse-view matrix
//! of the camera mirrored across the water plane for the reflection pass.

use crate::foundation::math::{create_trans_matrix, Mat4, Vec3};

/// Camera pose snapshot: position plus Euler rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Position in world space
    pub position: Vec3,
    /// Euler rotation (pitch, yaw, roll) in radians
    pub rotation: Vec3,
}

impl CameraState {
    /// Create a camera pose
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// The pose of this camera mirrored across the horizontal plane at
    /// `water_height`: vertical position reflected to `2h - y`, pitch
    /// negated, yaw and roll preserved. This is the camera that sees the
    /// mirror image of the scene in the water surface.
    pub fn mirrored_across(&self, water_height: f32) -> CameraState {
        CameraState {
            position: Vec3::new(
                self.position.x,
                2.0 * water_height - self.position.y,
                self.position.z,
            ),
            rotation: Vec3::new(-self.rotation.x, self.rotation.y, self.rotation.z),
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
        }
    }
}

/// Inverse-view matrix of the given camera pose.
///
/// Built from the negated position and rotation with the inverse
/// composition order; exact for the scale-free poses cameras have.
pub fn view_matrix(camera: &CameraState) -> Mat4 {
    create_trans_matrix(-camera.position, -camera.rotation, 1.0, true)
}

/// Inverse-view matrix of the camera mirrored across the water plane.
pub fn reflection_view_matrix(camera: &CameraState, water_height: f32) -> Mat4 {
    view_matrix(&camera.mirrored_across(water_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn mirrored_camera_reflects_height_and_negates_pitch() {
        let camera = CameraState::new(Vec3::new(3.0, 7.0, -1.0), Vec3::new(0.4, 1.2, -0.3));
        let mirrored = camera.mirrored_across(2.0);

        assert_eq!(mirrored.position.x, 3.0);
        assert_eq!(mirrored.position.y, 2.0 * 2.0 - 7.0);
        assert_eq!(mirrored.position.z, -1.0);
        assert_eq!(mirrored.rotation.x, -0.4);
        assert_eq!(mirrored.rotation.y, 1.2);
        assert_eq!(mirrored.rotation.z, -0.3);
    }

    #[test]
    fn mirroring_twice_restores_the_pose() {
        let camera = CameraState::new(Vec3::new(1.0, 5.0, 2.0), Vec3::new(0.2, 0.8, 0.1));
        let twice = camera.mirrored_across(-3.0).mirrored_across(-3.0);
        assert_eq!(twice, camera);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = CameraState::new(Vec3::new(2.0, 3.0, 4.0), Vec3::zeros());
        let view = view_matrix(&camera);
        let origin = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin.x, -2.0, epsilon = 1e-6);
        assert_relative_eq!(origin.y, -3.0, epsilon = 1e-6);
        assert_relative_eq!(origin.z, -4.0, epsilon = 1e-6);
    }

    #[test]
    fn view_matrix_inverts_the_camera_pose() {
        let camera = CameraState::new(Vec3::new(1.0, -2.0, 3.5), Vec3::new(0.3, -0.9, 0.2));
        let pose = create_trans_matrix(camera.position, camera.rotation, 1.0, false);
        let view = view_matrix(&camera);
        assert_relative_eq!(view * pose, Mat4::identity(), epsilon = 1e-5);
    }

    #[test]
    fn reflection_view_matches_view_of_mirrored_camera() {
        let camera = CameraState::new(Vec3::new(0.0, 6.0, -2.0), Vec3::new(0.5, 0.0, 0.0));
        let direct = reflection_view_matrix(&camera, 1.0);
        let via_pose = view_matrix(&camera.mirrored_across(1.0));
        assert_eq!(direct, via_pose);
    }
}
