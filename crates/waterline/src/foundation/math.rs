//! Math utilities and types
//!
//! Provides the matrix construction routines the render pipeline is built
//! on: affine transform matrices composed in a fixed order, the symmetric
//! perspective projection, and the in-place left-multiply they share.
//!
//! Matrices are plain column-major values (nalgebra's native layout); every
//! matrix is rebuilt from scratch each frame, so no renormalization of
//! rotation terms is performed.

pub use nalgebra::{Matrix4, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Build an affine transform from translation, Euler rotation, and uniform
/// scale.
///
/// The result is the product of {scale, rotation Z, rotation Y, rotation X,
/// translation} composed in that fixed order through [`left_mul_matrix4`],
/// i.e. `T * Rx * Ry * Rz * S` applied to column vectors.
///
/// With `inverse` set, the factors are composed in the opposite order
/// (translation first), which yields the inverse transform of the same pose
/// when `scale` is 1. Camera matrices are built this way from the negated
/// camera position and rotation; the scale factor is deliberately not
/// reciprocated, so the result is only a valid inverse for pure
/// rotation+translation poses.
pub fn create_trans_matrix(translation: Vec3, rotation: Vec3, scale: f32, inverse: bool) -> Mat4 {
    let factors = [
        Mat4::new_scaling(scale),
        Mat4::from_axis_angle(&Vec3::z_axis(), rotation.z),
        Mat4::from_axis_angle(&Vec3::y_axis(), rotation.y),
        Mat4::from_axis_angle(&Vec3::x_axis(), rotation.x),
        Mat4::new_translation(&translation),
    ];

    let mut acc = Mat4::identity();
    if inverse {
        for factor in factors.iter().rev() {
            left_mul_matrix4(&mut acc, factor);
        }
    } else {
        for factor in &factors {
            left_mul_matrix4(&mut acc, factor);
        }
    }
    acc
}

/// Build a symmetric perspective projection matrix.
///
/// Horizontal and vertical scales are `1/tan(fov/2)`, with the horizontal
/// term additionally divided by the aspect ratio. Depth maps through
/// `-(far+near)/(far-near)` and `-2*far*near/(far-near)`, with the
/// homogeneous divide encoded by the `-1` in the w-row.
///
/// The projection depends only on session constants and is computed once at
/// renderer initialization, then shared read-only across all shaders.
pub fn create_proj_matrix(aspect_ratio: f32, fov_radians: f32, z_near: f32, z_far: f32) -> Mat4 {
    let focal = 1.0 / (fov_radians * 0.5).tan();
    let depth_scale = -(z_far + z_near) / (z_far - z_near);
    let depth_offset = -2.0 * z_far * z_near / (z_far - z_near);

    Mat4::new(
        focal / aspect_ratio, 0.0, 0.0, 0.0,
        0.0, focal, 0.0, 0.0,
        0.0, 0.0, depth_scale, depth_offset,
        0.0, 0.0, -1.0, 0.0,
    )
}

/// In-place left-multiplication: `acc = left * acc`.
///
/// All matrix composition in the engine funnels through this routine so
/// every call site agrees on the same storage order and associativity.
pub fn left_mul_matrix4(acc: &mut Mat4, left: &Mat4) {
    *acc = left * *acc;
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }
}
