//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly.

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Convert Euler angles in degrees to a quaternion.
///
/// Rotations are intrinsic X, then Y, then Z: `q = Rx(x) · Ry(y) · Rz(z)`.
pub fn euler_degrees_to_quat(degrees: Vec3) -> Quat {
    Quat::from_rotation_x(degrees.x.to_radians())
        * Quat::from_rotation_y(degrees.y.to_radians())
        * Quat::from_rotation_z(degrees.z.to_radians())
}

/// Compose a local matrix as translate · rotate · scale.
pub fn compose_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}
