//! Small vector helpers matching the conventions of the host engine.

use glam::{Mat3, Quat, Vec3};

/// Squared-length product below which an angle is treated as undefined (returns 0).
const DEGENERATE_EPSILON: f32 = 1e-15;

/// Unsigned angle between two vectors in degrees, in [0, 180].
///
/// Returns 0 when either vector is (near) zero length instead of NaN.
pub fn angle_degrees(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom < DEGENERATE_EPSILON {
        return 0.0;
    }
    let cos = (a.dot(b) / denom).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Sign that treats zero as positive.
pub fn sign_non_zero(x: f32) -> f32 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

/// Clamp into [0, 1].
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Rotation whose +Z axis points along `forward` and whose +Y axis is as close
/// to `up` as possible. Falls back to identity for a zero forward.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let f = forward.normalize_or_zero();
    if f == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut r = up.cross(f);
    if r.length_squared() < 1e-12 {
        // up parallel to forward: pick any perpendicular
        r = f.any_orthonormal_vector();
    }
    let r = r.normalize();
    let u = f.cross(r);
    Quat::from_mat3(&Mat3::from_cols(r, u, f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_of_perpendicular_vectors() {
        let a = angle_degrees(Vec3::X, Vec3::Y);
        assert!((a - 90.0).abs() < 1e-4);
    }

    #[test]
    fn angle_of_opposite_vectors() {
        let a = angle_degrees(Vec3::X, -Vec3::X);
        assert!((a - 180.0).abs() < 1e-3);
    }

    #[test]
    fn angle_with_zero_vector_is_zero() {
        assert_eq!(angle_degrees(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn sign_of_zero_is_positive() {
        assert_eq!(sign_non_zero(0.0), 1.0);
        assert_eq!(sign_non_zero(-0.5), -1.0);
    }

    #[test]
    fn look_rotation_maps_z_to_forward() {
        let fwd = Vec3::new(-1.0, 0.0, 0.0);
        let q = look_rotation(fwd, Vec3::Y);
        assert!((q * Vec3::Z - fwd).length() < 1e-5);
        assert!((q * Vec3::Y - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn look_rotation_handles_parallel_up() {
        let q = look_rotation(Vec3::Y, Vec3::Y);
        assert!((q * Vec3::Z - Vec3::Y).length() < 1e-5);
    }
}
