//! Surface frame reconstruction: tangent/bitangent from screen-space
//! derivatives and normal-map application.
//!
//! Degenerate derivative input (zero-area UV footprints, NaN positions) falls
//! back to the geometric normal instead of propagating NaN into lighting.

use glam::{Vec2, Vec3, Vec4};

/// Reconstructs tangent and bitangent from position and UV derivatives.
///
/// Returns `(tangent, bitangent)`, both scaled by a shared inverse square
/// root so their relative lengths encode UV anisotropy. Falls back to
/// `(normal, normal)` when the footprint is degenerate or non-finite.
pub fn tangent_bitangent_from_derivatives(
    normal: Vec3,
    dp_dx: Vec3,
    dp_dy: Vec3,
    duv_dx: Vec2,
    duv_dy: Vec2,
) -> (Vec3, Vec3) {
    let r1 = normal.cross(dp_dx);
    let r2 = dp_dy.cross(normal);
    let mut tangent = r2 * duv_dx.x + r1 * duv_dy.x;
    let mut bitangent = r2 * duv_dx.y + r1 * duv_dy.y;
    let t_sq = tangent.dot(tangent);
    let b_sq = bitangent.dot(bitangent);
    let max_sq = t_sq.max(b_sq);
    let inv = 1.0 / max_sq.sqrt();
    tangent *= inv;
    bitangent *= inv;
    if (t_sq + b_sq).is_nan() || max_sq <= 0.0 {
        tangent = normal;
        bitangent = normal;
    }
    (tangent, bitangent)
}

/// Bitangent from a normal and a 4-component tangent whose `w` carries
/// handedness.
pub fn compute_bitangent(normal: Vec3, tangent: Vec4) -> Vec3 {
    normal.cross(tangent.truncate()) * tangent.w
}

/// Perturbs a geometric normal by a decoded tangent-space normal using an
/// explicit TBN frame.
pub fn apply_normal_map_tbn(
    sampled: Vec3,
    normal: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
) -> Vec3 {
    (sampled.x * tangent + sampled.y * bitangent + sampled.z * normal).normalize()
}

/// Perturbs a geometric normal by a decoded tangent-space normal, deriving
/// the TBN frame from screen-space derivatives.
///
/// A near-zero result (the decoded normal cancelled the frame) returns the
/// geometric normal.
pub fn apply_normal_map(
    sampled: Vec3,
    normal: Vec3,
    dp_dx: Vec3,
    dp_dy: Vec3,
    duv_dx: Vec2,
    duv_dy: Vec2,
) -> Vec3 {
    let (tangent, bitangent) =
        tangent_bitangent_from_derivatives(normal, dp_dx, dp_dy, duv_dx, duv_dy);
    let r = (sampled.x * tangent + sampled.y * bitangent + sampled.z * normal).normalize();
    if r.x.abs() + r.y.abs() + r.z.abs() < 0.5 {
        normal
    } else {
        r
    }
}

/// Terrain variant: builds the frame from two world-axis reference vectors
/// instead of UV derivatives, guarding the result against NaN.
pub fn apply_normal_map_terrain(
    sampled: Vec3,
    normal: Vec3,
    axis_u: Vec3,
    axis_v: Vec3,
) -> Vec3 {
    let p = normal.cross(axis_u);
    let s = axis_v.cross(normal);
    let mut tangent = s * axis_u.x + p * axis_v.x;
    let mut bitangent = s * axis_u.z + p * axis_v.z;
    let inv = 1.0 / tangent.dot(tangent).max(bitangent.dot(bitangent)).sqrt();
    tangent *= inv;
    bitangent *= inv;
    let d = (sampled.x * tangent + sampled.y * bitangent + sampled.z * normal).normalize();
    if d.x.is_nan() { normal } else { d }
}
