//! Normal-vector encodings: sphere-map packing for G-buffer style storage and
//! tangent-space normal-map texel decoding.

use glam::{Vec2, Vec3};

/// How tangent-space normals are stored in the atlas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalEncoding {
    /// All three components stored; Z is read as-is.
    #[default]
    Full,
    /// Two components stored; Z is reconstructed from the unit-length
    /// constraint.
    Compressed,
}

/// Sphere-map encodes a unit normal into two values in `[0, 65535]`.
pub fn pack_normal_sphere_map(n: Vec3) -> Vec2 {
    let f = n.truncate().normalize() * (-n.z * 0.5 + 0.5).sqrt();
    (f * 0.5 + Vec2::splat(0.5)) * 65535.0
}

/// Decodes a sphere-map encoded normal from two values in `[0, 65535]`.
pub fn unpack_normal_sphere_map(v: Vec2) -> Vec3 {
    let mut f = glam::Vec4::new(v.x / 32767.0 - 1.0, v.y / 32767.0 - 1.0, 1.0, -1.0);
    let l = Vec3::new(f.x, f.y, f.z).dot(-Vec3::new(f.x, f.y, f.w));
    f.x *= l.sqrt();
    f.y *= l.sqrt();
    f.z = l;
    Vec3::new(f.x, f.y, f.z) * 2.0 + Vec3::new(0.0, 0.0, -1.0)
}

/// Decodes a two-channel tangent-space normal texel, reconstructing Z.
///
/// Channel layout matches the packed atlas convention: X comes from the
/// texel's blue channel and Y from red.
pub fn unpack_compressed_normal(texel: Vec3) -> Vec3 {
    let mut v = Vec3::new(
        texel.z * 255.0 / 127.0 - 1.00787,
        texel.x * 255.0 / 127.0 - 1.00787,
        0.0,
    );
    v.z = (1.0 - v.truncate().length_squared().min(1.0)).sqrt();
    v.y = -v.y;
    v
}

/// Decodes a tangent-space normal texel and scales its XY response.
///
/// `scale` is the per-material normal-scale parameter; values above 1 steepen
/// the decoded normal, values below 1 flatten it.
pub fn unpack_normal_scaled(texel: Vec3, scale: f32, encoding: NormalEncoding) -> Vec3 {
    let mut n = match encoding {
        NormalEncoding::Compressed => unpack_compressed_normal(texel),
        NormalEncoding::Full => {
            // Stored (y, z, x): swizzle back before bias.
            let mut v = Vec3::new(texel.z, texel.x, texel.y) * (255.0 / 127.0)
                - Vec3::splat(1.00787);
            v.y = -v.y;
            v
        }
    };
    n.x *= scale;
    n.y *= scale;
    n
}

/// Decodes a tangent-space normal texel at unit scale.
pub fn unpack_normal(texel: Vec3, encoding: NormalEncoding) -> Vec3 {
    unpack_normal_scaled(texel, 1.0, encoding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3, tol: f32) {
        assert!((a - b).length() < tol, "{a} !~ {b}");
    }

    #[test]
    fn test_sphere_map_round_trips_unit_normals() {
        let normals = [
            Vec3::new(0.6, 0.8, 0.0).normalize(),
            Vec3::new(0.3, -0.4, -0.5).normalize(),
            Vec3::new(-0.2, 0.9, -0.3).normalize(),
        ];
        for n in normals {
            let packed = pack_normal_sphere_map(n);
            let unpacked = unpack_normal_sphere_map(packed);
            assert_close(unpacked, n, 1e-3);
        }
    }

    #[test]
    fn test_compressed_normal_reconstructs_z() {
        // A flat normal (0, 0, 1) stored as 127/255 in both channels.
        let texel = Vec3::new(127.0 / 255.0, 0.0, 127.0 / 255.0);
        let n = unpack_compressed_normal(texel);
        assert!(n.z > 0.99, "flat texel should decode near +Z, got {n}");
    }

    #[test]
    fn test_normal_scale_amplifies_xy_only() {
        let texel = Vec3::new(160.0 / 255.0, 127.0 / 255.0, 140.0 / 255.0);
        let base = unpack_normal(texel, NormalEncoding::Full);
        let scaled = unpack_normal_scaled(texel, 2.0, NormalEncoding::Full);
        assert!((scaled.x - base.x * 2.0).abs() < 1e-6);
        assert!((scaled.y - base.y * 2.0).abs() < 1e-6);
        assert!((scaled.z - base.z).abs() < 1e-6);
    }
}
