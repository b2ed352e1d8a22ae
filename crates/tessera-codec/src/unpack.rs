//! Unpacking: reconstructing scalar quantities from normalized 8-bit channels.
//!
//! No routine here has an error path. Texel data that was never produced by
//! the matching pack routine yields wrong but defined numeric output.

use glam::{Vec2, Vec3, Vec4};

use crate::pack::PackScheme;

/// Reconstructs a float in `[0, 1)` from a normalized RGBA texel.
///
/// Must be called with the same [`PackScheme`] the texel was packed with.
pub fn unpack_rgba_to_float(scheme: PackScheme, texel: Vec4) -> f32 {
    match scheme {
        PackScheme::Mod => {
            let bit_shifts = Vec4::new(
                1.0 / (256.0 * 256.0 * 256.0),
                1.0 / (256.0 * 256.0),
                1.0 / 256.0,
                1.0,
            );
            texel.dot(bit_shifts)
        }
        PackScheme::Aras => {
            let bit_shifts = Vec4::new(1.0, 1.0 / 255.0, 1.0 / 65025.0, 1.0 / 16_581_375.0);
            texel.dot(bit_shifts)
        }
    }
}

/// Reconstructs a 32-bit unsigned integer stored big-endian across four
/// normalized channels.
pub fn unpack_rgba_to_integer_float(texel: Vec4) -> f32 {
    (texel.x * 255.0 + 0.5).floor() * 256.0 * 256.0 * 256.0
        + (texel.y * 255.0 + 0.5).floor() * 256.0 * 256.0
        + (texel.z * 255.0 + 0.5).floor() * 256.0
        + (texel.w * 255.0 + 0.5).floor()
}

/// Reconstructs a 16-bit unsigned integer (as a float in `[0, 65535]`) from
/// two normalized channels, high byte first.
pub fn unpack_vec2_to_float(v: Vec2) -> f32 {
    (v.x * 255.0 + 0.5).floor() * 256.0 + (v.y * 255.0 + 0.5).floor()
}

/// Splits a 24-bit colour integer into normalized RGB.
pub fn colour_unpack(value: f32) -> Vec3 {
    let r = (value / 256.0 / 256.0).floor();
    let g = ((value - r * 256.0 * 256.0) / 256.0).floor();
    let b = (value - r * 256.0 * 256.0 - g * 256.0).floor();
    Vec3::new(r, g, b) / 256.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_vec2_reconstructs_u16() {
        for value in [0u16, 1, 255, 256, 4660, 32767, 65535] {
            let hi = (value >> 8) as f32 / 255.0;
            let lo = (value & 0xff) as f32 / 255.0;
            let got = unpack_vec2_to_float(Vec2::new(hi, lo));
            assert_eq!(got, value as f32);
        }
    }

    #[test]
    fn test_unpack_integer_float_reconstructs_bytes() {
        let texel = Vec4::new(1.0 / 255.0, 2.0 / 255.0, 3.0 / 255.0, 4.0 / 255.0);
        let expected = (1u32 << 24 | 2 << 16 | 3 << 8 | 4) as f32;
        assert_eq!(unpack_rgba_to_integer_float(texel), expected);
    }

    #[test]
    fn test_colour_unpack_splits_24_bit() {
        // 0xff8040
        let c = colour_unpack(0x00ff_8040 as f32);
        assert!((c.x - 255.0 / 256.0).abs() < 1e-6);
        assert!((c.y - 128.0 / 256.0).abs() < 1e-6);
        assert!((c.z - 64.0 / 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_unpack_zero_texel_is_zero() {
        for scheme in [PackScheme::Mod, PackScheme::Aras] {
            assert_eq!(unpack_rgba_to_float(scheme, Vec4::ZERO), 0.0);
        }
        assert_eq!(unpack_vec2_to_float(Vec2::ZERO), 0.0);
    }
}
