//! Packing: scalar quantities split across normalized 8-bit texture channels.

use glam::{Vec2, Vec4};

// ---------------------------------------------------------------------------
// PackScheme
// ---------------------------------------------------------------------------

/// Bit-decomposition scheme used when splitting a float across RGBA channels.
///
/// The two schemes are mutually exclusive: a texel packed with one must be
/// unpacked with the same one. Which is in use is a per-pipeline choice, so
/// it is an explicit parameter here rather than a compile-time switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PackScheme {
    /// Modulo-based decomposition: each channel holds one base-256 digit of
    /// `value * 255 * 256^k`, most significant digit in red.
    #[default]
    Mod,
    /// Fractional decomposition (base 255 ladder), least significant scale in
    /// red. Named after the widely-circulated depth-packing trick.
    Aras,
}

fn fract(v: f32) -> f32 {
    v - v.floor()
}

/// Packs a float into a normalized RGBA texel.
///
/// The input is expected in `[0, 1)`; out-of-range values produce wrong but
/// defined output, never an error. Inverse of
/// [`unpack_rgba_to_float`](crate::unpack_rgba_to_float) within 8-bit
/// quantization error.
pub fn pack_float_to_rgba(scheme: PackScheme, value: f32) -> Vec4 {
    match scheme {
        PackScheme::Mod => {
            let bit_shift = Vec4::new(256.0 * 256.0 * 256.0, 256.0 * 256.0, 256.0, 1.0);
            let bit_mask = Vec4::new(0.0, 1.0 / 256.0, 1.0 / 256.0, 1.0 / 256.0);
            let scaled = value * bit_shift * 255.0;
            let c = Vec4::new(
                scaled.x.rem_euclid(256.0),
                scaled.y.rem_euclid(256.0),
                scaled.z.rem_euclid(256.0),
                scaled.w.rem_euclid(256.0),
            ) / 255.0;
            c - Vec4::new(c.x, c.x, c.y, c.z) * bit_mask
        }
        PackScheme::Aras => {
            let bit_shift = Vec4::new(1.0, 255.0, 65025.0, 16_581_375.0);
            let bit_mask = Vec4::new(1.0 / 255.0, 1.0 / 255.0, 1.0 / 255.0, 0.0);
            let scaled = value * bit_shift;
            let c = Vec4::new(
                fract(scaled.x),
                fract(scaled.y),
                fract(scaled.z),
                fract(scaled.w),
            );
            c - Vec4::new(c.x, c.x, c.y, c.z) * bit_mask
        }
    }
}

/// Packs a float in `[0, 1)` into two normalized 8-bit channels.
pub fn pack_float_to_vec2(value: f32) -> Vec2 {
    let mut r = Vec2::new(fract(value), fract(255.0 * value));
    r.x -= r.y * (1.0 / 255.0);
    r
}
