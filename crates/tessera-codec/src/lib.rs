//! Packed-value codec: float/vector quantities packed into normalized 8-bit
//! texture channels, and the colour-space conversions that ride along with them.
//!
//! Every routine here is the CPU mirror of a GPU-side decode, so the math is
//! kept bit-for-bit faithful to the shader formulation (including its odd
//! constants) rather than cleaned up.

mod convert;
mod normal;
mod pack;
mod unpack;

pub use convert::{
    hsl_to_rgb, linear_to_srgb, linear_to_srgb_legacy, linear_to_srgb_scalar, rgb_to_hsl,
    srgb_to_linear, srgb_to_linear_fast,
};
pub use normal::{
    NormalEncoding, pack_normal_sphere_map, unpack_compressed_normal, unpack_normal,
    unpack_normal_scaled, unpack_normal_sphere_map,
};
pub use pack::{PackScheme, pack_float_to_rgba, pack_float_to_vec2};
pub use unpack::{
    colour_unpack, unpack_rgba_to_float, unpack_rgba_to_integer_float, unpack_vec2_to_float,
};

/// Bias used to recenter signed 16-bit quantities stored as unsigned byte pairs.
pub const SIGNED_16_BIAS: f32 = 32767.0;

/// Reciprocal of [`SIGNED_16_BIAS`], the matching rescale factor.
pub const INV_SIGNED_16_BIAS: f32 = 1.0 / 32767.0;
