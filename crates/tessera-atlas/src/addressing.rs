//! Tile-local UV wrapping: clamp, repeat, mirror, and the per-material
//! dynamic blend of all three.

use glam::{Vec2, Vec4};

// ---------------------------------------------------------------------------
// AddressingMode
// ---------------------------------------------------------------------------

/// UV addressing mode for atlas tiles.
///
/// `Clamp` and `Repeat` are fixed pipeline-wide choices; `Dynamic` defers to
/// each material's wrap byte, selecting clamp/repeat per axis and falling
/// through to mirror when neither bit is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AddressingMode {
    /// Clamp into the tile interior (inset by half a texel).
    Clamp,
    /// Tile repeats: UV 1.25 addresses the same texel as 0.25.
    #[default]
    Repeat,
    /// Per-material selection from the wrap byte.
    Dynamic,
}

// ---------------------------------------------------------------------------
// WrapMask
// ---------------------------------------------------------------------------

/// Per-axis wrap selection decoded from a material's wrap byte.
///
/// Bit 0/1: clamp X/Y. Bit 2/3: repeat X/Y. An axis with neither bit set
/// mirrors. The decode mirrors the shader's fractional bit extraction so
/// non-integer wrap values degrade identically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrapMask {
    /// 1.0 where the axis clamps, else 0.0.
    pub clamp: Vec2,
    /// 1.0 where the axis repeats, else 0.0.
    pub repeat: Vec2,
}

impl WrapMask {
    /// Extracts the wrap mask from the wrap byte.
    pub fn from_wrapping(wrapping: f32) -> Self {
        let bit = |scale: f32| {
            let x = wrapping * scale;
            if x - x.floor() >= 0.5 { 1.0 } else { 0.0 }
        };
        let bits = Vec4::new(bit(0.5), bit(0.25), bit(0.125), bit(0.0625));
        Self {
            clamp: Vec2::new(bits.x, bits.y),
            repeat: Vec2::new(bits.z, bits.w),
        }
    }
}

fn clamp_inset(uv: Vec2, inset: f32) -> Vec2 {
    uv.clamp(Vec2::splat(inset), Vec2::ONE - Vec2::splat(inset))
}

fn repeat(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x.rem_euclid(1.0), uv.y.rem_euclid(1.0))
}

fn mirror(uv: Vec2) -> Vec2 {
    let a = uv - 2.0 * (uv * 0.5).floor();
    Vec2::ONE - (Vec2::ONE - a).abs()
}

/// Wraps a tile-local UV according to the addressing mode.
///
/// `inset` is the half-texel border (`0.5 / tile_extent_texels`) that keeps
/// clamped samples from bleeding into neighbouring tiles; `wrapping` is the
/// material's wrap byte, consulted only in [`AddressingMode::Dynamic`].
pub fn wrap_uv(mode: AddressingMode, uv: Vec2, inset: f32, wrapping: f32) -> Vec2 {
    match mode {
        AddressingMode::Clamp => clamp_inset(uv, inset),
        AddressingMode::Repeat => repeat(uv),
        AddressingMode::Dynamic => {
            let mask = WrapMask::from_wrapping(wrapping);
            let c = clamp_inset(uv, inset);
            let r = repeat(uv);
            let m = mirror(uv);
            mask.clamp * c + mask.repeat * r + (Vec2::ONE - mask.clamp - mask.repeat) * m
        }
    }
}
