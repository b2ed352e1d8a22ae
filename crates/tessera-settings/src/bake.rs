//! Baking: encoding material parameters into a slot's texel grid.
//!
//! The exact inverse of [`fetch_settings`](crate::fetch_settings), used to
//! produce well-formed settings textures for tests, tooling, and upload.

use glam::{Vec2, Vec3, Vec4};

use crate::grid::{SlotCoord, SLOT_TEXELS_X, SLOT_TEXELS_Y};
use crate::image::{SettingsImage, Texel};

// ---------------------------------------------------------------------------
// SlotSpec
// ---------------------------------------------------------------------------

/// Authoring-space values for one material slot.
///
/// Quantities are in decoded units; quantization to the texel layout happens
/// in [`bake_slot`]. Out-of-range values are masked/saturated, never errors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSpec {
    /// Atlas tile origin for the first texture channel, 9-bit grid units.
    pub origin1: [u16; 2],
    /// Atlas tile origin for the second texture channel, 9-bit grid units.
    pub origin2: [u16; 2],
    /// Slot extent in tile-scale units (multiplied by the atlas tile scale
    /// at decode time to give texels).
    pub size_units: [u8; 2],
    /// Wrap-mode byte: bits 0–1 clamp X/Y, bits 2–3 repeat X/Y, neither
    /// mirrors.
    pub wrapping: u8,
    /// UV scroll velocity per time unit.
    pub uv_anim: Vec2,
    /// Specular response scale, `[0, 257]`.
    pub specular: f32,
    /// Normal-map steepness scale, `[-8, 17.7]`.
    pub normal_scale: f32,
    /// Refraction parameters (strength, depth scale in `[1, 3]`, offset in
    /// `[0, 10]`).
    pub refraction: Vec3,
    /// Viewport-map UV scale (xy) and scroll (zw).
    pub viewport_map_uv_scale_and_anim: Vec4,
    /// Debug material id.
    pub material_id: u16,
}

impl Default for SlotSpec {
    fn default() -> Self {
        Self {
            origin1: [0, 0],
            origin2: [0, 0],
            size_units: [1, 1],
            wrapping: 0,
            uv_anim: Vec2::ZERO,
            specular: 0.0,
            normal_scale: 0.0,
            refraction: Vec3::new(0.0, 1.0, 0.0),
            viewport_map_uv_scale_and_anim: Vec4::ZERO,
            material_id: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// bake_slot
// ---------------------------------------------------------------------------

fn split_u16(v: u16) -> (u8, u8) {
    ((v >> 8) as u8, (v & 0xff) as u8)
}

fn signed16(v: f32) -> u16 {
    // Recenter around the 32767 bias; half the signed range per unit.
    (v * 32767.0 / 2.0 + 32767.0).round().clamp(0.0, 65535.0) as u16
}

fn byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Writes `spec` into the 3×4 texel grid of `slot`.
pub fn bake_slot(image: &mut SettingsImage, slot: SlotCoord, spec: &SlotSpec) {
    let (sx, sy) = slot.texel_origin();
    let mut put = |dx: u32, dy: u32, t: Texel| {
        debug_assert!(dx < SLOT_TEXELS_X && dy < SLOT_TEXELS_Y);
        image.set_texel(sx + dx, sy + dy, t);
    };

    // (0,0): origin low bytes; ninth bits go into the etc nibble.
    let o = [
        spec.origin1[0] & 0x1ff,
        spec.origin1[1] & 0x1ff,
        spec.origin2[0] & 0x1ff,
        spec.origin2[1] & 0x1ff,
    ];
    put(
        0,
        0,
        Texel {
            r: (o[0] & 0xff) as u8,
            g: (o[1] & 0xff) as u8,
            b: (o[2] & 0xff) as u8,
            a: (o[3] & 0xff) as u8,
        },
    );
    let etc = ((o[0] >> 8) | (o[1] >> 8 << 1) | (o[2] >> 8 << 2) | (o[3] >> 8 << 3)) as u8;
    put(1, 2, Texel { r: 0, g: 0, b: 0, a: etc });

    // (2,0): slot extents and the wrap byte.
    put(
        2,
        0,
        Texel {
            r: spec.size_units[0],
            g: spec.size_units[1],
            b: 0,
            a: spec.wrapping,
        },
    );

    // (0,1): UV scroll, two biased signed-16 values.
    let (axh, axl) = split_u16(signed16(spec.uv_anim.x));
    let (ayh, ayl) = split_u16(signed16(spec.uv_anim.y));
    put(0, 1, Texel { r: axh, g: axl, b: ayh, a: ayl });

    // (1,1): specular and normal scale, 16-bit each.
    let (sh, sl) = split_u16((spec.specular * 255.0).round().clamp(0.0, 65535.0) as u16);
    let (nh, nl) = split_u16(
        ((spec.normal_scale + 8.0) * 10.0 * 255.0)
            .round()
            .clamp(0.0, 65535.0) as u16,
    );
    put(1, 1, Texel { r: sh, g: sl, b: nh, a: nl });

    // (0,2): refraction: strength byte, recentred depth-scale byte, 16-bit
    // offset. The low offset byte doubles as the decoded w channel.
    let (rh, rl) = split_u16(
        (spec.refraction.z / 10.0 * 65535.0)
            .round()
            .clamp(0.0, 65535.0) as u16,
    );
    put(
        0,
        2,
        Texel {
            r: byte(spec.refraction.x),
            g: byte((spec.refraction.y - 1.0) / 2.0),
            b: rh,
            a: rl,
        },
    );

    // (2,2) + (0,3): viewport-map scale and scroll.
    let v = spec.viewport_map_uv_scale_and_anim;
    let (vsxh, vsxl) = split_u16(signed16(v.x));
    let (vsyh, vsyl) = split_u16(signed16(v.y));
    put(2, 2, Texel { r: vsxh, g: vsxl, b: vsyh, a: vsyl });
    let (vaxh, vaxl) = split_u16(signed16(v.z));
    let (vayh, vayl) = split_u16(signed16(v.w));
    put(0, 3, Texel { r: vaxh, g: vaxl, b: vayh, a: vayl });

    // (2,3): debug material id.
    let (dh, dl) = split_u16(spec.material_id);
    put(2, 3, Texel { r: dh, g: dl, b: 0, a: 0 });
}
