//! Decoding a material slot's texel grid into a [`MaterialSettings`] record.

use glam::{IVec2, Vec2, Vec3, Vec4};

use tessera_codec::{INV_SIGNED_16_BIAS, SIGNED_16_BIAS, unpack_vec2_to_float};

use crate::grid::SlotCoord;
use crate::image::SettingsImage;

// Texel offsets of each packed field within a slot's 3×4 grid.
const OFFSET_SLOT_SIZES_AND_WRAPPING: IVec2 = IVec2::new(2, 0);
const OFFSET_UV_ANIM: IVec2 = IVec2::new(0, 1);
const OFFSET_SPECULAR_NORMAL_SCALE: IVec2 = IVec2::new(1, 1);
const OFFSET_REFRACTION: IVec2 = IVec2::new(0, 2);
const OFFSET_SLOT_ETC: IVec2 = IVec2::new(1, 2);
const OFFSET_VIEWPORT_MAP_UV_SCALE: IVec2 = IVec2::new(2, 2);
const OFFSET_VIEWPORT_MAP_UV_ANIM: IVec2 = IVec2::new(0, 3);
const OFFSET_DEBUG: IVec2 = IVec2::new(2, 3);

// ---------------------------------------------------------------------------
// FetchStrategy
// ---------------------------------------------------------------------------

/// How per-field texels are addressed relative to the slot base.
///
/// Hardware targets use integer texel offsets; targets without offset
/// fetches fold the offset into UV arithmetic. The two must decode
/// identically for the same texture content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Integer texel offsets applied after UV→texel conversion.
    #[default]
    TexelOffset,
    /// Offsets converted to UV deltas before the fetch.
    ManualUv,
}

// ---------------------------------------------------------------------------
// ShadingFeatures
// ---------------------------------------------------------------------------

/// Which optional material fields the current pipeline wants decoded.
///
/// Replaces the shader-variant preprocessor flags: fields whose feature is
/// off are defaulted instead of fetched, exactly as the disabled code paths
/// left them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadingFeatures {
    /// Specular lighting response is evaluated.
    pub specular_lighting: bool,
    /// Normal maps are sampled.
    pub normal_map: bool,
    /// Refractive materials are supported.
    pub refraction: bool,
    /// Viewport-map (screen-space projected texture) materials are supported.
    pub viewport_map: bool,
    /// Debug material-id highlighting is active.
    pub material_highlight: bool,
}

impl ShadingFeatures {
    /// Every optional field decoded.
    pub const ALL: ShadingFeatures = ShadingFeatures {
        specular_lighting: true,
        normal_map: true,
        refraction: true,
        viewport_map: true,
        material_highlight: true,
    };

    /// Specular and normal-scale parameters share one packed texel; either
    /// feature pulls it in.
    pub fn surface_response(&self) -> bool {
        self.specular_lighting || self.normal_map
    }
}

// ---------------------------------------------------------------------------
// MaterialSettings
// ---------------------------------------------------------------------------

/// Per-material parameters decoded from one settings slot.
///
/// Immutable for the duration of a draw: a pure function of the settings
/// texture contents and the slot coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialSettings {
    /// Atlas tile origin (x, y in atlas grid units) and X extent in texels
    /// for the first texture channel.
    pub texture_meta1: Vec3,
    /// Same for the second texture channel; `z` is the Y extent in texels.
    pub texture_meta2: Vec3,
    /// UV scroll velocity per time unit.
    pub uv_anim: Vec2,
    /// Wrap-mode byte; low four bits select per-axis clamp/repeat, the
    /// remainder mirrors.
    pub wrapping: f32,
    /// Specular response scale.
    pub specular: f32,
    /// Normal-map steepness scale.
    pub normal_scale: f32,
    /// Refraction parameters, when the feature is on.
    pub refraction: Option<Vec4>,
    /// Viewport-map UV scale (xy) and scroll (zw), when the feature is on.
    pub viewport_map_uv_scale_and_anim: Option<Vec4>,
    /// Debug material id, when highlighting is on.
    pub material_id: Option<f32>,
}

// ---------------------------------------------------------------------------
// fetch_settings
// ---------------------------------------------------------------------------

fn quantize_byte(v: Vec4) -> Vec4 {
    (v * 255.0 + Vec4::splat(0.5)).floor()
}

/// Extracts the low four bits of a byte-valued float, shader-style: bit `k`
/// is `step(0.5, fract(v * 2^-(k+1)))`.
fn low_nibble_bits(v: f32) -> Vec4 {
    let f = |s: f32| {
        let x = v * s;
        if x - x.floor() >= 0.5 { 1.0 } else { 0.0 }
    };
    Vec4::new(f(0.5), f(0.25), f(0.125), f(0.0625))
}

/// Dead-zones a recentered signed-16 pair: magnitudes below 1.5 collapse to
/// zero so a bias-only encoding reads as "no animation".
fn dead_zone(v: Vec2) -> Vec2 {
    Vec2::new(
        if v.x.abs() >= 1.5 { v.x } else { 0.0 },
        if v.y.abs() >= 1.5 { v.y } else { 0.0 },
    )
}

/// Decodes the settings slot at `slot` into a [`MaterialSettings`].
///
/// `tile_scale` is the atlas texels-per-grid-unit factor (the `y` component
/// of the atlas metadata); slot extents are stored in grid units and scaled
/// into texels here. Decoding never fails: malformed texel values produce
/// wrong but defined output.
pub fn fetch_settings(
    image: &SettingsImage,
    slot: SlotCoord,
    tile_scale: f32,
    features: ShadingFeatures,
    strategy: FetchStrategy,
) -> MaterialSettings {
    let base = slot.base_uv();
    let sample = |offset: IVec2| match strategy {
        FetchStrategy::TexelOffset => image.fetch_offset(base, offset),
        FetchStrategy::ManualUv => image.fetch_manual(base, offset),
    };

    let origins = image.fetch(base);
    let sizes_wrap = sample(OFFSET_SLOT_SIZES_AND_WRAPPING);
    let anim = sample(OFFSET_UV_ANIM);
    let etc = sample(OFFSET_SLOT_ETC).w;

    // Origin bytes widen to 9 bits via the etc byte's low nibble.
    let mut origins = quantize_byte(origins);
    let sizes_wrap = quantize_byte(sizes_wrap);
    let etc = (etc * 255.0 + 0.5).floor();
    origins += Vec4::splat(256.0) * low_nibble_bits(etc);

    let extent = Vec2::new(sizes_wrap.x, sizes_wrap.y) * tile_scale;

    let mut settings = MaterialSettings {
        texture_meta1: Vec3::new(origins.x, origins.y, extent.x),
        texture_meta2: Vec3::new(origins.z, origins.w, extent.y),
        wrapping: sizes_wrap.w,
        ..MaterialSettings::default()
    };

    if features.surface_response() {
        let surface = sample(OFFSET_SPECULAR_NORMAL_SCALE);
        settings.specular = unpack_vec2_to_float(Vec2::new(surface.x, surface.y)) / 255.0;
        let raw = unpack_vec2_to_float(Vec2::new(surface.z, surface.w)) / 255.0;
        settings.normal_scale = raw * 0.1 - 8.0;
    }

    let scroll = Vec2::new(
        unpack_vec2_to_float(Vec2::new(anim.x, anim.y)),
        unpack_vec2_to_float(Vec2::new(anim.z, anim.w)),
    ) - Vec2::splat(SIGNED_16_BIAS);
    settings.uv_anim = dead_zone(scroll) * INV_SIGNED_16_BIAS * 2.0;

    if features.refraction {
        let r = sample(OFFSET_REFRACTION);
        settings.refraction = Some(Vec4::new(
            r.x,
            r.y * 2.0 + 1.0,
            unpack_vec2_to_float(Vec2::new(r.z, r.w)) * (1.0 / 65535.0) * 10.0,
            r.w,
        ));
    }

    if features.viewport_map {
        let scale = sample(OFFSET_VIEWPORT_MAP_UV_SCALE);
        let vanim = sample(OFFSET_VIEWPORT_MAP_UV_ANIM);
        let s = dead_zone(
            Vec2::new(
                unpack_vec2_to_float(Vec2::new(scale.x, scale.y)),
                unpack_vec2_to_float(Vec2::new(scale.z, scale.w)),
            ) - Vec2::splat(SIGNED_16_BIAS),
        );
        let a = dead_zone(
            Vec2::new(
                unpack_vec2_to_float(Vec2::new(vanim.x, vanim.y)),
                unpack_vec2_to_float(Vec2::new(vanim.z, vanim.w)),
            ) - Vec2::splat(SIGNED_16_BIAS),
        );
        let s = s * INV_SIGNED_16_BIAS * 2.0;
        let a = a * INV_SIGNED_16_BIAS * 2.0;
        settings.viewport_map_uv_scale_and_anim = Some(Vec4::new(s.x, s.y, a.x, a.y));
    }

    if features.material_highlight {
        let dbg = sample(OFFSET_DEBUG);
        settings.material_id = Some(unpack_vec2_to_float(Vec2::new(dbg.x, dbg.y)));
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::{SlotSpec, bake_slot};
    use crate::grid::{SLOT_COUNT, SlotIndex};

    fn sample_spec() -> SlotSpec {
        SlotSpec {
            origin1: [300, 2],
            origin2: [5, 410],
            size_units: [8, 16],
            wrapping: 0b0011, // clamp both axes
            uv_anim: Vec2::new(0.25, -0.5),
            specular: 0.8,
            normal_scale: 3.0,
            refraction: Vec3::new(0.5, 2.0, 1.25),
            viewport_map_uv_scale_and_anim: Vec4::new(0.5, -0.25, 0.125, 0.0),
            material_id: 777,
        }
    }

    #[test]
    fn test_fetch_strategies_decode_identically() {
        let mut img = SettingsImage::new();
        let spec = sample_spec();
        for idx in [0u16, 1, 41, 42, 700, (SLOT_COUNT - 1) as u16] {
            let slot = SlotCoord::from_linear(SlotIndex(idx)).unwrap();
            bake_slot(&mut img, slot, &spec);
        }
        for idx in [0u16, 1, 41, 42, 700, (SLOT_COUNT - 1) as u16] {
            let slot = SlotCoord::from_linear(SlotIndex(idx)).unwrap();
            let a = fetch_settings(
                &img,
                slot,
                16.0,
                ShadingFeatures::ALL,
                FetchStrategy::TexelOffset,
            );
            let b = fetch_settings(
                &img,
                slot,
                16.0,
                ShadingFeatures::ALL,
                FetchStrategy::ManualUv,
            );
            assert_eq!(a, b, "strategies diverged for slot {idx}");
        }
    }

    #[test]
    fn test_decode_is_idempotent() {
        let mut img = SettingsImage::new();
        let slot = SlotCoord::new(3, 7).unwrap();
        bake_slot(&mut img, slot, &sample_spec());
        let a = fetch_settings(
            &img,
            slot,
            16.0,
            ShadingFeatures::ALL,
            FetchStrategy::TexelOffset,
        );
        let b = fetch_settings(
            &img,
            slot,
            16.0,
            ShadingFeatures::ALL,
            FetchStrategy::TexelOffset,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_nine_bit_origins_round_trip() {
        let mut img = SettingsImage::new();
        let slot = SlotCoord::new(0, 0).unwrap();
        let spec = SlotSpec {
            origin1: [511, 256],
            origin2: [255, 257],
            ..sample_spec()
        };
        bake_slot(&mut img, slot, &spec);
        let s = fetch_settings(
            &img,
            slot,
            16.0,
            ShadingFeatures::default(),
            FetchStrategy::TexelOffset,
        );
        assert_eq!(s.texture_meta1.x, 511.0);
        assert_eq!(s.texture_meta1.y, 256.0);
        assert_eq!(s.texture_meta2.x, 255.0);
        assert_eq!(s.texture_meta2.y, 257.0);
    }

    #[test]
    fn test_extent_scales_by_tile_scale() {
        let mut img = SettingsImage::new();
        let slot = SlotCoord::new(1, 1).unwrap();
        bake_slot(&mut img, slot, &sample_spec());
        let s = fetch_settings(
            &img,
            slot,
            16.0,
            ShadingFeatures::default(),
            FetchStrategy::TexelOffset,
        );
        assert_eq!(s.texture_meta1.z, 8.0 * 16.0);
        assert_eq!(s.texture_meta2.z, 16.0 * 16.0);
        assert_eq!(s.wrapping, 0b0011 as f32);
    }

    #[test]
    fn test_scalar_fields_round_trip_within_quantization() {
        let mut img = SettingsImage::new();
        let slot = SlotCoord::new(10, 20).unwrap();
        let spec = sample_spec();
        bake_slot(&mut img, slot, &spec);
        let s = fetch_settings(
            &img,
            slot,
            16.0,
            ShadingFeatures::ALL,
            FetchStrategy::TexelOffset,
        );
        assert!((s.specular - spec.specular).abs() < 1.0 / 255.0);
        assert!((s.normal_scale - spec.normal_scale).abs() < 0.01);
        assert!((s.uv_anim - spec.uv_anim).length() < 1e-3);
        let r = s.refraction.unwrap();
        assert!((r.x - spec.refraction.x).abs() < 1.0 / 255.0);
        assert!((r.y - spec.refraction.y).abs() < 2.0 / 255.0);
        assert!((r.z - spec.refraction.z).abs() < 1e-3);
        let v = s.viewport_map_uv_scale_and_anim.unwrap();
        assert!((v - spec.viewport_map_uv_scale_and_anim).length() < 1e-3);
        assert_eq!(s.material_id, Some(777.0));
    }

    #[test]
    fn test_disabled_features_default_to_zero() {
        let mut img = SettingsImage::new();
        let slot = SlotCoord::new(10, 20).unwrap();
        bake_slot(&mut img, slot, &sample_spec());
        let s = fetch_settings(
            &img,
            slot,
            16.0,
            ShadingFeatures::default(),
            FetchStrategy::TexelOffset,
        );
        assert_eq!(s.specular, 0.0);
        assert_eq!(s.normal_scale, 0.0);
        assert_eq!(s.refraction, None);
        assert_eq!(s.viewport_map_uv_scale_and_anim, None);
        assert_eq!(s.material_id, None);
    }

    #[test]
    fn test_small_uv_anim_dead_zones_to_rest() {
        let mut img = SettingsImage::new();
        let slot = SlotCoord::new(0, 1).unwrap();
        let spec = SlotSpec {
            uv_anim: Vec2::ZERO,
            ..sample_spec()
        };
        bake_slot(&mut img, slot, &spec);
        let s = fetch_settings(
            &img,
            slot,
            16.0,
            ShadingFeatures::default(),
            FetchStrategy::TexelOffset,
        );
        assert_eq!(s.uv_anim, Vec2::ZERO);
    }
}
