//! Multi-layer terrain sampling: per-layer UV derivation, weighted blending,
//! and the single colour-space policy applied across all layers.

use glam::{Vec2, Vec3, Vec4};

use tessera_codec::srgb_to_linear;
use tessera_settings::MaterialSettings;

use crate::addressing::AddressingMode;
use crate::context::FrameContext;
use crate::meta::AtlasMeta;
use crate::sampler::{AtlasImage, MipSelection, TileRef, sample_tile};

// ---------------------------------------------------------------------------
// SrgbPolicy
// ---------------------------------------------------------------------------

/// Where sRGB decoding happens for atlas colour reads.
///
/// Exactly one policy applies to every layer of a draw; mixing placements
/// double-corrects whichever layer gets both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SrgbPolicy {
    /// Each sampled texel is decoded to linear before blending.
    #[default]
    DecodePerSample,
    /// Layers blend in storage space; the blended result is decoded once.
    DecodeBlended,
    /// Texel data is already linear; no decode.
    PassThrough,
}

// ---------------------------------------------------------------------------
// TerrainLayer
// ---------------------------------------------------------------------------

/// One of up to three material layers blended across a terrain fragment.
#[derive(Clone, Copy, Debug)]
pub struct TerrainLayer {
    /// Decoded settings for this layer's material.
    pub settings: MaterialSettings,
    /// Per-layer world-space texture scale.
    pub texture_scale: f32,
    /// Precomputed per-vertex blend weight.
    pub weight: f32,
}

/// Tile-local UV for a terrain layer: world XZ scaled by
/// `8 / (texture_scale * grid_size)`.
pub fn terrain_layer_uv(world: Vec3, texture_scale: f32, grid_size: f32) -> Vec2 {
    Vec2::new(world.x, world.z) * (8.0 / (texture_scale * grid_size))
}

/// Weighted sum of layer samples. Weights are expected to sum to 1; no
/// renormalization happens here.
pub fn blend_layers(samples: &[Vec4], weights: &[f32]) -> Vec4 {
    samples
        .iter()
        .zip(weights)
        .fold(Vec4::ZERO, |acc, (s, w)| acc + *s * *w)
}

fn decode_rgb(c: Vec4) -> Vec4 {
    let rgb = srgb_to_linear(Vec3::new(c.x, c.y, c.z));
    Vec4::new(rgb.x, rgb.y, rgb.z, c.w)
}

// ---------------------------------------------------------------------------
// TerrainSampler
// ---------------------------------------------------------------------------

/// Samples and blends up to three material layers for a terrain fragment.
pub struct TerrainSampler<'a> {
    /// The shared atlas texture.
    pub atlas: &'a AtlasImage,
    /// Atlas geometry.
    pub meta: AtlasMeta,
    /// Pipeline-wide addressing mode.
    pub mode: AddressingMode,
    /// Mip selection strategy.
    pub mip: MipSelection,
    /// Colour-space policy.
    pub srgb: SrgbPolicy,
}

impl TerrainSampler<'_> {
    /// Samples every layer at a world position and blends by layer weight.
    ///
    /// `ddx_world`/`ddy_world` are the screen-space world-position
    /// derivatives; each layer rescales them into its own UV space for mip
    /// selection.
    pub fn sample(
        &self,
        ctx: &FrameContext,
        world: Vec3,
        ddx_world: Vec3,
        ddy_world: Vec3,
        layers: &[TerrainLayer],
    ) -> Vec4 {
        let mut blended = Vec4::ZERO;
        for layer in layers.iter().take(3) {
            let scale = 8.0 / (layer.texture_scale * ctx.grid_size);
            let uv = ctx.animated_uv(
                Vec2::new(world.x, world.z) * scale,
                layer.settings.uv_anim,
            );
            let ddx = Vec2::new(ddx_world.x, ddx_world.z) * scale;
            let ddy = Vec2::new(ddy_world.x, ddy_world.z) * scale;
            let tile = TileRef::from_meta(layer.settings.texture_meta1);
            let mut sample = sample_tile(
                self.atlas,
                &self.meta,
                tile,
                uv,
                ddx,
                ddy,
                self.mode,
                layer.settings.wrapping,
                self.mip,
            );
            if self.srgb == SrgbPolicy::DecodePerSample {
                sample = decode_rgb(sample);
            }
            blended += sample * layer.weight;
        }
        if self.srgb == SrgbPolicy::DecodeBlended {
            blended = decode_rgb(blended);
        }
        blended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checker_atlas() -> AtlasImage {
        // Two flat 16-texel tiles side by side at grid (0,0) and (1,0).
        let mut img = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255]));
        for y in 0..16 {
            for x in 0..16 {
                img.put_pixel(x, y, Rgba([255, 0, 0, 255]));
                img.put_pixel(x + 16, y, Rgba([0, 0, 255, 255]));
            }
        }
        AtlasImage::from_base(img).unwrap()
    }

    fn layer(origin: Vec2, weight: f32) -> TerrainLayer {
        TerrainLayer {
            settings: MaterialSettings {
                texture_meta1: Vec3::new(origin.x, origin.y, 16.0),
                texture_meta2: Vec3::new(origin.x, origin.y, 16.0),
                ..MaterialSettings::default()
            },
            texture_scale: 1.0,
            weight,
        }
    }

    fn test_sampler(atlas: &AtlasImage, srgb: SrgbPolicy) -> TerrainSampler<'_> {
        TerrainSampler {
            atlas,
            meta: AtlasMeta::new(4.0, 16.0, 4.0).unwrap(),
            mode: AddressingMode::Repeat,
            mip: MipSelection::Gradient,
            srgb,
        }
    }

    fn ctx() -> FrameContext {
        FrameContext {
            animation_time: 0.0,
            grid_size: 8.0,
        }
    }

    #[test]
    fn test_single_layer_reads_its_tile() {
        let atlas = checker_atlas();
        let sampler = test_sampler(&atlas, SrgbPolicy::PassThrough);
        // UV = world.xz * (8 / (1 * 8)) = world.xz; 0.5 lands mid-tile.
        let c = sampler.sample(
            &ctx(),
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::splat(0.001),
            Vec3::splat(0.001),
            &[layer(Vec2::new(0.0, 0.0), 1.0)],
        );
        assert!(c.x > 0.9 && c.z < 0.1, "expected red tile, got {c}");
    }

    #[test]
    fn test_two_layers_blend_by_weight() {
        let atlas = checker_atlas();
        let sampler = test_sampler(&atlas, SrgbPolicy::PassThrough);
        let c = sampler.sample(
            &ctx(),
            Vec3::new(0.5, 0.0, 0.5),
            Vec3::splat(0.001),
            Vec3::splat(0.001),
            &[
                layer(Vec2::new(0.0, 0.0), 0.25),
                layer(Vec2::new(1.0, 0.0), 0.75),
            ],
        );
        assert!((c.x - 0.25).abs() < 0.05, "{c}");
        assert!((c.z - 0.75).abs() < 0.05, "{c}");
    }

    #[test]
    fn test_srgb_policies_agree_on_single_opaque_layer() {
        let atlas = checker_atlas();
        let per_sample = test_sampler(&atlas, SrgbPolicy::DecodePerSample);
        let blended = test_sampler(&atlas, SrgbPolicy::DecodeBlended);
        let layers = [layer(Vec2::new(1.0, 0.0), 1.0)];
        let world = Vec3::new(0.5, 0.0, 0.5);
        let a = per_sample.sample(&ctx(), world, Vec3::splat(0.001), Vec3::splat(0.001), &layers);
        let b = blended.sample(&ctx(), world, Vec3::splat(0.001), Vec3::splat(0.001), &layers);
        // With one full-weight layer, decode placement cannot matter.
        assert!((a - b).length() < 1e-4, "{a} vs {b}");
    }

    #[test]
    fn test_blend_layers_weighted_sum() {
        let out = blend_layers(
            &[Vec4::splat(1.0), Vec4::splat(0.0), Vec4::splat(0.5)],
            &[0.5, 0.25, 0.25],
        );
        assert!((out.x - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_terrain_layer_uv_scale() {
        let uv = terrain_layer_uv(Vec3::new(4.0, 99.0, 2.0), 1.0, 8.0);
        assert_eq!(uv, Vec2::new(4.0, 2.0));
    }
}
