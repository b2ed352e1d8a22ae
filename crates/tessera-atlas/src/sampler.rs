//! Software atlas sampler: mip-chain storage, footprint-based level
//! selection, and the tile-to-atlas coordinate transform.

use glam::{Vec2, Vec4};
use image::RgbaImage;

use crate::addressing::{AddressingMode, wrap_uv};
use crate::meta::{AtlasError, AtlasMeta};

/// Per-axis gradient clamp applied before gradient sampling, in atlas UV
/// units. Keeps anisotropic footprints from spanning tile seams.
pub const GRADIENT_CLAMP: f32 = 0.025;

// ---------------------------------------------------------------------------
// TileRef
// ---------------------------------------------------------------------------

/// One atlas tile: origin in grid units plus extent in texels, as decoded
/// into a material's texture metadata triple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileRef {
    /// Tile origin in atlas grid units.
    pub origin: Vec2,
    /// Tile extent in texels (one scalar; tiles are square per channel).
    pub extent: f32,
}

impl TileRef {
    /// Builds a tile reference from a decoded `texture_meta` triple.
    pub fn from_meta(meta: glam::Vec3) -> Self {
        Self {
            origin: Vec2::new(meta.x, meta.y),
            extent: meta.z,
        }
    }

    /// Half-texel inset in tile-local UV units.
    pub fn inset(&self) -> f32 {
        0.5 / self.extent
    }
}

/// Transforms a wrapped tile-local UV into atlas UV space.
pub fn tile_uv_to_atlas(wrapped: Vec2, tile: TileRef, meta: &AtlasMeta) -> Vec2 {
    wrapped * tile.extent * meta.texel_to_uv + tile.origin * meta.tile_scale * meta.texel_to_uv
}

/// Mip level for a screen-space footprint, from UV-per-pixel gradients
/// expressed in texels: `0.5 * log2(max(|ddx|², |ddy|²))`, floored at 0.
pub fn mip_level_for_footprint(ddx: Vec2, ddy: Vec2) -> f32 {
    let len_sq = ddx.dot(ddx).max(ddy.dot(ddy));
    (0.5 * len_sq.log2()).max(0.0)
}

// ---------------------------------------------------------------------------
// MipSelection
// ---------------------------------------------------------------------------

/// How the sampler picks its mip level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MipSelection {
    /// Explicit gradients, clamped per axis; preferred, avoids seams under
    /// anisotropic filtering.
    #[default]
    Gradient,
    /// Explicit LOD computed from the footprint and clamped to the
    /// material mip cap.
    ExplicitLod,
}

// ---------------------------------------------------------------------------
// AtlasImage
// ---------------------------------------------------------------------------

/// CPU-side atlas texture with a full mip chain.
///
/// Mip level 0 is the full-resolution atlas; each following level halves.
pub struct AtlasImage {
    mip_chain: Vec<RgbaImage>,
}

impl AtlasImage {
    /// Builds the mip chain down to 1×1 from a base image.
    pub fn from_base(base: RgbaImage) -> Result<Self, AtlasError> {
        if base.width() == 0 || base.height() == 0 {
            return Err(AtlasError::EmptyImage {
                width: base.width(),
                height: base.height(),
            });
        }
        let levels = (base.width().max(base.height()) as f32).log2() as usize + 1;
        let mut mip_chain = Vec::with_capacity(levels);
        mip_chain.push(base);
        for level in 1..levels {
            let prev = &mip_chain[level - 1];
            let w = (prev.width() / 2).max(1);
            let h = (prev.height() / 2).max(1);
            mip_chain.push(image::imageops::resize(
                prev,
                w,
                h,
                image::imageops::FilterType::Triangle,
            ));
        }
        Ok(Self { mip_chain })
    }

    /// Number of mip levels.
    pub fn mip_level_count(&self) -> u32 {
        self.mip_chain.len() as u32
    }

    /// Base atlas width in texels.
    pub fn size_texels(&self) -> f32 {
        self.mip_chain[0].width() as f32
    }

    fn texel(&self, level: usize, x: i64, y: i64) -> Vec4 {
        let img = &self.mip_chain[level];
        let x = x.clamp(0, i64::from(img.width()) - 1) as u32;
        let y = y.clamp(0, i64::from(img.height()) - 1) as u32;
        let p = img.get_pixel(x, y);
        Vec4::new(
            f32::from(p[0]),
            f32::from(p[1]),
            f32::from(p[2]),
            f32::from(p[3]),
        ) / 255.0
    }

    /// Bilinear fetch at one mip level.
    pub fn sample_bilinear(&self, level: usize, uv: Vec2) -> Vec4 {
        let level = level.min(self.mip_chain.len() - 1);
        let img = &self.mip_chain[level];
        let pos = uv * Vec2::new(img.width() as f32, img.height() as f32) - Vec2::splat(0.5);
        let x0 = pos.x.floor();
        let y0 = pos.y.floor();
        let fx = pos.x - x0;
        let fy = pos.y - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let c00 = self.texel(level, x0, y0);
        let c10 = self.texel(level, x0 + 1, y0);
        let c01 = self.texel(level, x0, y0 + 1);
        let c11 = self.texel(level, x0 + 1, y0 + 1);
        let top = c00 * (1.0 - fx) + c10 * fx;
        let bottom = c01 * (1.0 - fx) + c11 * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Trilinear fetch at an explicit LOD.
    pub fn sample_lod(&self, uv: Vec2, lod: f32) -> Vec4 {
        let lod = lod.clamp(0.0, (self.mip_chain.len() - 1) as f32);
        let lower = lod.floor();
        let frac = lod - lower;
        let a = self.sample_bilinear(lower as usize, uv);
        if frac == 0.0 {
            return a;
        }
        let b = self.sample_bilinear(lower as usize + 1, uv);
        a * (1.0 - frac) + b * frac
    }

    /// Gradient fetch: LOD derived from atlas-UV-space gradients.
    pub fn sample_grad(&self, uv: Vec2, ddx: Vec2, ddy: Vec2) -> Vec4 {
        let size = self.size_texels();
        let lod = mip_level_for_footprint(ddx * size, ddy * size);
        self.sample_lod(uv, lod)
    }
}

// ---------------------------------------------------------------------------
// sample_tile
// ---------------------------------------------------------------------------

/// Samples one atlas tile at a tile-local UV.
///
/// `ddx`/`ddy` are the tile-local UV derivatives per pixel. The gradient
/// path clamps the scaled gradients to ±[`GRADIENT_CLAMP`]; the explicit-LOD
/// path clamps the computed level to the material mip cap.
#[allow(clippy::too_many_arguments)]
pub fn sample_tile(
    atlas: &AtlasImage,
    meta: &AtlasMeta,
    tile: TileRef,
    uv: Vec2,
    ddx: Vec2,
    ddy: Vec2,
    mode: AddressingMode,
    wrapping: f32,
    mip: MipSelection,
) -> Vec4 {
    let wrapped = wrap_uv(mode, uv, tile.inset(), wrapping);
    let atlas_uv = tile_uv_to_atlas(wrapped, tile, meta);
    match mip {
        MipSelection::Gradient => {
            let scale = meta.texel_to_uv * tile.extent;
            let limit = Vec2::splat(GRADIENT_CLAMP);
            let gx = (ddx * scale).clamp(-limit, limit);
            let gy = (ddy * scale).clamp(-limit, limit);
            atlas.sample_grad(atlas_uv, gx, gy)
        }
        MipSelection::ExplicitLod => {
            let lod = mip_level_for_footprint(ddx * tile.extent, ddy * tile.extent);
            atlas.sample_lod(atlas_uv, lod.min(meta.mip_cap))
        }
    }
}
