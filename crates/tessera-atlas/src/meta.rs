//! Atlas metadata: the per-draw quadruple describing atlas geometry.

use glam::Vec4;
use thiserror::Error;

/// Errors from atlas construction and metadata validation.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// A metadata component that must be positive was zero or negative.
    #[error("degenerate atlas meta: {field} = {value}")]
    DegenerateMeta {
        /// Offending component name.
        field: &'static str,
        /// Its value.
        value: f32,
    },

    /// The atlas base image has a zero dimension.
    #[error("atlas image is empty ({width}x{height})")]
    EmptyImage {
        /// Base width in texels.
        width: u32,
        /// Base height in texels.
        height: u32,
    },
}

// ---------------------------------------------------------------------------
// AtlasMeta
// ---------------------------------------------------------------------------

/// Decoded atlas metadata (the renderer's `uAtlasMeta` uniform).
///
/// Validated at construction: tile extents stored in the settings texture are
/// multiplied by these factors, so a zero here would poison every sample with
/// a divide-by-zero further down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasMeta {
    /// Atlas size in grid units (e.g. 512).
    pub grid_units: f32,
    /// Texels per grid unit (e.g. 16).
    pub tile_scale: f32,
    /// Texel-to-UV factor, `1 / (grid_units * tile_scale)`.
    pub texel_to_uv: f32,
    /// Highest mip level materials may select.
    pub mip_cap: f32,
}

impl AtlasMeta {
    /// Builds metadata from grid size and tile scale, deriving the texel-to-UV
    /// factor.
    pub fn new(grid_units: f32, tile_scale: f32, mip_cap: f32) -> Result<Self, AtlasError> {
        Self::from_raw(Vec4::new(
            grid_units,
            tile_scale,
            1.0 / (grid_units * tile_scale),
            mip_cap,
        ))
    }

    /// Validates a raw uniform quadruple.
    pub fn from_raw(raw: Vec4) -> Result<Self, AtlasError> {
        let check = |field: &'static str, value: f32| {
            if value > 0.0 && value.is_finite() {
                Ok(value)
            } else {
                Err(AtlasError::DegenerateMeta { field, value })
            }
        };
        if !(raw.w >= 0.0 && raw.w.is_finite()) {
            return Err(AtlasError::DegenerateMeta {
                field: "mip_cap",
                value: raw.w,
            });
        }
        Ok(Self {
            grid_units: check("grid_units", raw.x)?,
            tile_scale: check("tile_scale", raw.y)?,
            texel_to_uv: check("texel_to_uv", raw.z)?,
            mip_cap: raw.w,
        })
    }

    /// Atlas width/height in texels.
    pub fn size_texels(&self) -> f32 {
        self.grid_units * self.tile_scale
    }
}
