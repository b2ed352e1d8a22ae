//! Texture-atlas addressing and sampling: tile-local UV wrapping, mip
//! selection from screen-space footprints, multi-layer blending, and the
//! surface/fragment helpers that consume the sampled texels.
//!
//! Everything here is a pure function of its inputs, re-evaluated per
//! invocation; there is no state to share between fragments and no error
//! path once the atlas metadata has been validated.

mod addressing;
mod context;
mod fragment;
mod layers;
mod meta;
mod sampler;
mod surface;

pub use addressing::{AddressingMode, WrapMask, wrap_uv};
pub use context::FrameContext;
pub use fragment::{
    FragmentVerdict, StippleTransparency, alpha_test, interleaved_gradient_noise, stipple_visible,
};
pub use layers::{SrgbPolicy, TerrainLayer, TerrainSampler, blend_layers, terrain_layer_uv};
pub use meta::{AtlasError, AtlasMeta};
pub use sampler::{
    AtlasImage, GRADIENT_CLAMP, MipSelection, TileRef, mip_level_for_footprint, sample_tile,
    tile_uv_to_atlas,
};
pub use surface::{
    apply_normal_map, apply_normal_map_tbn, apply_normal_map_terrain, compute_bitangent,
    tangent_bitangent_from_derivatives,
};
