//! Material-settings texture: fixed-grid layout, texel fetch, and decoding of
//! byte-packed per-material parameters into structured records.
//!
//! Each material occupies a 3×4 texel slot in a 128×128 RGBA8 lookup texture,
//! 42 slots per row and 32 rows. The decode routines are the exact inverse of
//! the offline baker in [`bake`]; both directions are kept bit-faithful to the
//! renderer's layout so a baked texture can be validated on the CPU before
//! upload.

mod bake;
mod decode;
mod grid;
mod image;

pub use bake::{SlotSpec, bake_slot};
pub use decode::{FetchStrategy, MaterialSettings, ShadingFeatures, fetch_settings};
pub use grid::{
    SETTINGS_TEXTURE_SIZE, SLOT_COLUMNS, SLOT_COUNT, SLOT_ROWS, SLOT_TEXELS_X, SLOT_TEXELS_Y,
    SettingsError, SlotCoord, SlotIndex,
};
pub use image::{SettingsImage, Texel};
