//! Slot grid layout: fixed texel dimensions and linear-index addressing.

use glam::Vec2;
use thiserror::Error;

/// Texels per material slot along X.
pub const SLOT_TEXELS_X: u32 = 3;

/// Texels per material slot along Y.
pub const SLOT_TEXELS_Y: u32 = 4;

/// Material slots per settings-texture row.
pub const SLOT_COLUMNS: u32 = 42;

/// Material slot rows in the settings texture.
pub const SLOT_ROWS: u32 = 32;

/// Width and height of the settings texture in texels.
pub const SETTINGS_TEXTURE_SIZE: u32 = 128;

/// Total addressable material slots.
pub const SLOT_COUNT: u32 = SLOT_COLUMNS * SLOT_ROWS;

// ---------------------------------------------------------------------------
// SettingsError
// ---------------------------------------------------------------------------

/// Errors returned by settings-grid addressing and image construction.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The linear slot index exceeds the grid.
    #[error("slot index {index} out of range (max {})", SLOT_COUNT - 1)]
    SlotOutOfRange {
        /// The offending index.
        index: u32,
    },

    /// The slot coordinate lies outside the 42×32 grid.
    #[error("slot coordinate ({x}, {y}) outside {SLOT_COLUMNS}x{SLOT_ROWS} grid")]
    CoordOutOfRange {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },

    /// A texel buffer of the wrong size was supplied.
    #[error("settings image needs {expected} texels, got {got}")]
    BadDimensions {
        /// Required texel count.
        expected: usize,
        /// Supplied texel count.
        got: usize,
    },
}

// ---------------------------------------------------------------------------
// SlotIndex / SlotCoord
// ---------------------------------------------------------------------------

/// Linear material-slot index, as carried per-instance in vertex data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotIndex(pub u16);

/// 2D slot coordinate in grid units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotCoord {
    /// Column in `[0, 42)`.
    pub x: u32,
    /// Row in `[0, 32)`.
    pub y: u32,
}

impl SlotCoord {
    /// Validates a raw coordinate against the grid bounds.
    pub fn new(x: u32, y: u32) -> Result<Self, SettingsError> {
        if x >= SLOT_COLUMNS || y >= SLOT_ROWS {
            return Err(SettingsError::CoordOutOfRange { x, y });
        }
        Ok(Self { x, y })
    }

    /// Converts a linear slot index to its grid coordinate using the fixed
    /// row width of 42.
    pub fn from_linear(index: SlotIndex) -> Result<Self, SettingsError> {
        let id = u32::from(index.0);
        if id >= SLOT_COUNT {
            return Err(SettingsError::SlotOutOfRange { index: id });
        }
        let y = id / SLOT_COLUMNS;
        let x = id - y * SLOT_COLUMNS;
        Ok(Self { x, y })
    }

    /// Texel coordinate of this slot's top-left corner.
    pub fn texel_origin(&self) -> (u32, u32) {
        (self.x * SLOT_TEXELS_X, self.y * SLOT_TEXELS_Y)
    }

    /// UV coordinate of the center of this slot's top-left texel, the base
    /// address all per-field texel offsets are applied to.
    pub fn base_uv(&self) -> Vec2 {
        let inv = 1.0 / SETTINGS_TEXTURE_SIZE as f32;
        (Vec2::new(
            (self.x * SLOT_TEXELS_X) as f32,
            (self.y * SLOT_TEXELS_Y) as f32,
        ) + Vec2::splat(0.5))
            * inv
    }
}
