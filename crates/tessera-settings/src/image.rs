//! Owned settings-texture storage and the two texel-fetch paths.

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec2, Vec4};

use crate::grid::{SETTINGS_TEXTURE_SIZE, SettingsError};

// ---------------------------------------------------------------------------
// Texel
// ---------------------------------------------------------------------------

/// One 8-bit RGBA texel of the settings texture.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Texel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Texel {
    /// All-zero texel.
    pub const ZERO: Texel = Texel {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Normalized channel values in `[0, 1]`, as a shader would read them.
    pub fn normalized(self) -> Vec4 {
        Vec4::new(
            f32::from(self.r),
            f32::from(self.g),
            f32::from(self.b),
            f32::from(self.a),
        ) / 255.0
    }
}

// ---------------------------------------------------------------------------
// SettingsImage
// ---------------------------------------------------------------------------

/// The 128×128 RGBA8 material-settings texture, CPU-side.
///
/// Fetches model nearest-neighbour sampling at mip 0, which is how the
/// renderer reads this texture: texel centers only, no filtering.
#[derive(Clone)]
pub struct SettingsImage {
    texels: Vec<Texel>,
}

impl Default for SettingsImage {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsImage {
    const SIZE: u32 = SETTINGS_TEXTURE_SIZE;

    /// Creates an all-zero settings texture.
    pub fn new() -> Self {
        Self {
            texels: vec![Texel::ZERO; (Self::SIZE * Self::SIZE) as usize],
        }
    }

    /// Wraps an existing texel buffer. The buffer must hold exactly 128×128
    /// texels.
    pub fn from_texels(texels: Vec<Texel>) -> Result<Self, SettingsError> {
        let expected = (Self::SIZE * Self::SIZE) as usize;
        if texels.len() != expected {
            return Err(SettingsError::BadDimensions {
                expected,
                got: texels.len(),
            });
        }
        Ok(Self { texels })
    }

    /// Raw bytes in row-major RGBA order, suitable for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Reads the texel at integer coordinates, clamped to the edge like a
    /// clamp-to-edge sampler.
    pub fn texel(&self, x: i32, y: i32) -> Texel {
        let x = x.clamp(0, Self::SIZE as i32 - 1) as u32;
        let y = y.clamp(0, Self::SIZE as i32 - 1) as u32;
        self.texels[(y * Self::SIZE + x) as usize]
    }

    /// Writes the texel at integer coordinates. Out-of-bounds writes are
    /// ignored rather than wrapped.
    pub fn set_texel(&mut self, x: u32, y: u32, texel: Texel) {
        if x < Self::SIZE && y < Self::SIZE {
            self.texels[(y * Self::SIZE + x) as usize] = texel;
        }
    }

    /// Nearest-neighbour fetch at a UV coordinate, mip 0.
    pub fn fetch(&self, uv: Vec2) -> Vec4 {
        let x = (uv.x * Self::SIZE as f32).floor() as i32;
        let y = (uv.y * Self::SIZE as f32).floor() as i32;
        self.texel(x, y).normalized()
    }

    /// Fetch with an integer texel offset applied after UV→texel conversion,
    /// the hardware `textureLodOffset` path.
    pub fn fetch_offset(&self, uv: Vec2, offset: IVec2) -> Vec4 {
        let x = (uv.x * Self::SIZE as f32).floor() as i32 + offset.x;
        let y = (uv.y * Self::SIZE as f32).floor() as i32 + offset.y;
        self.texel(x, y).normalized()
    }

    /// Fetch with the offset folded into the UV instead, the fallback path
    /// for targets without offset fetches. Must agree with
    /// [`fetch_offset`](Self::fetch_offset) for every in-grid texel.
    pub fn fetch_manual(&self, uv: Vec2, offset: IVec2) -> Vec4 {
        let texel_uv = 1.0 / Self::SIZE as f32;
        self.fetch(uv + offset.as_vec2() * texel_uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_reads_texel_centers() {
        let mut img = SettingsImage::new();
        img.set_texel(
            5,
            7,
            Texel {
                r: 255,
                g: 128,
                b: 0,
                a: 64,
            },
        );
        let uv = Vec2::new(5.5 / 128.0, 7.5 / 128.0);
        let v = img.fetch(uv);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 128.0 / 255.0);
    }

    #[test]
    fn test_offset_and_manual_fetch_agree() {
        let mut img = SettingsImage::new();
        for (i, (x, y)) in [(0u32, 0u32), (2, 0), (1, 1), (2, 3), (125, 127)]
            .iter()
            .enumerate()
        {
            img.set_texel(
                *x,
                *y,
                Texel {
                    r: i as u8,
                    g: 10 + i as u8,
                    b: 20 + i as u8,
                    a: 30 + i as u8,
                },
            );
        }
        let base = Vec2::new(0.5 / 128.0, 0.5 / 128.0);
        for offset in [
            IVec2::new(0, 0),
            IVec2::new(2, 0),
            IVec2::new(1, 1),
            IVec2::new(2, 3),
        ] {
            assert_eq!(
                img.fetch_offset(base, offset),
                img.fetch_manual(base, offset),
                "strategies diverged at offset {offset}"
            );
        }
    }

    #[test]
    fn test_edge_reads_clamp() {
        let mut img = SettingsImage::new();
        img.set_texel(127, 127, Texel { r: 9, g: 9, b: 9, a: 9 });
        assert_eq!(img.texel(128, 200), img.texel(127, 127));
        assert_eq!(img.texel(-1, -1), img.texel(0, 0));
    }

    #[test]
    fn test_byte_view_is_row_major_rgba() {
        let mut img = SettingsImage::new();
        img.set_texel(1, 0, Texel { r: 1, g: 2, b: 3, a: 4 });
        let bytes = img.as_bytes();
        assert_eq!(bytes.len(), 128 * 128 * 4);
        assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_wrong_buffer_size_rejected() {
        assert!(SettingsImage::from_texels(vec![Texel::ZERO; 100]).is_err());
    }
}
