//! Demo binary: bakes a settings texture from a RON material manifest,
//! cross-checks both fetch strategies, builds a procedural atlas, and renders
//! a blended terrain swatch to a PNG.
//!
//! Run with `cargo run -p tessera-demo` from the workspace root.
//! Run with `cargo run -p tessera-demo -- --time 4.5` to advance UV scroll.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::{Vec2, Vec3};
use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::info;

use tessera_atlas::{
    AddressingMode, AtlasError, AtlasImage, AtlasMeta, FrameContext, MipSelection, SrgbPolicy,
    TerrainLayer, TerrainSampler,
};
use tessera_codec::linear_to_srgb;
use tessera_settings::{
    FetchStrategy, SettingsError, SettingsImage, ShadingFeatures, SlotCoord, SlotIndex, SlotSpec,
    bake_slot, fetch_settings,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "tessera-demo",
    about = "Render a terrain swatch from a material manifest"
)]
struct Args {
    /// Path to the RON material manifest.
    #[arg(long, default_value = "crates/tessera-demo/materials.ron")]
    manifest: PathBuf,

    /// Output PNG path.
    #[arg(long, default_value = "swatch.png")]
    output: PathBuf,

    /// Swatch size in pixels.
    #[arg(long, default_value_t = 256)]
    size: u32,

    /// Animation clock value for UV scroll.
    #[arg(long, default_value_t = 0.0)]
    time: f32,

    /// Log filter override (e.g. "debug,tessera_atlas=trace").
    #[arg(long)]
    log: Option<String>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
enum DemoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ron parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("atlas error: {0}")]
    Atlas(#[from] AtlasError),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("manifest has no materials")]
    EmptyManifest,

    #[error("fetch strategies disagree for material '{0}'")]
    StrategyMismatch(String),
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Top-level RON manifest.
#[derive(serde::Deserialize)]
struct DemoManifest {
    atlas: AtlasSpec,
    /// Terrain grid cell size in world units.
    grid_size: f32,
    materials: Vec<MaterialEntry>,
}

/// Atlas geometry, mirrored into [`AtlasMeta`] after validation.
#[derive(serde::Deserialize)]
struct AtlasSpec {
    grid_units: f32,
    tile_scale: f32,
    mip_cap: f32,
}

/// One material entry in the manifest.
#[derive(serde::Deserialize)]
struct MaterialEntry {
    /// Human-readable name, used in logs and errors.
    name: String,
    /// Atlas tile origin in grid units.
    origin: (u16, u16),
    /// Tile extent in grid units.
    size_units: (u8, u8),
    /// Wrap-mode byte.
    wrapping: u8,
    /// UV scroll velocity per time unit.
    uv_anim: (f32, f32),
    /// Specular response scale.
    specular: f32,
    /// Normal-map steepness scale.
    normal_scale: f32,
    /// Flat colour painted into this material's atlas tile.
    albedo: (f32, f32, f32),
    /// Per-layer world-space texture scale.
    texture_scale: f32,
}

impl MaterialEntry {
    fn slot_spec(&self) -> SlotSpec {
        SlotSpec {
            origin1: [self.origin.0, self.origin.1],
            origin2: [self.origin.0, self.origin.1],
            size_units: [self.size_units.0, self.size_units.1],
            wrapping: self.wrapping,
            uv_anim: Vec2::new(self.uv_anim.0, self.uv_anim.1),
            specular: self.specular,
            normal_scale: self.normal_scale,
            ..SlotSpec::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Atlas painting
// ---------------------------------------------------------------------------

fn byte_rgb(rgb: (f32, f32, f32), scale: f32) -> Rgba<u8> {
    let q = |c: f32| ((c * scale).clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
    Rgba([q(rgb.0), q(rgb.1), q(rgb.2), 255])
}

/// Paints each material's tile as a two-tone checker of its albedo.
fn paint_atlas(meta: &AtlasMeta, materials: &[MaterialEntry]) -> RgbaImage {
    let size = meta.size_texels() as u32;
    let mut img = RgbaImage::from_pixel(size, size, Rgba([32, 32, 32, 255]));
    let tile_scale = meta.tile_scale as u32;
    let cell = (tile_scale / 4).max(1);

    for entry in materials {
        let x0 = u32::from(entry.origin.0) * tile_scale;
        let y0 = u32::from(entry.origin.1) * tile_scale;
        let w = u32::from(entry.size_units.0) * tile_scale;
        let h = u32::from(entry.size_units.1) * tile_scale;
        let light = byte_rgb(entry.albedo, 1.0);
        let dark = byte_rgb(entry.albedo, 0.6);

        for dy in 0..h {
            for dx in 0..w {
                let (x, y) = (x0 + dx, y0 + dy);
                if x < size && y < size {
                    let tone = if ((dx / cell) + (dy / cell)) % 2 == 0 {
                        light
                    } else {
                        dark
                    };
                    img.put_pixel(x, y, tone);
                }
            }
        }
    }
    img
}

// ---------------------------------------------------------------------------
// Swatch rendering
// ---------------------------------------------------------------------------

/// Blend weights across the swatch: layer 0 to layer 1 left-to-right, with
/// layer 2 fading in towards the bottom when present.
fn layer_weights(tx: f32, ty: f32, layer_count: usize) -> [f32; 3] {
    match layer_count {
        1 => [1.0, 0.0, 0.0],
        2 => [1.0 - tx, tx, 0.0],
        _ => {
            let band = ty * 0.5;
            [(1.0 - tx) * (1.0 - band), tx * (1.0 - band), band]
        }
    }
}

fn run(args: &Args) -> Result<(), DemoError> {
    let manifest: DemoManifest = ron::from_str(&std::fs::read_to_string(&args.manifest)?)?;
    if manifest.materials.is_empty() {
        return Err(DemoError::EmptyManifest);
    }
    let meta = AtlasMeta::new(
        manifest.atlas.grid_units,
        manifest.atlas.tile_scale,
        manifest.atlas.mip_cap,
    )?;

    // Bake every material into the settings texture, one slot per entry.
    let mut settings_image = SettingsImage::new();
    for (i, entry) in manifest.materials.iter().enumerate() {
        let slot = SlotCoord::from_linear(SlotIndex(i as u16))?;
        bake_slot(&mut settings_image, slot, &entry.slot_spec());
    }

    // Decode with both fetch strategies and cross-check before rendering.
    let mut decoded = Vec::with_capacity(manifest.materials.len());
    for (i, entry) in manifest.materials.iter().enumerate() {
        let slot = SlotCoord::from_linear(SlotIndex(i as u16))?;
        let offset = fetch_settings(
            &settings_image,
            slot,
            meta.tile_scale,
            ShadingFeatures::ALL,
            FetchStrategy::TexelOffset,
        );
        let manual = fetch_settings(
            &settings_image,
            slot,
            meta.tile_scale,
            ShadingFeatures::ALL,
            FetchStrategy::ManualUv,
        );
        if offset != manual {
            return Err(DemoError::StrategyMismatch(entry.name.clone()));
        }
        info!(
            material = %entry.name,
            slot = i,
            specular = offset.specular,
            "decoded settings"
        );
        decoded.push(offset);
    }

    let atlas = AtlasImage::from_base(paint_atlas(&meta, &manifest.materials))?;
    info!(
        mips = atlas.mip_level_count(),
        size = meta.size_texels(),
        "built atlas"
    );

    let sampler = TerrainSampler {
        atlas: &atlas,
        meta,
        mode: AddressingMode::Dynamic,
        mip: MipSelection::Gradient,
        srgb: SrgbPolicy::DecodePerSample,
    };
    let ctx = FrameContext {
        animation_time: args.time,
        grid_size: manifest.grid_size,
    };

    // Sweep world space so a texture_scale-1 layer tiles four times.
    let span = manifest.grid_size * 0.5;
    let step = span / args.size as f32;
    let ddx_world = Vec3::new(step, 0.0, 0.0);
    let ddy_world = Vec3::new(0.0, 0.0, step);
    let layer_count = decoded.len().min(3);

    let mut swatch = RgbaImage::new(args.size, args.size);
    for py in 0..args.size {
        for px in 0..args.size {
            let tx = px as f32 / (args.size - 1).max(1) as f32;
            let ty = py as f32 / (args.size - 1).max(1) as f32;
            let world = Vec3::new(tx * span, 0.0, ty * span);

            let weights = layer_weights(tx, ty, layer_count);
            let layers: Vec<TerrainLayer> = decoded
                .iter()
                .zip(&manifest.materials)
                .zip(weights)
                .take(layer_count)
                .map(|((settings, entry), weight)| TerrainLayer {
                    settings: *settings,
                    texture_scale: entry.texture_scale,
                    weight,
                })
                .collect();

            let linear = sampler.sample(&ctx, world, ddx_world, ddy_world, &layers);
            let srgb = linear_to_srgb(Vec3::new(linear.x, linear.y, linear.z));
            let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            swatch.put_pixel(px, py, Rgba([q(srgb.x), q(srgb.y), q(srgb.z), 255]));
        }
    }

    swatch.save(&args.output)?;
    info!(path = %args.output.display(), size = args.size, "wrote swatch");
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    tessera_log::init_logging(args.log.as_deref());
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tessera-demo: {e}");
            ExitCode::FAILURE
        }
    }
}
