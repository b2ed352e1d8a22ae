//! Per-draw frame context: the read-only values the renderer binds once per
//! draw, passed explicitly instead of living in global uniforms.

use glam::Vec2;

/// Read-only per-draw inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameContext {
    /// Texture animation clock, in the same time unit UV scroll velocities
    /// are authored against.
    pub animation_time: f32,
    /// Terrain grid cell size in world units.
    pub grid_size: f32,
}

impl FrameContext {
    /// Applies a material's UV scroll to a base UV.
    ///
    /// The offset is taken modulo 1 before the add so long-running clocks
    /// keep full float precision in the fractional part.
    pub fn animated_uv(&self, uv: Vec2, uv_anim: Vec2) -> Vec2 {
        let scrolled = uv_anim * self.animation_time;
        uv + Vec2::new(
            scrolled.x - scrolled.x.floor(),
            scrolled.y - scrolled.y.floor(),
        )
    }
}
