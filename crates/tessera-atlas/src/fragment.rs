//! Fragment gating: the only "error path" an invocation has is to abandon
//! its unit of work and emit nothing. Alpha-test cutoff and stochastic
//! stipple transparency both resolve to that verdict.

use glam::Vec2;

// ---------------------------------------------------------------------------
// FragmentVerdict
// ---------------------------------------------------------------------------

/// Outcome of a fragment gate.
///
/// `Discard` means no colour is written for this invocation; callers must
/// not emit any output, mirroring shader `discard` exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentVerdict {
    /// Continue shading.
    Keep,
    /// Abandon this invocation; emit nothing.
    Discard,
}

/// Alpha-test cutoff: discard at or below the threshold.
pub fn alpha_test(alpha: f32, threshold: f32) -> FragmentVerdict {
    if alpha <= threshold {
        FragmentVerdict::Discard
    } else {
        FragmentVerdict::Keep
    }
}

/// Interleaved gradient noise over screen coordinates, in `[0, 0.999]`.
///
/// The standard screen-space dither pattern: stable per pixel, decorrelated
/// between neighbours.
pub fn interleaved_gradient_noise(frag_coord: Vec2) -> f32 {
    let f = |x: f32| x - x.floor();
    f(52.9829 * f(0.0671106 * frag_coord.x + 0.00583715 * frag_coord.y)).clamp(0.0, 0.999)
}

// ---------------------------------------------------------------------------
// StippleTransparency
// ---------------------------------------------------------------------------

/// Stipple (dithered) transparency configuration.
///
/// Coverage fades in near the camera and out towards the far clip, then the
/// fragment survives only where coverage beats the per-pixel noise.
#[derive(Clone, Copy, Debug, Default)]
pub struct StippleTransparency {
    /// `(start_depth, scale)` for the near fade-in, if enabled.
    pub near_fade: Option<(f32, f32)>,
    /// `(start_depth, scale)` for the far fade-out, if enabled.
    pub far_fade: Option<(f32, f32)>,
    /// Multiply coverage by the material alpha (plus a small epsilon so
    /// fully-authored-opaque fragments never dither).
    pub use_alpha: bool,
}

impl StippleTransparency {
    /// Effective coverage for a fragment at `view_depth` with `alpha`.
    pub fn coverage(&self, view_depth: f32, alpha: f32) -> f32 {
        let mut c = 1.0;
        if let Some((start, scale)) = self.near_fade {
            c *= ((view_depth - start) * scale).clamp(0.0, 1.0);
        }
        if let Some((start, scale)) = self.far_fade {
            c *= (1.0 - (view_depth - start) * scale).clamp(0.0, 1.0);
        }
        if self.use_alpha {
            c *= (alpha + 0.005).clamp(0.0, 1.0);
        }
        c
    }
}

/// Stipple visibility: the fragment survives where coverage beats the
/// screen-space noise.
pub fn stipple_visible(
    stipple: &StippleTransparency,
    view_depth: f32,
    alpha: f32,
    frag_coord: Vec2,
) -> FragmentVerdict {
    if stipple.coverage(view_depth, alpha) > interleaved_gradient_noise(frag_coord) {
        FragmentVerdict::Keep
    } else {
        FragmentVerdict::Discard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_test_boundary_is_inclusive() {
        assert_eq!(alpha_test(0.5, 0.5), FragmentVerdict::Discard);
        assert_eq!(alpha_test(0.51, 0.5), FragmentVerdict::Keep);
        assert_eq!(alpha_test(0.0, 0.0), FragmentVerdict::Discard);
    }

    #[test]
    fn test_noise_stays_in_range() {
        for y in 0..64 {
            for x in 0..64 {
                let n = interleaved_gradient_noise(Vec2::new(x as f32, y as f32));
                assert!((0.0..=0.999).contains(&n));
            }
        }
    }

    #[test]
    fn test_noise_varies_between_neighbours() {
        let a = interleaved_gradient_noise(Vec2::new(10.0, 10.0));
        let b = interleaved_gradient_noise(Vec2::new(11.0, 10.0));
        assert!((a - b).abs() > 1e-3);
    }

    #[test]
    fn test_full_coverage_always_survives() {
        let stipple = StippleTransparency::default();
        for x in 0..32 {
            let v = stipple_visible(&stipple, 100.0, 1.0, Vec2::new(x as f32, 3.0));
            assert_eq!(v, FragmentVerdict::Keep, "pixel {x} dithered at coverage 1");
        }
    }

    #[test]
    fn test_zero_alpha_coverage_never_survives_anywhere() {
        let stipple = StippleTransparency {
            use_alpha: true,
            ..StippleTransparency::default()
        };
        let mut kept = 0;
        for x in 0..64 {
            for y in 0..64 {
                if stipple_visible(&stipple, 100.0, 0.0, Vec2::new(x as f32, y as f32))
                    == FragmentVerdict::Keep
                {
                    kept += 1;
                }
            }
        }
        // Coverage 0.005 survives only where noise < 0.005.
        assert!(kept < 64 * 64 / 50, "kept {kept} of 4096");
    }

    #[test]
    fn test_half_alpha_dithers_roughly_half() {
        let stipple = StippleTransparency {
            use_alpha: true,
            ..StippleTransparency::default()
        };
        let mut kept = 0;
        for x in 0..64 {
            for y in 0..64 {
                if stipple_visible(&stipple, 100.0, 0.5, Vec2::new(x as f32, y as f32))
                    == FragmentVerdict::Keep
                {
                    kept += 1;
                }
            }
        }
        let ratio = kept as f32 / 4096.0;
        assert!((0.35..0.65).contains(&ratio), "kept ratio {ratio}");
    }

    #[test]
    fn test_near_fade_discards_at_camera() {
        let stipple = StippleTransparency {
            near_fade: Some((10.0, 0.1)),
            ..StippleTransparency::default()
        };
        assert_eq!(stipple.coverage(10.0, 1.0), 0.0);
        assert_eq!(stipple.coverage(20.0, 1.0), 1.0);
    }
}
