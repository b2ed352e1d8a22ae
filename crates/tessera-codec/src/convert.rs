//! Colour-space conversions: sRGB↔linear and RGB↔HSL.

use glam::{Vec3, Vec4};

/// Converts an sRGB colour to linear using the pow-2.2 approximation.
pub fn srgb_to_linear(srgb: Vec3) -> Vec3 {
    Vec3::new(
        srgb.x.powf(2.2),
        srgb.y.powf(2.2),
        srgb.z.powf(2.2),
    )
}

/// Cheap gamma-correct-inputs variant: squares the colour instead of the
/// full pow. Pairs with [`linear_to_srgb_legacy`].
pub fn srgb_to_linear_fast(srgb: Vec3) -> Vec3 {
    srgb * srgb
}

/// Converts a linear colour to sRGB using the scaled-pow approximation.
pub fn linear_to_srgb(linear: Vec3) -> Vec3 {
    let powed = Vec3::new(
        linear.x.powf(0.416667),
        linear.y.powf(0.416667),
        linear.z.powf(0.416667),
    );
    (Vec3::splat(1.055) * powed - Vec3::splat(0.055)).max(Vec3::ZERO)
}

/// Scalar linear→sRGB via the plain 1/2.2 power.
pub fn linear_to_srgb_scalar(linear: f32) -> f32 {
    linear.powf(1.0 / 2.2)
}

/// Legacy sqrt gamma, the inverse of [`srgb_to_linear_fast`].
pub fn linear_to_srgb_legacy(linear: Vec3) -> Vec3 {
    Vec3::new(linear.x.sqrt(), linear.y.sqrt(), linear.z.sqrt())
}

/// Converts RGBA to HSL, alpha passed through in `w`.
pub fn rgb_to_hsl(rgba: Vec4) -> Vec4 {
    let (r, g, b) = (rgba.x, rgba.y, rgba.z);
    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;
    let lightness = (min + max) * 0.5;

    let mut saturation = 0.0;
    if lightness > 0.0 && lightness < 1.0 {
        let l = if lightness < 0.5 {
            lightness
        } else {
            1.0 - lightness
        };
        saturation = delta / (l * 2.0);
    }

    let mut hue = 0.0;
    if delta > 0.0 {
        let mask = Vec3::new(
            if max == r && max != g { 1.0 } else { 0.0 },
            if max == g && max != b { 1.0 } else { 0.0 },
            if max == b && max != r { 1.0 } else { 0.0 },
        );
        let candidates = Vec3::new(
            (g - b) / delta,
            2.0 + (b - r) / delta,
            4.0 + (r - g) / delta,
        );
        hue += candidates.dot(mask);
        hue *= 1.0 / 6.0;
        if hue < 0.0 {
            hue += 1.0;
        }
    }

    Vec4::new(hue, saturation, lightness, rgba.w)
}

/// Converts HSLA to RGBA, alpha passed through in `w`.
pub fn hsl_to_rgb(hsla: Vec4) -> Vec4 {
    let (h, s, l) = (hsla.x, hsla.y, hsla.z);

    let mut f = Vec3::new(6.0 * (h - 2.0 / 3.0), 0.0, 6.0 * (1.0 - h));
    if h < 2.0 / 3.0 {
        f = Vec3::new(0.0, 6.0 * (2.0 / 3.0 - h), 6.0 * (h - 1.0 / 3.0));
    }
    if h < 1.0 / 3.0 {
        f = Vec3::new(6.0 * (1.0 / 3.0 - h), 6.0 * h, 0.0);
    }
    f = f.min(Vec3::ONE);

    let scale = 2.0 * s;
    let offset = 1.0 - s;
    let c = scale * f + Vec3::splat(offset);

    let rgb = if l >= 0.5 {
        (1.0 - l) * c + Vec3::splat(2.0 * l - 1.0)
    } else {
        l * c
    };

    Vec4::new(rgb.x, rgb.y, rgb.z, hsla.w)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_round_trip() {
        for i in 1..20 {
            let c = Vec3::splat(i as f32 / 20.0);
            let linear = srgb_to_linear(c);
            let back = linear_to_srgb(linear);
            assert!((back - c).length() < 0.02, "{c} -> {linear} -> {back}");
        }
    }

    #[test]
    fn test_fast_gamma_round_trip_is_exact() {
        let c = Vec3::new(0.25, 0.5, 0.75);
        let back = linear_to_srgb_legacy(srgb_to_linear_fast(c));
        assert!((back - c).length() < 1e-6);
    }

    #[test]
    fn test_hsl_round_trip_primaries() {
        for c in [
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 0.5),
            Vec4::new(0.3, 0.6, 0.9, 1.0),
        ] {
            let hsl = rgb_to_hsl(c);
            let back = hsl_to_rgb(hsl);
            assert!(
                (back - c).length() < 1e-3,
                "rgb->hsl->rgb drifted: {c} -> {hsl} -> {back}"
            );
        }
    }

    #[test]
    fn test_grey_has_zero_saturation() {
        let hsl = rgb_to_hsl(Vec4::new(0.4, 0.4, 0.4, 1.0));
        assert_eq!(hsl.y, 0.0);
        assert!((hsl.z - 0.4).abs() < 1e-6);
    }
}
