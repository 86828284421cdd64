//! Conversion of `0xRRGGBB` sRGB integers into the linear values shaders expect.

/// Decode one sRGB-encoded channel in `[0, 1]` to linear.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// `0xRRGGBB` as linear RGB.
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

/// `0xRRGGBB` as an opaque linear clear color.
pub fn hex_to_clear_color(hex: u32) -> wgpu::Color {
    let [r, g, b] = srgb_hex_to_linear(hex);
    wgpu::Color {
        r: f64::from(r),
        g: f64::from(g),
        b: f64::from(b),
        a: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white_are_fixed_points() {
        assert_eq!(srgb_hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
        let white = srgb_hex_to_linear(0xffffff);
        assert!(white.iter().all(|c| (c - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_mid_grey_is_darker_in_linear() {
        let [r, g, b] = srgb_hex_to_linear(0x808080);
        assert!((r - 0.2158).abs() < 1e-3);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn test_channel_order() {
        let [r, g, b] = srgb_hex_to_linear(0xff0000);
        assert!((r - 1.0).abs() < 1e-6);
        assert_eq!((g, b), (0.0, 0.0));
        let [r, g, b] = srgb_hex_to_linear(0x0000ff);
        assert_eq!((r, g), (0.0, 0.0));
        assert!((b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clear_color_is_opaque() {
        assert_eq!(hex_to_clear_color(0x1e485e).a, 1.0);
    }
}
