use crate::types::Rgb;

/// Anchor colours for harmonic sets and Doppler markers, left to right on the slider.
pub const PALETTE_ANCHORS: [Rgb; 12] = [
    Rgb::new(0xe6, 0x19, 0x4b), // red
    Rgb::new(0xf5, 0x82, 0x31), // orange
    Rgb::new(0xff, 0xe1, 0x19), // yellow
    Rgb::new(0xbf, 0xef, 0x45), // lime
    Rgb::new(0x3c, 0xb4, 0x4b), // green
    Rgb::new(0x46, 0xf0, 0xf0), // cyan
    Rgb::new(0x42, 0xd4, 0xf4), // sky
    Rgb::new(0x43, 0x63, 0xd8), // blue
    Rgb::new(0x91, 0x1e, 0xb4), // purple
    Rgb::new(0xf0, 0x32, 0xe6), // magenta
    Rgb::new(0xfa, 0xbe, 0xd4), // pink
    Rgb::new(0xff, 0xff, 0xff), // white
];

/// Map a slider position in `[0, width]` to a colour, blending linearly between
/// adjacent anchors. Out-of-range positions clamp to the end anchors.
pub fn palette_color(position: f64, width: f64) -> Rgb {
    if width <= 0.0 || !position.is_finite() {
        return PALETTE_ANCHORS[0];
    }
    let frac = (position / width).clamp(0.0, 1.0);
    let segments = (PALETTE_ANCHORS.len() - 1) as f64;
    let scaled = frac * segments;
    let lo = (scaled as usize).min(PALETTE_ANCHORS.len() - 2);
    let t = scaled - lo as f64;
    let a = PALETTE_ANCHORS[lo];
    let b = PALETTE_ANCHORS[lo + 1];
    Rgb {
        r: lerp_u8(a.r, b.r, t),
        g: lerp_u8(a.g, b.g, t),
        b: lerp_u8(a.b, b.b, t),
    }
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

/// CSS colour string with alpha, e.g. `rgba(230, 25, 75, 0.8)`.
pub fn rgba_css(c: Rgb, alpha: f64) -> String {
    format!("rgba({}, {}, {}, {:.2})", c.r, c.g, c.b, alpha.clamp(0.0, 1.0))
}

/// Label for a frequency line.
pub fn freq_label(freq_hz: f64) -> String {
    if freq_hz.abs() >= 1000.0 {
        format!("{:.2} kHz", freq_hz / 1000.0)
    } else {
        format!("{:.0} Hz", freq_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_ends_are_exact_anchors() {
        assert_eq!(palette_color(0.0, 240.0), PALETTE_ANCHORS[0]);
        assert_eq!(palette_color(240.0, 240.0), PALETTE_ANCHORS[11]);
        assert_eq!(palette_color(-50.0, 240.0), PALETTE_ANCHORS[0]);
        assert_eq!(palette_color(999.0, 240.0), PALETTE_ANCHORS[11]);
    }

    #[test]
    fn test_palette_hits_interior_anchors() {
        let width = 110.0;
        for (i, anchor) in PALETTE_ANCHORS.iter().enumerate() {
            assert_eq!(palette_color(i as f64 * 10.0, width), *anchor, "anchor {i}");
        }
    }

    #[test]
    fn test_palette_blend_is_monotonic_within_segment() {
        let width = 110.0;
        // Segment 0: red -> orange. Green rises, blue falls.
        let mut prev = palette_color(0.0, width);
        for step in 1..=10 {
            let c = palette_color(step as f64, width);
            assert!(c.g >= prev.g, "green should not fall at step {step}");
            assert!(c.b <= prev.b, "blue should not rise at step {step}");
            prev = c;
        }
        let quarter = palette_color(2.5, width);
        let (a, b) = (PALETTE_ANCHORS[0], PALETTE_ANCHORS[1]);
        assert_eq!(quarter.r, lerp_u8(a.r, b.r, 0.25));
        assert_eq!(quarter.g, lerp_u8(a.g, b.g, 0.25));
    }

    #[test]
    fn test_freq_label() {
        assert_eq!(freq_label(450.0), "450 Hz");
        assert_eq!(freq_label(12_500.0), "12.50 kHz");
    }
}
