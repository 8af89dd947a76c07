/// Upper bound on lines listed for one window, so a tiny spacing cannot flood the display.
pub const MAX_VISIBLE_HARMONICS: usize = 2048;

/// Harmonic lines k · spacing (k ≥ 1) that fall inside `[min_freq, max_freq]`,
/// as `(k, frequency)` pairs in ascending order.
pub fn harmonic_frequencies(spacing: f64, min_freq: f64, max_freq: f64) -> Vec<(usize, f64)> {
    if !spacing.is_finite() || spacing <= 0.0 || !(min_freq <= max_freq) {
        return Vec::new();
    }
    let first = (min_freq / spacing).ceil().max(1.0);
    let last = (max_freq / spacing).floor();
    if !first.is_finite() || !last.is_finite() || last < first {
        return Vec::new();
    }
    (first as usize..=last as usize)
        .take(MAX_VISIBLE_HARMONICS)
        .map(|k| (k, k as f64 * spacing))
        .collect()
}

/// Spacing implied by dragging from one harmonic line to its neighbour.
pub fn spacing_from_drag(start_freq: f64, current_freq: f64) -> Option<f64> {
    let spacing = (current_freq - start_freq).abs();
    (spacing.is_finite() && spacing > 0.0).then_some(spacing)
}

/// Spacing that puts harmonic number `k` at `freq`.
pub fn spacing_for_harmonic(freq: f64, k: usize) -> Option<f64> {
    if k == 0 {
        return None;
    }
    let spacing = freq / k as f64;
    (spacing.is_finite() && spacing > 0.0).then_some(spacing)
}

/// Harmonic number whose line lies closest to `freq` (at least 1).
pub fn nearest_harmonic(spacing: f64, freq: f64) -> usize {
    if spacing <= 0.0 || !freq.is_finite() {
        return 1;
    }
    ((freq / spacing).round() as usize).max(1)
}
