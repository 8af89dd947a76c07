use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;
use crate::annotations::HarmonicSet;
use crate::canvas::colors::{freq_label, rgba_css};
use crate::canvas::transform::TransformManager;
use crate::dsp::harmonics::harmonic_frequencies;
use crate::modes::analysis::AnalysisState;
use crate::modes::doppler::DopplerState;
use crate::modes::zoom::ZoomSelectState;
use crate::modes::ModeState;
use crate::state::AppState;
use crate::types::{DataPoint, Rgb, ScreenPoint, SurfacePoint};

const MARKER_RADIUS: f64 = 6.0;
const PREVIEW_COLOR: Rgb = Rgb::new(0xff, 0xff, 0xff);

/// Screen x of each harmonic line of `set` currently in view, paired with
/// its harmonic number.
pub fn harmonic_line_positions(set: &HarmonicSet, transform: &TransformManager, width: f64) -> Vec<(usize, f64)> {
    let range = transform.coordinate_system().data_range();
    let visible = transform.visible_data_rect();
    let low = visible.freq_low.max(range.min_x);
    let high = visible.freq_high.min(range.max_x);
    harmonic_frequencies(set.spacing, low, high)
        .into_iter()
        .filter_map(|(k, freq)| {
            let x = transform.data_to_screen(DataPoint::new(freq, range.min_y)).x;
            (0.0..=width).contains(&x).then_some((k, x))
        })
        .collect()
}

/// Redraw every overlay for the published state. The canvas is expected to
/// cover the container, so screen coordinates are canvas pixels.
pub fn draw_overlay(
    ctx: &CanvasRenderingContext2d,
    state: &AppState,
    transform: &TransformManager,
    canvas_width: f64,
    canvas_height: f64,
) {
    ctx.clear_rect(0.0, 0.0, canvas_width, canvas_height);

    for set in &state.harmonic_sets {
        draw_harmonic_set(ctx, set, transform, canvas_width, canvas_height);
    }

    let Some(active) = state.active_mode else {
        return;
    };
    match state.mode_state(active) {
        Some(ModeState::Doppler(s)) => draw_doppler(ctx, s, transform),
        Some(ModeState::Zoom(s)) => draw_zoom_selection(ctx, s, transform),
        Some(ModeState::Analysis(s)) => draw_analysis(ctx, s, transform, canvas_width, canvas_height),
        _ => {}
    }
}

pub fn draw_harmonic_set(
    ctx: &CanvasRenderingContext2d,
    set: &HarmonicSet,
    transform: &TransformManager,
    canvas_width: f64,
    canvas_height: f64,
) {
    ctx.set_stroke_style_str(&rgba_css(set.color, 0.8));
    ctx.set_fill_style_str(&rgba_css(set.color, 0.9));
    ctx.set_font("11px sans-serif");
    for (k, x) in harmonic_line_positions(set, transform, canvas_width) {
        // Fundamental is drawn heavier
        ctx.set_line_width(if k == 1 { 2.0 } else { 1.0 });
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, canvas_height);
        ctx.stroke();
    }
    if let Some((_, x)) = harmonic_line_positions(set, transform, canvas_width).first() {
        let _ = ctx.fill_text(&freq_label(set.spacing), x + 3.0, 12.0);
    }
}

pub fn draw_doppler(ctx: &CanvasRenderingContext2d, state: &DopplerState, transform: &TransformManager) {
    let color = state.color.unwrap_or(PREVIEW_COLOR);

    // Preview: first marker fixed, second following the pointer
    if state.markers_placed == 1 {
        if let (Some(a), Some(b)) = (state.temp_first, state.f_minus) {
            let (pa, pb) = (transform.data_to_screen(a), transform.data_to_screen(b));
            stroke_line(ctx, pa, pb, &rgba_css(PREVIEW_COLOR, 0.6));
            draw_marker(ctx, pa, PREVIEW_COLOR, "");
            draw_marker(ctx, pb, PREVIEW_COLOR, "");
        }
        return;
    }

    let (Some(fp), Some(fm), Some(f0)) = (state.f_plus, state.f_minus, state.f_zero) else {
        return;
    };
    let (pp, pm, p0) = (
        transform.data_to_screen(fp),
        transform.data_to_screen(fm),
        transform.data_to_screen(f0),
    );
    stroke_line(ctx, pm, pp, &rgba_css(color, 0.7));
    draw_marker(ctx, pp, color, "f+");
    draw_marker(ctx, pm, color, "f-");
    draw_marker(ctx, p0, color, "f0");

    if let Some(speed) = state.speed {
        ctx.set_fill_style_str(&rgba_css(color, 1.0));
        ctx.set_font("12px sans-serif");
        let label = match state.speed_knots() {
            Some(kn) => format!("{speed:.1} m/s ({kn:.1} kn)"),
            None => format!("{speed:.1} m/s"),
        };
        let _ = ctx.fill_text(&label, p0.x + 10.0, p0.y - 10.0);
    }
}

pub fn draw_zoom_selection(ctx: &CanvasRenderingContext2d, state: &ZoomSelectState, transform: &TransformManager) {
    let Some(rect) = state.selection.map(|r| r.normalized()) else {
        return;
    };
    let coords = transform.coordinate_system();
    let a = coords.svg_to_screen(SurfacePoint::new(rect.x, rect.y), false);
    let b = coords.svg_to_screen(SurfacePoint::new(rect.x + rect.width, rect.y + rect.height), false);
    let (w, h) = (b.x - a.x, b.y - a.y);
    if w <= 0.0 || h <= 0.0 {
        return;
    }

    ctx.set_fill_style_str("rgba(50, 120, 200, 0.15)");
    ctx.fill_rect(a.x, a.y, w, h);

    ctx.set_stroke_style_str("rgba(80, 160, 255, 0.7)");
    ctx.set_line_width(1.0);
    ctx.stroke_rect(a.x, a.y, w, h);
}

pub fn draw_analysis(
    ctx: &CanvasRenderingContext2d,
    state: &AnalysisState,
    transform: &TransformManager,
    canvas_width: f64,
    canvas_height: f64,
) {
    let Some(pin) = state.pinned else {
        return;
    };
    let p = transform.data_to_screen(pin);
    ctx.set_stroke_style_str("rgba(255, 255, 255, 0.5)");
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(p.x, 0.0);
    ctx.line_to(p.x, canvas_height);
    ctx.move_to(0.0, p.y);
    ctx.line_to(canvas_width, p.y);
    ctx.stroke();

    if let Some((df, dt)) = state.delta() {
        ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
        ctx.set_font("11px sans-serif");
        let _ = ctx.fill_text(&format!("\u{0394}f {df:.1} Hz  \u{0394}t {dt:.3}"), p.x + 4.0, p.y - 4.0);
    }
}

fn stroke_line(ctx: &CanvasRenderingContext2d, a: ScreenPoint, b: ScreenPoint, style: &str) {
    ctx.set_stroke_style_str(style);
    ctx.set_line_width(1.5);
    ctx.begin_path();
    ctx.move_to(a.x, a.y);
    ctx.line_to(b.x, b.y);
    ctx.stroke();
}

fn draw_marker(ctx: &CanvasRenderingContext2d, at: ScreenPoint, color: Rgb, label: &str) {
    ctx.set_fill_style_str(&rgba_css(color, 0.9));
    ctx.begin_path();
    let _ = ctx.arc(at.x, at.y, MARKER_RADIUS, 0.0, TAU);
    ctx.fill();
    if !label.is_empty() {
        ctx.set_font("11px sans-serif");
        let _ = ctx.fill_text(label, at.x + MARKER_RADIUS + 2.0, at.y + 4.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::coordinates::CoordinateSystem;
    use crate::config::AnnotatorConfig;
    use crate::types::{DataRange, ImageDimensions};

    fn transform() -> TransformManager {
        let cs = CoordinateSystem::new(
            DataRange::new(100.0, 900.0, 100.0, 500.0).unwrap(),
            ImageDimensions::new(1000.0, 500.0).unwrap(),
        )
        .unwrap();
        TransformManager::new(cs, &AnnotatorConfig::default())
    }

    #[test]
    fn test_harmonic_lines_in_view() {
        let t = transform();
        let set = HarmonicSet { id: 1, spacing: 200.0, color: PREVIEW_COLOR };
        let lines = harmonic_line_positions(&set, &t, 1000.0);
        let ks: Vec<usize> = lines.iter().map(|(k, _)| *k).collect();
        assert_eq!(ks, vec![1, 2, 3, 4]);
        assert!((lines[0].1 - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_harmonic_lines_follow_zoom() {
        let mut t = transform();
        // Right half of the image: 500-900 Hz
        t.zoom_to_rect(500.0, 0.0, 500.0, 500.0).unwrap();
        let set = HarmonicSet { id: 1, spacing: 200.0, color: PREVIEW_COLOR };
        let lines = harmonic_line_positions(&set, &t, 1000.0);
        let ks: Vec<usize> = lines.iter().map(|(k, _)| *k).collect();
        assert_eq!(ks, vec![3, 4]);
        // 600 Hz sits a quarter of the way across 500-900 Hz
        assert!((lines[0].1 - 250.0).abs() < 1e-6);
    }

    #[test]
    fn test_harmonic_lines_cover_full_band() {
        let cs = CoordinateSystem::new(
            DataRange::new(0.0, 24_000.0, 0.0, 10.0).unwrap(),
            ImageDimensions::new(1200.0, 600.0).unwrap(),
        )
        .unwrap();
        let t = TransformManager::new(cs, &AnnotatorConfig::default());
        let set = HarmonicSet { id: 1, spacing: 100.0, color: PREVIEW_COLOR };
        let lines = harmonic_line_positions(&set, &t, 1200.0);
        assert_eq!(lines.len(), 240);
        let at_20k = lines.iter().find(|(k, _)| *k == 200).expect("20 kHz line drawn");
        assert!((at_20k.1 - 1000.0).abs() < 1e-6, "20 kHz at x={}", at_20k.1);
        assert_eq!(lines.last().map(|(k, _)| *k), Some(240));
    }
}
