//! Zoom and pan state layered over a `CoordinateSystem`.
//!
//! The displayed surface is `display = surface * scale + pan` in Y-down surface
//! units, i.e. the transform a renderer applies to the image group. Pan is
//! clamped so the scaled image always covers the viewport on every edge.

use serde::{Deserialize, Serialize};
use crate::canvas::coordinates::CoordinateSystem;
use crate::config::AnnotatorConfig;
use crate::error::AnnotatorError;
use crate::types::{DataPoint, DataRect, ImageDimensions, ImagePoint, ScreenPoint, SurfacePoint};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomState {
    pub scale_x: f64,
    pub scale_y: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ZoomState {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanLimits {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

/// One pointer position resolved into every coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateBundle {
    pub screen: ScreenPoint,
    /// Y-down surface position as displayed (zoom/pan still applied).
    pub display: SurfacePoint,
    /// Y-down surface position with zoom/pan undone.
    pub surface: SurfacePoint,
    pub image: ImagePoint,
    pub data: DataPoint,
    pub zoom: ZoomState,
}

#[derive(Clone, Debug)]
pub struct TransformManager {
    coords: CoordinateSystem,
    zoom: ZoomState,
    min_scale: f64,
    max_scale: f64,
}

impl TransformManager {
    pub fn new(coords: CoordinateSystem, config: &AnnotatorConfig) -> Self {
        Self {
            coords,
            zoom: ZoomState::default(),
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        }
    }

    pub fn coordinate_system(&self) -> &CoordinateSystem {
        &self.coords
    }

    /// Swap in the mapping for a new image. Zoom is reset.
    pub fn replace_coordinate_system(&mut self, coords: CoordinateSystem) {
        self.coords = coords;
        self.reset_transform();
    }

    pub fn set_container_size(&mut self, container: ImageDimensions) -> Result<(), AnnotatorError> {
        self.coords.set_container_size(container)
    }

    pub fn zoom_state(&self) -> ZoomState {
        self.zoom
    }

    /// Viewport size in surface units.
    pub fn viewport_size(&self) -> (f64, f64) {
        let s = self.coords.surface();
        (s.width, s.height)
    }

    pub fn calculate_pan_limits(&self) -> PanLimits {
        let (vw, vh) = self.viewport_size();
        let scaled_w = vw * self.zoom.scale_x;
        let scaled_h = vh * self.zoom.scale_y;
        PanLimits {
            min_x: (vw - scaled_w).min(0.0),
            max_x: 0.0,
            min_y: (vh - scaled_h).min(0.0),
            max_y: 0.0,
        }
    }

    fn clamp_pan(&mut self) {
        let limits = self.calculate_pan_limits();
        let x = self.zoom.pan_x.clamp(limits.min_x, limits.max_x);
        let y = self.zoom.pan_y.clamp(limits.min_y, limits.max_y);
        if x != self.zoom.pan_x || y != self.zoom.pan_y {
            log::debug!(
                "pan clamped ({:.1}, {:.1}) -> ({:.1}, {:.1})",
                self.zoom.pan_x, self.zoom.pan_y, x, y
            );
        }
        self.zoom.pan_x = x;
        self.zoom.pan_y = y;
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Pan by a device-pixel delta. Returns true if the pan actually moved.
    pub fn update_pan(&mut self, delta_screen_x: f64, delta_screen_y: f64) -> bool {
        let before = self.zoom;
        let (kx, ky) = self.coords.screen_scale();
        self.zoom.pan_x += delta_screen_x * kx;
        self.zoom.pan_y += delta_screen_y * ky;
        self.clamp_pan();
        before != self.zoom
    }

    /// Fit the given Y-down surface rectangle to the viewport. Each axis scales
    /// independently, so the displayed aspect ratio may change.
    pub fn zoom_to_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> Result<(), AnnotatorError> {
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(AnnotatorError::InvalidDimension { width: w, height: h });
        }
        let (vw, vh) = self.viewport_size();
        self.zoom.scale_x = self.clamp_scale(vw / w);
        self.zoom.scale_y = self.clamp_scale(vh / h);

        let cx = x + w / 2.0;
        let cy = y + h / 2.0;
        self.zoom.pan_x = vw / 2.0 - cx * self.zoom.scale_x;
        self.zoom.pan_y = vh / 2.0 - cy * self.zoom.scale_y;
        self.clamp_pan();
        log::debug!(
            "zoom to rect ({x:.1}, {y:.1}, {w:.1}x{h:.1}) -> scale ({:.2}, {:.2})",
            self.zoom.scale_x, self.zoom.scale_y
        );
        Ok(())
    }

    /// Scale both axes by `factor`, keeping the point under the viewport centre fixed.
    pub fn zoom_by_factor(&mut self, factor: f64) -> Result<(), AnnotatorError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(AnnotatorError::InvalidZoomFactor(factor));
        }
        let (vw, vh) = self.viewport_size();
        let centre = self.display_to_surface(SurfacePoint::new(vw / 2.0, vh / 2.0));

        self.zoom.scale_x = self.clamp_scale(self.zoom.scale_x * factor);
        self.zoom.scale_y = self.clamp_scale(self.zoom.scale_y * factor);
        self.zoom.pan_x = vw / 2.0 - centre.x * self.zoom.scale_x;
        self.zoom.pan_y = vh / 2.0 - centre.y * self.zoom.scale_y;
        self.clamp_pan();
        log::debug!("zoom by {factor:.3} -> scale ({:.2}, {:.2})", self.zoom.scale_x, self.zoom.scale_y);
        Ok(())
    }

    pub fn reset_transform(&mut self) {
        self.zoom = ZoomState::default();
    }

    pub fn surface_to_display(&self, p: SurfacePoint) -> SurfacePoint {
        SurfacePoint {
            x: p.x * self.zoom.scale_x + self.zoom.pan_x,
            y: p.y * self.zoom.scale_y + self.zoom.pan_y,
        }
    }

    pub fn display_to_surface(&self, p: SurfacePoint) -> SurfacePoint {
        SurfacePoint {
            x: (p.x - self.zoom.pan_x) / self.zoom.scale_x,
            y: (p.y - self.zoom.pan_y) / self.zoom.scale_y,
        }
    }

    pub fn get_all_coordinates(&self, screen_x: f64, screen_y: f64) -> CoordinateBundle {
        let display = self.coords.screen_to_svg(screen_x, screen_y, false);
        let surface = self.display_to_surface(display);
        let data = self.coords.svg_to_data(self.coords.flip_y(surface));
        CoordinateBundle {
            screen: ScreenPoint::new(screen_x, screen_y),
            display,
            surface,
            image: self.coords.data_to_image(data),
            data,
            zoom: self.zoom,
        }
    }

    /// Device-pixel position of a data point under the current zoom/pan.
    pub fn data_to_screen(&self, d: DataPoint) -> ScreenPoint {
        let surface = self.coords.flip_y(self.coords.data_to_svg(d));
        self.coords.svg_to_screen(self.surface_to_display(surface), false)
    }

    /// CSS `transform` (with `transform-origin: 0 0`) that places an element
    /// laid out at container size where the zoomed surface is displayed.
    pub fn css_transform(&self) -> String {
        let (kx, ky) = self.coords.screen_scale();
        format!(
            "translate({:.3}px, {:.3}px) scale({:.5}, {:.5})",
            self.zoom.pan_x / kx,
            self.zoom.pan_y / ky,
            self.zoom.scale_x,
            self.zoom.scale_y
        )
    }

    pub fn visible_data_rect(&self) -> DataRect {
        let (vw, vh) = self.viewport_size();
        let top_left = self.display_to_surface(SurfacePoint::new(0.0, 0.0));
        let bottom_right = self.display_to_surface(SurfacePoint::new(vw, vh));
        let hi = self.coords.svg_to_data(self.coords.flip_y(top_left));
        let lo = self.coords.svg_to_data(self.coords.flip_y(bottom_right));
        DataRect {
            freq_low: hi.freq,
            freq_high: lo.freq,
            time_start: lo.time,
            time_end: hi.time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataRange;

    fn manager() -> TransformManager {
        let cs = CoordinateSystem::new(
            DataRange::new(100.0, 900.0, 100.0, 500.0).unwrap(),
            ImageDimensions::new(1000.0, 500.0).unwrap(),
        )
        .unwrap();
        TransformManager::new(cs, &AnnotatorConfig::default())
    }

    fn assert_close(a: f64, b: f64, what: &str) {
        assert!((a - b).abs() < 1e-6, "{what}: expected {b}, got {a}");
    }

    #[test]
    fn test_zoom_to_rect_then_reset() {
        let mut tm = manager();
        tm.zoom_to_rect(250.0, 125.0, 500.0, 250.0).unwrap();
        let z = tm.zoom_state();
        assert_close(z.scale_x, 2.0, "scale_x");
        assert_close(z.scale_y, 2.0, "scale_y");
        assert_close(z.pan_x, -500.0, "pan_x");
        assert_close(z.pan_y, -250.0, "pan_y");

        tm.reset_transform();
        assert!(tm.zoom_state().is_identity());
    }

    #[test]
    fn test_zoom_to_rect_allows_aspect_change() {
        let mut tm = manager();
        tm.zoom_to_rect(0.0, 0.0, 250.0, 500.0).unwrap();
        let z = tm.zoom_state();
        assert_close(z.scale_x, 4.0, "scale_x");
        assert_close(z.scale_y, 1.0, "scale_y");
    }

    #[test]
    fn test_zoom_to_rect_rejects_degenerate() {
        let mut tm = manager();
        assert!(matches!(
            tm.zoom_to_rect(0.0, 0.0, 0.0, 10.0),
            Err(AnnotatorError::InvalidDimension { .. })
        ));
        assert!(tm.zoom_to_rect(0.0, 0.0, 10.0, -1.0).is_err());
        assert!(tm.zoom_state().is_identity());
    }

    #[test]
    fn test_all_coordinates_under_zoom() {
        let mut tm = manager();
        tm.zoom_to_rect(250.0, 125.0, 500.0, 250.0).unwrap();

        let centre = tm.get_all_coordinates(500.0, 250.0);
        assert_close(centre.data.freq, 500.0, "centre freq");
        assert_close(centre.data.time, 300.0, "centre time");

        let corner = tm.get_all_coordinates(0.0, 0.0);
        assert_close(corner.surface.x, 250.0, "surface x");
        assert_close(corner.surface.y, 125.0, "surface y");
        assert_close(corner.data.freq, 300.0, "corner freq");
        assert_close(corner.data.time, 400.0, "corner time");
        assert_close(corner.image.x, 250.0, "image x");
        assert_close(corner.image.y, 125.0, "image y");
        assert_eq!(corner.zoom, tm.zoom_state());
    }

    #[test]
    fn test_data_to_screen_inverts_get_all_coordinates() {
        let mut tm = manager();
        tm.zoom_by_factor(3.0).unwrap();
        tm.update_pan(-120.0, 40.0);
        let c = tm.get_all_coordinates(321.0, 123.0);
        let s = tm.data_to_screen(c.data);
        assert_close(s.x, 321.0, "screen x");
        assert_close(s.y, 123.0, "screen y");
    }

    #[test]
    fn test_zoom_factors_compose() {
        let mut a = manager();
        a.zoom_by_factor(1.5).unwrap();
        a.zoom_by_factor(2.0).unwrap();

        let mut b = manager();
        b.zoom_by_factor(3.0).unwrap();

        assert_close(a.zoom_state().scale_x, b.zoom_state().scale_x, "scale_x");
        assert_close(a.zoom_state().scale_y, b.zoom_state().scale_y, "scale_y");
        assert_close(a.zoom_state().pan_x, b.zoom_state().pan_x, "pan_x");
    }

    #[test]
    fn test_zoom_by_factor_keeps_centre_fixed() {
        let mut tm = manager();
        tm.zoom_to_rect(100.0, 100.0, 400.0, 200.0).unwrap();
        let before = tm.get_all_coordinates(500.0, 250.0).data;
        tm.zoom_by_factor(1.25).unwrap();
        let after = tm.get_all_coordinates(500.0, 250.0).data;
        assert_close(after.freq, before.freq, "freq");
        assert_close(after.time, before.time, "time");
    }

    #[test]
    fn test_scale_is_clamped() {
        let mut tm = manager();
        tm.zoom_by_factor(1000.0).unwrap();
        assert_close(tm.zoom_state().scale_x, 10.0, "max scale");
        tm.zoom_by_factor(1e-6).unwrap();
        assert_close(tm.zoom_state().scale_y, 0.1, "min scale");
        assert!(tm.zoom_by_factor(0.0).is_err());
        assert!(tm.zoom_by_factor(f64::NAN).is_err());
    }

    #[test]
    fn test_pan_never_exposes_outside_image() {
        let mut tm = manager();
        tm.zoom_by_factor(2.5).unwrap();
        let range = tm.coordinate_system().data_range();
        let deltas = [
            (5000.0, 0.0),
            (-12000.0, 300.0),
            (40.0, -9000.0),
            (-3.0, 7.0),
            (800.0, 800.0),
        ];
        for (dx, dy) in deltas {
            tm.update_pan(dx, dy);
            let v = tm.visible_data_rect();
            assert!(v.freq_low >= range.min_x - 1e-9, "freq_low {} escaped", v.freq_low);
            assert!(v.freq_high <= range.max_x + 1e-9, "freq_high {} escaped", v.freq_high);
            assert!(v.time_start >= range.min_y - 1e-9, "time_start {} escaped", v.time_start);
            assert!(v.time_end <= range.max_y + 1e-9, "time_end {} escaped", v.time_end);
        }
    }

    #[test]
    fn test_pan_at_identity_is_a_no_op() {
        let mut tm = manager();
        assert!(!tm.update_pan(100.0, -50.0));
        assert!(tm.zoom_state().is_identity());
    }

    #[test]
    fn test_pan_scales_with_container() {
        let mut tm = manager();
        tm.set_container_size(ImageDimensions::new(500.0, 250.0).unwrap()).unwrap();
        tm.zoom_by_factor(2.0).unwrap();
        let before = tm.zoom_state().pan_x;
        tm.update_pan(10.0, 0.0);
        assert_close(tm.zoom_state().pan_x - before, 20.0, "surface delta");
    }

    #[test]
    fn test_css_transform_uses_container_pixels() {
        let mut tm = manager();
        assert_eq!(tm.css_transform(), "translate(0.000px, 0.000px) scale(1.00000, 1.00000)");
        tm.set_container_size(ImageDimensions::new(500.0, 250.0).unwrap()).unwrap();
        tm.zoom_to_rect(250.0, 125.0, 500.0, 250.0).unwrap();
        assert_eq!(tm.css_transform(), "translate(-250.000px, -125.000px) scale(2.00000, 2.00000)");
    }
}
