//! Pure mapping between the four coordinate spaces of one displayed image:
//! device pixels, rendering-surface units, native image pixels and data units.
//!
//! Surface points come in two orientations. `screen_to_svg(.., true)` and the
//! `svg_to_data`/`data_to_svg` pair use the Y-up convention (surface Y = 0 is
//! the lowest time). `screen_to_svg(.., false)` yields the Y-down layout used
//! by the rendering transform; `flip_y` converts between the two.

use crate::error::AnnotatorError;
use crate::types::{DataPoint, DataRange, ImageDimensions, ImagePoint, ScreenPoint, SurfacePoint};

#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateSystem {
    range: DataRange,
    image: ImageDimensions,
    surface: ImageDimensions,
    container: ImageDimensions,
}

impl CoordinateSystem {
    /// Surface and container both start at the image's native size.
    pub fn new(range: DataRange, image: ImageDimensions) -> Result<Self, AnnotatorError> {
        range.validate()?;
        image.validate("image")?;
        Ok(Self {
            range,
            image,
            surface: image,
            container: image,
        })
    }

    /// Use a rendering surface whose size differs from the raster (scaled or padded display).
    pub fn with_surface(mut self, surface: ImageDimensions) -> Result<Self, AnnotatorError> {
        surface.validate("surface")?;
        self.surface = surface;
        Ok(self)
    }

    pub fn set_container_size(&mut self, container: ImageDimensions) -> Result<(), AnnotatorError> {
        container.validate("container")?;
        self.container = container;
        Ok(())
    }

    pub fn data_range(&self) -> DataRange {
        self.range
    }

    pub fn image(&self) -> ImageDimensions {
        self.image
    }

    pub fn surface(&self) -> ImageDimensions {
        self.surface
    }

    pub fn container(&self) -> ImageDimensions {
        self.container
    }

    /// Surface units per device pixel, per axis.
    pub fn screen_scale(&self) -> (f64, f64) {
        (
            self.surface.width / self.container.width,
            self.surface.height / self.container.height,
        )
    }

    pub fn screen_to_svg(&self, screen_x: f64, screen_y: f64, invert_y: bool) -> SurfacePoint {
        let (kx, ky) = self.screen_scale();
        let x = screen_x * kx;
        let scaled_y = screen_y * ky;
        let y = if invert_y { self.surface.height - scaled_y } else { scaled_y };
        SurfacePoint::new(x, y)
    }

    /// Inverse of `screen_to_svg` with the same `inverted` flag.
    pub fn svg_to_screen(&self, p: SurfacePoint, inverted: bool) -> ScreenPoint {
        let (kx, ky) = self.screen_scale();
        let y = if inverted { self.surface.height - p.y } else { p.y };
        ScreenPoint::new(p.x / kx, y / ky)
    }

    pub fn flip_y(&self, p: SurfacePoint) -> SurfacePoint {
        SurfacePoint::new(p.x, self.surface.height - p.y)
    }

    pub fn svg_to_data(&self, p: SurfacePoint) -> DataPoint {
        DataPoint {
            freq: self.range.min_x + (p.x / self.surface.width) * self.range.span_x(),
            time: self.range.min_y + (p.y / self.surface.height) * self.range.span_y(),
        }
    }

    pub fn data_to_svg(&self, d: DataPoint) -> SurfacePoint {
        SurfacePoint {
            x: (d.freq - self.range.min_x) / self.range.span_x() * self.surface.width,
            y: (d.time - self.range.min_y) / self.range.span_y() * self.surface.height,
        }
    }

    pub fn data_to_image(&self, d: DataPoint) -> ImagePoint {
        ImagePoint {
            x: (d.freq - self.range.min_x) / self.range.span_x() * self.image.width,
            y: (self.range.max_y - d.time) / self.range.span_y() * self.image.height,
        }
    }

    pub fn image_to_data(&self, p: ImagePoint) -> DataPoint {
        DataPoint {
            freq: self.range.min_x + (p.x / self.image.width) * self.range.span_x(),
            time: self.range.max_y - (p.y / self.image.height) * self.range.span_y(),
        }
    }

    /// Ignores zoom/pan; see `TransformManager::get_all_coordinates` for the zoom-aware path.
    pub fn screen_to_data(&self, screen_x: f64, screen_y: f64) -> DataPoint {
        self.svg_to_data(self.screen_to_svg(screen_x, screen_y, true))
    }

    pub fn data_to_screen(&self, d: DataPoint) -> ScreenPoint {
        self.svg_to_screen(self.data_to_svg(d), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> CoordinateSystem {
        CoordinateSystem::new(
            DataRange::new(100.0, 900.0, 100.0, 500.0).unwrap(),
            ImageDimensions::new(1000.0, 500.0).unwrap(),
        )
        .unwrap()
    }

    fn assert_close(a: f64, b: f64, what: &str) {
        assert!((a - b).abs() < 1e-3, "{what}: expected {b}, got {a}");
    }

    #[test]
    fn test_screen_to_data_corners_and_centre() {
        let cs = scenario();
        let top_left = cs.screen_to_data(0.0, 0.0);
        assert_close(top_left.freq, 100.0, "top-left freq");
        assert_close(top_left.time, 500.0, "top-left time");

        let bottom_right = cs.screen_to_data(1000.0, 500.0);
        assert_close(bottom_right.freq, 900.0, "bottom-right freq");
        assert_close(bottom_right.time, 100.0, "bottom-right time");

        let centre = cs.screen_to_data(500.0, 250.0);
        assert_close(centre.freq, 500.0, "centre freq");
        assert_close(centre.time, 300.0, "centre time");
    }

    #[test]
    fn test_svg_data_round_trip() {
        let cs = scenario();
        for &(f, t) in &[(100.0, 100.0), (900.0, 500.0), (123.4, 456.7), (555.5, 222.2)] {
            let d = DataPoint::new(f, t);
            let back = cs.svg_to_data(cs.data_to_svg(d));
            assert_close(back.freq, f, "freq");
            assert_close(back.time, t, "time");
        }
    }

    #[test]
    fn test_image_round_trip_with_padded_surface() {
        let cs = scenario()
            .with_surface(ImageDimensions::new(1200.0, 700.0).unwrap())
            .unwrap();
        let d = DataPoint::new(321.0, 444.0);
        let img = cs.data_to_image(d);
        let back = cs.image_to_data(img);
        assert_close(back.freq, d.freq, "freq");
        assert_close(back.time, d.time, "time");

        // Top of the raster is the latest time
        let top = cs.data_to_image(DataPoint::new(100.0, 500.0));
        assert_close(top.x, 0.0, "image x");
        assert_close(top.y, 0.0, "image y");
    }

    #[test]
    fn test_container_scaling() {
        let mut cs = scenario();
        cs.set_container_size(ImageDimensions::new(500.0, 250.0).unwrap()).unwrap();
        let p = cs.screen_to_svg(250.0, 0.0, false);
        assert_close(p.x, 500.0, "surface x");
        assert_close(p.y, 0.0, "surface y");
        let inverted = cs.screen_to_svg(250.0, 0.0, true);
        assert_close(inverted.y, 500.0, "inverted surface y");

        let s = cs.data_to_screen(DataPoint::new(500.0, 300.0));
        assert_close(s.x, 250.0, "screen x");
        assert_close(s.y, 125.0, "screen y");
    }

    #[test]
    fn test_invalid_construction_is_rejected() {
        let range = DataRange { min_x: 5.0, max_x: 1.0, min_y: 0.0, max_y: 1.0 };
        let image = ImageDimensions { width: 100.0, height: 100.0 };
        assert!(CoordinateSystem::new(range, image).is_err());

        let range = DataRange { min_x: 0.0, max_x: 1.0, min_y: 0.0, max_y: 1.0 };
        let image = ImageDimensions { width: 0.0, height: 100.0 };
        assert!(matches!(
            CoordinateSystem::new(range, image),
            Err(AnnotatorError::InvalidConfiguration(_))
        ));
    }
}
