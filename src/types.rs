use serde::{Deserialize, Serialize};
use crate::error::AnnotatorError;

/// Device pixels relative to the container's top-left corner (Y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Rendering-surface units ("SVG units").
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
}

/// Native image pixels, row 0 = top of the raster (highest time).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

/// Domain coordinates: X axis is frequency, Y axis is time (grows upward).
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    pub freq: f64,
    pub time: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: ScreenPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl SurfacePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl DataPoint {
    pub fn new(freq: f64, time: f64) -> Self {
        Self { freq, time }
    }

    /// Arithmetic mean of frequency and of time, taken independently.
    pub fn midpoint(self, other: DataPoint) -> DataPoint {
        DataPoint {
            freq: (self.freq + other.freq) / 2.0,
            time: (self.time + other.time) / 2.0,
        }
    }
}

/// Domain rectangle shown by one image. X = frequency (Hz), Y = time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl DataRange {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Result<Self, AnnotatorError> {
        let range = Self { min_x, max_x, min_y, max_y };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), AnnotatorError> {
        let finite = [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(AnnotatorError::InvalidConfiguration(
                "data range bounds must be finite".to_string(),
            ));
        }
        if self.min_x >= self.max_x {
            return Err(AnnotatorError::InvalidConfiguration(format!(
                "data range x: min {} must be below max {}",
                self.min_x, self.max_x
            )));
        }
        if self.min_y >= self.max_y {
            return Err(AnnotatorError::InvalidConfiguration(format!(
                "data range y: min {} must be below max {}",
                self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    pub fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn contains(&self, p: DataPoint) -> bool {
        p.freq >= self.min_x && p.freq <= self.max_x && p.time >= self.min_y && p.time <= self.max_y
    }
}

/// Native pixel size of the displayed raster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: f64,
    pub height: f64,
}

impl ImageDimensions {
    pub fn new(width: f64, height: f64) -> Result<Self, AnnotatorError> {
        let dims = Self { width, height };
        dims.validate("image")?;
        Ok(dims)
    }

    pub(crate) fn validate(&self, what: &str) -> Result<(), AnnotatorError> {
        if !(self.width.is_finite() && self.height.is_finite()) || self.width <= 0.0 || self.height <= 0.0 {
            return Err(AnnotatorError::InvalidConfiguration(format!(
                "{what} dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Transient zoom-mode selection in rendering-surface units.
/// Width and height may be negative while the user drags up or left.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Same rectangle with a non-negative width and height.
    pub fn normalized(&self) -> SelectionRect {
        SelectionRect {
            x: self.x.min(self.x + self.width),
            y: self.y.min(self.y + self.height),
            width: self.width.abs(),
            height: self.height.abs(),
        }
    }
}

/// Visible portion of the data range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataRect {
    pub freq_low: f64,
    pub freq_high: f64,
    pub time_start: f64,
    pub time_end: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorStyle {
    #[default]
    Default,
    Crosshair,
    Grab,
    Grabbing,
    Move,
    EwResize,
    ZoomIn,
}

impl CursorStyle {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Crosshair => "crosshair",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Move => "move",
            Self::EwResize => "ew-resize",
            Self::ZoomIn => "zoom-in",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` code.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Pointer event already normalized to container-relative device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointerEvent {
    pub position: ScreenPoint,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: ScreenPoint::new(x, y),
            ..Default::default()
        }
    }

    pub fn secondary(x: f64, y: f64) -> Self {
        Self {
            position: ScreenPoint::new(x, y),
            button: MouseButton::Secondary,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// DOM `KeyboardEvent.key` value, e.g. "Escape" or "+".
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            modifiers: Modifiers::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_range_rejects_inverted_bounds() {
        assert!(DataRange::new(10.0, 10.0, 0.0, 1.0).is_err());
        assert!(DataRange::new(0.0, 10.0, 5.0, 1.0).is_err());
        assert!(DataRange::new(0.0, f64::NAN, 0.0, 1.0).is_err());
        assert!(DataRange::new(0.0, 10.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_image_dimensions_must_be_positive() {
        assert!(ImageDimensions::new(0.0, 10.0).is_err());
        assert!(ImageDimensions::new(10.0, -1.0).is_err());
        assert!(ImageDimensions::new(640.0, 480.0).is_ok());
    }

    #[test]
    fn test_selection_rect_normalized() {
        let r = SelectionRect { x: 100.0, y: 50.0, width: -40.0, height: -20.0 }.normalized();
        assert_eq!(r, SelectionRect { x: 60.0, y: 30.0, width: 40.0, height: 20.0 });
    }

    #[test]
    fn test_midpoint_is_independent_per_axis() {
        let m = DataPoint::new(1000.0, 10.0).midpoint(DataPoint::new(800.0, 5.0));
        assert_eq!(m, DataPoint::new(900.0, 7.5));
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::new(255, 0, 16).to_hex(), "#ff0010");
    }
}
