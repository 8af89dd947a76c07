use serde::{Deserialize, Serialize};
use crate::error::AnnotatorError;

/// Tunables for the annotator. Every field has a default, so a partial JSON
/// object such as `{"hit_tolerance_px": 30}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Pointer-to-marker distance (device px) that still grabs a Doppler marker.
    pub hit_tolerance_px: f64,
    pub line_hit_tolerance_px: f64,
    /// Zoom selections must exceed this on both sides (device px).
    pub min_selection_px: f64,
    /// Below this a press/release pair counts as a click, not a drag.
    pub min_drag_px: f64,
    pub zoom_step: f64,
    pub wheel_zoom_step: f64,
    /// Propagation speed used by the Doppler formula (m/s, seawater ≈ 1500).
    pub sound_speed_mps: f64,
    pub palette_slider_width: f64,
    /// Unknown mode names are an error when true, inert fallback when false.
    pub strict_modes: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 10.0,
            hit_tolerance_px: 20.0,
            line_hit_tolerance_px: 6.0,
            min_selection_px: 10.0,
            min_drag_px: 3.0,
            zoom_step: 1.25,
            wheel_zoom_step: 1.1,
            sound_speed_mps: 1500.0,
            palette_slider_width: 240.0,
            strict_modes: cfg!(debug_assertions),
        }
    }
}

impl AnnotatorConfig {
    pub fn from_json(text: &str) -> Result<Self, AnnotatorError> {
        let config: AnnotatorConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnnotatorError> {
        let positive = [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("hit_tolerance_px", self.hit_tolerance_px),
            ("line_hit_tolerance_px", self.line_hit_tolerance_px),
            ("min_selection_px", self.min_selection_px),
            ("min_drag_px", self.min_drag_px),
            ("sound_speed_mps", self.sound_speed_mps),
            ("palette_slider_width", self.palette_slider_width),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnnotatorError::InvalidConfiguration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.min_scale > self.max_scale {
            return Err(AnnotatorError::InvalidConfiguration(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        for (name, value) in [("zoom_step", self.zoom_step), ("wheel_zoom_step", self.wheel_zoom_step)] {
            if !value.is_finite() || value <= 1.0 {
                return Err(AnnotatorError::InvalidConfiguration(format!(
                    "{name} must be greater than 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnnotatorConfig::from_json(r#"{"hit_tolerance_px": 40.0, "strict_modes": false}"#)
            .expect("valid config");
        assert_eq!(config.hit_tolerance_px, 40.0);
        assert!(!config.strict_modes);
        assert_eq!(config.min_selection_px, 10.0);
        assert_eq!(config.max_scale, 10.0);
    }

    #[test]
    fn test_rejects_inverted_scale_bounds() {
        let err = AnnotatorConfig::from_json(r#"{"min_scale": 5.0, "max_scale": 2.0}"#);
        assert!(matches!(err, Err(AnnotatorError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = AnnotatorConfig::from_json("{not json");
        assert!(matches!(err, Err(AnnotatorError::Config(_))));
    }

    #[test]
    fn test_zoom_step_must_grow() {
        let err = AnnotatorConfig::from_json(r#"{"zoom_step": 0.5}"#);
        assert!(err.is_err());
    }
}
