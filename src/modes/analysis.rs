use serde::Serialize;
use crate::canvas::transform::CoordinateBundle;
use crate::modes::{EventResult, Mode, ModeContext, ModeState};
use crate::types::{CursorStyle, DataPoint, ImagePoint, MouseButton, PointerEvent};

/// Cursor readout plus an optional pinned reference point.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct AnalysisState {
    /// `None` while the pointer is outside the data range.
    pub cursor: Option<DataPoint>,
    pub cursor_image: Option<ImagePoint>,
    pub pinned: Option<DataPoint>,
}

impl AnalysisState {
    /// (Δfrequency, Δtime) from the pinned point to the cursor.
    pub fn delta(&self) -> Option<(f64, f64)> {
        let (c, p) = (self.cursor?, self.pinned?);
        Some((c.freq - p.freq, c.time - p.time))
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnalysisMode {
    state: AnalysisState,
}

impl AnalysisMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mode for AnalysisMode {
    fn name(&self) -> &'static str {
        "analysis"
    }

    fn handle_mouse_down(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        if !ctx.transform.coordinate_system().data_range().contains(coords.data) {
            return EventResult::Ignored;
        }
        self.state.pinned = Some(coords.data);
        log::debug!("pinned reference at {:.1} Hz, {:.3} s", coords.data.freq, coords.data.time);
        EventResult::Consumed
    }

    fn handle_mouse_move(&mut self, _event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        let inside = ctx.transform.coordinate_system().data_range().contains(coords.data);
        let (cursor, image) = if inside {
            (Some(coords.data), Some(coords.image))
        } else {
            (None, None)
        };
        if cursor == self.state.cursor && image == self.state.cursor_image {
            return EventResult::Ignored;
        }
        self.state.cursor = cursor;
        self.state.cursor_image = image;
        EventResult::Consumed
    }

    fn handle_context_menu(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        if self.state.pinned.take().is_some() {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    fn guidance_text(&self) -> String {
        match self.state.pinned {
            None => "Move over the spectrogram to read frequency and time. Click to pin a reference point.".to_string(),
            Some(_) => "Readout shows the offset from the pinned point. Right-click to unpin.".to_string(),
        }
    }

    fn cursor(&self) -> CursorStyle {
        CursorStyle::Crosshair
    }

    fn reset_state(&mut self) {
        self.state = AnalysisState::default();
    }

    fn state_snapshot(&self) -> ModeState {
        ModeState::Analysis(self.state)
    }

    fn initial_state() -> ModeState {
        ModeState::Analysis(AnalysisState::default())
    }
}
