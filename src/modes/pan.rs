use serde::Serialize;
use crate::canvas::transform::CoordinateBundle;
use crate::modes::{EventResult, Mode, ModeContext, ModeState};
use crate::types::{CursorStyle, MouseButton, PointerEvent, ScreenPoint};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct PanState {
    pub armed: bool,
    pub last: Option<ScreenPoint>,
}

/// Drag to move the zoomed image. Pan limits are enforced by the transform manager.
#[derive(Clone, Debug, Default)]
pub struct PanMode {
    state: PanState,
}

impl PanMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mode for PanMode {
    fn name(&self) -> &'static str {
        "pan"
    }

    fn handle_mouse_down(&mut self, event: &PointerEvent, coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        self.state = PanState {
            armed: true,
            last: Some(coords.screen),
        };
        EventResult::Consumed
    }

    fn handle_mouse_move(&mut self, _event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if !self.state.armed {
            return EventResult::Ignored;
        }
        let Some(last) = self.state.last else {
            return EventResult::Ignored;
        };
        let dx = coords.screen.x - last.x;
        let dy = coords.screen.y - last.y;
        self.state.last = Some(coords.screen);
        if ctx.transform.update_pan(dx, dy) {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    fn handle_mouse_up(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        if !self.state.armed {
            return EventResult::Ignored;
        }
        self.reset_state();
        EventResult::Consumed
    }

    fn guidance_text(&self) -> String {
        "Drag to pan the zoomed spectrogram.".to_string()
    }

    fn cursor(&self) -> CursorStyle {
        if self.state.armed {
            CursorStyle::Grabbing
        } else {
            CursorStyle::Grab
        }
    }

    fn reset_state(&mut self) {
        self.state = PanState::default();
    }

    fn cleanup(&mut self) {
        self.reset_state();
    }

    fn state_snapshot(&self) -> ModeState {
        ModeState::Pan(self.state)
    }

    fn initial_state() -> ModeState {
        ModeState::Pan(PanState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_support::{down, move_to, up, Harness};

    #[test]
    fn test_drag_pans_zoomed_view() {
        let mut h = Harness::new();
        h.transform.zoom_by_factor(2.0).unwrap();
        let start = h.transform.zoom_state();

        let mut mode = PanMode::new();
        assert_eq!(down(&mut mode, &mut h, 500.0, 250.0), EventResult::Consumed);
        assert_eq!(mode.cursor(), CursorStyle::Grabbing);
        assert_eq!(move_to(&mut mode, &mut h, 540.0, 230.0), EventResult::Consumed);
        let z = h.transform.zoom_state();
        assert!((z.pan_x - (start.pan_x + 40.0)).abs() < 1e-9);
        assert!((z.pan_y - (start.pan_y - 20.0)).abs() < 1e-9);

        assert_eq!(up(&mut mode, &mut h, 540.0, 230.0), EventResult::Consumed);
        assert_eq!(move_to(&mut mode, &mut h, 600.0, 230.0), EventResult::Ignored);
        assert_eq!(h.transform.zoom_state(), z);
    }

    #[test]
    fn test_pan_at_full_view_is_ignored() {
        let mut h = Harness::new();
        let mut mode = PanMode::new();
        down(&mut mode, &mut h, 100.0, 100.0);
        assert_eq!(move_to(&mut mode, &mut h, 300.0, 200.0), EventResult::Ignored);
        assert!(h.transform.zoom_state().is_identity());
    }
}
