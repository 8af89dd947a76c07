use serde::Serialize;
use crate::canvas::transform::CoordinateBundle;
use crate::modes::{EventResult, Mode, ModeContext, ModeState};
use crate::types::{CursorStyle, MouseButton, PointerEvent, SelectionRect, SurfacePoint};

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct ZoomSelectState {
    /// Live rectangle in displayed surface units, as drawn over the view.
    pub selection: Option<SelectionRect>,
    pub anchor: Option<SurfacePoint>,
}

/// Rubber-band selection that zooms to the selected rectangle on release.
#[derive(Clone, Debug, Default)]
pub struct ZoomMode {
    state: ZoomSelectState,
}

impl ZoomMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mode for ZoomMode {
    fn name(&self) -> &'static str {
        "zoom"
    }

    fn handle_mouse_down(&mut self, event: &PointerEvent, coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        self.state.anchor = Some(coords.display);
        self.state.selection = Some(SelectionRect {
            x: coords.display.x,
            y: coords.display.y,
            width: 0.0,
            height: 0.0,
        });
        EventResult::Consumed
    }

    fn handle_mouse_move(&mut self, _event: &PointerEvent, coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        let (Some(anchor), Some(rect)) = (self.state.anchor, self.state.selection.as_mut()) else {
            return EventResult::Ignored;
        };
        rect.width = coords.display.x - anchor.x;
        rect.height = coords.display.y - anchor.y;
        EventResult::Consumed
    }

    fn handle_mouse_up(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        let Some(anchor) = self.state.anchor else {
            return EventResult::Ignored;
        };
        let rect = SelectionRect {
            x: anchor.x,
            y: anchor.y,
            width: coords.display.x - anchor.x,
            height: coords.display.y - anchor.y,
        }
        .normalized();
        self.reset_state();

        // Display units to device pixels
        let (kx, ky) = ctx.transform.coordinate_system().screen_scale();
        let (px_w, px_h) = (rect.width / kx, rect.height / ky);
        let min = ctx.config.min_selection_px;
        if px_w <= min || px_h <= min {
            log::debug!("zoom selection {:.1}x{:.1} px below minimum, ignored", px_w, px_h);
            ctx.set_status(format!("Selection too small to zoom (minimum {min:.0} px per side)"));
            return EventResult::Consumed;
        }

        // Undo the current zoom so the rectangle is expressed in surface units
        let zoom = ctx.transform.zoom_state();
        let origin = ctx.transform.display_to_surface(SurfacePoint::new(rect.x, rect.y));
        let width = rect.width / zoom.scale_x;
        let height = rect.height / zoom.scale_y;
        match ctx.transform.zoom_to_rect(origin.x, origin.y, width, height) {
            Ok(()) => {
                *ctx.status = None;
            }
            Err(e) => {
                log::warn!("zoom selection rejected: {e}");
                ctx.set_status(e.to_string());
            }
        }
        EventResult::Consumed
    }

    fn handle_context_menu(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        if self.state.selection.is_none() {
            return EventResult::Ignored;
        }
        self.reset_state();
        EventResult::Consumed
    }

    fn guidance_text(&self) -> String {
        match self.state.selection {
            None => "Drag a rectangle to zoom into it.".to_string(),
            Some(_) => "Release to zoom. Right-click or Escape cancels.".to_string(),
        }
    }

    fn cursor(&self) -> CursorStyle {
        CursorStyle::ZoomIn
    }

    fn reset_state(&mut self) {
        self.state = ZoomSelectState::default();
    }

    fn cleanup(&mut self) {
        self.reset_state();
    }

    fn state_snapshot(&self) -> ModeState {
        ModeState::Zoom(self.state)
    }

    fn initial_state() -> ModeState {
        ModeState::Zoom(ZoomSelectState::default())
    }
}
