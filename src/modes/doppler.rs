//! Doppler measurement: place f+ and f- on the two steady tones of a pass,
//! f0 lands on their midpoint, and the speed follows from the shift.
//!
//! Idle (0 markers) → Previewing (1) → Placed (2) ⇄ Dragging. Only a reset
//! (right-click, Escape, re-entry) goes back to Idle.

use serde::{Deserialize, Serialize};
use crate::canvas::transform::{CoordinateBundle, TransformManager};
use crate::config::AnnotatorConfig;
use crate::dsp::doppler::{doppler_speed, mps_to_knots};
use crate::modes::drag::{DragHandler, DragTracker};
use crate::modes::{EventResult, Mode, ModeContext, ModeState};
use crate::types::{CursorStyle, DataPoint, MouseButton, PointerEvent, Rgb, ScreenPoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerId {
    FPlus,
    FMinus,
    FZero,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DopplerPhase {
    Idle,
    Previewing,
    Placed,
    Dragging,
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct DopplerState {
    /// Later-time marker once placement is committed.
    pub f_plus: Option<DataPoint>,
    /// Earlier-time marker once committed; tracks the pointer while previewing.
    pub f_minus: Option<DataPoint>,
    pub f_zero: Option<DataPoint>,
    /// Metres per second.
    pub speed: Option<f64>,
    pub markers_placed: u8,
    pub is_dragging: bool,
    pub dragged_marker: Option<MarkerId>,
    /// Button still held since the first marker went down.
    pub is_preview_drag: bool,
    pub temp_first: Option<DataPoint>,
    pub preview_end: Option<DataPoint>,
    /// Assigned once at commit from the palette; edits never change it.
    pub color: Option<Rgb>,
}

impl DopplerState {
    pub fn phase(&self) -> DopplerPhase {
        match self.markers_placed {
            0 => DopplerPhase::Idle,
            1 => DopplerPhase::Previewing,
            _ if self.is_dragging => DopplerPhase::Dragging,
            _ => DopplerPhase::Placed,
        }
    }

    pub fn speed_knots(&self) -> Option<f64> {
        self.speed.map(mps_to_knots)
    }

    pub fn marker(&self, id: MarkerId) -> Option<DataPoint> {
        match id {
            MarkerId::FPlus => self.f_plus,
            MarkerId::FMinus => self.f_minus,
            MarkerId::FZero => self.f_zero,
        }
    }

    fn set_marker(&mut self, id: MarkerId, p: DataPoint) {
        match id {
            MarkerId::FPlus => self.f_plus = Some(p),
            MarkerId::FMinus => self.f_minus = Some(p),
            MarkerId::FZero => self.f_zero = Some(p),
        }
    }

    fn recompute_speed(&mut self, sound_speed: f64) {
        self.speed = match (self.f_plus, self.f_minus, self.f_zero) {
            (Some(p), Some(m), Some(z)) => doppler_speed(p, m, z, sound_speed),
            _ => None,
        };
    }

    /// Keep f+ as the later-time marker.
    fn order_by_time(&mut self) {
        if let (Some(p), Some(m)) = (self.f_plus, self.f_minus) {
            if p.time < m.time {
                self.f_plus = Some(m);
                self.f_minus = Some(p);
            }
        }
    }
}

impl DragHandler for DopplerState {
    type Target = MarkerId;

    fn find_target_at(&self, position: &CoordinateBundle, transform: &TransformManager, config: &AnnotatorConfig) -> Option<MarkerId> {
        if self.markers_placed < 2 {
            return None;
        }
        [MarkerId::FPlus, MarkerId::FMinus, MarkerId::FZero]
            .into_iter()
            .filter_map(|id| {
                let p = self.marker(id)?;
                let d = transform.data_to_screen(p).distance_to(position.screen);
                (d <= config.hit_tolerance_px).then_some((id, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn on_drag_start(&mut self, target: &MarkerId, _position: &CoordinateBundle) {
        self.is_dragging = true;
        self.dragged_marker = Some(*target);
    }

    /// f+ and f- drags carry f0 along as their midpoint; an f0 drag moves f0 alone.
    fn on_drag_update(&mut self, target: &MarkerId, current: &CoordinateBundle, _start: &CoordinateBundle) {
        self.set_marker(*target, current.data);
        if *target != MarkerId::FZero {
            if let (Some(p), Some(m)) = (self.f_plus, self.f_minus) {
                self.f_zero = Some(p.midpoint(m));
            }
        }
    }

    fn on_drag_end(&mut self, target: &MarkerId, position: &CoordinateBundle) {
        self.on_drag_update(target, position, position);
        self.is_dragging = false;
        self.dragged_marker = None;
        self.order_by_time();
    }

    fn cursor_for(&self, hovered: Option<&MarkerId>, dragging: bool) -> CursorStyle {
        match (hovered, dragging) {
            (_, true) => CursorStyle::Grabbing,
            (Some(_), false) => CursorStyle::Move,
            (None, false) => CursorStyle::Crosshair,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DopplerMode {
    state: DopplerState,
    drag: DragTracker<MarkerId>,
    press: Option<ScreenPoint>,
}

impl DopplerMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DopplerState {
        &self.state
    }

    fn begin_preview(&mut self, coords: &CoordinateBundle) {
        self.state.f_plus = Some(coords.data);
        self.state.temp_first = Some(coords.data);
        self.state.f_minus = None;
        self.state.preview_end = Some(coords.data);
        self.state.markers_placed = 1;
        self.state.is_preview_drag = true;
        self.press = Some(coords.screen);
        log::debug!("doppler: first marker at {:.1} Hz, {:.3} s", coords.data.freq, coords.data.time);
    }

    fn commit(&mut self, second: DataPoint, ctx: &mut ModeContext<'_>) {
        let Some(first) = self.state.temp_first.or(self.state.f_plus) else {
            return;
        };
        let (later, earlier) = if first.time > second.time {
            (first, second)
        } else {
            (second, first)
        };
        self.state.f_plus = Some(later);
        self.state.f_minus = Some(earlier);
        self.state.f_zero = Some(later.midpoint(earlier));
        self.state.markers_placed = 2;
        self.state.is_preview_drag = false;
        self.state.temp_first = None;
        self.state.preview_end = None;
        self.press = None;
        if self.state.color.is_none() {
            self.state.color = Some(ctx.palette_color);
        }
        self.state.recompute_speed(ctx.config.sound_speed_mps);
        match self.state.speed {
            Some(v) => log::info!("doppler: markers placed, speed {:.2} m/s ({:.2} kn)", v, mps_to_knots(v)),
            None => log::warn!("doppler: markers placed but speed is undefined (f0 {:.1} Hz)", later.midpoint(earlier).freq),
        }
    }
}

impl Mode for DopplerMode {
    fn name(&self) -> &'static str {
        "doppler"
    }

    fn activate(&mut self, _ctx: &mut ModeContext<'_>) {
        self.reset_state();
    }

    fn handle_mouse_down(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        match self.state.markers_placed {
            0 => {
                self.begin_preview(coords);
                EventResult::Consumed
            }
            1 => {
                self.commit(coords.data, ctx);
                EventResult::Consumed
            }
            _ => {
                if self.drag.try_begin(&mut self.state, coords, ctx.transform, ctx.config) {
                    EventResult::Consumed
                } else {
                    ctx.set_status("Drag a marker to adjust it, or right-click to start over.");
                    EventResult::Consumed
                }
            }
        }
    }

    fn handle_mouse_move(&mut self, _event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if self.drag.is_dragging() {
            self.drag.update(&mut self.state, coords);
            self.state.recompute_speed(ctx.config.sound_speed_mps);
            return EventResult::Consumed;
        }
        match self.state.markers_placed {
            1 => {
                self.state.f_minus = Some(coords.data);
                self.state.preview_end = Some(coords.data);
                EventResult::Consumed
            }
            2 => {
                if self.drag.hover(&self.state, coords, ctx.transform, ctx.config) {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
            _ => EventResult::Ignored,
        }
    }

    fn handle_mouse_up(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        if self.drag.is_dragging() {
            self.drag.finish(&mut self.state, coords);
            self.state.recompute_speed(ctx.config.sound_speed_mps);
            return EventResult::Consumed;
        }
        if self.state.markers_placed == 1 && self.state.is_preview_drag {
            let moved = self
                .press
                .map(|p| p.distance_to(coords.screen))
                .unwrap_or(0.0);
            if moved >= ctx.config.min_drag_px {
                self.commit(coords.data, ctx);
            } else {
                // A click rather than a drag: the next click places the second marker
                self.state.is_preview_drag = false;
            }
            return EventResult::Consumed;
        }
        EventResult::Ignored
    }

    fn handle_context_menu(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        self.reset_state();
        log::debug!("doppler: reset");
        EventResult::Consumed
    }

    fn guidance_text(&self) -> String {
        match self.state.phase() {
            DopplerPhase::Idle => "Press on one steady tone of the pass and drag to the other.".to_string(),
            DopplerPhase::Previewing => "Release (or click) on the second tone to place f-.".to_string(),
            DopplerPhase::Dragging => "Release to drop the marker.".to_string(),
            DopplerPhase::Placed => match self.state.speed {
                Some(v) => format!(
                    "Speed {:.2} m/s ({:.2} kn). Drag a marker to refine, right-click to clear.",
                    v,
                    mps_to_knots(v)
                ),
                None => "Speed undefined for these markers. Drag a marker or right-click to clear.".to_string(),
            },
        }
    }

    fn cursor(&self) -> CursorStyle {
        self.drag.cursor(&self.state)
    }

    fn reset_state(&mut self) {
        self.state = DopplerState::default();
        self.drag.cancel();
        self.press = None;
    }

    fn cleanup(&mut self) {
        if self.drag.cancel().is_some() {
            self.state.is_dragging = false;
            self.state.dragged_marker = None;
        }
    }

    fn state_snapshot(&self) -> ModeState {
        ModeState::Doppler(self.state)
    }

    fn initial_state() -> ModeState {
        ModeState::Doppler(DopplerState::default())
    }
}
