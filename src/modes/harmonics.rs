use serde::Serialize;
use crate::annotations::HarmonicCollection;
use crate::canvas::transform::{CoordinateBundle, TransformManager};
use crate::config::AnnotatorConfig;
use crate::dsp::harmonics::{nearest_harmonic, spacing_for_harmonic, spacing_from_drag};
use crate::modes::drag::{DragHandler, DragTracker};
use crate::modes::{EventResult, Mode, ModeContext, ModeState};
use crate::types::{CursorStyle, DataPoint, KeyEvent, MouseButton, PointerEvent};

/// Line `harmonic` (k ≥ 1) of harmonic set `set_id`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LineTarget {
    pub set_id: u32,
    pub harmonic: usize,
    /// Spacing before the drag, restored if the drag is cancelled.
    pub original_spacing: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize)]
pub struct HarmonicsState {
    /// Start of a creation drag in progress.
    pub creating_from: Option<DataPoint>,
    /// Set created by the current creation drag, once it has moved far enough.
    pub creating_set: Option<u32>,
    pub dragging: Option<LineTarget>,
    pub hovered: Option<LineTarget>,
}

/// Drag handler view over the shared harmonic sets.
struct HarmonicLines<'a> {
    sets: &'a mut HarmonicCollection,
}

impl DragHandler for HarmonicLines<'_> {
    type Target = LineTarget;

    fn find_target_at(&self, position: &CoordinateBundle, transform: &TransformManager, config: &AnnotatorConfig) -> Option<LineTarget> {
        let max_freq = transform.coordinate_system().data_range().max_x;
        let mut best: Option<(LineTarget, f64)> = None;
        for set in self.sets.iter() {
            // Screen x is linear in frequency, so only the nearest line can win
            let k = nearest_harmonic(set.spacing, position.data.freq);
            let freq = k as f64 * set.spacing;
            if freq > max_freq {
                continue;
            }
            let x = transform
                .data_to_screen(DataPoint::new(freq, position.data.time))
                .x;
            let d = (x - position.screen.x).abs();
            if d > config.line_hit_tolerance_px || best.is_some_and(|(_, bd)| bd <= d) {
                continue;
            }
            let target = LineTarget {
                set_id: set.id,
                harmonic: k,
                original_spacing: set.spacing,
            };
            best = Some((target, d));
        }
        best.map(|(t, _)| t)
    }

    fn on_drag_start(&mut self, target: &LineTarget, _position: &CoordinateBundle) {
        log::debug!("adjusting harmonic set {} via line {}", target.set_id, target.harmonic);
    }

    fn on_drag_update(&mut self, target: &LineTarget, current: &CoordinateBundle, _start: &CoordinateBundle) {
        if let Some(spacing) = spacing_for_harmonic(current.data.freq, target.harmonic) {
            self.sets.update_spacing(target.set_id, spacing);
        }
    }

    fn on_drag_end(&mut self, target: &LineTarget, position: &CoordinateBundle) {
        self.on_drag_update(target, position, position);
    }

    fn cursor_for(&self, hovered: Option<&LineTarget>, dragging: bool) -> CursorStyle {
        if dragging || hovered.is_some() {
            CursorStyle::EwResize
        } else {
            CursorStyle::Crosshair
        }
    }
}

/// Create harmonic sets by dragging between two adjacent lines; drag any
/// existing line to rescale its set.
#[derive(Clone, Debug, Default)]
pub struct HarmonicsMode {
    state: HarmonicsState,
    drag: DragTracker<LineTarget>,
    press: Option<CoordinateBundle>,
}

impl HarmonicsMode {
    pub fn new() -> Self {
        Self::default()
    }

    fn sync_drag_state(&mut self) {
        self.state.dragging = self.drag.session().map(|s| s.target);
        self.state.hovered = self.drag.hovered().copied();
    }

    fn update_creation(&mut self, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        let (Some(press), Some(from)) = (self.press, self.state.creating_from) else {
            return EventResult::Ignored;
        };
        if press.screen.distance_to(coords.screen) < ctx.config.min_drag_px {
            return EventResult::Ignored;
        }
        let Some(spacing) = spacing_from_drag(from.freq, coords.data.freq) else {
            return EventResult::Ignored;
        };
        match self.state.creating_set {
            Some(id) => {
                ctx.harmonics.update_spacing(id, spacing);
            }
            None => {
                self.state.creating_set = ctx.harmonics.add(spacing, ctx.palette_color);
            }
        }
        EventResult::Consumed
    }

    /// Abandon the gesture in progress, undoing its effect on the sets.
    fn cancel_gesture(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        let mut changed = false;
        if let Some(session) = self.drag.cancel() {
            let t = session.target;
            ctx.harmonics.update_spacing(t.set_id, t.original_spacing);
            changed = true;
        }
        if let Some(id) = self.state.creating_set.take() {
            ctx.harmonics.remove(id);
            changed = true;
        }
        if self.state.creating_from.take().is_some() {
            changed = true;
        }
        self.press = None;
        self.sync_drag_state();
        changed
    }
}

impl Mode for HarmonicsMode {
    fn name(&self) -> &'static str {
        "harmonics"
    }

    fn handle_mouse_down(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        let mut lines = HarmonicLines { sets: &mut *ctx.harmonics };
        if self.drag.try_begin(&mut lines, coords, ctx.transform, ctx.config) {
            self.sync_drag_state();
            return EventResult::Consumed;
        }
        self.press = Some(*coords);
        self.state.creating_from = Some(coords.data);
        self.state.creating_set = None;
        EventResult::Consumed
    }

    fn handle_mouse_move(&mut self, _event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if self.drag.is_dragging() {
            let mut lines = HarmonicLines { sets: &mut *ctx.harmonics };
            self.drag.update(&mut lines, coords);
            return EventResult::Consumed;
        }
        if self.state.creating_from.is_some() {
            return self.update_creation(coords, ctx);
        }
        let lines = HarmonicLines { sets: &mut *ctx.harmonics };
        if self.drag.hover(&lines, coords, ctx.transform, ctx.config) {
            self.sync_drag_state();
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    fn handle_mouse_up(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if event.button != MouseButton::Primary {
            return EventResult::Ignored;
        }
        if self.drag.is_dragging() {
            let mut lines = HarmonicLines { sets: &mut *ctx.harmonics };
            self.drag.finish(&mut lines, coords);
            self.sync_drag_state();
            return EventResult::Consumed;
        }
        if self.state.creating_from.is_none() {
            return EventResult::Ignored;
        }
        self.update_creation(coords, ctx);
        if self.state.creating_set.is_none() {
            ctx.set_status("Drag from one harmonic line to the next to set the spacing.");
        }
        self.state.creating_from = None;
        self.state.creating_set = None;
        self.press = None;
        EventResult::Consumed
    }

    fn handle_context_menu(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        if self.cancel_gesture(ctx) {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    fn handle_key_down(&mut self, key: &KeyEvent, ctx: &mut ModeContext<'_>) -> EventResult {
        match key.key.as_str() {
            "Escape" => {
                if self.cancel_gesture(ctx) {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
            "Delete" | "Backspace" => {
                let Some(target) = self.state.hovered.filter(|_| !self.drag.is_dragging()) else {
                    return EventResult::Ignored;
                };
                ctx.harmonics.remove(target.set_id);
                self.drag.cancel();
                self.sync_drag_state();
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn guidance_text(&self) -> String {
        if self.state.dragging.is_some() {
            "Release to set the new spacing. Right-click cancels.".to_string()
        } else if self.state.creating_from.is_some() {
            "Drag to the neighbouring harmonic line and release.".to_string()
        } else if self.state.hovered.is_some() {
            "Drag to rescale this harmonic set, Delete removes it.".to_string()
        } else {
            "Drag between two adjacent harmonic lines to add a set. Drag an existing line to adjust it.".to_string()
        }
    }

    fn cursor(&self) -> CursorStyle {
        if self.drag.is_dragging() || self.state.hovered.is_some() {
            CursorStyle::EwResize
        } else {
            CursorStyle::Crosshair
        }
    }

    fn reset_state(&mut self) {
        self.state = HarmonicsState::default();
        self.drag.cancel();
        self.press = None;
    }

    fn cleanup(&mut self) {
        self.reset_state();
    }

    fn state_snapshot(&self) -> ModeState {
        ModeState::Harmonics(self.state)
    }

    fn initial_state() -> ModeState {
        ModeState::Harmonics(HarmonicsState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::HarmonicChange;
    use crate::canvas::coordinates::CoordinateSystem;
    use crate::modes::test_support::{down, move_to, right_click, secondary_up, up, Harness};
    use crate::types::{DataRange, ImageDimensions};

    // Harness: screen x = (freq - 100) * 1.25
    fn x_of(freq: f64) -> f64 {
        (freq - 100.0) * 1.25
    }

    fn spacing(h: &Harness, id: u32) -> f64 {
        h.harmonics.get(id).map(|s| s.spacing).expect("set exists")
    }

    #[test]
    fn test_drag_creates_set_with_live_spacing() {
        let mut h = Harness::new();
        let mut mode = HarmonicsMode::new();
        down(&mut mode, &mut h, x_of(200.0), 100.0);
        move_to(&mut mode, &mut h, x_of(300.0), 100.0);
        assert_eq!(h.harmonics.len(), 1);
        let id = h.harmonics.iter().next().unwrap().id;
        assert!((spacing(&h, id) - 100.0).abs() < 1e-9);

        move_to(&mut mode, &mut h, x_of(350.0), 100.0);
        assert!((spacing(&h, id) - 150.0).abs() < 1e-9);
        up(&mut mode, &mut h, x_of(350.0), 100.0);

        assert_eq!(h.harmonics.len(), 1);
        assert_eq!(h.harmonics.get(id).unwrap().color, h.palette_color);
        assert_eq!(mode.state_snapshot(), HarmonicsMode::initial_state());
    }

    #[test]
    fn test_click_without_drag_creates_nothing() {
        let mut h = Harness::new();
        let mut mode = HarmonicsMode::new();
        down(&mut mode, &mut h, x_of(400.0), 100.0);
        up(&mut mode, &mut h, x_of(400.0) + 1.0, 100.0);
        assert!(h.harmonics.is_empty());
        assert!(h.status.is_some());
    }

    #[test]
    fn test_dragging_line_rescales_set() {
        let mut h = Harness::new();
        let id = h.harmonics.add(200.0, h.palette_color).unwrap();
        h.harmonics.take_changes();
        let mut mode = HarmonicsMode::new();

        // Third harmonic sits at 600 Hz
        assert_eq!(move_to(&mut mode, &mut h, x_of(600.0) + 2.0, 50.0), EventResult::Consumed);
        assert_eq!(mode.cursor(), CursorStyle::EwResize);
        down(&mut mode, &mut h, x_of(600.0) + 2.0, 50.0);
        match mode.state_snapshot() {
            ModeState::Harmonics(s) => assert_eq!(s.dragging.map(|t| (t.set_id, t.harmonic)), Some((id, 3))),
            other => panic!("unexpected {other:?}"),
        }
        move_to(&mut mode, &mut h, x_of(750.0), 50.0);
        assert!((spacing(&h, id) - 250.0).abs() < 1e-9);
        move_to(&mut mode, &mut h, x_of(450.0), 50.0);
        assert!((spacing(&h, id) - 150.0).abs() < 1e-9);
        up(&mut mode, &mut h, x_of(450.0), 50.0);
        assert!((spacing(&h, id) - 150.0).abs() < 1e-9);
        assert_eq!(h.harmonics.take_changes(), vec![HarmonicChange::Updated(id)]);
    }

    #[test]
    fn test_right_click_restores_spacing() {
        let mut h = Harness::new();
        let id = h.harmonics.add(200.0, h.palette_color).unwrap();
        let mut mode = HarmonicsMode::new();
        down(&mut mode, &mut h, x_of(400.0), 50.0);
        move_to(&mut mode, &mut h, x_of(500.0), 50.0);
        assert!((spacing(&h, id) - 250.0).abs() < 1e-9);
        assert_eq!(right_click(&mut mode, &mut h, x_of(500.0), 50.0), EventResult::Consumed);
        assert!((spacing(&h, id) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_click_discards_set_being_created() {
        let mut h = Harness::new();
        let mut mode = HarmonicsMode::new();
        down(&mut mode, &mut h, x_of(200.0), 100.0);
        move_to(&mut mode, &mut h, x_of(320.0), 100.0);
        assert_eq!(h.harmonics.len(), 1);
        right_click(&mut mode, &mut h, x_of(320.0), 100.0);
        assert!(h.harmonics.is_empty());
        assert_eq!(up(&mut mode, &mut h, x_of(320.0), 100.0), EventResult::Ignored);
    }

    #[test]
    fn test_delete_key_removes_hovered_set() {
        let mut h = Harness::new();
        let keep = h.harmonics.add(300.0, h.palette_color).unwrap();
        let gone = h.harmonics.add(250.0, h.palette_color).unwrap();
        let mut mode = HarmonicsMode::new();
        move_to(&mut mode, &mut h, x_of(500.0), 50.0);
        let result = mode.handle_key_down(&KeyEvent::new("Delete"), &mut h.ctx());
        assert_eq!(result, EventResult::Consumed);
        assert!(h.harmonics.get(gone).is_none());
        assert!(h.harmonics.get(keep).is_some());
    }

    #[test]
    fn test_secondary_release_keeps_adjustment_cancellable() {
        let mut h = Harness::new();
        let id = h.harmonics.add(200.0, h.palette_color).unwrap();
        let mut mode = HarmonicsMode::new();
        down(&mut mode, &mut h, x_of(400.0), 50.0);
        move_to(&mut mode, &mut h, x_of(500.0), 50.0);
        assert_eq!(secondary_up(&mut mode, &mut h, x_of(500.0), 50.0), EventResult::Ignored);
        assert!((spacing(&h, id) - 250.0).abs() < 1e-9);
        assert_eq!(right_click(&mut mode, &mut h, x_of(500.0), 50.0), EventResult::Consumed);
        assert!((spacing(&h, id) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_harmonic_can_be_grabbed() {
        let mut h = Harness::new();
        // 0-24 kHz over 1200 px: 20 Hz per pixel
        let cs = CoordinateSystem::new(
            DataRange::new(0.0, 24_000.0, 0.0, 10.0).unwrap(),
            ImageDimensions::new(1200.0, 600.0).unwrap(),
        )
        .unwrap();
        h.transform = TransformManager::new(cs, &h.config);
        let id = h.harmonics.add(100.0, h.palette_color).unwrap();
        let mut mode = HarmonicsMode::new();

        // 20020 Hz, one pixel right of harmonic 200
        down(&mut mode, &mut h, 1001.0, 300.0);
        match mode.state_snapshot() {
            ModeState::Harmonics(s) => assert_eq!(s.dragging.map(|t| (t.set_id, t.harmonic)), Some((id, 200))),
            other => panic!("unexpected {other:?}"),
        }
        move_to(&mut mode, &mut h, 1010.0, 300.0);
        up(&mut mode, &mut h, 1010.0, 300.0);
        assert!((spacing(&h, id) - 101.0).abs() < 1e-9);
    }
}
