//! The single owner of annotator state. Resolves pointer positions, forwards
//! events to the active mode and publishes a snapshot after every change.

use crate::annotations::{HarmonicCollection, HarmonicSet};
use crate::canvas::colors::palette_color;
use crate::canvas::coordinates::CoordinateSystem;
use crate::canvas::transform::{CoordinateBundle, TransformManager};
use crate::config::AnnotatorConfig;
use crate::error::AnnotatorError;
use crate::modes::factory::ModeFactory;
use crate::modes::{AnyMode, EventResult, Mode, ModeContext, ModeKind, ModeState};
use crate::state::{AppState, Listener, ListenerId, StateSnapshot, StateStore};
use crate::types::{CursorStyle, DataRange, ImageDimensions, KeyEvent, PointerEvent, Rgb};

pub struct ModeManager {
    config: AnnotatorConfig,
    transform: TransformManager,
    harmonics: HarmonicCollection,
    palette_position: f64,
    status: Option<String>,
    active: AnyMode,
    store: StateStore,
}

impl ModeManager {
    /// Starts in analysis mode.
    pub fn new(coords: CoordinateSystem, config: AnnotatorConfig) -> Result<Self, AnnotatorError> {
        config.validate()?;
        let transform = TransformManager::new(coords, &config);
        let color = palette_color(0.0, config.palette_slider_width);
        let seed = AppState::new(transform.zoom_state(), transform.visible_data_rect(), color);
        let mut manager = Self {
            config,
            transform,
            harmonics: HarmonicCollection::default(),
            palette_position: 0.0,
            status: None,
            active: ModeFactory::create(ModeKind::Analysis),
            store: StateStore::new(seed),
        };
        {
            let mut ctx = ModeContext {
                transform: &mut manager.transform,
                harmonics: &mut manager.harmonics,
                palette_color: color,
                config: &manager.config,
                status: &mut manager.status,
            };
            manager.active.activate(&mut ctx);
        }
        let initial = manager.build_state();
        manager.store = StateStore::new(initial);
        Ok(manager)
    }

    /// Switch modes by name. Unknown names are an error when
    /// `strict_modes` is set; otherwise the inert mode is installed.
    #[track_caller]
    pub fn set_mode(&mut self, name: &str) -> Result<(), AnnotatorError> {
        let next = ModeFactory::create_by_name(name, self.config.strict_modes)?;
        self.install(next);
        Ok(())
    }

    pub fn set_mode_kind(&mut self, kind: ModeKind) {
        self.install(ModeFactory::create(kind));
    }

    fn install(&mut self, next: AnyMode) {
        let mut ctx = ModeContext {
            transform: &mut self.transform,
            harmonics: &mut self.harmonics,
            palette_color: palette_color(self.palette_position, self.config.palette_slider_width),
            config: &self.config,
            status: &mut self.status,
        };
        self.active.deactivate(&mut ctx);
        self.active.cleanup();
        let previous = std::mem::replace(&mut self.active, next);
        self.active.activate(&mut ctx);
        log::info!("mode {} -> {}", previous.name(), self.active.name());
        self.publish();
    }

    pub fn active_kind(&self) -> Option<ModeKind> {
        self.active.kind()
    }

    pub fn handle_mouse_down(&mut self, event: &PointerEvent) -> EventResult {
        // A new gesture dismisses the previous message
        let cleared = self.status.take().is_some();
        let coords = self.coords_for(event);
        let result = self.dispatch(|m, ctx| m.handle_mouse_down(event, &coords, ctx));
        if cleared && !result.is_consumed() {
            self.publish();
        }
        result
    }

    pub fn handle_mouse_move(&mut self, event: &PointerEvent) -> EventResult {
        let coords = self.coords_for(event);
        self.dispatch(|m, ctx| m.handle_mouse_move(event, &coords, ctx))
    }

    pub fn handle_mouse_up(&mut self, event: &PointerEvent) -> EventResult {
        let coords = self.coords_for(event);
        self.dispatch(|m, ctx| m.handle_mouse_up(event, &coords, ctx))
    }

    pub fn handle_context_menu(&mut self, event: &PointerEvent) -> EventResult {
        let coords = self.coords_for(event);
        self.dispatch(|m, ctx| m.handle_context_menu(event, &coords, ctx))
    }

    /// The active mode sees the key first. Unhandled keys fall through to
    /// zoom shortcuts and single-letter mode switches.
    pub fn handle_key_down(&mut self, key: &KeyEvent) -> EventResult {
        let result = self.dispatch(|m, ctx| m.handle_key_down(key, ctx));
        if result.is_consumed() || key.modifiers.ctrl || key.modifiers.alt {
            return result;
        }
        let applied = match key.key.as_str() {
            "+" | "=" => self.zoom_by_factor(self.config.zoom_step).is_ok(),
            "-" => self.zoom_by_factor(1.0 / self.config.zoom_step).is_ok(),
            "0" => {
                self.reset_zoom();
                true
            }
            other => match ModeKind::from_shortcut(&other.to_ascii_lowercase()) {
                Some(kind) if self.active.kind() != Some(kind) => {
                    self.set_mode_kind(kind);
                    true
                }
                _ => false,
            },
        };
        if applied {
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    /// Negative `delta_y` (wheel away from the user) zooms in about the viewport centre.
    pub fn handle_wheel(&mut self, delta_y: f64) -> EventResult {
        if delta_y == 0.0 || !delta_y.is_finite() {
            return EventResult::Ignored;
        }
        let step = self.config.wheel_zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        let before = self.transform.zoom_state();
        if let Err(e) = self.transform.zoom_by_factor(factor) {
            log::warn!("wheel zoom rejected: {e}");
            return EventResult::Ignored;
        }
        if self.transform.zoom_state() == before {
            return EventResult::Ignored;
        }
        self.publish();
        EventResult::Consumed
    }

    pub fn zoom_by_factor(&mut self, factor: f64) -> Result<(), AnnotatorError> {
        self.transform.zoom_by_factor(factor)?;
        self.publish();
        Ok(())
    }

    pub fn zoom_to_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), AnnotatorError> {
        self.transform.zoom_to_rect(x, y, width, height)?;
        self.publish();
        Ok(())
    }

    pub fn reset_zoom(&mut self) {
        self.transform.reset_transform();
        self.publish();
    }

    /// Returns false when clamping left the pan unchanged.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        let changed = self.transform.update_pan(dx, dy);
        if changed {
            self.publish();
        }
        changed
    }

    pub fn get_all_coordinates(&self, screen_x: f64, screen_y: f64) -> CoordinateBundle {
        self.transform.get_all_coordinates(screen_x, screen_y)
    }

    /// Replace the displayed image. Zoom and the active mode's state are reset;
    /// harmonic sets are kept since they are in data units.
    pub fn load_image(&mut self, range: DataRange, image: ImageDimensions) -> Result<(), AnnotatorError> {
        let mut coords = CoordinateSystem::new(range, image)?;
        coords.set_container_size(self.transform.coordinate_system().container())?;
        self.transform.replace_coordinate_system(coords);
        self.active.reset_state();
        log::info!(
            "image loaded: {}x{} px, {:.0}-{:.0} Hz",
            image.width,
            image.height,
            range.min_x,
            range.max_x
        );
        self.publish();
        Ok(())
    }

    /// Layout change only; nothing observable in the published state.
    pub fn set_container_size(&mut self, width: f64, height: f64) -> Result<(), AnnotatorError> {
        self.transform.set_container_size(ImageDimensions::new(width, height)?)
    }

    pub fn set_palette_position(&mut self, position: f64) {
        let clamped = if position.is_finite() {
            position.clamp(0.0, self.config.palette_slider_width)
        } else {
            0.0
        };
        if clamped == self.palette_position {
            return;
        }
        self.palette_position = clamped;
        self.publish();
    }

    pub fn palette_color(&self) -> Rgb {
        palette_color(self.palette_position, self.config.palette_slider_width)
    }

    pub fn remove_harmonic_set(&mut self, id: u32) -> bool {
        let removed = self.harmonics.remove(id);
        if removed {
            self.publish();
        }
        removed
    }

    pub fn harmonic_sets(&self) -> &[HarmonicSet] {
        self.harmonics.as_slice()
    }

    pub fn add_listener(&mut self, listener: Listener) -> ListenerId {
        self.store.add_listener(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.store.remove_listener(id)
    }

    pub fn guidance_text(&self) -> String {
        self.active.guidance_text()
    }

    pub fn cursor(&self) -> CursorStyle {
        self.active.cursor()
    }

    /// Live state of the active mode.
    pub fn state_snapshot(&self) -> ModeState {
        self.active.state_snapshot()
    }

    /// Last published snapshot.
    pub fn snapshot(&self) -> &StateSnapshot {
        self.store.snapshot()
    }

    pub fn transform(&self) -> &TransformManager {
        &self.transform
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    fn coords_for(&self, event: &PointerEvent) -> CoordinateBundle {
        self.transform
            .get_all_coordinates(event.position.x, event.position.y)
    }

    fn dispatch<F>(&mut self, f: F) -> EventResult
    where
        F: FnOnce(&mut AnyMode, &mut ModeContext<'_>) -> EventResult,
    {
        let mut ctx = ModeContext {
            transform: &mut self.transform,
            harmonics: &mut self.harmonics,
            palette_color: palette_color(self.palette_position, self.config.palette_slider_width),
            config: &self.config,
            status: &mut self.status,
        };
        let result = f(&mut self.active, &mut ctx);
        if result.is_consumed() {
            self.publish();
        }
        result
    }

    fn build_state(&mut self) -> AppState {
        let active_mode = self.active.kind();
        let mut mode_states = self.store.snapshot().state.mode_states.clone();
        if let Some(kind) = active_mode {
            mode_states.insert(kind, self.active.state_snapshot());
        }
        AppState {
            active_mode,
            guidance: self.active.guidance_text(),
            cursor: self.active.cursor(),
            zoom: self.transform.zoom_state(),
            visible: self.transform.visible_data_rect(),
            mode_states,
            harmonic_sets: self.harmonics.as_slice().to_vec(),
            harmonic_changes: self.harmonics.take_changes(),
            palette_position: self.palette_position,
            palette_color: self.palette_color(),
            status: self.status.clone(),
        }
    }

    fn publish(&mut self) {
        let state = self.build_state();
        self.store.publish(state);
    }
}
