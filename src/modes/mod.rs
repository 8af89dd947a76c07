//! Interaction modes. Exactly one is active at a time; the `ModeManager`
//! resolves each pointer position through the `TransformManager` and hands
//! the resulting `CoordinateBundle` to the active mode.

pub mod analysis;
pub mod base;
pub mod doppler;
pub mod drag;
pub mod factory;
pub mod harmonics;
pub mod pan;
pub mod zoom;

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::annotations::HarmonicCollection;
use crate::canvas::transform::{CoordinateBundle, TransformManager};
use crate::config::AnnotatorConfig;
use crate::types::{CursorStyle, KeyEvent, PointerEvent, Rgb};

use analysis::{AnalysisMode, AnalysisState};
use base::BaseMode;
use doppler::{DopplerMode, DopplerState};
use harmonics::{HarmonicsMode, HarmonicsState};
use pan::{PanMode, PanState};
use zoom::{ZoomMode, ZoomSelectState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Analysis,
    Harmonics,
    Doppler,
    Pan,
    Zoom,
}

impl ModeKind {
    pub const ALL: [ModeKind; 5] = [
        ModeKind::Analysis,
        ModeKind::Harmonics,
        ModeKind::Doppler,
        ModeKind::Pan,
        ModeKind::Zoom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Harmonics => "harmonics",
            Self::Doppler => "doppler",
            Self::Pan => "pan",
            Self::Zoom => "zoom",
        }
    }

    /// Single-key shortcut used when the active mode does not consume the key.
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key {
            "a" => Some(Self::Analysis),
            "h" => Some(Self::Harmonics),
            "d" => Some(Self::Doppler),
            "p" => Some(Self::Pan),
            "z" => Some(Self::Zoom),
            _ => None,
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResult {
    /// The event changed state; listeners are notified.
    Consumed,
    Ignored,
}

impl EventResult {
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}

/// Per-mode state, as seeded before activation and as reported after each event.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ModeState {
    Inert,
    Analysis(AnalysisState),
    Harmonics(HarmonicsState),
    Doppler(DopplerState),
    Pan(PanState),
    Zoom(ZoomSelectState),
}

/// Everything a mode may touch besides its own state. Built by the manager
/// for each dispatched event.
pub struct ModeContext<'a> {
    pub transform: &'a mut TransformManager,
    pub harmonics: &'a mut HarmonicCollection,
    /// Colour currently selected on the palette slider.
    pub palette_color: Rgb,
    pub config: &'a AnnotatorConfig,
    pub status: &'a mut Option<String>,
}

impl ModeContext<'_> {
    pub fn set_status(&mut self, message: impl Into<String>) {
        *self.status = Some(message.into());
    }
}

/// Contract every interaction mode implements. Handlers return
/// `EventResult::Consumed` when they changed any state.
pub trait Mode {
    fn name(&self) -> &'static str;

    fn activate(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn deactivate(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn handle_mouse_down(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        EventResult::Ignored
    }

    fn handle_mouse_move(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        EventResult::Ignored
    }

    fn handle_mouse_up(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        EventResult::Ignored
    }

    fn handle_context_menu(&mut self, _event: &PointerEvent, _coords: &CoordinateBundle, _ctx: &mut ModeContext<'_>) -> EventResult {
        EventResult::Ignored
    }

    /// Escape abandons whatever the mode is doing.
    fn handle_key_down(&mut self, key: &KeyEvent, _ctx: &mut ModeContext<'_>) -> EventResult {
        if key.key == "Escape" {
            self.reset_state();
            EventResult::Consumed
        } else {
            EventResult::Ignored
        }
    }

    fn guidance_text(&self) -> String;

    fn cursor(&self) -> CursorStyle {
        CursorStyle::Default
    }

    fn reset_state(&mut self);

    fn cleanup(&mut self) {}

    fn state_snapshot(&self) -> ModeState;

    /// State used to seed the application state before the mode is ever activated.
    fn initial_state() -> ModeState
    where
        Self: Sized;
}

/// Closed set of mode implementations; the manager owns exactly one.
#[derive(Debug)]
pub enum AnyMode {
    Inert(BaseMode),
    Analysis(AnalysisMode),
    Harmonics(HarmonicsMode),
    Doppler(DopplerMode),
    Pan(PanMode),
    Zoom(ZoomMode),
}

impl AnyMode {
    pub fn kind(&self) -> Option<ModeKind> {
        match self {
            Self::Inert(_) => None,
            Self::Analysis(_) => Some(ModeKind::Analysis),
            Self::Harmonics(_) => Some(ModeKind::Harmonics),
            Self::Doppler(_) => Some(ModeKind::Doppler),
            Self::Pan(_) => Some(ModeKind::Pan),
            Self::Zoom(_) => Some(ModeKind::Zoom),
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AnyMode::Inert($m) => $body,
            AnyMode::Analysis($m) => $body,
            AnyMode::Harmonics($m) => $body,
            AnyMode::Doppler($m) => $body,
            AnyMode::Pan($m) => $body,
            AnyMode::Zoom($m) => $body,
        }
    };
}

impl Mode for AnyMode {
    fn name(&self) -> &'static str {
        dispatch!(self, m => m.name())
    }

    fn activate(&mut self, ctx: &mut ModeContext<'_>) {
        dispatch!(self, m => m.activate(ctx))
    }

    fn deactivate(&mut self, ctx: &mut ModeContext<'_>) {
        dispatch!(self, m => m.deactivate(ctx))
    }

    fn handle_mouse_down(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        dispatch!(self, m => m.handle_mouse_down(event, coords, ctx))
    }

    fn handle_mouse_move(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        dispatch!(self, m => m.handle_mouse_move(event, coords, ctx))
    }

    fn handle_mouse_up(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        dispatch!(self, m => m.handle_mouse_up(event, coords, ctx))
    }

    fn handle_context_menu(&mut self, event: &PointerEvent, coords: &CoordinateBundle, ctx: &mut ModeContext<'_>) -> EventResult {
        dispatch!(self, m => m.handle_context_menu(event, coords, ctx))
    }

    fn handle_key_down(&mut self, key: &KeyEvent, ctx: &mut ModeContext<'_>) -> EventResult {
        dispatch!(self, m => m.handle_key_down(key, ctx))
    }

    fn guidance_text(&self) -> String {
        dispatch!(self, m => m.guidance_text())
    }

    fn cursor(&self) -> CursorStyle {
        dispatch!(self, m => m.cursor())
    }

    fn reset_state(&mut self) {
        dispatch!(self, m => m.reset_state())
    }

    fn cleanup(&mut self) {
        dispatch!(self, m => m.cleanup())
    }

    fn state_snapshot(&self) -> ModeState {
        dispatch!(self, m => m.state_snapshot())
    }

    fn initial_state() -> ModeState {
        ModeState::Inert
    }
}
