use std::collections::BTreeMap;
use serde::Serialize;
use crate::annotations::{HarmonicChange, HarmonicSet};
use crate::canvas::transform::ZoomState;
use crate::modes::factory::ModeFactory;
use crate::modes::{ModeKind, ModeState};
use crate::types::{CursorStyle, DataRect, Rgb};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppState {
    /// `None` while the inert fallback mode is installed.
    pub active_mode: Option<ModeKind>,
    pub guidance: String,
    pub cursor: CursorStyle,
    pub zoom: ZoomState,
    pub visible: DataRect,
    /// Latest state of every mode; inactive modes keep their seeded or last reported state.
    pub mode_states: BTreeMap<ModeKind, ModeState>,
    pub harmonic_sets: Vec<HarmonicSet>,
    /// Harmonic changes since the previous snapshot.
    pub harmonic_changes: Vec<HarmonicChange>,
    pub palette_position: f64,
    pub palette_color: Rgb,
    /// One-shot user message, e.g. why a gesture was rejected.
    pub status: Option<String>,
}

impl AppState {
    pub fn new(zoom: ZoomState, visible: DataRect, palette_color: Rgb) -> Self {
        let mode_states = ModeKind::ALL
            .into_iter()
            .map(|k| (k, ModeFactory::initial_state(k)))
            .collect();
        Self {
            active_mode: None,
            guidance: String::new(),
            cursor: CursorStyle::Default,
            zoom,
            visible,
            mode_states,
            harmonic_sets: Vec::new(),
            harmonic_changes: Vec::new(),
            palette_position: 0.0,
            palette_color,
            status: None,
        }
    }

    /// Whether any harmonic set was added, updated or removed since the previous snapshot.
    pub fn harmonics_changed(&self) -> bool {
        !self.harmonic_changes.is_empty()
    }

    pub fn mode_state(&self, kind: ModeKind) -> Option<&ModeState> {
        self.mode_states.get(&kind)
    }
}

/// Immutable state published to listeners after each mutation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub revision: u64,
    pub state: AppState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn Fn(&StateSnapshot) -> Result<(), String>>;

/// Owns the current snapshot and the only listener registry.
pub struct StateStore {
    current: StateSnapshot,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl StateStore {
    pub fn new(initial: AppState) -> Self {
        Self {
            current: StateSnapshot { revision: 0, state: initial },
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn add_listener(&mut self, listener: Listener) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Replace the current state and notify every listener with the same
    /// snapshot. A failing listener is logged and does not stop delivery.
    pub fn publish(&mut self, state: AppState) -> &StateSnapshot {
        self.current = StateSnapshot {
            revision: self.current.revision + 1,
            state,
        };
        for (id, listener) in &self.listeners {
            if let Err(e) = listener(&self.current) {
                log::warn!("state listener {:?} failed: {}", id, e);
            }
        }
        &self.current
    }

    pub fn snapshot(&self) -> &StateSnapshot {
        &self.current
    }
}
