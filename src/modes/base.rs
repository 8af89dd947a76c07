use crate::modes::{Mode, ModeState};

/// Inert mode installed when an unknown mode is requested and the manager is
/// not strict. Ignores every event.
#[derive(Clone, Debug, Default)]
pub struct BaseMode;

impl Mode for BaseMode {
    fn name(&self) -> &'static str {
        "inert"
    }

    fn guidance_text(&self) -> String {
        "No interaction mode is active. Choose a tool to continue.".to_string()
    }

    fn reset_state(&mut self) {}

    fn state_snapshot(&self) -> ModeState {
        ModeState::Inert
    }

    fn initial_state() -> ModeState {
        ModeState::Inert
    }
}
