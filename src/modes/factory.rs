use std::panic::Location;
use crate::error::AnnotatorError;
use crate::modes::analysis::AnalysisMode;
use crate::modes::base::BaseMode;
use crate::modes::doppler::DopplerMode;
use crate::modes::harmonics::HarmonicsMode;
use crate::modes::pan::PanMode;
use crate::modes::zoom::ZoomMode;
use crate::modes::{AnyMode, Mode, ModeKind, ModeState};

/// Builds mode instances by kind or by user-facing name.
pub struct ModeFactory;

impl ModeFactory {
    /// Resolve a mode name. The error records the caller's location.
    #[track_caller]
    pub fn parse(name: &str) -> Result<ModeKind, AnnotatorError> {
        let location = Location::caller();
        name.parse().map_err(|()| AnnotatorError::UnknownMode {
            name: name.to_string(),
            location,
        })
    }

    /// Fresh instance; no state carries over from earlier instances.
    pub fn create(kind: ModeKind) -> AnyMode {
        match kind {
            ModeKind::Analysis => AnyMode::Analysis(AnalysisMode::new()),
            ModeKind::Harmonics => AnyMode::Harmonics(HarmonicsMode::new()),
            ModeKind::Doppler => AnyMode::Doppler(DopplerMode::new()),
            ModeKind::Pan => AnyMode::Pan(PanMode::new()),
            ModeKind::Zoom => AnyMode::Zoom(ZoomMode::new()),
        }
    }

    /// With `strict` an unknown name is an error; otherwise it is logged and
    /// an inert mode is returned.
    #[track_caller]
    pub fn create_by_name(name: &str, strict: bool) -> Result<AnyMode, AnnotatorError> {
        match Self::parse(name) {
            Ok(kind) => Ok(Self::create(kind)),
            Err(e) if strict => Err(e),
            Err(e) => {
                log::error!("{e}; falling back to inert mode");
                Ok(AnyMode::Inert(BaseMode))
            }
        }
    }

    pub fn initial_state(kind: ModeKind) -> ModeState {
        match kind {
            ModeKind::Analysis => AnalysisMode::initial_state(),
            ModeKind::Harmonics => HarmonicsMode::initial_state(),
            ModeKind::Doppler => DopplerMode::initial_state(),
            ModeKind::Pan => PanMode::initial_state(),
            ModeKind::Zoom => ZoomMode::initial_state(),
        }
    }
}
