use std::panic::Location;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotatorError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid zoom rectangle {width}x{height}: both sides must be positive")]
    InvalidDimension { width: f64, height: f64 },

    #[error("invalid zoom factor {0}: must be finite and positive")]
    InvalidZoomFactor(f64),

    #[error("unknown mode '{name}' requested at {location}")]
    UnknownMode {
        name: String,
        location: &'static Location<'static>,
    },

    #[error("config parse: {0}")]
    Config(#[from] serde_json::Error),
}
