use thiserror::Error;

/// Failures surfaced by the decode → analyze → layout → render chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    #[error("Invalid frequency range: {min} Hz - {max} Hz")]
    InvalidRange { min: f64, max: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode error: {0}")]
    Decode(String),
}
