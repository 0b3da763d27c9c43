pub type DriftfieldResult<T> = Result<T, DriftfieldError>;

#[derive(thiserror::Error, Debug)]
pub enum DriftfieldError {
    /// Scenario or configuration input rejected before any work was done.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame could not be rasterized (surface limits, size mismatches).
    #[error("render error: {0}")]
    Render(String),

    /// The external ffmpeg encoder failed to start, accept frames, or exit cleanly.
    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DriftfieldError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
