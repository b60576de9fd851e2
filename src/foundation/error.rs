/// Convenience result type used across the crate.
pub type KaraokeResult<T> = Result<T, KaraokeError>;

/// Top-level error taxonomy used by render APIs.
///
/// Cancellation is not represented here; see [`crate::RenderOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum KaraokeError {
    /// Invalid caller-provided data (resolution, fps, timing records).
    #[error("validation error: {0}")]
    Validation(String),

    /// A required external resource (audio track, output directory) is unusable.
    #[error("resource error: {0}")]
    Resource(String),

    /// Errors while producing frame pixels.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Failures reported by the video/audio encoding step.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing timing data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KaraokeError {
    /// Build a [`KaraokeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KaraokeError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`KaraokeError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`KaraokeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`KaraokeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
