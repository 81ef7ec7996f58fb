/// Crate-wide result alias.
pub type SearchVizResult<T> = Result<T, SearchVizError>;

/// Errors produced by trace generation, mark tracking and the video plumbing.
///
/// A target that is absent from the array is not an error: it ends the trace with a
/// [`StepKind::NotFound`](crate::StepKind::NotFound) step.
#[derive(thiserror::Error, Debug)]
pub enum SearchVizError {
    /// The input array has no elements.
    #[error("empty array: nothing to search")]
    EmptyArray,

    /// The array does not satisfy the ordering the chosen variant relies on.
    #[error("precondition violation: {0}")]
    PreconditionViolation(String),

    /// An internal cursor left `[0, len - 1]`.
    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange {
        /// Offending cursor value.
        index: i64,
        /// Array length.
        len: usize,
    },

    /// A step asked the mark tracker for an illegal transition.
    #[error("mark invariant violated: {0}")]
    MarkInvariant(String),

    /// Invalid caller-supplied configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure in ffmpeg/ffprobe or the files they read and write.
    #[error("media error: {0}")]
    Media(String),

    /// Serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SearchVizError {
    /// Build a [`SearchVizError::PreconditionViolation`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionViolation(msg.into())
    }

    /// Build a [`SearchVizError::MarkInvariant`] value.
    pub fn mark_invariant(msg: impl Into<String>) -> Self {
        Self::MarkInvariant(msg.into())
    }

    /// Build a [`SearchVizError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SearchVizError::Media`] value.
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    /// Build a [`SearchVizError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SearchVizError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
