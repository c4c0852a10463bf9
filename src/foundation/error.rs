/// Crate-wide result alias.
pub type SwarmResult<T> = Result<T, SwarmError>;

/// Errors surfaced by bake passes, stores and scene documents.
#[derive(thiserror::Error, Debug)]
pub enum SwarmError {
    /// Rejected configuration or malformed input, raised before any work starts.
    #[error("validation error: {0}")]
    Validation(String),

    /// Source animation data for an object could not be read.
    #[error("source error: {0}")]
    Source(String),

    /// The host animation store refused a write.
    #[error("store error: {0}")]
    Store(String),

    /// Scene or job document (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SwarmError {
    /// Build a [`SwarmError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SwarmError::Source`].
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Build a [`SwarmError::Store`].
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Build a [`SwarmError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
