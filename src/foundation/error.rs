/// Result alias used across the crate.
pub type ReelResult<T> = Result<T, ReelError>;

/// Failure kinds surfaced by a render session.
///
/// Every failure is terminal for the session that produced it; callers retry by invoking
/// render again.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid or empty scene list, or invalid render configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The host cannot capture the drawing surface at all.
    #[error("unsupported capability: {0}")]
    UnsupportedCapability(String),

    /// A scene image could not be resolved or decoded.
    #[error("asset load error: '{reference}': {reason}")]
    AssetLoad {
        /// The offending image reference.
        reference: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Render was invoked before a drawing surface was mounted.
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The capture pipeline failed mid-recording.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The engine is busy with another render.
    #[error("state error: {0}")]
    State(String),

    /// The in-flight render was stopped before completion.
    #[error("render cancelled")]
    Cancelled,

    /// Contextual failure from an I/O edge.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Payload-free discriminant of [`ReelError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ReelError::Configuration`].
    Configuration,
    /// See [`ReelError::UnsupportedCapability`].
    UnsupportedCapability,
    /// See [`ReelError::AssetLoad`].
    AssetLoad,
    /// See [`ReelError::SurfaceUnavailable`].
    SurfaceUnavailable,
    /// See [`ReelError::Encoding`].
    Encoding,
    /// See [`ReelError::State`].
    State,
    /// See [`ReelError::Cancelled`].
    Cancelled,
    /// See [`ReelError::Other`].
    Other,
}

impl ReelError {
    /// Build a [`ReelError::Configuration`].
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`ReelError::UnsupportedCapability`].
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedCapability(msg.into())
    }

    /// Build a [`ReelError::AssetLoad`] for `reference`.
    pub fn asset_load(reference: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AssetLoad {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`ReelError::SurfaceUnavailable`].
    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    /// Build a [`ReelError::Encoding`].
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`ReelError::State`].
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Return the payload-free kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::UnsupportedCapability(_) => ErrorKind::UnsupportedCapability,
            Self::AssetLoad { .. } => ErrorKind::AssetLoad,
            Self::SurfaceUnavailable(_) => ErrorKind::SurfaceUnavailable,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::State(_) => ErrorKind::State,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
