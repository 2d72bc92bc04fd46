//! Error types shared across gazetrack crates.

/// Top-level error type for gazetrack operations.
#[derive(Debug, thiserror::Error)]
pub enum GazeError {
    /// The gaze source became unreachable. Fatal for the current session.
    #[error("Gaze source connection lost: {message}")]
    ConnectionLost { message: String },

    /// A transient failure reading the gaze source.
    #[error("Gaze source error: {message}")]
    Source { message: String },

    #[error("Motion estimate needs {required} samples, only {available} available")]
    InsufficientHistory { available: usize, required: usize },

    #[error("No gaze samples within the last {window_ms} ms")]
    EmptyWindow { window_ms: u32 },

    #[error("No gaze samples available")]
    NoSamples,

    #[error("Sample timestamp {current_ms} ms does not follow {previous_ms} ms")]
    NonMonotonicTimestamp { previous_ms: u32, current_ms: u32 },

    #[error("Invalid sampling period: {ms} ms")]
    InvalidSamplingPeriod { ms: u32 },

    /// Malformed export data.
    #[error("Format error: {message}")]
    Format { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using GazeError.
pub type GazeResult<T> = Result<T, GazeError>;

impl GazeError {
    pub fn connection_lost(msg: impl Into<String>) -> Self {
        Self::ConnectionLost {
            message: msg.into(),
        }
    }

    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source {
            message: msg.into(),
        }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error ends the current tracking session.
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, Self::ConnectionLost { .. })
    }
}
