//! Error type for VAD service operations.

/// Errors surfaced by the controller and the pipeline.
#[derive(Debug)]
pub enum VadError {
    /// `start` called while a pipeline is active.
    AlreadyRunning,
    /// Options update attempted while a pipeline is active.
    BusyRunning,
    /// Rejected options (bad thresholds, unsupported rate, unknown keys).
    InvalidOptions(String),
    /// Model file missing or failed to load.
    ModelUnavailable(String),
    /// Recorder child process could not be spawned.
    MicUnavailable(String),
    /// A model inference call failed; the pipeline terminates.
    InferenceFailed(String),
    /// Filesystem failure; the affected segment is lost.
    Io(String),
}

impl std::fmt::Display for VadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VadError::AlreadyRunning => write!(f, "VAD is already running"),
            VadError::BusyRunning => write!(f, "cannot change options while running"),
            VadError::InvalidOptions(msg) => write!(f, "invalid options: {}", msg),
            VadError::ModelUnavailable(msg) => write!(f, "model unavailable: {}", msg),
            VadError::MicUnavailable(msg) => write!(f, "microphone unavailable: {}", msg),
            VadError::InferenceFailed(msg) => write!(f, "inference failed: {}", msg),
            VadError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for VadError {}

impl From<std::io::Error> for VadError {
    fn from(err: std::io::Error) -> Self {
        VadError::Io(err.to_string())
    }
}
