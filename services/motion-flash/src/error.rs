//! Error types for the motion-flash service

/// Startup and configuration errors. These are the only errors that end the process.
#[derive(Debug, thiserror::Error)]
pub enum MotionFlashError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Result type alias for motion-flash operations
pub type Result<T> = std::result::Result<T, MotionFlashError>;

/// Failure of a single HTTP exchange, classified at the transport seam
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

/// Classified outcome of a failed status poll
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    /// The endpoint could not be reached
    #[error("cannot connect to status endpoint: {0}")]
    Connection(String),

    /// The request exceeded the fetch timeout
    #[error("status request timed out")]
    Timeout,

    /// The endpoint answered but reported `success: false`
    #[error("status API returned error{}", .0.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    ApiLogical(Option<String>),

    /// Malformed payload, unexpected status or any other failure
    #[error("{0}")]
    Unknown(String),
}

impl From<TransportError> for PollError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Connect(detail) => PollError::Connection(detail),
            TransportError::Timeout => PollError::Timeout,
            TransportError::Other(detail) => PollError::Unknown(detail),
        }
    }
}

/// Failure of one actuator invocation. Never escapes the flash routine.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} did not finish within {timeout:?}")]
    Timeout {
        command: String,
        timeout: std::time::Duration,
    },

    #[error("{command} exited with {status}")]
    ExitStatus { command: String, status: String },

    #[error("{0}")]
    Other(String),
}
