use serde::{Deserialize, Serialize};

/// Error category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Operator input rejected (empty version label, malformed config field)
    ValidationError,
    /// No project configured, or the stored record cannot be read
    ConfigurationError,
    /// Another operation already holds the working directory
    ConcurrencyError,
    /// An external command could not be started
    LaunchError,
    /// An external command ran and exited non-zero
    CommandError,
    TimeoutError,
    IoError,
    SerializationError,
    InternalError,
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Error severity enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Error,
    Warning,
    Info,
    Debug,
}
