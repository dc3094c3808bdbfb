//! Error types for the Linux GPIO debug interface

use thiserror::Error;

/// Linux GPIO debug interface errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request GPIO lines (commonly missing permissions)
    #[error("Failed to request GPIO lines on '{path}': {source}")]
    LineRequestFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid GPIO line number
    #[error("Invalid GPIO line number for {name}: {value}")]
    InvalidLineNumber { name: &'static str, value: String },
}

/// Result type for Linux GPIO debug interface operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
