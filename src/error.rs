//! Error types for mxrss.

use thiserror::Error;

/// Common error type for mxrss.
#[derive(Error, Debug)]
pub enum MxrssError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Feed fetch or parse error for a single feed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Notification delivery error.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for mxrss operations.
pub type Result<T> = std::result::Result<T, MxrssError>;
