use std::fmt;

/// Unified error type for buffer pool operations
#[derive(Debug)]
pub enum Error {
    /// Invalid argument value passed to a pool factory or facade call
    InvalidArgument(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias for buffer pool operations
pub type Result<T> = std::result::Result<T, Error>;
