//! Error types for the feature drawer
//!
//! Only construction, configuration loading and a few explicit entry points
//! return errors. Classification and batching never fail: a feature that
//! cannot be classified simply stays undrawn for the frame.

use std::fmt;

/// Result type for feature drawer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Feature drawer errors
#[derive(Debug, Clone)]
pub enum Error {
    /// A configuration value is unusable (NaN, infinite, ...)
    InvalidConfig(String),

    /// Map extents cannot hold a single draw quad
    InvalidMapDimensions(String),

    /// Feature key is unknown or the feature cannot be drawn
    InvalidFeature(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::InvalidMapDimensions(msg) => write!(f, "Invalid map dimensions: {}", msg),
            Error::InvalidFeature(msg) => write!(f, "Invalid feature: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error and build it.
///
/// ```ignore
/// let err = fd_err!("rts::Config", InvalidConfig, "draw distance is {}", value);
/// ```
#[macro_export]
macro_rules! fd_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::fd_error!($source, "{}", message);
        $crate::rts::Error::$variant(message)
    }};
}

/// Log an error and return it from the enclosing function.
#[macro_export]
macro_rules! fd_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::fd_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
