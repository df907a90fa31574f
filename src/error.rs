//! Error types for websift.
//!
//! Entry points never let an error cross the library boundary: rejected
//! inputs surface as `None`, recoverable issues are absorbed after logging.
//! `Error` is exposed for the fallible constructors (options parsing) and
//! for the CLI.

/// Error type for websift operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input was rejected before or during parsing.
    #[error("input rejected: {0}")]
    InputRejected(&'static str),

    /// An option value was invalid at construction time.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Result type alias for websift operations.
pub type Result<T> = std::result::Result<T, Error>;
