//! Error types for data parsing in smartinv-types.

use thiserror::Error;

/// Errors that can occur when parsing Smart Inventory values.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// History range token is malformed.
    #[error("Invalid history range '{value}': {reason}")]
    InvalidRange { value: String, reason: &'static str },
}

/// Result type alias using smartinv-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
