//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Represents errors that can occur while building or signing certificate profiles.
///
/// Construction is all-or-nothing: whenever one of these is returned, no profile was
/// produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// A required input is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error during subject key generation.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// A profile option rejected the current profile state.
    #[error("Option application error: {0}")]
    OptionApplicationError(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error while signing a certificate.
    #[error("Signing error: {0}")]
    SigningError(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ProfileError>;

impl From<der::Error> for ProfileError {
    /// Converts a `der::Error` into a `ProfileError`.
    fn from(err: der::Error) -> Self {
        ProfileError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for ProfileError {
    fn from(err: pkcs8::spki::Error) -> Self {
        ProfileError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for ProfileError {
    fn from(err: pkcs8::Error) -> Self {
        ProfileError::DecodingError(err.to_string())
    }
}
