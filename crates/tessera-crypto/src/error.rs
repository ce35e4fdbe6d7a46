//! Error types for key material.

use thiserror::Error;

/// Errors that can occur while decoding or using key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The signature verification failed.
    #[error("signature verification failed")]
    InvalidSignature,

    /// The signature bytes have the wrong length.
    #[error("invalid signature length: expected {expected}, got {got}")]
    SignatureLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// The signature is not valid hex.
    #[error("invalid signature encoding: {0}")]
    SignatureEncoding(String),

    /// The public key is malformed.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The secret key is malformed.
    #[error("invalid secret key")]
    InvalidSecretKey,
}

/// A specialized Result type for key material operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
