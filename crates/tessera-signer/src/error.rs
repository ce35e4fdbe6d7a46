//! Error types for signing operations.

use tessera_crypto::CryptoError;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for signing operations.
pub type Result<T> = std::result::Result<T, SignerError>;

/// Errors that can occur while signing, verifying or resolving keys.
///
/// Transport and service failures are always distinct from a signature that
/// is merely invalid: [`Signer::verify`](crate::Signer::verify) reports the
/// latter as `Ok(false)`.
#[derive(Debug, Error)]
pub enum SignerError {
    /// Exchanging the refresh credential for an access token failed.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// The custody service answered with a non-success status.
    #[error("custody service returned {status}: {body}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The custody service could not be reached.
    #[error("custody service unreachable: {0}")]
    Transport(String),

    /// The referenced custody key does not exist.
    #[error("custody key {key_id} not found in domain {custody_domain_id}")]
    MissingKey {
        /// Custody domain that was searched.
        custody_domain_id: Uuid,
        /// Key that was requested.
        key_id: Uuid,
    },

    /// A custody response could not be decoded.
    #[error("malformed custody response: {0}")]
    Decode(String),

    /// The operation was cancelled or ran past its deadline.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// The custody client could not be configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local key material was rejected.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl SignerError {
    /// Returns whether this error came from the custody service or the
    /// network path to it.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SignerError::Remote { .. } | SignerError::Transport(_) | SignerError::Decode(_)
        )
    }

    /// Returns whether this error was raised by cancellation or a deadline.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SignerError::Cancelled(_))
    }
}
