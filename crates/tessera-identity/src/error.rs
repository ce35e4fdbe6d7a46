//! Error types for identity operations.

use std::path::PathBuf;
use tessera_signer::{CustodyKeyRef, SignerError};
use thiserror::Error;

/// Errors that can occur while loading or creating an identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The identity record could not be read or written.
    #[error("identity record {}: {source}", path.display())]
    Io {
        /// Record location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The identity record is malformed.
    #[error("malformed identity record {}: {reason}", path.display())]
    Decode {
        /// Record location.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A custody key was created but its record could not be written.
    ///
    /// The key still exists in custody; bind to it with `key_id` instead of
    /// creating another.
    #[error("custody key {key} was created but not recorded in {}: {source}", path.display())]
    UnrecordedKey {
        /// The newly created key.
        key: CustodyKeyRef,
        /// Record location.
        path: PathBuf,
        /// Why the record could not be written.
        #[source]
        source: Box<IdentityError>,
    },

    /// The supplied custody options cannot be satisfied.
    #[error("invalid identity configuration: {0}")]
    Configuration(String),

    /// The signer failed.
    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// A specialized Result type for identity operations.
pub type Result<T> = std::result::Result<T, IdentityError>;
