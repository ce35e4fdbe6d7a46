//! Error types for validator signing.

use std::path::PathBuf;
use tessera_core::{Hrs, SignStep};
use tessera_identity::IdentityError;
use tessera_signer::SignerError;
use thiserror::Error;

/// Result type alias for validator signing.
pub type Result<T> = std::result::Result<T, PrivvalError>;

/// Errors that can occur while signing consensus messages.
///
/// None of these are retried or repaired locally.
#[derive(Debug, Error)]
pub enum PrivvalError {
    /// The request targets a slot before the last signed one.
    #[error(
        "refusing to sign {requested}: last signed {last_height}/{last_round}/{}",
        step_name(.last_step)
    )]
    Regression {
        /// Requested slot.
        requested: Hrs,
        /// Height of the last signature.
        last_height: i64,
        /// Round of the last signature.
        last_round: i32,
        /// Step of the last signature, if any.
        last_step: Option<SignStep>,
    },

    /// Different data was requested for an already signed slot.
    #[error("conflicting data at {hrs}")]
    Conflict {
        /// Slot that was already signed.
        hrs: Hrs,
    },

    /// The sign state claims a slot was signed but lacks the evidence.
    #[error("sign state corrupt at {hrs}: {reason}")]
    MissingRecord {
        /// Affected slot.
        hrs: Hrs,
        /// What is missing.
        reason: &'static str,
    },

    /// The sign state could not be written or read.
    #[error("sign state {}: {source}", path.display())]
    Persistence {
        /// State file location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The sign state file is malformed.
    #[error("malformed sign state {}: {reason}", path.display())]
    Decode {
        /// State file location.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// The signer failed.
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The validator identity could not be loaded.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

fn step_name(step: &Option<SignStep>) -> String {
    step.map_or_else(|| "none".to_string(), |s| s.to_string())
}

impl PrivvalError {
    /// Returns whether signing would have produced a double sign.
    pub fn is_safety_violation(&self) -> bool {
        matches!(
            self,
            PrivvalError::Regression { .. } | PrivvalError::Conflict { .. }
        )
    }

    /// Returns whether the validator must stop signing until an operator
    /// intervenes.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PrivvalError::Regression { .. }
                | PrivvalError::Conflict { .. }
                | PrivvalError::MissingRecord { .. }
                | PrivvalError::Persistence { .. }
                | PrivvalError::Decode { .. }
        )
    }
}
