//! Double-sign prevention.
//!
//! The guard owns the persisted [`LastSignState`] and decides, for every
//! signing request, whether a new signature may be produced, the previous
//! one must be reused, or the request must be refused.
//!
//! ```text
//! request (h, r, s, bytes)
//!        │
//!        ▼
//!   compare with last ──── before last ──────▶ Regression
//!        │
//!        ├─ after last ───────────────────────▶ Proceed
//!        │
//!        └─ same slot ─┬─ identical bytes ────▶ Reuse(sig)
//!                      ├─ timestamp differs ──▶ Reuse(sig, last ts)
//!                      ├─ other difference ───▶ Conflict
//!                      └─ evidence missing ───▶ MissingRecord
//! ```

use crate::error::{PrivvalError, Result};
use crate::state::LastSignState;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tessera_core::{only_differ_by_timestamp, Hrs, Timestamp};
use tessera_crypto::Signature;

/// Outcome of [`SignGuard::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A new signature may be produced.
    Proceed,
    /// The slot was already signed over equivalent bytes.
    Reuse {
        /// Previously released signature.
        signature: Signature,
        /// Timestamp to substitute into the outgoing message, when the
        /// request differed only there.
        timestamp: Option<Timestamp>,
    },
}

/// Single-writer owner of the sign state file.
#[derive(Debug)]
pub struct SignGuard {
    state: LastSignState,
    path: PathBuf,
}

impl SignGuard {
    /// Creates a guard over an in-memory state persisted at `path`.
    pub fn new(path: impl Into<PathBuf>, state: LastSignState) -> Self {
        Self {
            state,
            path: path.into(),
        }
    }

    /// Loads the sign state at `path`, initialising an empty one if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file is malformed or a new one
    /// cannot be written.
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let state = LastSignState::load(path)?;
            tracing::debug!(
                path = %path.display(),
                height = state.height,
                round = state.round,
                "Loaded sign state"
            );
            return Ok(Self::new(path, state));
        }

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| PrivvalError::Persistence {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let state = LastSignState::default();
        state.save(path)?;
        tracing::info!(path = %path.display(), "Initialised empty sign state");

        Ok(Self::new(path, state))
    }

    /// Returns the current state.
    pub fn state(&self) -> &LastSignState {
        &self.state
    }

    /// Returns the state file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decides whether `sign_bytes` may be signed at `hrs`.
    ///
    /// # Errors
    ///
    /// - [`PrivvalError::Regression`] if `hrs` precedes the last signed slot
    /// - [`PrivvalError::Conflict`] if the slot was signed over different
    ///   data
    /// - [`PrivvalError::MissingRecord`] if the slot was signed but the
    ///   state lacks the bytes or the signature
    pub fn check(&self, hrs: Hrs, sign_bytes: &[u8]) -> Result<Decision> {
        let last = &self.state;

        let order = hrs
            .height
            .cmp(&last.height)
            .then(hrs.round.cmp(&last.round))
            .then_with(|| Some(hrs.step).cmp(&last.step));

        let decision = match order {
            Ordering::Less => {
                tracing::warn!(requested = %hrs, "Refusing to sign: regression");
                return Err(PrivvalError::Regression {
                    requested: hrs,
                    last_height: last.height,
                    last_round: last.round,
                    last_step: last.step,
                });
            }
            Ordering::Greater => Decision::Proceed,
            Ordering::Equal => self.same_slot(hrs, sign_bytes)?,
        };

        tracing::debug!(hrs = %hrs, decision = ?decision, "Sign guard decision");
        Ok(decision)
    }

    fn same_slot(&self, hrs: Hrs, sign_bytes: &[u8]) -> Result<Decision> {
        let Some(last_bytes) = self.state.signbytes.as_deref() else {
            tracing::error!(hrs = %hrs, "Sign state has no sign bytes for signed slot");
            return Err(PrivvalError::MissingRecord {
                hrs,
                reason: "no sign bytes recorded",
            });
        };
        let Some(signature) = self.state.signature else {
            tracing::error!(hrs = %hrs, "Sign state has sign bytes but no signature");
            return Err(PrivvalError::MissingRecord {
                hrs,
                reason: "sign bytes recorded without a signature",
            });
        };

        if last_bytes == sign_bytes {
            return Ok(Decision::Reuse {
                signature,
                timestamp: None,
            });
        }

        if let Some(timestamp) = only_differ_by_timestamp(last_bytes, sign_bytes) {
            return Ok(Decision::Reuse {
                signature,
                timestamp: Some(timestamp),
            });
        }

        tracing::warn!(hrs = %hrs, "Refusing to sign: conflicting data");
        Err(PrivvalError::Conflict { hrs })
    }

    /// Durably records a new signature.
    ///
    /// The state file is replaced before the in-memory state changes; the
    /// caller must only release `signature` if this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`PrivvalError::Persistence`] if the state cannot be written;
    /// the guard is unchanged in that case.
    pub fn record(&mut self, hrs: Hrs, sign_bytes: &[u8], signature: Signature) -> Result<()> {
        let next = LastSignState::signed(hrs, sign_bytes, signature);

        if let Err(e) = next.save(&self.path) {
            tracing::error!(hrs = %hrs, path = %self.path.display(), error = %e, "Failed to persist sign state");
            return Err(e);
        }

        self.state = next;
        tracing::debug!(hrs = %hrs, "Recorded signature");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::SignStep;
    use tessera_crypto::Keypair;

    fn guard_at(dir: &Path) -> SignGuard {
        SignGuard::load_or_create(dir.join("validator-state.json")).unwrap()
    }

    #[test]
    fn test_empty_state_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let guard = guard_at(dir.path());
        assert_eq!(
            guard.check(Hrs::new(0, 0, SignStep::Propose), b"x").unwrap(),
            Decision::Proceed
        );
    }

    #[test]
    fn test_missing_signature_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let hrs = Hrs::new(3, 0, SignStep::Prevote);
        let guard = SignGuard::new(
            dir.path().join("s.json"),
            LastSignState {
                height: 3,
                round: 0,
                step: Some(SignStep::Prevote),
                signature: None,
                signbytes: Some(b"bytes".to_vec()),
            },
        );

        let err = guard.check(hrs, b"bytes").unwrap_err();
        assert!(matches!(err, PrivvalError::MissingRecord { .. }));
    }

    #[test]
    fn test_missing_sign_bytes_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let hrs = Hrs::new(3, 0, SignStep::Prevote);
        let guard = SignGuard::new(
            dir.path().join("s.json"),
            LastSignState {
                height: 3,
                round: 0,
                step: Some(SignStep::Prevote),
                signature: Some(Keypair::generate().sign(b"bytes")),
                signbytes: None,
            },
        );

        let err = guard.check(hrs, b"bytes").unwrap_err();
        assert!(matches!(err, PrivvalError::MissingRecord { .. }));
    }

    #[test]
    fn test_record_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let hrs = Hrs::new(9, 2, SignStep::Precommit);
        let signature = Keypair::generate().sign(b"bytes");

        let mut guard = guard_at(dir.path());
        guard.record(hrs, b"bytes", signature).unwrap();

        let reloaded = guard_at(dir.path());
        assert_eq!(reloaded.state(), guard.state());
        assert_eq!(
            reloaded.check(hrs, b"bytes").unwrap(),
            Decision::Reuse {
                signature,
                timestamp: None
            }
        );
    }
}
