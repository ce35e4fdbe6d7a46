//! Double-sign protected validator.

use crate::error::Result;
use crate::guard::{Decision, SignGuard};
use std::path::Path;
use std::sync::Arc;
use tessera_core::{proposal_sign_bytes, vote_sign_bytes, Hrs, Proposal, Timestamp, Vote};
use tessera_crypto::{Address, PublicKey, Signature};
use tessera_identity::{load_or_create, CustodyOptions};
use tessera_signer::{CustodyClient, Signer};

/// Key record file name under the validator root.
pub const KEY_FILE: &str = "validator.json";

/// Sign state file name under the validator root.
pub const STATE_FILE: &str = "validator-state.json";

/// A validator that signs votes and proposals at most once per slot.
#[derive(Debug)]
pub struct Validator {
    signer: Arc<dyn Signer>,
    guard: SignGuard,
}

impl Validator {
    /// Creates a validator from a signer and its guard.
    pub fn new(signer: Arc<dyn Signer>, guard: SignGuard) -> Self {
        Self { signer, guard }
    }

    /// Loads or creates the validator stored under `root`.
    ///
    /// The key record lives at `root/validator.json` and the sign state at
    /// `root/validator-state.json`; a missing sign state starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be loaded or created.
    pub async fn load_or_create(
        root: impl AsRef<Path>,
        options: &CustodyOptions,
        client: &CustodyClient,
    ) -> Result<Self> {
        let root = root.as_ref();
        let identity = load_or_create(root.join(KEY_FILE), options, client).await?;
        let guard = SignGuard::load_or_create(root.join(STATE_FILE))?;

        tracing::info!(
            root = %root.display(),
            kind = %identity.kind(),
            height = guard.state().height,
            "Validator ready"
        );

        Ok(Self::new(identity.signer(), guard))
    }

    /// Returns the public key.
    ///
    /// # Errors
    ///
    /// Custody failures are returned as-is.
    pub async fn public_key(&self) -> Result<PublicKey> {
        Ok(self.signer.public_key().await?)
    }

    /// Returns the validator address.
    pub async fn address(&self) -> Result<Address> {
        Ok(self.public_key().await?.address())
    }

    /// Returns the guard.
    pub fn guard(&self) -> &SignGuard {
        &self.guard
    }

    /// Returns the signer.
    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    /// Signs `vote` for `chain_id`, setting its signature.
    ///
    /// If the slot was already signed over the same vote, the earlier
    /// signature is reused; if only the timestamp differs, the earlier
    /// timestamp is also restored on `vote`.
    ///
    /// # Errors
    ///
    /// Refusals from the guard and signer failures propagate unchanged;
    /// `vote` is not modified on error.
    pub async fn sign_vote(&mut self, chain_id: &str, vote: &mut Vote) -> Result<()> {
        let (signature, timestamp) = self
            .sign_slot(vote.hrs(), vote_sign_bytes(chain_id, vote))
            .await?;

        if let Some(timestamp) = timestamp {
            vote.timestamp = timestamp;
        }
        vote.signature = Some(signature.to_vec());
        Ok(())
    }

    /// Signs `proposal` for `chain_id`, setting its signature.
    ///
    /// Same reuse rules as [`Validator::sign_vote`].
    pub async fn sign_proposal(&mut self, chain_id: &str, proposal: &mut Proposal) -> Result<()> {
        let (signature, timestamp) = self
            .sign_slot(proposal.hrs(), proposal_sign_bytes(chain_id, proposal))
            .await?;

        if let Some(timestamp) = timestamp {
            proposal.timestamp = timestamp;
        }
        proposal.signature = Some(signature.to_vec());
        Ok(())
    }

    async fn sign_slot(
        &mut self,
        hrs: Hrs,
        sign_bytes: Vec<u8>,
    ) -> Result<(Signature, Option<Timestamp>)> {
        match self.guard.check(hrs, &sign_bytes)? {
            Decision::Reuse {
                signature,
                timestamp,
            } => Ok((signature, timestamp)),
            Decision::Proceed => {
                let signature = self.signer.sign(&sign_bytes).await?;
                self.guard.record(hrs, &sign_bytes, signature)?;
                Ok((signature, None))
            }
        }
    }
}
