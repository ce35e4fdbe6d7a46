//! Tagged key handle over both signer kinds.

use crate::custodied::{CustodiedSigner, CustodyKeyRef};
use crate::error::Result;
use crate::local::LocalSigner;
use crate::signer::{Signer, SignerKind};
use async_trait::async_trait;
use tessera_crypto::{PublicKey, Signature};

/// A private key, either resident or held in custody.
#[derive(Debug)]
pub enum PrivateKeyHandle {
    /// In-process key.
    Local(LocalSigner),
    /// Custody-held key.
    Custodied(CustodiedSigner),
}

impl PrivateKeyHandle {
    /// Returns the custody reference, if this is a custodied key.
    pub fn custody_ref(&self) -> Option<CustodyKeyRef> {
        match self {
            PrivateKeyHandle::Local(_) => None,
            PrivateKeyHandle::Custodied(signer) => Some(signer.key_ref()),
        }
    }

    fn inner(&self) -> &dyn Signer {
        match self {
            PrivateKeyHandle::Local(signer) => signer,
            PrivateKeyHandle::Custodied(signer) => signer,
        }
    }
}

impl From<LocalSigner> for PrivateKeyHandle {
    fn from(signer: LocalSigner) -> Self {
        PrivateKeyHandle::Local(signer)
    }
}

impl From<CustodiedSigner> for PrivateKeyHandle {
    fn from(signer: CustodiedSigner) -> Self {
        PrivateKeyHandle::Custodied(signer)
    }
}

#[async_trait]
impl Signer for PrivateKeyHandle {
    async fn public_key(&self) -> Result<PublicKey> {
        self.inner().public_key().await
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        self.inner().sign(message).await
    }

    async fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        self.inner().verify(message, signature).await
    }

    fn kind(&self) -> SignerKind {
        self.inner().kind()
    }
}
