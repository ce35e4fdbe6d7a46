//! Signer backed by an in-process keypair.

use crate::error::Result;
use crate::signer::{Signer, SignerKind};
use async_trait::async_trait;
use tessera_crypto::{Keypair, PublicKey, Signature};

/// Signer whose secret key lives in this process.
///
/// Pure cryptographic operations; no I/O and no failure modes beyond
/// invalid input.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    keypair: Keypair,
}

impl LocalSigner {
    /// Wraps an existing keypair.
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self::new(Keypair::generate())
    }

    /// Returns the underlying keypair.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn public_key(&self) -> Result<PublicKey> {
        Ok(self.keypair.public_key())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        Ok(self.keypair.sign(message))
    }

    async fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        Ok(self.keypair.public_key().verify(message, signature).is_ok())
    }

    fn kind(&self) -> SignerKind {
        SignerKind::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_sign_verify() {
        let signer = LocalSigner::generate();
        let sig = signer.sign(b"prevote").await.unwrap();
        assert!(signer.verify(b"prevote", &sig).await.unwrap());
        assert!(!signer.verify(b"precommit", &sig).await.unwrap());
    }

    #[tokio::test]
    async fn test_local_public_key_matches_keypair() {
        let keypair = Keypair::generate();
        let expected = keypair.public_key();
        let signer = LocalSigner::new(keypair);
        assert_eq!(signer.public_key().await.unwrap(), expected);
        assert_eq!(signer.kind(), SignerKind::Local);
    }

    #[tokio::test]
    async fn test_local_signing_is_deterministic() {
        let signer = LocalSigner::generate();
        let a = signer.sign(b"m").await.unwrap();
        let b = signer.sign(b"m").await.unwrap();
        assert_eq!(a, b);
    }
}
