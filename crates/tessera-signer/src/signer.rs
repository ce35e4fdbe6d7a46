//! The signing capability.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_crypto::{PublicKey, Signature};

/// Where the key material behind a signer lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignerKind {
    /// Key material is resident in this process.
    Local,
    /// Key material is held by an external custody service.
    Custodied,
}

impl fmt::Display for SignerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignerKind::Local => f.write_str("local"),
            SignerKind::Custodied => f.write_str("custodied"),
        }
    }
}

/// Trait for signing capabilities.
///
/// Implementations never retry: a failed remote call is reported once and
/// immediately.
#[async_trait]
pub trait Signer: Send + Sync + fmt::Debug {
    /// Returns the public key of the signing key.
    async fn public_key(&self) -> Result<PublicKey>;

    /// Signs `message`.
    async fn sign(&self, message: &[u8]) -> Result<Signature>;

    /// Verifies `signature` over `message`.
    ///
    /// Returns `Ok(false)` when the signature is cryptographically invalid
    /// and `Err` when verification could not be carried out.
    async fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool>;

    /// Returns where the key material lives.
    fn kind(&self) -> SignerKind;
}
