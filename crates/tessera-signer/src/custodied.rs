//! Signer backed by a key held in the custody service.

use crate::client::CustodyClient;
use crate::credential::Credential;
use crate::error::{Result, SignerError};
use crate::signer::{Signer, SignerKind};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_crypto::{PublicKey, Signature};
use uuid::Uuid;

/// Identifies a key inside the custody service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustodyKeyRef {
    /// Custody domain (vault) holding the key.
    pub custody_domain_id: Uuid,
    /// Key identifier within the domain.
    pub key_id: Uuid,
}

impl fmt::Display for CustodyKeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.custody_domain_id, self.key_id)
    }
}

/// Signer whose secret key never leaves the custody service.
///
/// Each operation mints a fresh access token from the refresh credential.
/// The public key is cached after the first successful fetch.
pub struct CustodiedSigner {
    client: CustodyClient,
    key: CustodyKeyRef,
    refresh_token: Credential,
    public_key: RwLock<Option<PublicKey>>,
}

impl fmt::Debug for CustodiedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodiedSigner")
            .field("key", &self.key)
            .field("refresh_token", &self.refresh_token)
            .field("public_key", &*self.public_key.read())
            .finish_non_exhaustive()
    }
}

impl CustodiedSigner {
    /// Binds a signer to an existing key reference without contacting the
    /// service.
    pub fn new(client: CustodyClient, key: CustodyKeyRef, refresh_token: Credential) -> Self {
        Self {
            client,
            key,
            refresh_token,
            public_key: RwLock::new(None),
        }
    }

    /// Seeds the public key cache.
    #[must_use]
    pub fn with_public_key(self, public_key: PublicKey) -> Self {
        *self.public_key.write() = Some(public_key);
        self
    }

    /// Creates a new key in `custody_domain_id` and binds a signer to it.
    ///
    /// # Errors
    ///
    /// Fails if the token exchange or key creation fails.
    pub async fn create(
        client: CustodyClient,
        custody_domain_id: Uuid,
        refresh_token: Credential,
        name: &str,
    ) -> Result<Self> {
        let access = client.create_token(&refresh_token).await?;
        let key = client.create_key(&access, custody_domain_id, name).await?;

        tracing::info!(
            custody_domain_id = %custody_domain_id,
            key_id = %key.id,
            "Created custody key"
        );

        let signer = Self::new(
            client,
            CustodyKeyRef {
                custody_domain_id,
                key_id: key.id,
            },
            refresh_token,
        );

        match key.public_key.as_deref() {
            Some(hex) => Ok(signer.with_public_key(decode_public_key(hex)?)),
            None => Ok(signer),
        }
    }

    /// Binds a signer to an existing key, confirming it exists.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError::MissingKey`] if the service does not know the
    /// key.
    pub async fn fetch(
        client: CustodyClient,
        key: CustodyKeyRef,
        refresh_token: Credential,
    ) -> Result<Self> {
        let signer = Self::new(client, key, refresh_token);
        signer.public_key().await?;
        Ok(signer)
    }

    /// Returns the key reference.
    pub fn key_ref(&self) -> CustodyKeyRef {
        self.key
    }

    async fn access_token(&self) -> Result<Credential> {
        self.client.create_token(&self.refresh_token).await
    }
}

fn decode_public_key(hex: &str) -> Result<PublicKey> {
    PublicKey::from_hex(hex).map_err(|e| SignerError::Decode(format!("public key: {e}")))
}

#[async_trait]
impl Signer for CustodiedSigner {
    async fn public_key(&self) -> Result<PublicKey> {
        let cached = *self.public_key.read();
        if let Some(pk) = cached {
            return Ok(pk);
        }

        let access = self.access_token().await?;
        let key = self
            .client
            .fetch_key(&access, self.key.custody_domain_id, self.key.key_id)
            .await?;

        let hex = key
            .public_key
            .ok_or_else(|| SignerError::Decode("key carried no public key".to_string()))?;
        let pk = decode_public_key(&hex)?;

        tracing::debug!(key = %self.key, public_key = %pk, "Fetched custody public key");

        *self.public_key.write() = Some(pk);
        Ok(pk)
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature> {
        let access = self.access_token().await?;
        let signature_hex = self
            .client
            .sign_message(
                &access,
                self.key.custody_domain_id,
                self.key.key_id,
                &hex::encode(message),
            )
            .await?;

        tracing::debug!(key = %self.key, len = message.len(), "Custody signed message");

        Signature::from_hex(&signature_hex)
            .map_err(|e| SignerError::Decode(format!("signature: {e}")))
    }

    async fn verify(&self, message: &[u8], signature: &Signature) -> Result<bool> {
        let access = self.access_token().await?;
        self.client
            .verify_signature(
                &access,
                self.key.custody_domain_id,
                self.key.key_id,
                &hex::encode(message),
                &hex::encode(signature.as_bytes()),
            )
            .await
    }

    fn kind(&self) -> SignerKind {
        SignerKind::Custodied
    }
}
