//! Node identity: a key handle bound to a persisted record.

use crate::error::{IdentityError, Result};
use crate::node_id::NodeId;
use crate::options::{CustodyOptions, Plan};
use crate::record::IdentityRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tessera_crypto::{Address, Keypair, PublicKey};
use tessera_signer::{
    CustodiedSigner, CustodyClient, CustodyKeyRef, LocalSigner, PrivateKeyHandle, Signer,
    SignerKind,
};

/// Name given to keys created in custody.
const CUSTODY_KEY_NAME: &str = "tessera-node-key";

/// A node's signing identity.
///
/// Cheap to clone; clones share the key handle.
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    handle: Arc<PrivateKeyHandle>,
    path: PathBuf,
}

impl NodeIdentity {
    /// Returns the public key.
    ///
    /// For custodied keys the first call contacts the custody service.
    ///
    /// # Errors
    ///
    /// Custody failures are returned as-is; there is no fallback value.
    pub async fn public_key(&self) -> Result<PublicKey> {
        Ok(self.handle.public_key().await?)
    }

    /// Returns the address derived from the public key.
    pub async fn address(&self) -> Result<Address> {
        Ok(self.public_key().await?.address())
    }

    /// Returns the peer identifier derived from the public key.
    pub async fn node_id(&self) -> Result<NodeId> {
        Ok(NodeId::from(self.address().await?))
    }

    /// Returns the signing capability.
    pub fn signer(&self) -> Arc<dyn Signer> {
        self.handle.clone()
    }

    /// Returns the key handle.
    pub fn handle(&self) -> &PrivateKeyHandle {
        &self.handle
    }

    /// Returns where the key material lives.
    pub fn kind(&self) -> SignerKind {
        self.handle.kind()
    }

    /// Returns the custody reference for custodied identities.
    pub fn custody_ref(&self) -> Option<CustodyKeyRef> {
        self.handle.custody_ref()
    }

    /// Returns the record location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn new(handle: PrivateKeyHandle, path: &Path) -> Self {
        Self {
            handle: Arc::new(handle),
            path: path.to_path_buf(),
        }
    }
}

/// Loads the identity stored at `path`, or creates one there.
///
/// An existing record always wins: a local record is decoded in place, a
/// custodied record is bound to the refresh credential from `options`
/// without contacting the service. Without a record, `options` decides
/// between generating a local key, creating one in custody, or binding to
/// an existing custody key; the result is persisted before returning.
///
/// # Errors
///
/// - [`IdentityError::Configuration`] for unusable option combinations, a
///   custodied record without a refresh credential, or options naming a
///   different custody key than the record
/// - [`IdentityError::Signer`] for custody failures, including
///   `MissingKey` when binding to an unknown key
/// - [`IdentityError::Io`] / [`IdentityError::Decode`] for record problems
/// - [`IdentityError::UnrecordedKey`] if a key was created in custody but
///   its record could not be written; the error carries the key reference
pub async fn load_or_create(
    path: impl AsRef<Path>,
    options: &CustodyOptions,
    client: &CustodyClient,
) -> Result<NodeIdentity> {
    let path = path.as_ref();

    if path.exists() {
        let record = IdentityRecord::load(path)?;
        let handle = bind(&record, path, options, client)?;
        tracing::debug!(path = %path.display(), kind = %handle.kind(), "Loaded identity");
        return Ok(NodeIdentity::new(handle, path));
    }

    let (handle, record, created) = match options.plan()? {
        Plan::Generate => {
            let keypair = Keypair::generate();
            let record = IdentityRecord::local(&keypair);
            (PrivateKeyHandle::from(LocalSigner::new(keypair)), record, None)
        }
        Plan::Create {
            refresh_token,
            custody_domain_id,
        } => {
            let signer = CustodiedSigner::create(
                client.clone(),
                custody_domain_id,
                refresh_token,
                CUSTODY_KEY_NAME,
            )
            .await?;
            let key = signer.key_ref();
            (
                PrivateKeyHandle::from(signer),
                IdentityRecord::custodied(key),
                Some(key),
            )
        }
        Plan::Fetch { refresh_token, key } => {
            let signer = CustodiedSigner::fetch(client.clone(), key, refresh_token).await?;
            (
                PrivateKeyHandle::from(signer),
                IdentityRecord::custodied(key),
                None,
            )
        }
    };

    record.create(path).map_err(|source| match created {
        Some(key) => {
            tracing::error!(
                path = %path.display(),
                custody_domain_id = %key.custody_domain_id,
                key_id = %key.key_id,
                error = %source,
                "Custody key created but identity record not written"
            );
            IdentityError::UnrecordedKey {
                key,
                path: path.to_path_buf(),
                source: Box::new(source),
            }
        }
        None => source,
    })?;
    tracing::info!(path = %path.display(), kind = %handle.kind(), "Created identity");

    Ok(NodeIdentity::new(handle, path))
}

fn bind(
    record: &IdentityRecord,
    path: &Path,
    options: &CustodyOptions,
    client: &CustodyClient,
) -> Result<PrivateKeyHandle> {
    match record {
        IdentityRecord::Local { secret_key } => {
            if options.is_custodied() {
                tracing::warn!(
                    path = %path.display(),
                    "Custody options ignored: identity record holds a local key"
                );
            }
            let keypair =
                Keypair::from_secret_hex(secret_key).map_err(|e| IdentityError::Decode {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            Ok(LocalSigner::new(keypair).into())
        }
        IdentityRecord::Custodied {
            custody_domain_id,
            key_id,
        } => {
            let key = CustodyKeyRef {
                custody_domain_id: *custody_domain_id,
                key_id: *key_id,
            };

            if options.custody_domain_id.is_some_and(|d| d != key.custody_domain_id)
                || options.key_id.is_some_and(|k| k != key.key_id)
            {
                return Err(IdentityError::Configuration(format!(
                    "identity record holds custody key {key}, options name a different key"
                )));
            }

            let refresh_token = options.refresh_token().cloned().ok_or_else(|| {
                IdentityError::Configuration(format!(
                    "identity record holds custody key {key} but no refresh token was supplied"
                ))
            })?;

            Ok(CustodiedSigner::new(client.clone(), key, refresh_token).into())
        }
    }
}
