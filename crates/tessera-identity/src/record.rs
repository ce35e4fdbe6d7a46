//! On-disk identity record.

use crate::error::{IdentityError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tessera_crypto::Keypair;
use tessera_signer::CustodyKeyRef;
use uuid::Uuid;
use zeroize::Zeroize;

/// Persisted identity. Custodied records never carry the refresh credential.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum IdentityRecord {
    Local {
        secret_key: String,
    },
    Custodied {
        custody_domain_id: Uuid,
        key_id: Uuid,
    },
}

impl Drop for IdentityRecord {
    fn drop(&mut self) {
        if let IdentityRecord::Local { secret_key } = self {
            secret_key.zeroize();
        }
    }
}

impl IdentityRecord {
    pub(crate) fn local(keypair: &Keypair) -> Self {
        IdentityRecord::Local {
            secret_key: keypair.secret_hex().to_string(),
        }
    }

    pub(crate) fn custodied(key: CustodyKeyRef) -> Self {
        IdentityRecord::Custodied {
            custody_domain_id: key.custody_domain_id,
            key_id: key.key_id,
        }
    }

    pub(crate) fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| IdentityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| IdentityError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Writes the record to `path` with owner-only permissions.
    ///
    /// Fails if a record already exists there.
    pub(crate) fn create(&self, path: &Path) -> Result<()> {
        let io_err = |source| IdentityError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut json = serde_json::to_vec_pretty(self).map_err(|e| IdentityError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        let written = tmp.write_all(&json).and_then(|()| tmp.as_file().sync_all());
        json.zeroize();
        written.map_err(io_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }

        tmp.persist_noclobber(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}
