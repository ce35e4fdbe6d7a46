//! Persisted record of the last signature.

use crate::error::{PrivvalError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tessera_core::{Hrs, SignStep};
use tessera_crypto::Signature;

/// The last slot this validator signed, with the evidence.
///
/// A freshly initialised record has no step; an absent step orders below
/// every real step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSignState {
    /// Height of the last signature.
    pub height: i64,
    /// Round of the last signature.
    pub round: i32,
    /// Step of the last signature.
    pub step: Option<SignStep>,
    /// The signature that was released.
    pub signature: Option<Signature>,
    /// Canonical bytes that were signed.
    #[serde(default, with = "hex_bytes")]
    pub signbytes: Option<Vec<u8>>,
}

impl LastSignState {
    /// Builds the record for a new signature.
    pub fn signed(hrs: Hrs, sign_bytes: &[u8], signature: Signature) -> Self {
        Self {
            height: hrs.height,
            round: hrs.round,
            step: Some(hrs.step),
            signature: Some(signature),
            signbytes: Some(sign_bytes.to_vec()),
        }
    }

    /// Returns the recorded slot, if a signature was ever recorded.
    pub fn hrs(&self) -> Option<Hrs> {
        self.step.map(|step| Hrs::new(self.height, self.round, step))
    }

    /// Reads a record from `path`.
    ///
    /// Safe to call while another process is writing: the file is only
    /// ever replaced by rename.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| PrivvalError::Persistence {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| PrivvalError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Atomically replaces the record at `path`.
    ///
    /// The record is written to a temporary file in the same directory,
    /// flushed to disk, then renamed over `path`, and the directory is
    /// synced so the rename survives a crash. Readers see either the
    /// old or the new record, never a mix.
    ///
    /// # Errors
    ///
    /// Returns [`PrivvalError::Persistence`] if any step fails; `path` is
    /// left untouched in that case.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_err = |source| PrivvalError::Persistence {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_vec_pretty(self).map_err(|e| PrivvalError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&json).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        // The rename is only durable once the directory entry is on disk.
        #[cfg(unix)]
        fs::File::open(dir)
            .and_then(|d| d.sync_all())
            .map_err(io_err)?;

        Ok(())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => s.serialize_some(&hex::encode_upper(b)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| hex::decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
