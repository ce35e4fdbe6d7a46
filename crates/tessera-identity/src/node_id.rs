//! Peer identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use tessera_crypto::{Address, PublicKey};

/// Lowercase hex encoding of a node's [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Derives the identifier of `public_key`.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::from(public_key.address())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Address> for NodeId {
    fn from(address: Address) -> Self {
        Self(hex::encode(address.as_bytes()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
