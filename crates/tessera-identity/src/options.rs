//! Custody options that drive identity creation.

use crate::error::{IdentityError, Result};
use serde::Deserialize;
use tessera_signer::{Credential, CustodyKeyRef};
use uuid::Uuid;

/// Custody settings supplied by the operator.
///
/// | refresh | domain | key id | action                 |
/// |---------|--------|--------|------------------------|
/// | -       | -      | -      | generate a local key   |
/// | yes     | yes    | -      | create a key in custody|
/// | yes     | yes    | yes    | fetch key from custody |
///
/// Every other combination is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustodyOptions {
    /// Long-lived refresh credential.
    #[serde(default)]
    pub refresh_token: Option<Credential>,
    /// Custody domain holding (or receiving) the key.
    #[serde(default)]
    pub custody_domain_id: Option<Uuid>,
    /// Existing key to bind to.
    #[serde(default)]
    pub key_id: Option<Uuid>,
}

/// What to do when no identity record exists yet.
#[derive(Debug)]
pub(crate) enum Plan {
    Generate,
    Create {
        refresh_token: Credential,
        custody_domain_id: Uuid,
    },
    Fetch {
        refresh_token: Credential,
        key: CustodyKeyRef,
    },
}

impl CustodyOptions {
    /// Options for a purely local identity.
    pub fn none() -> Self {
        Self::default()
    }

    /// Options that create a new key in `custody_domain_id`.
    pub fn create(refresh_token: Credential, custody_domain_id: Uuid) -> Self {
        Self {
            refresh_token: Some(refresh_token),
            custody_domain_id: Some(custody_domain_id),
            key_id: None,
        }
    }

    /// Options that bind to an existing custody key.
    pub fn fetch(refresh_token: Credential, key: CustodyKeyRef) -> Self {
        Self {
            refresh_token: Some(refresh_token),
            custody_domain_id: Some(key.custody_domain_id),
            key_id: Some(key.key_id),
        }
    }

    /// Returns the refresh credential, treating an empty one as absent.
    pub fn refresh_token(&self) -> Option<&Credential> {
        self.refresh_token.as_ref().filter(|t| !t.is_empty())
    }

    /// Returns whether any custody setting is present.
    pub fn is_custodied(&self) -> bool {
        self.refresh_token().is_some() || self.custody_domain_id.is_some() || self.key_id.is_some()
    }

    pub(crate) fn plan(&self) -> Result<Plan> {
        match (self.refresh_token(), self.custody_domain_id, self.key_id) {
            (None, None, None) => Ok(Plan::Generate),
            (Some(token), Some(custody_domain_id), None) => Ok(Plan::Create {
                refresh_token: token.clone(),
                custody_domain_id,
            }),
            (Some(token), Some(custody_domain_id), Some(key_id)) => Ok(Plan::Fetch {
                refresh_token: token.clone(),
                key: CustodyKeyRef {
                    custody_domain_id,
                    key_id,
                },
            }),
            (None, _, _) => Err(IdentityError::Configuration(
                "custody domain or key id given without a refresh token".to_string(),
            )),
            (Some(_), None, _) => Err(IdentityError::Configuration(
                "refresh token given without a custody domain id".to_string(),
            )),
        }
    }
}
