//! Bearer credentials for the custody service.

use serde::{Deserialize, Deserializer};
use std::fmt;
use zeroize::Zeroizing;

/// A refresh or access token.
///
/// This type ensures that credentials are:
/// - Not logged via Debug or Display
/// - Zeroized on drop
/// - Never serialized
#[derive(Clone)]
pub struct Credential {
    inner: Zeroizing<String>,
}

impl Credential {
    /// Wraps a credential value.
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(s.into()),
        }
    }

    /// Exposes the credential value.
    ///
    /// Use this only to build the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Returns whether the credential is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.inner.as_bytes(), other.inner.as_bytes())
    }
}

impl Eq for Credential {}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_redaction() {
        let token = Credential::new("refresh-abc123");
        assert!(!format!("{token:?}").contains("abc123"));
        assert!(!format!("{token}").contains("abc123"));
        assert_eq!(token.expose(), "refresh-abc123");
    }

    #[test]
    fn test_credential_equality() {
        assert_eq!(Credential::new("a"), Credential::new("a"));
        assert_ne!(Credential::new("a"), Credential::new("b"));
        assert_ne!(Credential::new("a"), Credential::new("ab"));
    }

    #[test]
    fn test_credential_deserialize() {
        let token: Credential = serde_json::from_str("\"xyz\"").unwrap();
        assert_eq!(token.bearer(), "Bearer xyz");
    }
}
