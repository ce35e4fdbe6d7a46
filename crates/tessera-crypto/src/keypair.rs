//! Ed25519 keypair held in process memory.

use crate::{CryptoError, PublicKey, Result, Signature};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// An Ed25519 keypair resident in this process.
///
/// The signing key is zeroized when the keypair is dropped.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a new random keypair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Creates a keypair from a secret key (32 bytes).
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is not 32 bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidSecretKey);
        }

        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(bytes);

        let signing_key = SigningKey::from_bytes(&secret);
        Ok(Self { signing_key })
    }

    /// Creates a keypair from a hex-encoded secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not 64 hex characters.
    pub fn from_secret_hex(s: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(s).map_err(|_| CryptoError::InvalidSecretKey)?);
        Self::from_secret_bytes(&bytes)
    }

    /// Returns the public key for this keypair.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Signs a message with this keypair.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        let sig = self.signing_key.sign(message);
        Signature::from_bytes(sig.to_bytes())
    }

    /// Returns the secret key bytes.
    ///
    /// # Security
    ///
    /// Handle with care. The returned buffer is zeroized on drop.
    #[must_use]
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Returns the hex-encoded secret key, zeroized on drop.
    #[must_use]
    pub fn secret_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&*self.secret_bytes()))
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.secret_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keypair_generate() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::generate();
        assert_ne!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn keypair_sign_verify() {
        let kp = Keypair::generate();
        let signature = kp.sign(b"precommit");
        assert!(kp.public_key().verify(b"precommit", &signature).is_ok());
        assert!(kp.public_key().verify(b"prevote", &signature).is_err());
    }

    #[test]
    fn keypair_signing_is_deterministic() {
        let kp = Keypair::generate();
        assert_eq!(kp.sign(b"m"), kp.sign(b"m"));
    }

    #[test]
    fn keypair_from_secret_hex() {
        let kp1 = Keypair::generate();
        let kp2 = Keypair::from_secret_hex(&kp1.secret_hex()).unwrap();
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn keypair_rejects_short_secret() {
        assert_eq!(
            Keypair::from_secret_bytes(&[0u8; 31]).unwrap_err(),
            CryptoError::InvalidSecretKey
        );
        assert!(Keypair::from_secret_hex("zz").is_err());
    }

    #[test]
    fn keypair_debug_hides_secret() {
        let kp = Keypair::generate();
        let debug = format!("{kp:?}");
        assert!(!debug.contains(kp.secret_hex().as_str()));
    }
}
