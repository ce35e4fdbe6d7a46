//! # Tessera Crypto
//!
//! Ed25519 key material for validators and nodes.
//!
//! ## Example
//!
//! ```rust
//! use tessera_crypto::Keypair;
//!
//! let keypair = Keypair::generate();
//! let signature = keypair.sign(b"vote");
//! assert!(keypair.public_key().verify(b"vote", &signature).is_ok());
//!
//! // The address is a pure function of the public key.
//! assert_eq!(keypair.public_key().address(), keypair.public_key().address());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod error;
mod keypair;
mod public_key;
mod signature;

pub use address::Address;
pub use error::{CryptoError, Result};
pub use keypair::Keypair;
pub use public_key::PublicKey;
pub use signature::Signature;
