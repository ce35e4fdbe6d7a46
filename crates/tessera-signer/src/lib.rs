//! # Tessera Signer
//!
//! The signing capability consumed by validators and nodes.
//!
//! A [`Signer`] derives its public key, signs messages and verifies
//! signatures. Two implementations exist, selected when the key handle is
//! constructed:
//!
//! - [`LocalSigner`]: key material resident in this process, no I/O
//! - [`CustodiedSigner`]: key material held by an external custody service,
//!   reached over HTTP with short-lived access tokens minted from a
//!   long-lived refresh credential
//!
//! [`PrivateKeyHandle`] is the tagged variant over both and itself
//! implements [`Signer`].
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────────────────────────┐
//! │ PrivateKeyHandle │─────▶│ LocalSigner (Keypair, zeroized)      │
//! │   (Signer)       │      └──────────────────────────────────────┘
//! │                  │      ┌──────────────────────────────────────┐
//! │                  │─────▶│ CustodiedSigner                      │
//! └──────────────────┘      │  refresh ─▶ CreateToken ─▶ access    │
//!                           │  access  ─▶ FetchKey / Sign / Verify │
//!                           └──────────────┬───────────────────────┘
//!                                          ▼
//!                           ┌──────────────────────────────────────┐
//!                           │ CustodyClient (reqwest, deadline,    │
//!                           │   cancellation)                      │
//!                           └──────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use tessera_signer::{LocalSigner, Signer};
//!
//! # async fn demo() -> tessera_signer::Result<()> {
//! let signer = LocalSigner::generate();
//! let signature = signer.sign(b"precommit").await?;
//! assert!(signer.verify(b"precommit", &signature).await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod credential;
mod custodied;
mod error;
mod handle;
mod local;
mod signer;

pub use client::{CustodyClient, CustodyConfig, CustodyKey, DEFAULT_REQUEST_TIMEOUT_MS};
pub use credential::Credential;
pub use custodied::{CustodiedSigner, CustodyKeyRef};
pub use error::{Result, SignerError};
pub use handle::PrivateKeyHandle;
pub use local::LocalSigner;
pub use signer::{Signer, SignerKind};

pub use tokio_util::sync::CancellationToken;
