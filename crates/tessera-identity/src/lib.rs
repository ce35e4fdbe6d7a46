//! # Tessera Identity
//!
//! Stable signing identity for nodes and validators.
//!
//! An identity is created once and read on every start. Its record is a
//! small JSON file:
//!
//! ```text
//! {"type":"local","secret_key":"<hex>"}
//! {"type":"custodied","custody_domain_id":"<uuid>","key_id":"<uuid>"}
//! ```
//!
//! Custodied records only name the key; the refresh credential is supplied
//! through [`CustodyOptions`] on every start and is never written to disk.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tessera_identity::{load_or_create, CustodyOptions};
//! use tessera_signer::{CustodyClient, CustodyConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CustodyClient::new(CustodyConfig::new("https://custody.example"))?;
//! let identity = load_or_create("config/node_key.json", &CustodyOptions::none(), &client).await?;
//! println!("node id: {}", identity.node_id().await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod identity;
mod node_id;
mod options;
mod record;

pub use error::{IdentityError, Result};
pub use identity::{load_or_create, NodeIdentity};
pub use node_id::NodeId;
pub use options::CustodyOptions;
