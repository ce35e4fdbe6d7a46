//! # Tessera Privval
//!
//! Validator signing with double-sign prevention.
//!
//! A [`Validator`] pairs a [`Signer`](tessera_signer::Signer) with a
//! [`SignGuard`]. Before any signature is produced the guard compares the
//! requested height/round/step with the last signed one; after a new
//! signature is produced the guard durably records it before it is handed
//! back to consensus.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tessera_core::{BlockId, Timestamp, Vote, VoteType};
//! use tessera_identity::CustodyOptions;
//! use tessera_privval::Validator;
//! use tessera_signer::{CustodyClient, CustodyConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CustodyClient::new(CustodyConfig::new("https://custody.example"))?;
//! let mut validator =
//!     Validator::load_or_create("data/privval", &CustodyOptions::none(), &client).await?;
//!
//! let mut vote = Vote::new(VoteType::Prevote, 1, 0, Timestamp::now())
//!     .with_block_id(BlockId::from_bytes([1; 32]));
//! validator.sign_vote("tessera-1", &mut vote).await?;
//! assert!(vote.signature.is_some());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod guard;
mod state;
mod validator;

pub use error::{PrivvalError, Result};
pub use guard::{Decision, SignGuard};
pub use state::LastSignState;
pub use validator::{Validator, KEY_FILE, STATE_FILE};
