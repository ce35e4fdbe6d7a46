//! # Tessera Core
//!
//! Consensus message types and the canonical byte encodings that validators
//! sign.
//!
//! This crate is the boundary between the consensus algorithm and the
//! signing subsystem. It owns:
//!
//! - [`Vote`] and [`Proposal`], the two messages a validator signs
//! - [`SignStep`] and [`Hrs`], the totally ordered (height, round, step) slot
//! - [`vote_sign_bytes`] and [`proposal_sign_bytes`], pure canonical encodings
//! - [`only_differ_by_timestamp`], the byte-level comparison used to recognise
//!   a re-sign of the same logical message at a later wall-clock instant
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{vote_sign_bytes, Timestamp, Vote, VoteType};
//!
//! let vote = Vote::new(VoteType::Precommit, 10, 0, Timestamp::from_millis(1_000));
//! let bytes = vote_sign_bytes("test-chain", &vote);
//! assert_eq!(bytes[0], 0x02);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod canonical;
pub mod error;
pub mod hrs;
pub mod message;
pub mod timestamp;

pub use canonical::{
    only_differ_by_timestamp, proposal_sign_bytes, timestamp_of, vote_sign_bytes,
    TIMESTAMP_RANGE,
};
pub use error::{CoreError, Result};
pub use hrs::{Hrs, SignStep};
pub use message::{BlockId, Proposal, Vote, VoteType};
pub use timestamp::Timestamp;
