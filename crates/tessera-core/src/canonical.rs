//! Canonical sign bytes.
//!
//! Every signed message starts with the same fixed header so that the
//! timestamp always sits at [`TIMESTAMP_RANGE`]:
//!
//! ```text
//! offset  len  field
//!      0    1  message type (prevote 0x01, precommit 0x02, proposal 0x20)
//!      1    8  height, i64 big-endian
//!      9    4  round, i32 big-endian
//!     13    8  timestamp, i64 millis big-endian
//!     21    …  body (proposal: pol_round i32 BE), block id, chain id
//! ```
//!
//! The block id is one presence byte followed by 32 bytes (zeroed for nil).
//! The chain id is a u64 big-endian length followed by all of its UTF-8
//! bytes.

use crate::error::{CoreError, Result};
use crate::message::{BlockId, Proposal, Vote, VoteType};
use crate::timestamp::Timestamp;
use std::ops::Range;

const PREVOTE_TYPE: u8 = 0x01;
const PRECOMMIT_TYPE: u8 = 0x02;
const PROPOSAL_TYPE: u8 = 0x20;

/// Position of the timestamp inside every canonical encoding.
pub const TIMESTAMP_RANGE: Range<usize> = 13..21;

fn header(buf: &mut Vec<u8>, msg_type: u8, height: i64, round: i32, timestamp: Timestamp) {
    buf.push(msg_type);
    buf.extend_from_slice(&height.to_be_bytes());
    buf.extend_from_slice(&round.to_be_bytes());
    buf.extend_from_slice(&timestamp.to_be_bytes());
}

fn block_id(buf: &mut Vec<u8>, block_id: Option<&BlockId>) {
    match block_id {
        Some(id) => {
            buf.push(1);
            buf.extend_from_slice(id.as_bytes());
        }
        None => {
            buf.push(0);
            buf.extend_from_slice(&[0u8; BlockId::LEN]);
        }
    }
}

const CHAIN_ID_LEN_PREFIX: usize = 8;

fn chain_id(buf: &mut Vec<u8>, chain_id: &str) {
    let bytes = chain_id.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// Returns the canonical bytes a validator signs for `vote` on `chain`.
#[must_use]
pub fn vote_sign_bytes(chain: &str, vote: &Vote) -> Vec<u8> {
    let msg_type = match vote.vote_type {
        VoteType::Prevote => PREVOTE_TYPE,
        VoteType::Precommit => PRECOMMIT_TYPE,
    };
    let mut buf = Vec::with_capacity(
        TIMESTAMP_RANGE.end + 1 + BlockId::LEN + CHAIN_ID_LEN_PREFIX + chain.len(),
    );
    header(&mut buf, msg_type, vote.height, vote.round, vote.timestamp);
    block_id(&mut buf, vote.block_id.as_ref());
    chain_id(&mut buf, chain);
    buf
}

/// Returns the canonical bytes a validator signs for `proposal` on `chain`.
#[must_use]
pub fn proposal_sign_bytes(chain: &str, proposal: &Proposal) -> Vec<u8> {
    let mut buf = Vec::with_capacity(
        TIMESTAMP_RANGE.end + 4 + 1 + BlockId::LEN + CHAIN_ID_LEN_PREFIX + chain.len(),
    );
    header(
        &mut buf,
        PROPOSAL_TYPE,
        proposal.height,
        proposal.round,
        proposal.timestamp,
    );
    buf.extend_from_slice(&proposal.pol_round.to_be_bytes());
    block_id(&mut buf, proposal.block_id.as_ref());
    chain_id(&mut buf, chain);
    buf
}

/// Extracts the timestamp embedded in a canonical encoding.
///
/// # Errors
///
/// Returns [`CoreError::Truncated`] if the encoding is shorter than the
/// fixed header.
pub fn timestamp_of(sign_bytes: &[u8]) -> Result<Timestamp> {
    let field = sign_bytes
        .get(TIMESTAMP_RANGE)
        .ok_or(CoreError::Truncated {
            need: TIMESTAMP_RANGE.end,
            got: sign_bytes.len(),
        })?;
    let mut arr = [0u8; 8];
    arr.copy_from_slice(field);
    Ok(Timestamp::from_be_bytes(arr))
}

/// Checks whether two canonical encodings are identical except for the
/// timestamp field.
///
/// Returns the timestamp carried by `last` when every byte outside
/// [`TIMESTAMP_RANGE`] matches. Any other difference, including a length
/// difference, yields `None`.
#[must_use]
pub fn only_differ_by_timestamp(last: &[u8], new: &[u8]) -> Option<Timestamp> {
    if last.len() != new.len() || last.len() < TIMESTAMP_RANGE.end {
        return None;
    }
    let (start, end) = (TIMESTAMP_RANGE.start, TIMESTAMP_RANGE.end);
    if last[..start] != new[..start] || last[end..] != new[end..] {
        return None;
    }
    timestamp_of(last).ok()
}
