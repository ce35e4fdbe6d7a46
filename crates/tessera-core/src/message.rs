//! Votes and proposals as handed to the signer by the consensus algorithm.

use crate::error::{CoreError, Result};
use crate::hrs::{Hrs, SignStep};
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash identifying a block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId([u8; 32]);

impl BlockId {
    /// The length of a block id in bytes.
    pub const LEN: usize = 32;

    /// Creates a block id from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parses a hex-encoded block id.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| CoreError::InvalidBlockId(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::InvalidBlockId(format!("expected {} bytes", Self::LEN)))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Kind of vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    /// Prevote.
    Prevote,
    /// Precommit.
    Precommit,
}

/// A consensus vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Prevote or precommit.
    pub vote_type: VoteType,
    /// Block height.
    pub height: i64,
    /// Round within the height.
    pub round: i32,
    /// Block voted for; `None` is a nil vote.
    pub block_id: Option<BlockId>,
    /// Wall-clock time the vote was created.
    pub timestamp: Timestamp,
    /// Hex address of the voting validator. Not signed.
    pub validator_address: String,
    /// Index in the validator set. Not signed.
    pub validator_index: i32,
    /// Signature over the canonical sign bytes.
    pub signature: Option<Vec<u8>>,
}

impl Vote {
    /// Creates an unsigned nil vote.
    #[must_use]
    pub fn new(vote_type: VoteType, height: i64, round: i32, timestamp: Timestamp) -> Self {
        Self {
            vote_type,
            height,
            round,
            block_id: None,
            timestamp,
            validator_address: String::new(),
            validator_index: 0,
            signature: None,
        }
    }

    /// Sets the block voted for.
    #[must_use]
    pub fn with_block_id(mut self, block_id: BlockId) -> Self {
        self.block_id = Some(block_id);
        self
    }

    /// Returns the slot this vote occupies.
    #[must_use]
    pub fn hrs(&self) -> Hrs {
        Hrs::new(self.height, self.round, SignStep::from(self.vote_type))
    }
}

/// A block proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Block height.
    pub height: i64,
    /// Round within the height.
    pub round: i32,
    /// Proof-of-lock round, `-1` if none.
    pub pol_round: i32,
    /// Proposed block.
    pub block_id: Option<BlockId>,
    /// Wall-clock time the proposal was created.
    pub timestamp: Timestamp,
    /// Signature over the canonical sign bytes.
    pub signature: Option<Vec<u8>>,
}

impl Proposal {
    /// Creates an unsigned proposal without a proof-of-lock round.
    #[must_use]
    pub fn new(height: i64, round: i32, block_id: BlockId, timestamp: Timestamp) -> Self {
        Self {
            height,
            round,
            pol_round: -1,
            block_id: Some(block_id),
            timestamp,
            signature: None,
        }
    }

    /// Returns the slot this proposal occupies. Proposals always sign at
    /// [`SignStep::Propose`].
    #[must_use]
    pub fn hrs(&self) -> Hrs {
        Hrs::new(self.height, self.round, SignStep::Propose)
    }
}
