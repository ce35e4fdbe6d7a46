//! Height/round/step slots.
//!
//! Exactly one message may be signed per [`Hrs`]. Slots are totally ordered
//! lexicographically by `(height, round, step)`.

use crate::error::CoreError;
use crate::message::VoteType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The step within a round at which a message is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SignStep {
    /// Block proposal.
    Propose = 1,
    /// First voting step.
    Prevote = 2,
    /// Second voting step.
    Precommit = 3,
}

impl SignStep {
    /// Returns the persisted integer value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<SignStep> for u8 {
    fn from(step: SignStep) -> Self {
        step.as_u8()
    }
}

impl TryFrom<u8> for SignStep {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Propose),
            2 => Ok(Self::Prevote),
            3 => Ok(Self::Precommit),
            other => Err(CoreError::InvalidStep(other)),
        }
    }
}

impl From<VoteType> for SignStep {
    fn from(vote_type: VoteType) -> Self {
        match vote_type {
            VoteType::Prevote => Self::Prevote,
            VoteType::Precommit => Self::Precommit,
        }
    }
}

impl fmt::Display for SignStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Propose => "propose",
            Self::Prevote => "prevote",
            Self::Precommit => "precommit",
        };
        f.write_str(name)
    }
}

/// A (height, round, step) slot.
///
/// Field order matters: the derived `Ord` is the lexicographic order used
/// for regression checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hrs {
    /// Block height.
    pub height: i64,
    /// Round within the height.
    pub round: i32,
    /// Step within the round.
    pub step: SignStep,
}

impl Hrs {
    /// Creates a new slot.
    #[must_use]
    pub const fn new(height: i64, round: i32, step: SignStep) -> Self {
        Self {
            height,
            round,
            step,
        }
    }
}

impl fmt::Display for Hrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.height, self.round, self.step)
    }
}
