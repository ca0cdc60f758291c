use tally_types::{Address, Amount, Timestamp};
use thiserror::Error;

use crate::proposal::ProposalId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("invalid token {0}")]
    InvalidToken(Address),

    #[error("quorum percent {0} outside 1..=100")]
    InvalidQuorum(u64),

    #[error("invalid voting duration {0}s")]
    InvalidDuration(u64),

    #[error("{0} holds none of the proposal token")]
    NotATokenHolder(Address),

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("voting on proposal {id} closed at {end_time}")]
    VotingClosed { id: ProposalId, end_time: Timestamp },

    #[error("voting on proposal {id} runs until {end_time}")]
    VotingNotEnded { id: ProposalId, end_time: Timestamp },

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(ProposalId),

    #[error("{voter} has already voted on proposal {id}")]
    AlreadyVoted { id: ProposalId, voter: Address },

    #[error("{0} has no voting power")]
    NoVotingPower(Address),

    #[error("quorum not reached: {have} < {need}")]
    QuorumNotReached { have: Amount, need: Amount },

    #[error("arithmetic overflow")]
    Overflow,
}
