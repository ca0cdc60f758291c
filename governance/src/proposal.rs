//! Governance proposals and ballots.

use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount, Timestamp};

/// Proposal identifier. Assigned from 1 upwards, never reused.
pub type ProposalId = u64;

/// Lifecycle state, derived from a proposal's fields and the current time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Accepting votes (`now <= end_time`).
    Active,
    /// Voting window closed, not yet executed.
    Closed,
    /// Outcome finalized.
    Executed,
}

/// What a caller asks for when opening a proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    /// Token whose balances weight the votes.
    pub token: Address,
    pub duration_secs: u64,
    /// Share of the token's supply at creation that must vote, 1..=100.
    pub quorum_percent: u64,
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    /// Token used for weight lookups; fixed for the proposal's lifetime.
    pub token: Address,
    pub creator: Address,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Absolute weight threshold, computed once at creation from the supply then.
    pub quorum: Amount,
    pub votes_for: Amount,
    pub votes_against: Amount,
    pub executed: bool,
    /// Meaningful only once `executed` is set.
    pub passed: bool,
}

impl Proposal {
    pub fn state(&self, now: Timestamp) -> ProposalState {
        if self.executed {
            ProposalState::Executed
        } else if now <= self.end_time {
            ProposalState::Active
        } else {
            ProposalState::Closed
        }
    }

    /// Combined weight of every ballot cast.
    pub fn total_votes(&self) -> Option<Amount> {
        self.votes_for.checked_add(self.votes_against)
    }

    pub fn quorum_reached(&self) -> bool {
        // An overflowing total is necessarily above any quorum.
        self.total_votes().map_or(true, |total| total >= self.quorum)
    }

    /// Strict majority of weight in favour; a tie loses.
    pub fn majority_for(&self) -> bool {
        self.votes_for > self.votes_against
    }
}

/// One voter's choice on one proposal.
///
/// The default value is the "has not voted" record returned for unknown pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voted: bool,
    pub support: bool,
    /// Voter's balance at the moment of voting.
    pub weight: Amount,
}
