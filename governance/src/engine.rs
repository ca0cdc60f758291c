//! Core governance engine: proposal registry, ballot ledger and execution rule.

use std::collections::{BTreeMap, HashMap};

use tally_types::{Address, Amount, Timestamp, TokenDirectory};
use tracing::{debug, info};

use crate::error::GovernanceError;
use crate::event::GovernanceEvent;
use crate::proposal::{Ballot, NewProposal, Proposal, ProposalId};

/// Owns every proposal and ballot. Token state is only ever read, through the
/// [`TokenDirectory`] passed into each call.
#[derive(Clone, Debug)]
pub struct GovernanceEngine {
    next_id: ProposalId,
    proposals: BTreeMap<ProposalId, Proposal>,
    ballots: HashMap<(ProposalId, Address), Ballot>,
}

impl GovernanceEngine {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            proposals: BTreeMap::new(),
            ballots: HashMap::new(),
        }
    }

    /// Open a proposal weighted by `request.token`.
    ///
    /// The quorum is `quorum_percent * total_supply / 100` (floored) as of now and
    /// never follows later supply changes.
    pub fn create_proposal(
        &mut self,
        creator: Address,
        request: NewProposal,
        tokens: &dyn TokenDirectory,
        now: Timestamp,
    ) -> Result<(ProposalId, GovernanceEvent), GovernanceError> {
        if request.token.is_zero() {
            return Err(GovernanceError::InvalidToken(request.token));
        }
        let quorum_percent = u8::try_from(request.quorum_percent)
            .ok()
            .filter(|p| (1..=100).contains(p))
            .ok_or(GovernanceError::InvalidQuorum(request.quorum_percent))?;
        if request.duration_secs == 0 {
            return Err(GovernanceError::InvalidDuration(request.duration_secs));
        }
        let token = tokens
            .voting_token(&request.token)
            .ok_or(GovernanceError::InvalidToken(request.token))?;
        if token.balance_of(&creator).is_zero() {
            return Err(GovernanceError::NotATokenHolder(creator));
        }
        let quorum = token
            .total_supply()
            .percent(quorum_percent)
            .ok_or(GovernanceError::Overflow)?;
        let end_time = now
            .checked_add_secs(request.duration_secs)
            .ok_or(GovernanceError::InvalidDuration(request.duration_secs))?;

        let id = self.next_id;
        self.next_id += 1;
        let proposal = Proposal {
            id,
            title: request.title,
            description: request.description,
            token: request.token,
            creator,
            start_time: now,
            end_time,
            quorum,
            votes_for: Amount::ZERO,
            votes_against: Amount::ZERO,
            executed: false,
            passed: false,
        };
        let event = GovernanceEvent::ProposalCreated {
            id,
            title: proposal.title.clone(),
            token: proposal.token,
            creator,
            start_time: now,
            end_time,
            quorum,
        };
        info!(id, %creator, token = %proposal.token, %quorum, %end_time, "proposal created");
        self.proposals.insert(id, proposal);
        Ok((id, event))
    }

    /// Record `voter`'s ballot, weighted by their balance right now.
    ///
    /// The weight is a live read, not a snapshot: tokens moved to a fresh address
    /// after voting can vote again from there. Only one ballot per address is
    /// enforced.
    pub fn cast_vote(
        &mut self,
        voter: Address,
        id: ProposalId,
        support: bool,
        tokens: &dyn TokenDirectory,
        now: Timestamp,
    ) -> Result<GovernanceEvent, GovernanceError> {
        let proposal = self
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if now > proposal.end_time {
            return Err(GovernanceError::VotingClosed {
                id,
                end_time: proposal.end_time,
            });
        }
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if self.has_voted(id, &voter) {
            return Err(GovernanceError::AlreadyVoted { id, voter });
        }
        let weight = tokens
            .voting_token(&proposal.token)
            .map(|token| token.balance_of(&voter))
            .unwrap_or(Amount::ZERO);
        if weight.is_zero() {
            return Err(GovernanceError::NoVotingPower(voter));
        }
        let tally = if support {
            proposal.votes_for
        } else {
            proposal.votes_against
        };
        let tally = tally.checked_add(weight).ok_or(GovernanceError::Overflow)?;

        if let Some(proposal) = self.proposals.get_mut(&id) {
            if support {
                proposal.votes_for = tally;
            } else {
                proposal.votes_against = tally;
            }
        }
        self.ballots.insert(
            (id, voter),
            Ballot {
                voted: true,
                support,
                weight,
            },
        );
        debug!(id, %voter, support, %weight, "vote cast");
        Ok(GovernanceEvent::VoteCast {
            id,
            voter,
            support,
            weight,
        })
    }

    /// Finalize a proposal whose voting window has closed.
    ///
    /// A `QuorumNotReached` failure leaves the proposal untouched. Since no vote
    /// can arrive after the window and the quorum is frozen, that failure is
    /// permanent for the proposal.
    pub fn execute_proposal(
        &mut self,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<(bool, GovernanceEvent), GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if now <= proposal.end_time {
            return Err(GovernanceError::VotingNotEnded {
                id,
                end_time: proposal.end_time,
            });
        }
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if !proposal.quorum_reached() {
            return Err(GovernanceError::QuorumNotReached {
                have: proposal.total_votes().unwrap_or(Amount::MAX),
                need: proposal.quorum,
            });
        }

        let passed = proposal.majority_for();
        proposal.executed = true;
        proposal.passed = passed;
        info!(
            id,
            passed,
            votes_for = %proposal.votes_for,
            votes_against = %proposal.votes_against,
            "proposal executed"
        );
        Ok((passed, GovernanceEvent::ProposalExecuted { id, passed }))
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn get_proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> bool {
        self.ballots.contains_key(&(id, *voter))
    }

    /// The ballot `voter` cast on `id`, or the default "not voted" record.
    /// Never fails, even for unknown proposals.
    pub fn get_vote(&self, id: ProposalId, voter: &Address) -> Ballot {
        self.ballots.get(&(id, *voter)).copied().unwrap_or_default()
    }

    pub fn proposal_count(&self) -> u64 {
        self.next_id - 1
    }

    /// All proposals, by ascending id.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.values()
    }

    pub fn proposals_by_creator(&self, creator: &Address) -> Vec<&Proposal> {
        self.proposals()
            .filter(|p| p.creator == *creator)
            .collect()
    }

    pub fn proposals_for_token(&self, token: &Address) -> Vec<&Proposal> {
        self.proposals().filter(|p| p.token == *token).collect()
    }
}

impl Default for GovernanceEngine {
    fn default() -> Self {
        Self::new()
    }
}
