//! Token-weighted governance.
//!
//! Proposals are scoped to a token. Each holder casts at most one ballot per
//! proposal, weighted by their balance at the moment of voting. Once the voting
//! window closes anyone may execute the proposal; execution requires the
//! combined weight to reach the quorum fixed at creation, and the proposal
//! passes on a strict majority of weight in favour.
//!
//! Key principle: governance only reads token state, through
//! [`tally_types::TokenDirectory`]; it never moves balances.

pub mod engine;
pub mod error;
pub mod event;
pub mod proposal;

pub use engine::GovernanceEngine;
pub use error::GovernanceError;
pub use event::GovernanceEvent;
pub use proposal::{Ballot, NewProposal, Proposal, ProposalId, ProposalState};
