use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount, Timestamp};

use crate::proposal::ProposalId;

/// Observations emitted by governance mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        title: String,
        token: Address,
        creator: Address,
        start_time: Timestamp,
        end_time: Timestamp,
        quorum: Amount,
    },
    VoteCast {
        id: ProposalId,
        voter: Address,
        support: bool,
        weight: Amount,
    },
    ProposalExecuted {
        id: ProposalId,
        passed: bool,
    },
}
