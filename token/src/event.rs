//! Observations emitted by token mutations.

use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount};

/// Something a token mutation did, for indexers and receipts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenEvent {
    /// Balance moved. `from == ZERO` is a mint, `to == ZERO` a burn.
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },
    TransferabilityChanged {
        transferable: bool,
    },
    DistributorUpdated {
        account: Address,
        enabled: bool,
    },
    OwnershipTransferred {
        previous: Address,
        new_owner: Address,
    },
}
