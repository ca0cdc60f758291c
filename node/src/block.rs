//! Blocks and receipts.

use serde::{Deserialize, Serialize};
use tally_types::{Address, Timestamp};

use crate::ledger_event::LedgerEvent;

/// A sealed block. Every committed call gets its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Height, starting at 1 for the first committed call.
    pub number: u64,
    /// Never earlier than the previous block's timestamp.
    pub timestamp: Timestamp,
}

/// The result of a committed call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub block: Block,
    /// Name of the entry point, e.g. `"cast_vote"`.
    pub call: String,
    pub caller: Address,
    pub events: Vec<LedgerEvent>,
}
