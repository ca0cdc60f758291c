//! Token-specific errors.

use tally_types::{Address, Amount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    #[error("insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: Amount, available: Amount },

    #[error("transfers are disabled and {0} is not a distributor")]
    TransfersDisabled(Address),

    #[error("{0} is not authorized for this action")]
    NotAuthorized(Address),

    #[error("recipients ({recipients}) and amounts ({amounts}) differ in length")]
    LengthMismatch { recipients: usize, amounts: usize },

    #[error("invalid recipient {0}")]
    InvalidRecipient(Address),

    #[error("supply {supply} with {decimals} decimals does not fit in 256 bits")]
    SupplyOverflow { supply: Amount, decimals: u8 },

    #[error("arithmetic overflow")]
    Overflow,
}
