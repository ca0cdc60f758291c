//! Read capabilities that governance consumes from tokens.
//!
//! Governance never depends on a concrete token type: any ledger that can
//! report a holder's balance and its total supply can weight votes.

use crate::{Address, Amount};

/// The read surface of a token that vote weighting needs.
pub trait VotingToken {
    /// Current balance of `account`; zero for unknown accounts.
    fn balance_of(&self, account: &Address) -> Amount;

    /// Current total supply.
    fn total_supply(&self) -> Amount;
}

/// Resolves a token address into its read capability.
pub trait TokenDirectory {
    /// The token deployed at `address`, if any.
    fn voting_token(&self, address: &Address) -> Option<&dyn VotingToken>;
}
