//! Token ledger.
//!
//! A [`Token`] is an ERC20-equivalent balance ledger: the full supply is minted
//! to the owner at creation, balances always sum to the total supply, and an
//! optional transfer gate restricts holder-to-holder transfers to registered
//! distributors. Minting and burning are never gated.
//!
//! Every mutating call validates all of its preconditions before touching a
//! balance, so a failed call leaves the ledger exactly as it was.

pub mod error;
pub mod event;
pub mod token;

pub use error::TokenError;
pub use event::TokenEvent;
pub use token::{Token, TokenInfo, TokenParams};
