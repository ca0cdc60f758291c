//! Token factory.
//!
//! Deploys [`tally_token::Token`] instances at deterministic addresses and keeps
//! the creator → tokens index. The factory owns only the index; each deployed
//! token is handed back to the caller, which owns its ledger.

pub mod error;
pub mod event;
pub mod factory;

pub use error::FactoryError;
pub use event::FactoryEvent;
pub use factory::{Deployment, TokenFactory};
