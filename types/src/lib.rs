//! Fundamental types for tally.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! addresses, 256-bit token amounts, timestamps and the narrow read capability
//! that governance uses to weigh votes against an arbitrary token.

pub mod address;
pub mod amount;
pub mod capability;
pub mod error;
pub mod time;

pub use address::Address;
pub use amount::Amount;
pub use capability::{TokenDirectory, VotingToken};
pub use error::TypesError;
pub use time::{Clock, SystemClock, Timestamp};
