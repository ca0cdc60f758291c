//! The tally chain host: the single writer in front of every ledger.
//!
//! The host is the central coordinator that:
//! - Owns the world state (deployed tokens, the factory index, governance)
//! - Serializes every mutating call behind one write lock, so each call commits
//!   fully or not at all and no call observes another half-done
//! - Seals each committed call into its own block and returns a receipt
//! - Fans committed events out to subscribers (indexers, mirrors)
//! - Reads time from an injected clock

pub mod block;
pub mod chain;
pub mod config;
pub mod error;
pub mod ledger_event;
pub mod logging;
pub mod metrics;
pub mod state;
pub mod tracing_spans;

pub use block::{Block, Receipt};
pub use chain::Chain;
pub use config::ChainConfig;
pub use error::ChainError;
pub use ledger_event::{EventBus, LedgerEvent};
pub use logging::{init_logging, LogFormat};
pub use metrics::ChainMetrics;
pub use state::{TokenRegistry, WorldState};
