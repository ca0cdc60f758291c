use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount};

/// Observations emitted by the factory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactoryEvent {
    TokenCreated {
        token: Address,
        name: String,
        symbol: String,
        /// Whole-unit supply as requested, before decimal scaling.
        initial_supply: Amount,
        decimals: u8,
        transferable: bool,
        creator: Address,
    },
}
