use tally_factory::FactoryError;
use tally_governance::GovernanceError;
use tally_token::TokenError;
use tally_types::Address;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("factory error: {0}")]
    Factory(#[from] FactoryError),

    #[error("governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("no token deployed at {0}")]
    UnknownToken(Address),

    #[error("config error: {0}")]
    Config(String),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("chain state lock poisoned")]
    LockPoisoned,
}
