use tally_token::TokenError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("token construction failed: {0}")]
    Token(#[from] TokenError),
}
