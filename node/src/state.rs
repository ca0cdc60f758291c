//! World state: every deployed token plus the factory and governance ledgers.

use std::collections::HashMap;

use tally_factory::TokenFactory;
use tally_governance::GovernanceEngine;
use tally_token::Token;
use tally_types::{Address, TokenDirectory, VotingToken};

use crate::error::ChainError;

/// Deployed tokens by address. Each token owns its own ledger.
#[derive(Clone, Debug, Default)]
pub struct TokenRegistry {
    tokens: HashMap<Address, Token>,
}

impl TokenRegistry {
    pub fn get(&self, address: &Address) -> Result<&Token, ChainError> {
        self.tokens
            .get(address)
            .ok_or(ChainError::UnknownToken(*address))
    }

    pub fn get_mut(&mut self, address: &Address) -> Result<&mut Token, ChainError> {
        self.tokens
            .get_mut(address)
            .ok_or(ChainError::UnknownToken(*address))
    }

    pub fn insert(&mut self, token: Token) {
        self.tokens.insert(token.address(), token);
    }
}

impl TokenDirectory for TokenRegistry {
    fn voting_token(&self, address: &Address) -> Option<&dyn VotingToken> {
        self.tokens.get(address).map(|t| t as &dyn VotingToken)
    }
}

/// Everything the chain mutates. Fields are disjoint so governance can be
/// borrowed mutably while it reads tokens.
#[derive(Clone, Debug)]
pub struct WorldState {
    pub tokens: TokenRegistry,
    pub factory: TokenFactory,
    pub governance: GovernanceEngine,
}

impl WorldState {
    pub fn new(factory_address: Address) -> Self {
        Self {
            tokens: TokenRegistry::default(),
            factory: TokenFactory::new(factory_address),
            governance: GovernanceEngine::new(),
        }
    }
}
