//! The factory registry.

use std::collections::HashMap;

use tally_token::{Token, TokenEvent, TokenParams};
use tally_types::Address;
use tracing::info;

use crate::error::FactoryError;
use crate::event::FactoryEvent;

/// A freshly deployed token together with everything its deployment emitted.
#[derive(Debug)]
pub struct Deployment {
    pub token: Token,
    /// Events emitted by the token's constructor (ownership, initial mint).
    pub token_events: Vec<TokenEvent>,
    pub created: FactoryEvent,
}

/// Deploys tokens and indexes them by creator.
#[derive(Clone, Debug)]
pub struct TokenFactory {
    address: Address,
    /// Every token deployed, in deployment order.
    tokens: Vec<Address>,
    /// Creator → tokens they deployed, in deployment order.
    by_creator: HashMap<Address, Vec<Address>>,
}

impl TokenFactory {
    /// A factory living at `address`; token addresses are derived from it.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            tokens: Vec::new(),
            by_creator: HashMap::new(),
        }
    }

    /// Deploy a token owned by `creator` and record it in both indexes.
    ///
    /// Nothing is recorded if token construction fails.
    pub fn create_token(
        &mut self,
        creator: Address,
        params: TokenParams,
    ) -> Result<Deployment, FactoryError> {
        let nonce = self.tokens.len() as u64;
        let address = Address::derive(&self.address, nonce);

        let created = FactoryEvent::TokenCreated {
            token: address,
            name: params.name.clone(),
            symbol: params.symbol.clone(),
            initial_supply: params.initial_supply,
            decimals: params.decimals,
            transferable: params.transferable,
            creator,
        };
        let (token, token_events) = Token::create(address, creator, params)?;

        self.tokens.push(address);
        self.by_creator.entry(creator).or_default().push(address);
        info!(
            token = %address,
            %creator,
            symbol = token.symbol(),
            supply = %token.total_supply(),
            "token deployed"
        );

        Ok(Deployment {
            token,
            token_events,
            created,
        })
    }

    /// Tokens deployed by `creator`, oldest first.
    pub fn tokens_by_creator(&self, creator: &Address) -> &[Address] {
        self.by_creator
            .get(creator)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn creator_token_count(&self, creator: &Address) -> usize {
        self.tokens_by_creator(creator).len()
    }

    pub fn all_tokens(&self) -> &[Address] {
        &self.tokens
    }

    pub fn token_at(&self, index: usize) -> Option<Address> {
        self.tokens.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_token::TokenError;
    use tally_types::Amount;

    fn addr(seed: u8) -> Address {
        Address::repeat_byte(seed)
    }

    fn params(symbol: &str, supply: u64, decimals: u8) -> TokenParams {
        TokenParams {
            name: format!("{symbol} token"),
            symbol: symbol.to_string(),
            initial_supply: Amount::from(supply),
            decimals,
            transferable: true,
        }
    }

    #[test]
    fn create_token_indexes_by_creator() {
        let mut factory = TokenFactory::new(addr(0xFA));
        let a1 = factory.create_token(addr(1), params("AAA", 10, 0)).unwrap();
        let b1 = factory.create_token(addr(2), params("BBB", 10, 0)).unwrap();
        let a2 = factory.create_token(addr(1), params("CCC", 10, 0)).unwrap();

        assert_eq!(factory.token_count(), 3);
        assert_eq!(factory.creator_token_count(&addr(1)), 2);
        assert_eq!(factory.creator_token_count(&addr(2)), 1);
        assert_eq!(factory.creator_token_count(&addr(3)), 0);
        assert_eq!(
            factory.tokens_by_creator(&addr(1)),
            &[a1.token.address(), a2.token.address()]
        );
        assert_eq!(factory.token_at(1), Some(b1.token.address()));
        assert_eq!(factory.token_at(3), None);
    }

    #[test]
    fn deployed_token_is_owned_by_creator() {
        let mut factory = TokenFactory::new(addr(0xFA));
        let deployment = factory.create_token(addr(1), params("AAA", 5, 3)).unwrap();
        assert_eq!(deployment.token.owner(), addr(1));
        assert_eq!(deployment.token.balance_of(&addr(1)), Amount::from(5000u64));
        match deployment.created {
            FactoryEvent::TokenCreated {
                token,
                initial_supply,
                creator,
                ..
            } => {
                assert_eq!(token, deployment.token.address());
                assert_eq!(initial_supply, Amount::from(5u64));
                assert_eq!(creator, addr(1));
            }
        }
    }

    #[test]
    fn addresses_are_unique() {
        let mut factory = TokenFactory::new(addr(0xFA));
        let first = factory.create_token(addr(1), params("AAA", 1, 0)).unwrap();
        let second = factory.create_token(addr(1), params("AAA", 1, 0)).unwrap();
        assert_ne!(first.token.address(), second.token.address());
    }

    #[test]
    fn failed_construction_records_nothing() {
        let mut factory = TokenFactory::new(addr(0xFA));
        let err = factory
            .create_token(addr(1), params("BIG", 1, 200))
            .unwrap_err();
        assert!(matches!(
            err,
            FactoryError::Token(TokenError::SupplyOverflow { .. })
        ));
        assert_eq!(factory.token_count(), 0);
        assert!(factory.tokens_by_creator(&addr(1)).is_empty());
    }
}
