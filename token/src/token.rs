//! The token ledger.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tally_types::{Address, Amount, VotingToken};
use tracing::debug;

use crate::error::TokenError;
use crate::event::TokenEvent;

/// Construction parameters for a new token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    /// Supply in whole units; the ledger mints `initial_supply * 10^decimals`.
    pub initial_supply: Amount,
    pub decimals: u8,
    pub transferable: bool,
}

/// Static and summary data about a token, as shown to indexers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: Amount,
    pub owner: Address,
    pub transferable: bool,
}

/// An account-balance ledger with an optional transfer gate.
///
/// Invariant: the balances sum to `total_supply` after every call.
#[derive(Clone, Debug)]
pub struct Token {
    address: Address,
    name: String,
    symbol: String,
    decimals: u8,
    owner: Address,
    total_supply: Amount,
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    transferable: bool,
    distributors: HashSet<Address>,
}

impl Token {
    /// Deploy a token at `address`, minting the whole scaled supply to `owner`.
    ///
    /// `owner` becomes the only distributor.
    pub fn create(
        address: Address,
        owner: Address,
        params: TokenParams,
    ) -> Result<(Self, Vec<TokenEvent>), TokenError> {
        if owner.is_zero() {
            return Err(TokenError::InvalidRecipient(owner));
        }
        let minted = params
            .initial_supply
            .scale_by_decimals(params.decimals)
            .ok_or(TokenError::SupplyOverflow {
                supply: params.initial_supply,
                decimals: params.decimals,
            })?;

        let mut token = Self {
            address,
            name: params.name,
            symbol: params.symbol,
            decimals: params.decimals,
            owner,
            total_supply: Amount::ZERO,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            transferable: params.transferable,
            distributors: HashSet::from([owner]),
        };

        let mut events = vec![TokenEvent::OwnershipTransferred {
            previous: Address::ZERO,
            new_owner: owner,
        }];
        if !minted.is_zero() {
            token.total_supply = minted;
            token.credit(owner, minted);
            events.push(TokenEvent::Transfer {
                from: Address::ZERO,
                to: owner,
                amount: minted,
            });
        }
        Ok((token, events))
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn is_transferable(&self) -> bool {
        self.transferable
    }

    pub fn is_distributor(&self, account: &Address) -> bool {
        self.distributors.contains(account)
    }

    /// Every account holding a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    pub fn info(&self) -> TokenInfo {
        TokenInfo {
            address: self.address,
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            total_supply: self.total_supply,
            owner: self.owner,
            transferable: self.transferable,
        }
    }

    // ── Transfers ───────────────────────────────────────────────────────

    /// Move `amount` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TokenEvent, TokenError> {
        self.check_transfer(&from, &to, amount)?;
        Ok(self.move_balance(from, to, amount))
    }

    /// Let `spender` move up to `amount` of `owner`'s balance.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<TokenEvent, TokenError> {
        if spender.is_zero() {
            return Err(TokenError::InvalidRecipient(spender));
        }
        self.allowances.insert((owner, spender), amount);
        Ok(TokenEvent::Approval {
            owner,
            spender,
            amount,
        })
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    ///
    /// The transfer gate is evaluated against `from`, not `spender`. An
    /// allowance of [`Amount::MAX`] is treated as unlimited and never lowered.
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TokenEvent, TokenError> {
        let allowed = self.allowance(&from, &spender);
        let remaining = allowed
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                needed: amount,
                available: allowed,
            })?;
        self.check_transfer(&from, &to, amount)?;

        if allowed != Amount::MAX {
            self.allowances.insert((from, spender), remaining);
        }
        Ok(self.move_balance(from, to, amount))
    }

    /// Send `amounts[i]` to `recipients[i]` from `caller`, in order.
    ///
    /// `caller` must be a distributor. All pairs are validated before the first
    /// balance changes, so either every transfer lands or none does.
    pub fn distribute(
        &mut self,
        caller: Address,
        recipients: &[Address],
        amounts: &[Amount],
    ) -> Result<Vec<TokenEvent>, TokenError> {
        if !self.distributors.contains(&caller) {
            return Err(TokenError::NotAuthorized(caller));
        }
        if recipients.len() != amounts.len() {
            return Err(TokenError::LengthMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }
        if let Some(zero) = recipients.iter().find(|r| r.is_zero()) {
            return Err(TokenError::InvalidRecipient(*zero));
        }
        let total = Amount::checked_sum(amounts.iter().copied()).ok_or(TokenError::Overflow)?;
        let available = self.balance_of(&caller);
        if available < total {
            return Err(TokenError::InsufficientBalance {
                needed: total,
                available,
            });
        }

        let events = recipients
            .iter()
            .zip(amounts)
            .map(|(to, amount)| self.move_balance(caller, *to, *amount))
            .collect();
        Ok(events)
    }

    // ── Supply ──────────────────────────────────────────────────────────

    /// Create `amount` new units for `to`. Owner only; never gated.
    pub fn mint(
        &mut self,
        caller: Address,
        to: Address,
        amount: Amount,
    ) -> Result<TokenEvent, TokenError> {
        self.only_owner(&caller)?;
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient(to));
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        self.credit(to, amount);
        debug!(token = %self.address, %to, %amount, "mint");
        Ok(TokenEvent::Transfer {
            from: Address::ZERO,
            to,
            amount,
        })
    }

    /// Destroy `amount` of the caller's own balance. Never gated.
    pub fn burn(&mut self, caller: Address, amount: Amount) -> Result<TokenEvent, TokenError> {
        self.check_balance(&caller, amount)?;
        self.debit(caller, amount);
        self.total_supply = self.total_supply.saturating_sub(amount);
        debug!(token = %self.address, from = %caller, %amount, "burn");
        Ok(TokenEvent::Transfer {
            from: caller,
            to: Address::ZERO,
            amount,
        })
    }

    // ── Administration ──────────────────────────────────────────────────

    pub fn set_transferable(
        &mut self,
        caller: Address,
        transferable: bool,
    ) -> Result<TokenEvent, TokenError> {
        self.only_owner(&caller)?;
        self.transferable = transferable;
        Ok(TokenEvent::TransferabilityChanged { transferable })
    }

    pub fn set_distributor(
        &mut self,
        caller: Address,
        account: Address,
        enabled: bool,
    ) -> Result<TokenEvent, TokenError> {
        self.only_owner(&caller)?;
        if enabled {
            self.distributors.insert(account);
        } else {
            self.distributors.remove(&account);
        }
        Ok(TokenEvent::DistributorUpdated { account, enabled })
    }

    /// Hand the owner role to `new_owner`. Distributor status does not move with it.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<TokenEvent, TokenError> {
        self.only_owner(&caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::InvalidRecipient(new_owner));
        }
        let previous = std::mem::replace(&mut self.owner, new_owner);
        Ok(TokenEvent::OwnershipTransferred {
            previous,
            new_owner,
        })
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn only_owner(&self, caller: &Address) -> Result<(), TokenError> {
        if *caller != self.owner {
            return Err(TokenError::NotAuthorized(*caller));
        }
        Ok(())
    }

    /// The gate applies to holder-to-holder moves only; mints and burns pass.
    fn check_gate(&self, from: &Address, to: &Address) -> Result<(), TokenError> {
        if self.transferable || from.is_zero() || to.is_zero() || self.distributors.contains(from)
        {
            return Ok(());
        }
        Err(TokenError::TransfersDisabled(*from))
    }

    fn check_balance(&self, account: &Address, amount: Amount) -> Result<(), TokenError> {
        let available = self.balance_of(account);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    fn check_transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient(*to));
        }
        self.check_gate(from, to)?;
        self.check_balance(from, amount)
    }

    /// Caller must have validated the balance.
    fn move_balance(&mut self, from: Address, to: Address, amount: Amount) -> TokenEvent {
        self.debit(from, amount);
        self.credit(to, amount);
        debug!(token = %self.address, %from, %to, %amount, "transfer");
        TokenEvent::Transfer { from, to, amount }
    }

    fn debit(&mut self, account: Address, amount: Amount) {
        let remaining = self.balance_of(&account).saturating_sub(amount);
        if remaining.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, remaining);
        }
    }

    /// Balances are bounded by total supply, so the sum cannot overflow.
    fn credit(&mut self, account: Address, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        let entry = self.balances.entry(account).or_insert(Amount::ZERO);
        *entry = entry.checked_add(amount).unwrap_or(Amount::MAX);
    }
}

impl VotingToken for Token {
    fn balance_of(&self, account: &Address) -> Amount {
        Token::balance_of(self, account)
    }

    fn total_supply(&self) -> Amount {
        Token::total_supply(self)
    }
}
