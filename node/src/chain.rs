//! The chain host: one write lock in front of every ledger.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use tally_governance::{Ballot, NewProposal, Proposal, ProposalId, ProposalState};
use tally_token::{Token, TokenEvent, TokenInfo, TokenParams};
use tally_types::{Address, Amount, Clock, Timestamp};
use tracing::{debug, info, warn};

use crate::block::{Block, Receipt};
use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::ledger_event::{EventBus, LedgerEvent};
use crate::metrics::ChainMetrics;
use crate::state::WorldState;
use crate::tracing_spans::{call_span, query_span};

/// Everything guarded by the chain lock.
struct ChainInner {
    state: WorldState,
    /// Height of the latest sealed block; 0 before the first commit.
    height: u64,
    last_timestamp: Timestamp,
    bus: EventBus,
}

/// In-process chain host.
///
/// Every mutating call holds the write lock from its first check to its last
/// event, so calls are totally ordered and either commit fully or leave no
/// trace. A committed call is sealed into its own block; a rejected one
/// consumes none.
pub struct Chain {
    config: ChainConfig,
    clock: Arc<dyn Clock>,
    metrics: Option<ChainMetrics>,
    inner: RwLock<ChainInner>,
}

impl Chain {
    pub fn new(config: ChainConfig, clock: Arc<dyn Clock>) -> Result<Self, ChainError> {
        let metrics = if config.enable_metrics {
            Some(ChainMetrics::new()?)
        } else {
            None
        };
        let inner = ChainInner {
            state: WorldState::new(config.factory_address),
            height: 0,
            last_timestamp: Timestamp::new(config.genesis_time),
            bus: EventBus::new(),
        };
        info!(
            chain_id = %config.chain_id,
            factory = %config.factory_address,
            genesis_time = config.genesis_time,
            "chain started"
        );
        Ok(Self {
            config,
            clock,
            metrics,
            inner: RwLock::new(inner),
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// `None` when the chain was configured without metrics.
    pub fn metrics(&self) -> Option<&ChainMetrics> {
        self.metrics.as_ref()
    }

    /// Register a listener for every event committed from now on.
    ///
    /// Listeners run under the chain lock and must not call back into the chain.
    /// A listener that panics is logged and skipped; the call still commits.
    pub fn subscribe<F>(&self, listener: F) -> Result<(), ChainError>
    where
        F: Fn(&Block, &LedgerEvent) + Send + Sync + 'static,
    {
        let mut inner = self.write()?;
        inner.bus.subscribe(Box::new(listener));
        debug!(listeners = inner.bus.listener_count(), "subscriber added");
        Ok(())
    }

    // ── Factory ─────────────────────────────────────────────────────────

    /// Deploy a token owned by `creator`. Returns the new token's address.
    pub fn create_token(
        &self,
        creator: Address,
        params: TokenParams,
    ) -> Result<(Address, Receipt), ChainError> {
        self.transact("create_token", creator, |state, _| {
            let deployment = state.factory.create_token(creator, params)?;
            let address = deployment.token.address();
            let mut events: Vec<LedgerEvent> = deployment
                .token_events
                .into_iter()
                .map(|e| LedgerEvent::token(address, e))
                .collect();
            events.push(deployment.created.into());
            state.tokens.insert(deployment.token);
            Ok((address, events))
        })
    }

    // ── Token calls ─────────────────────────────────────────────────────

    pub fn transfer(
        &self,
        caller: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Receipt, ChainError> {
        self.token_call("transfer", caller, token, |t| {
            Ok(vec![t.transfer(caller, to, amount)?])
        })
    }

    pub fn approve(
        &self,
        caller: Address,
        token: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<Receipt, ChainError> {
        self.token_call("approve", caller, token, |t| {
            Ok(vec![t.approve(caller, spender, amount)?])
        })
    }

    /// Move `from`'s tokens on `caller`'s allowance.
    pub fn transfer_from(
        &self,
        caller: Address,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Receipt, ChainError> {
        self.token_call("transfer_from", caller, token, |t| {
            Ok(vec![t.transfer_from(caller, from, to, amount)?])
        })
    }

    pub fn mint(
        &self,
        caller: Address,
        token: Address,
        to: Address,
        amount: Amount,
    ) -> Result<Receipt, ChainError> {
        self.token_call("mint", caller, token, |t| {
            Ok(vec![t.mint(caller, to, amount)?])
        })
    }

    pub fn burn(&self, caller: Address, token: Address, amount: Amount) -> Result<Receipt, ChainError> {
        self.token_call("burn", caller, token, |t| Ok(vec![t.burn(caller, amount)?]))
    }

    pub fn set_transferable(
        &self,
        caller: Address,
        token: Address,
        transferable: bool,
    ) -> Result<Receipt, ChainError> {
        self.token_call("set_transferable", caller, token, |t| {
            Ok(vec![t.set_transferable(caller, transferable)?])
        })
    }

    pub fn set_distributor(
        &self,
        caller: Address,
        token: Address,
        account: Address,
        enabled: bool,
    ) -> Result<Receipt, ChainError> {
        self.token_call("set_distributor", caller, token, |t| {
            Ok(vec![t.set_distributor(caller, account, enabled)?])
        })
    }

    pub fn transfer_ownership(
        &self,
        caller: Address,
        token: Address,
        new_owner: Address,
    ) -> Result<Receipt, ChainError> {
        self.token_call("transfer_ownership", caller, token, |t| {
            Ok(vec![t.transfer_ownership(caller, new_owner)?])
        })
    }

    /// Batch transfer from a distributor. All transfers land in one block or none do.
    pub fn distribute_tokens(
        &self,
        caller: Address,
        token: Address,
        recipients: &[Address],
        amounts: &[Amount],
    ) -> Result<Receipt, ChainError> {
        self.token_call("distribute_tokens", caller, token, |t| {
            Ok(t.distribute(caller, recipients, amounts)?)
        })
    }

    // ── Governance calls ────────────────────────────────────────────────

    pub fn create_proposal(
        &self,
        creator: Address,
        request: NewProposal,
    ) -> Result<(ProposalId, Receipt), ChainError> {
        self.transact("create_proposal", creator, |state, now| {
            let (id, event) =
                state
                    .governance
                    .create_proposal(creator, request, &state.tokens, now)?;
            Ok((id, vec![event.into()]))
        })
    }

    pub fn cast_vote(
        &self,
        voter: Address,
        id: ProposalId,
        support: bool,
    ) -> Result<Receipt, ChainError> {
        let ((), receipt) = self.transact("cast_vote", voter, |state, now| {
            let event = state
                .governance
                .cast_vote(voter, id, support, &state.tokens, now)?;
            Ok(((), vec![event.into()]))
        })?;
        Ok(receipt)
    }

    /// Finalize a proposal. Anyone may call this once voting has ended.
    pub fn execute_proposal(
        &self,
        caller: Address,
        id: ProposalId,
    ) -> Result<(bool, Receipt), ChainError> {
        self.transact("execute_proposal", caller, |state, now| {
            let (passed, event) = state.governance.execute_proposal(id, now)?;
            Ok((passed, vec![event.into()]))
        })
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn balance_of(&self, token: Address, account: &Address) -> Result<Amount, ChainError> {
        self.read("balance_of", |s| Ok(s.tokens.get(&token)?.balance_of(account)))
    }

    pub fn total_supply(&self, token: Address) -> Result<Amount, ChainError> {
        self.read("total_supply", |s| Ok(s.tokens.get(&token)?.total_supply()))
    }

    pub fn decimals(&self, token: Address) -> Result<u8, ChainError> {
        self.read("decimals", |s| Ok(s.tokens.get(&token)?.decimals()))
    }

    pub fn token_info(&self, token: Address) -> Result<TokenInfo, ChainError> {
        self.read("token_info", |s| Ok(s.tokens.get(&token)?.info()))
    }

    pub fn allowance(
        &self,
        token: Address,
        owner: &Address,
        spender: &Address,
    ) -> Result<Amount, ChainError> {
        self.read("allowance", |s| {
            Ok(s.tokens.get(&token)?.allowance(owner, spender))
        })
    }

    pub fn is_distributor(&self, token: Address, account: &Address) -> Result<bool, ChainError> {
        self.read("is_distributor", |s| {
            Ok(s.tokens.get(&token)?.is_distributor(account))
        })
    }

    pub fn is_transferable(&self, token: Address) -> Result<bool, ChainError> {
        self.read("is_transferable", |s| {
            Ok(s.tokens.get(&token)?.is_transferable())
        })
    }

    pub fn tokens_by_creator(&self, creator: &Address) -> Result<Vec<Address>, ChainError> {
        self.read("tokens_by_creator", |s| {
            Ok(s.factory.tokens_by_creator(creator).to_vec())
        })
    }

    pub fn token_count(&self) -> Result<usize, ChainError> {
        self.read("token_count", |s| Ok(s.factory.token_count()))
    }

    pub fn creator_token_count(&self, creator: &Address) -> Result<usize, ChainError> {
        self.read("creator_token_count", |s| {
            Ok(s.factory.creator_token_count(creator))
        })
    }

    pub fn all_tokens(&self) -> Result<Vec<Address>, ChainError> {
        self.read("all_tokens", |s| Ok(s.factory.all_tokens().to_vec()))
    }

    pub fn token_at(&self, index: usize) -> Result<Option<Address>, ChainError> {
        self.read("token_at", |s| Ok(s.factory.token_at(index)))
    }

    pub fn get_proposal(&self, id: ProposalId) -> Result<Proposal, ChainError> {
        self.read("get_proposal", |s| Ok(s.governance.get_proposal(id)?.clone()))
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> Result<bool, ChainError> {
        self.read("has_voted", |s| Ok(s.governance.has_voted(id, voter)))
    }

    pub fn get_vote(&self, id: ProposalId, voter: &Address) -> Result<Ballot, ChainError> {
        self.read("get_vote", |s| Ok(s.governance.get_vote(id, voter)))
    }

    pub fn proposal_count(&self) -> Result<u64, ChainError> {
        self.read("proposal_count", |s| Ok(s.governance.proposal_count()))
    }

    /// State of proposal `id` as of the current chain time.
    pub fn proposal_state(&self, id: ProposalId) -> Result<ProposalState, ChainError> {
        let _span = query_span("proposal_state").entered();
        let inner = self.read_inner()?;
        let now = self.clock.now().max(inner.last_timestamp);
        Ok(inner.state.governance.get_proposal(id)?.state(now))
    }

    pub fn block_height(&self) -> Result<u64, ChainError> {
        Ok(self.read_inner()?.height)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn write(&self) -> Result<RwLockWriteGuard<'_, ChainInner>, ChainError> {
        self.inner.write().map_err(|_| ChainError::LockPoisoned)
    }

    fn read_inner(&self) -> Result<RwLockReadGuard<'_, ChainInner>, ChainError> {
        self.inner.read().map_err(|_| ChainError::LockPoisoned)
    }

    fn read<T>(
        &self,
        query: &str,
        f: impl FnOnce(&WorldState) -> Result<T, ChainError>,
    ) -> Result<T, ChainError> {
        let _span = query_span(query).entered();
        f(&self.read_inner()?.state)
    }

    fn token_call(
        &self,
        call: &'static str,
        caller: Address,
        token: Address,
        f: impl FnOnce(&mut Token) -> Result<Vec<TokenEvent>, ChainError>,
    ) -> Result<Receipt, ChainError> {
        let ((), receipt) = self.transact(call, caller, |state, _| {
            let events = f(state.tokens.get_mut(&token)?)?;
            Ok((
                (),
                events
                    .into_iter()
                    .map(|e| LedgerEvent::token(token, e))
                    .collect(),
            ))
        })?;
        Ok(receipt)
    }

    /// Run one mutating call under the write lock and seal it into a block.
    ///
    /// `f` must leave the state untouched when it returns an error; every
    /// component validates before it mutates, so this holds for all calls.
    fn transact<T>(
        &self,
        call: &'static str,
        caller: Address,
        f: impl FnOnce(&mut WorldState, Timestamp) -> Result<(T, Vec<LedgerEvent>), ChainError>,
    ) -> Result<(T, Receipt), ChainError> {
        let _span = call_span(call, &caller).entered();
        let started = Instant::now();
        let mut guard = self.write()?;
        let inner = &mut *guard;
        let now = self.clock.now().max(inner.last_timestamp);

        let (value, events) = match f(&mut inner.state, now) {
            Ok(committed) => committed,
            Err(e) => {
                warn!(call, %caller, error = %e, "call rejected");
                if let Some(metrics) = &self.metrics {
                    metrics.calls_rejected.with_label_values(&[call]).inc();
                }
                return Err(e);
            }
        };

        inner.height += 1;
        inner.last_timestamp = now;
        let block = Block {
            number: inner.height,
            timestamp: now,
        };
        for event in &events {
            inner.bus.emit(&block, event);
        }
        debug!(block = block.number, events = events.len(), "call committed");

        if let Some(metrics) = &self.metrics {
            metrics.calls_committed.with_label_values(&[call]).inc();
            metrics.block_height.set(inner.height as i64);
            metrics
                .token_count
                .set(inner.state.factory.token_count() as i64);
            metrics
                .proposal_count
                .set(inner.state.governance.proposal_count() as i64);
            metrics
                .call_time_ms
                .observe(started.elapsed().as_secs_f64() * 1000.0);
        }

        Ok((
            value,
            Receipt {
                block,
                call: call.to_string(),
                caller,
                events,
            },
        ))
    }
}
