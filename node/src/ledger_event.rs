//! Events emitted by committed calls, for subscribers.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tally_factory::FactoryEvent;
use tally_governance::GovernanceEvent;
use tally_token::TokenEvent;
use tally_types::Address;
use tracing::warn;

use crate::block::Block;

/// Ledger-level events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Emitted by the token deployed at `token`.
    Token { token: Address, event: TokenEvent },
    Factory { event: FactoryEvent },
    Governance { event: GovernanceEvent },
}

impl LedgerEvent {
    pub fn token(token: Address, event: TokenEvent) -> Self {
        Self::Token { token, event }
    }
}

impl From<FactoryEvent> for LedgerEvent {
    fn from(event: FactoryEvent) -> Self {
        Self::Factory { event }
    }
}

impl From<GovernanceEvent> for LedgerEvent {
    fn from(event: GovernanceEvent) -> Self {
        Self::Governance { event }
    }
}

type Listener = Box<dyn Fn(&Block, &LedgerEvent) + Send + Sync>;

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners are invoked inline while the committing call still holds the state
/// lock, so they observe events in commit order. They must stay fast and must
/// not call back into the chain.
pub struct EventBus {
    listeners: Vec<Listener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Deliver `event` to every listener in subscription order.
    ///
    /// A panicking listener is logged and skipped; the rest still run.
    pub fn emit(&self, block: &Block, event: &LedgerEvent) {
        for (index, listener) in self.listeners.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| listener(block, event))).is_err() {
                warn!(listener = index, block = block.number, "event listener panicked");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tally_types::Timestamp;

    fn block() -> Block {
        Block {
            number: 1,
            timestamp: Timestamp::new(0),
        }
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_, _| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_, _| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        let event = LedgerEvent::from(GovernanceEvent::ProposalExecuted { id: 1, passed: true });
        bus.emit(&block(), &event);
        assert_eq!(counter.load(Ordering::SeqCst), 11);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn panicking_listener_does_not_stop_the_others() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(|_, _| panic!("listener bug")));
        let c = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_, _| {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        let event = LedgerEvent::from(GovernanceEvent::ProposalExecuted { id: 1, passed: true });
        bus.emit(&block(), &event);
        bus.emit(&block(), &event);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        let event = LedgerEvent::from(GovernanceEvent::ProposalExecuted { id: 1, passed: false });
        bus.emit(&block(), &event);
    }

    #[test]
    fn events_serialize_with_source_and_kind_tags() {
        let event = LedgerEvent::from(GovernanceEvent::ProposalExecuted { id: 3, passed: true });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["source"], "governance");
        assert_eq!(json["event"]["kind"], "proposal_executed");
        assert_eq!(json["event"]["id"], 3);
    }
}
