use std::sync::Arc;

use proptest::prelude::*;

use tally_nullables::NullClock;
use tally_node::{Chain, ChainConfig};
use tally_token::TokenParams;
use tally_types::{Address, Amount};

#[derive(Clone, Debug)]
enum Call {
    Transfer { from: u8, to: u8, amount: u64 },
    Burn { from: u8, amount: u64 },
    Distribute { to: Vec<(u8, u64)> },
    SetTransferable(bool),
    Vote { voter: u8, support: bool },
    Advance(u64),
    Execute,
}

fn addr(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

fn call_strategy() -> impl Strategy<Value = Call> {
    prop_oneof![
        (1u8..5, 1u8..5, 0u64..300).prop_map(|(from, to, amount)| Call::Transfer { from, to, amount }),
        (1u8..5, 0u64..100).prop_map(|(from, amount)| Call::Burn { from, amount }),
        prop::collection::vec((1u8..5, 0u64..200), 0..4).prop_map(|to| Call::Distribute { to }),
        any::<bool>().prop_map(Call::SetTransferable),
        (1u8..5, any::<bool>()).prop_map(|(voter, support)| Call::Vote { voter, support }),
        (0u64..200).prop_map(Call::Advance),
        Just(Call::Execute),
    ]
}

fn balances(chain: &Chain, token: Address) -> Vec<Amount> {
    (1u8..5)
        .map(|s| chain.balance_of(token, &addr(s)).unwrap())
        .collect()
}

proptest! {
    /// Block height counts committed calls exactly, and a rejected call leaves
    /// every balance and tally as it was.
    #[test]
    fn rejected_calls_leave_no_trace(calls in prop::collection::vec(call_strategy(), 0..40)) {
        let clock = Arc::new(NullClock::new(0));
        let chain = Chain::new(ChainConfig::default(), clock.clone()).unwrap();
        let params = TokenParams {
            name: "Prop".into(),
            symbol: "PRP".into(),
            initial_supply: Amount::from(1000u64),
            decimals: 0,
            transferable: true,
        };
        let (token, _) = chain.create_token(addr(1), params).unwrap();
        let request = tally_governance::NewProposal {
            title: "p".into(),
            description: String::new(),
            token,
            duration_secs: 500,
            quorum_percent: 10,
        };
        chain.create_proposal(addr(1), request).unwrap();
        let mut committed = 2u64;

        for call in calls {
            let before = balances(&chain, token);
            let proposal_before = chain.get_proposal(1).unwrap();
            let result = match call {
                Call::Transfer { from, to, amount } => {
                    chain.transfer(addr(from), token, addr(to), Amount::from(amount)).map(|_| ())
                }
                Call::Burn { from, amount } => chain.burn(addr(from), token, Amount::from(amount)).map(|_| ()),
                Call::Distribute { to } => {
                    let recipients: Vec<Address> = to.iter().map(|(r, _)| addr(*r)).collect();
                    let amounts: Vec<Amount> = to.iter().map(|(_, a)| Amount::from(*a)).collect();
                    chain.distribute_tokens(addr(1), token, &recipients, &amounts).map(|_| ())
                }
                Call::SetTransferable(flag) => chain.set_transferable(addr(1), token, flag).map(|_| ()),
                Call::Vote { voter, support } => chain.cast_vote(addr(voter), 1, support).map(|_| ()),
                Call::Advance(secs) => {
                    clock.advance(secs);
                    continue;
                }
                Call::Execute => chain.execute_proposal(addr(4), 1).map(|_| ()),
            };

            if result.is_ok() {
                committed += 1;
            } else {
                prop_assert_eq!(balances(&chain, token), before);
                prop_assert_eq!(chain.get_proposal(1).unwrap(), proposal_before);
            }
            prop_assert_eq!(chain.block_height().unwrap(), committed);
        }

        let sum = Amount::checked_sum(balances(&chain, token)).unwrap();
        prop_assert_eq!(sum, chain.total_supply(token).unwrap());
    }
}
