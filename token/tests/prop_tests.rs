use proptest::prelude::*;

use tally_token::{Token, TokenError, TokenParams};
use tally_types::{Address, Amount};

#[derive(Clone, Debug)]
enum Op {
    Transfer { from: u8, to: u8, amount: u64 },
    Mint { to: u8, amount: u64 },
    Burn { from: u8, amount: u64 },
    Distribute { to: Vec<(u8, u64)> },
    SetTransferable(bool),
    SetDistributor { account: u8, enabled: bool },
}

fn addr(seed: u8) -> Address {
    Address::repeat_byte(seed)
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u8..6, 1u8..6, 0u64..400).prop_map(|(from, to, amount)| Op::Transfer { from, to, amount }),
        (1u8..6, 0u64..400).prop_map(|(to, amount)| Op::Mint { to, amount }),
        (1u8..6, 0u64..400).prop_map(|(from, amount)| Op::Burn { from, amount }),
        prop::collection::vec((1u8..6, 0u64..200), 0..4).prop_map(|to| Op::Distribute { to }),
        any::<bool>().prop_map(Op::SetTransferable),
        (1u8..6, any::<bool>()).prop_map(|(account, enabled)| Op::SetDistributor { account, enabled }),
    ]
}

fn new_token(transferable: bool) -> Token {
    let params = TokenParams {
        name: "Prop".into(),
        symbol: "PRP".into(),
        initial_supply: Amount::from(1000u64),
        decimals: 0,
        transferable,
    };
    Token::create(addr(0xAA), addr(1), params).unwrap().0
}

fn holders_sum(token: &Token) -> Amount {
    Amount::checked_sum(token.holders().map(|(_, b)| *b)).unwrap()
}

proptest! {
    /// Balances always sum to total supply, and total supply always equals
    /// minted minus burned.
    #[test]
    fn conservation(transferable in any::<bool>(), ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut token = new_token(transferable);
        let mut minted = Amount::from(1000u64);
        let mut burned = Amount::ZERO;

        for op in ops {
            match op {
                Op::Transfer { from, to, amount } => {
                    let _ = token.transfer(addr(from), addr(to), Amount::from(amount));
                }
                Op::Mint { to, amount } => {
                    if token.mint(addr(1), addr(to), Amount::from(amount)).is_ok() {
                        minted = minted.checked_add(Amount::from(amount)).unwrap();
                    }
                }
                Op::Burn { from, amount } => {
                    if token.burn(addr(from), Amount::from(amount)).is_ok() {
                        burned = burned.checked_add(Amount::from(amount)).unwrap();
                    }
                }
                Op::Distribute { to } => {
                    let recipients: Vec<Address> = to.iter().map(|(r, _)| addr(*r)).collect();
                    let amounts: Vec<Amount> = to.iter().map(|(_, a)| Amount::from(*a)).collect();
                    let _ = token.distribute(addr(1), &recipients, &amounts);
                }
                Op::SetTransferable(flag) => {
                    token.set_transferable(addr(1), flag).unwrap();
                }
                Op::SetDistributor { account, enabled } => {
                    token.set_distributor(addr(1), addr(account), enabled).unwrap();
                }
            }
            prop_assert_eq!(holders_sum(&token), token.total_supply());
            prop_assert_eq!(Some(token.total_supply()), minted.checked_sub(burned));
        }
    }

    /// With the gate closed, a non-distributor never moves tokens to another holder.
    #[test]
    fn closed_gate_blocks_non_distributors(from in 2u8..6, to in 1u8..6, amount in 0u64..100) {
        let mut token = new_token(true);
        token.transfer(addr(1), addr(from), Amount::from(100u64)).unwrap();
        token.set_transferable(addr(1), false).unwrap();

        let before = token.balance_of(&addr(from));
        let err = token.transfer(addr(from), addr(to), Amount::from(amount)).unwrap_err();
        prop_assert_eq!(err, TokenError::TransfersDisabled(addr(from)));
        prop_assert_eq!(token.balance_of(&addr(from)), before);
    }

    /// A failed distribution leaves every balance untouched.
    #[test]
    fn failed_distribution_changes_nothing(
        to in prop::collection::vec((2u8..6, 0u64..800), 1..6),
    ) {
        let mut token = new_token(false);
        let recipients: Vec<Address> = to.iter().map(|(r, _)| addr(*r)).collect();
        let amounts: Vec<Amount> = to.iter().map(|(_, a)| Amount::from(*a)).collect();
        let before: Vec<Amount> = (1u8..6).map(|s| token.balance_of(&addr(s))).collect();

        if token.distribute(addr(1), &recipients, &amounts).is_err() {
            let after: Vec<Amount> = (1u8..6).map(|s| token.balance_of(&addr(s))).collect();
            prop_assert_eq!(before, after);
        }
    }
}
