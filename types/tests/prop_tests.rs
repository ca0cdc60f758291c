use proptest::prelude::*;

use tally_types::{Address, Amount, Timestamp};

proptest! {
    /// Address display -> parse roundtrip.
    #[test]
    fn address_display_parse_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed: Address = addr.to_string().parse().unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Derived addresses differ for distinct nonces of the same deployer.
    #[test]
    fn derived_addresses_are_distinct(seed in 0u8.., a in 0u64..10_000, b in 0u64..10_000) {
        prop_assume!(a != b);
        let deployer = Address::repeat_byte(seed);
        prop_assert_ne!(Address::derive(&deployer, a), Address::derive(&deployer, b));
    }

    /// Amount: checked_add(a, b) matches u128 arithmetic when no overflow.
    #[test]
    fn amount_checked_add(a in 0u128..u128::MAX / 2, b in 0u128..u128::MAX / 2) {
        let sum = Amount::from(a).checked_add(Amount::from(b));
        prop_assert_eq!(sum, Some(Amount::from(a + b)));
    }

    /// Amount: checked_sub returns None exactly when b > a.
    #[test]
    fn amount_checked_sub_underflow(a in 0u128..1_000_000, b in 0u128..1_000_000) {
        let result = Amount::from(a).checked_sub(Amount::from(b));
        if b > a {
            prop_assert!(result.is_none());
        } else {
            prop_assert_eq!(result, Some(Amount::from(a - b)));
        }
    }

    /// Amount: percent is floor(value * pct / 100).
    #[test]
    fn amount_percent_is_floor(value in 0u128..u128::MAX / 200, pct in 0u8..=100) {
        let expected = value * pct as u128 / 100;
        prop_assert_eq!(Amount::from(value).percent(pct), Some(Amount::from(expected)));
    }

    /// Amount: decimal text roundtrip.
    #[test]
    fn amount_decimal_roundtrip(value in any::<u128>()) {
        let amount = Amount::from(value);
        let parsed: Amount = amount.to_string().parse().unwrap();
        prop_assert_eq!(parsed, amount);
        prop_assert_eq!(amount.to_string(), value.to_string());
    }

    /// Timestamp: checked_add_secs agrees with u64 arithmetic.
    #[test]
    fn timestamp_checked_add(base in 0u64..u64::MAX / 2, secs in 0u64..u64::MAX / 2) {
        prop_assert_eq!(
            Timestamp::new(base).checked_add_secs(secs),
            Some(Timestamp::new(base + secs))
        );
    }
}
