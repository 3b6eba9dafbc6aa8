//! Property tests for group slug derivation and token amount parsing.

use proptest::prelude::*;
use zkvip_core::{GroupId, TokenAmount};

proptest! {
    #[test]
    fn slug_is_idempotent(name in "\\PC{0,40}") {
        if let Ok(id) = GroupId::from_name(&name) {
            let again = GroupId::from_name(id.as_str()).unwrap();
            prop_assert_eq!(&again, &id);
            prop_assert!(GroupId::parse(id.as_str()).is_ok());
        }
    }

    #[test]
    fn slug_uses_only_safe_characters(name in "\\PC{0,40}") {
        if let Ok(id) = GroupId::from_name(&name) {
            let s = id.as_str();
            prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!s.starts_with('-') && !s.ends_with('-'));
            prop_assert!(!s.contains("--"));
        }
    }

    #[test]
    fn names_differing_only_in_case_and_spacing_collide(words in prop::collection::vec("[a-z0-9]{1,8}", 1..4)) {
        let spaced = words.join("  ");
        let shouted = words.join("_").to_uppercase();
        prop_assert_eq!(GroupId::from_name(&spaced).unwrap(), GroupId::from_name(&shouted).unwrap());
    }

    #[test]
    fn amount_order_matches_integer_order(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let left = TokenAmount::parse_decimal(&format!("{}.{:06}", a / 1_000_000, a % 1_000_000)).unwrap();
        let right = TokenAmount::parse_decimal(&format!("{}.{:06}", b / 1_000_000, b % 1_000_000)).unwrap();
        prop_assert_eq!(left.cmp(&right), a.cmp(&b));
    }
}
