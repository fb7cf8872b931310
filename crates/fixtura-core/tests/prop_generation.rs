//! Property-based tests for the generation engine
//!
//! These tests check invariants that should hold for every seed, size
//! range and decomposed value.

mod test_support;

use fixtura_core::resolver::Parser;
use fixtura_core::{Error, FixtureMonkey, NodeResolver};
use proptest::prelude::*;
use std::collections::BTreeMap;
use test_support::{count, Item, Order, Shape};

// Strategy functions for property testing

fn item_strategy() -> impl Strategy<Value = Item> {
    ("[a-z0-9]{0,12}", any::<u32>()).prop_map(|(id, qty)| Item { id, qty })
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (-1.0e6f64..1.0e6).prop_map(|radius| Shape::Circle { radius }),
        (-1.0e6f64..1.0e6).prop_map(|side| Shape::Square { side }),
    ]
}

fn order_strategy() -> impl Strategy<Value = Order> {
    (
        "[a-zA-Z0-9-]{0,16}",
        proptest::collection::vec(item_strategy(), 0..5),
        proptest::collection::btree_map("[a-z]{1,8}", any::<i32>(), 0..4),
        shape_strategy(),
        proptest::option::of("[a-z ]{0,20}"),
    )
        .prop_map(|(id, items, tags, shape, note)| Order {
            id,
            items,
            tags,
            shape,
            note,
        })
}

/// Valid path expressions built from the grammar's pieces
fn expression_strategy() -> impl Strategy<Value = String> {
    let selector = prop_oneof![
        (0usize..50).prop_map(|i| format!("[{}]", i)),
        Just("[*]".to_string()),
        Just("[last]".to_string()),
        "[a-z .]{0,6}".prop_map(|key| format!("['{}']", key)),
        Just("{key}".to_string()),
        Just("{value}".to_string()),
    ];
    let segment = (
        prop_oneof!["[a-z_][a-z0-9_]{0,8}", Just("*".to_string())],
        proptest::collection::vec(selector, 0..3),
    )
        .prop_map(|(name, selectors)| format!("{}{}", name, selectors.concat()));
    (any::<bool>(), proptest::collection::vec(segment, 1..5)).prop_map(|(rooted, segments)| {
        let joined = segments.join(".");
        if rooted {
            format!("$.{}", joined)
        } else {
            joined
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_size_constraints_hold(seed in any::<u64>(), min in 0usize..4, extra in 0usize..4) {
        let max = min + extra;
        let fixture = FixtureMonkey::builder().seed(seed).build().unwrap();
        let mut builder = fixture
            .give_me_builder_of::<Order>()
            .size("items", min, max)
            .size("tags", min, max);
        let order = builder.sample().unwrap();
        prop_assert!((min..=max).contains(&count(&order, "items")));
        prop_assert!(count(&order, "tags") <= max);
    }

    #[test]
    fn prop_decomposed_value_round_trips(order in order_strategy(), seed in any::<u64>()) {
        let fixture = FixtureMonkey::builder().seed(seed).build().unwrap();
        let mut builder = fixture.give_me_builder_from(&order).unwrap();
        let sampled: Order = builder.sample_as().unwrap();
        prop_assert_eq!(sampled, order);
    }

    #[test]
    fn prop_same_seed_same_values(seed in any::<u64>()) {
        let first = FixtureMonkey::builder().seed(seed).build().unwrap();
        let second = FixtureMonkey::builder().seed(seed).build().unwrap();
        let a: Vec<Order> = first.give_me(3).unwrap();
        let b: Vec<Order> = second.give_me(3).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_valid_expressions_parse(expression in expression_strategy()) {
        let resolver = NodeResolver::parse(&expression);
        prop_assert!(resolver.is_ok(), "{} failed: {:?}", expression, resolver.err());
        let resolver = resolver.unwrap();
        prop_assert_eq!(resolver.expression(), expression.as_str());
    }

    #[test]
    fn prop_unbalanced_brackets_are_rejected(name in "[a-z]{1,8}", index in 0usize..100) {
        let expression = format!("{}[{}", name, index);
        match Parser::new(&expression).and_then(|parser| parser.parse()) {
            Err(Error::InvalidExpression { expression: reported, .. }) => prop_assert_eq!(reported, expression),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }

    #[test]
    fn prop_tags_keep_keys_when_set(key in "[a-z]{1,8}", value in any::<i32>(), seed in any::<u64>()) {
        let fixture = FixtureMonkey::builder().seed(seed).build().unwrap();
        let mut builder = fixture
            .give_me_builder_of::<Order>()
            .set_map_entry("tags", key.as_str(), value);
        let order: Order = builder.sample_as().unwrap();
        let tags: BTreeMap<String, i32> = order.tags;
        prop_assert_eq!(tags.get(&key), Some(&value));
    }
}
