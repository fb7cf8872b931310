//! Helpers around generation calls
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::arbitrary::UniqueScope;

pub struct ArbitrarySupports;

impl ArbitrarySupports {
    /// Run `f` with a fresh unique scope
    ///
    /// Samples taken with `sample_in(scope)` inside `f` never repeat a value
    /// of a builder marked `unique()`. The scope is dropped when `f` returns
    /// or unwinds.
    pub fn unique<R>(f: impl FnOnce(&mut UniqueScope) -> R) -> R {
        let mut scope = UniqueScope::new();
        f(&mut scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Type, Value};
    use crate::FixtureMonkey;
    use std::collections::HashSet;

    #[test]
    fn test_unique_scope_never_repeats() {
        let fixture = FixtureMonkey::builder().seed(5).int_range(0, 30).build().unwrap();
        let mut builder = fixture.give_me_builder(Type::U8).unique();
        let values: Vec<Value> = ArbitrarySupports::unique(|scope| {
            (0..20).map(|_| builder.sample_in(scope).unwrap()).collect()
        });
        let distinct: HashSet<String> = values.iter().map(Value::fingerprint).collect();
        assert_eq!(distinct.len(), values.len());
    }

    #[test]
    fn test_scopes_are_independent() {
        let fixture = FixtureMonkey::builder().seed(6).build().unwrap();
        let mut builder = fixture.give_me_builder(Type::Bool).unique();
        for _ in 0..3 {
            let pair = ArbitrarySupports::unique(|scope| {
                vec![builder.sample_in(scope).unwrap(), builder.sample_in(scope).unwrap()]
            });
            assert_ne!(pair[0], pair[1]);
        }
    }
}
