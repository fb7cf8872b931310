//! Combinable arbitraries
//!
//! A `CombinableArbitrary` is a lazily combined value producer. Every call to
//! `combined` yields a fresh value unless the arbitrary is `fixed`; `clear`
//! drops intermediate state so the next call regenerates. Composition happens
//! through wrappers: filter with retry, map, null injection, uniqueness, and
//! object or container assembly over child arbitraries.
//!
//! All randomness and uniqueness state flows through an explicit
//! `GenerationContext`.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod combinators;
pub mod composite;
pub mod lazy;
pub mod unique;

pub use combinators::{
    FilteredCombinableArbitrary, FixedCombinableArbitrary, MappedCombinableArbitrary,
    NullInjectCombinableArbitrary, DEFAULT_MAX_TRIES,
};
pub use composite::{ContainerCombinableArbitrary, ObjectCombinableArbitrary};
pub use lazy::{LazyArbitrary, LazyCombinableArbitrary};
pub use unique::{UniqueCombinableArbitrary, UniqueScope};

use crate::types::Value;
use crate::{Error, Result};
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;

/// State threaded through one generation
pub struct GenerationContext<'a> {
    pub rng: &'a mut StdRng,
    pub scope: &'a mut UniqueScope,
    /// Tries budget for filters and uniqueness
    pub max_tries: usize,
}

impl<'a> GenerationContext<'a> {
    pub fn new(rng: &'a mut StdRng, scope: &'a mut UniqueScope, max_tries: usize) -> Self {
        Self {
            rng,
            scope,
            max_tries: max_tries.max(1),
        }
    }
}

/// Lazily combined value producer
pub trait CombinableArbitrary: Send {
    /// The final value
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value>;

    /// The value before final assembly
    fn raw_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        self.combined(ctx)
    }

    /// Drop cached intermediate state; no-op when fixed
    fn clear(&mut self);

    /// Whether every call yields the same value
    fn fixed(&self) -> bool;
}

pub type BoxedArbitrary = Box<dyn CombinableArbitrary>;

impl CombinableArbitrary for BoxedArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        (**self).combined(ctx)
    }

    fn raw_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        (**self).raw_value(ctx)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn fixed(&self) -> bool {
        (**self).fixed()
    }
}

type Check = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// A condition generated values must satisfy
#[derive(Clone)]
pub struct PostCondition {
    description: String,
    check: Check,
}

impl PostCondition {
    /// Condition from a boolean predicate; rejections are `FilterRejected`
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let description = description.into();
        let rejected = description.clone();
        Self {
            description,
            check: Arc::new(move |value| {
                if predicate(value) {
                    Ok(())
                } else {
                    Err(Error::FilterRejected {
                        description: rejected.clone(),
                    })
                }
            }),
        }
    }

    /// Condition reporting its own error
    pub fn checked<F>(description: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            check: Arc::new(check),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn check(&self, value: &Value) -> Result<()> {
        (self.check)(value)
    }
}

impl fmt::Debug for PostCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Combinators available on every arbitrary
pub trait CombinableArbitraryExt: CombinableArbitrary + Sized + 'static {
    fn boxed(self) -> BoxedArbitrary {
        Box::new(self)
    }

    fn filter(self, condition: PostCondition) -> FilteredCombinableArbitrary {
        FilteredCombinableArbitrary::new(self.boxed(), vec![condition])
    }

    fn map<F>(self, path: impl Into<String>, mapper: F) -> MappedCombinableArbitrary
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        MappedCombinableArbitrary::new(self.boxed(), path, Arc::new(mapper))
    }

    fn inject_null(self, null_inject: f64) -> NullInjectCombinableArbitrary {
        NullInjectCombinableArbitrary::new(self.boxed(), null_inject)
    }

    fn unique(self, type_label: impl Into<String>) -> UniqueCombinableArbitrary {
        UniqueCombinableArbitrary::new(self.boxed(), type_label)
    }
}

impl<T: CombinableArbitrary + 'static> CombinableArbitraryExt for T {}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use rand::SeedableRng;

    /// Arbitrary counting up from zero
    pub struct Counter {
        pub next: i64,
    }

    impl CombinableArbitrary for Counter {
        fn combined(&mut self, _ctx: &mut GenerationContext<'_>) -> Result<Value> {
            self.next += 1;
            Ok(Value::Int(self.next - 1))
        }

        fn clear(&mut self) {}

        fn fixed(&self) -> bool {
            false
        }
    }

    pub fn with_context<R>(f: impl FnOnce(&mut GenerationContext<'_>) -> R) -> R {
        let mut rng = StdRng::seed_from_u64(42);
        let mut scope = UniqueScope::new();
        let mut ctx = GenerationContext::new(&mut rng, &mut scope, DEFAULT_MAX_TRIES);
        f(&mut ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    fn test_post_condition_reports_description() {
        let positive = PostCondition::new("positive", |v| v.as_i64().map(|i| i > 0).unwrap_or(false));
        assert!(positive.check(&Value::Int(1)).is_ok());
        match positive.check(&Value::Int(-1)) {
            Err(Error::FilterRejected { description }) => assert_eq!(description, "positive"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_extension_chain() {
        with_context(|ctx| {
            let mut arbitrary = Counter { next: 0 }
                .filter(PostCondition::new("even", |v| v.as_i64().unwrap_or(1) % 2 == 0))
                .map("$", |v| Ok(Value::Int(v.as_i64().unwrap_or_default() * 10)));
            assert_eq!(arbitrary.combined(ctx).unwrap(), Value::Int(0));
            assert_eq!(arbitrary.combined(ctx).unwrap(), Value::Int(20));
        });
    }
}
