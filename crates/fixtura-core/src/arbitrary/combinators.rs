//! Fixed, mapped, filtered and null-injecting arbitraries
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{BoxedArbitrary, CombinableArbitrary, GenerationContext, PostCondition};
use crate::types::Value;
use crate::{Error, Result};
use rand::Rng;
use std::sync::Arc;

/// Tries budget used when no settings are in play
pub const DEFAULT_MAX_TRIES: usize = 1000;

/// Always yields the same value
#[derive(Debug, Clone)]
pub struct FixedCombinableArbitrary {
    value: Value,
}

impl FixedCombinableArbitrary {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl CombinableArbitrary for FixedCombinableArbitrary {
    fn combined(&mut self, _ctx: &mut GenerationContext<'_>) -> Result<Value> {
        Ok(self.value.clone())
    }

    fn clear(&mut self) {}

    fn fixed(&self) -> bool {
        true
    }
}

pub type Mapper = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Applies a transformation to the upstream value
///
/// A transformation failing with a non-retryable error is reported as a
/// `Mapping` error tagged with the node path.
pub struct MappedCombinableArbitrary {
    upstream: BoxedArbitrary,
    path: String,
    mapper: Mapper,
}

impl MappedCombinableArbitrary {
    pub fn new(upstream: BoxedArbitrary, path: impl Into<String>, mapper: Mapper) -> Self {
        Self {
            upstream,
            path: path.into(),
            mapper,
        }
    }

    fn apply(&self, value: Value) -> Result<Value> {
        (self.mapper)(value).map_err(|e| {
            if e.is_retryable() || e.is_exhausted() {
                e
            } else {
                Error::Mapping {
                    path: self.path.clone(),
                    message: e.to_string(),
                    source: Some(Box::new(e)),
                }
            }
        })
    }
}

impl CombinableArbitrary for MappedCombinableArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let value = self.upstream.combined(ctx)?;
        self.apply(value)
    }

    fn raw_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let value = self.upstream.raw_value(ctx)?;
        self.apply(value)
    }

    fn clear(&mut self) {
        self.upstream.clear();
    }

    fn fixed(&self) -> bool {
        self.upstream.fixed()
    }
}

/// Regenerates until every condition accepts the value
pub struct FilteredCombinableArbitrary {
    upstream: BoxedArbitrary,
    conditions: Vec<PostCondition>,
    max_tries: Option<usize>,
}

impl FilteredCombinableArbitrary {
    pub fn new(upstream: BoxedArbitrary, conditions: Vec<PostCondition>) -> Self {
        Self {
            upstream,
            conditions,
            max_tries: None,
        }
    }

    /// Override the context's tries budget
    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = Some(max_tries.max(1));
        self
    }

    fn check(&self, value: &Value) -> Result<()> {
        self.conditions.iter().try_for_each(|c| c.check(value))
    }

    fn describe(&self) -> String {
        self.conditions
            .iter()
            .map(PostCondition::description)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn attempt(&mut self, ctx: &mut GenerationContext<'_>, raw: bool) -> Result<Value> {
        let tries = self.max_tries.unwrap_or(ctx.max_tries);
        let mut last_error: Option<Error> = None;

        for attempt in 1..=tries {
            let outcome = if raw {
                self.upstream.raw_value(ctx)
            } else {
                self.upstream.combined(ctx)
            };
            let rejection = match outcome {
                Ok(value) => match self.check(&value) {
                    Ok(()) => return Ok(value),
                    Err(e) if e.is_retryable() => e,
                    Err(e) => return Err(e),
                },
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            if self.upstream.fixed() {
                return Err(Error::FixedValueFilterMiss {
                    description: format!("{} ({})", self.describe(), rejection),
                });
            }

            tracing::trace!(attempt, error = %rejection, "filtered value rejected");
            last_error = Some(prefer_constrained(last_error, rejection));
            self.upstream.clear();
        }

        let property_names = last_error
            .as_ref()
            .map(Error::constrained_property_names)
            .unwrap_or_default();
        Err(Error::RetryExhausted {
            tries,
            property_names,
            source: last_error.map(Box::new),
        })
    }
}

/// Keep the most informative failure: one naming constrained properties wins
fn prefer_constrained(previous: Option<Error>, latest: Error) -> Error {
    match previous {
        Some(previous)
            if !previous.constrained_property_names().is_empty()
                && latest.constrained_property_names().is_empty() =>
        {
            previous
        }
        _ => latest,
    }
}

impl CombinableArbitrary for FilteredCombinableArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        self.attempt(ctx, false)
    }

    fn raw_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        self.attempt(ctx, true)
    }

    fn clear(&mut self) {
        self.upstream.clear();
    }

    fn fixed(&self) -> bool {
        self.upstream.fixed()
    }
}

/// Yields null with a per-mille probability
pub struct NullInjectCombinableArbitrary {
    upstream: BoxedArbitrary,
    null_inject: f64,
}

impl NullInjectCombinableArbitrary {
    pub fn new(upstream: BoxedArbitrary, null_inject: f64) -> Self {
        Self {
            upstream,
            null_inject: null_inject.clamp(0.0, 1.0),
        }
    }

    fn inject(&self, ctx: &mut GenerationContext<'_>) -> bool {
        let threshold = (self.null_inject * 1000.0).round() as u32;
        threshold > 0 && ctx.rng.gen_range(0..1000) < threshold
    }

    fn produce(&mut self, ctx: &mut GenerationContext<'_>, raw: bool) -> Result<Value> {
        if self.null_inject >= 1.0 {
            // upstream still runs so side effects match a non-null draw
            if raw {
                self.upstream.raw_value(ctx)?;
            } else {
                self.upstream.combined(ctx)?;
            }
            return Ok(Value::Null);
        }
        if self.inject(ctx) {
            return Ok(Value::Null);
        }
        if raw {
            self.upstream.raw_value(ctx)
        } else {
            self.upstream.combined(ctx)
        }
    }
}

impl CombinableArbitrary for NullInjectCombinableArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        self.produce(ctx, false)
    }

    fn raw_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        self.produce(ctx, true)
    }

    fn clear(&mut self) {
        self.upstream.clear();
    }

    fn fixed(&self) -> bool {
        self.null_inject <= 0.0 && self.upstream.fixed()
    }
}
