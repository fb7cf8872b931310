//! Uniqueness within a scope
//!
//! A `UniqueScope` records, per type label, the fingerprints of values already
//! produced. It is an owned value: a generation opens one, threads it through
//! `GenerationContext`, and it is released when dropped, whichever way the
//! generation ends.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{BoxedArbitrary, CombinableArbitrary, GenerationContext};
use crate::types::Value;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Values already used, keyed by type label
#[derive(Debug, Default)]
pub struct UniqueScope {
    used: HashMap<String, HashSet<String>>,
}

impl UniqueScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, type_label: &str, value: &Value) -> bool {
        self.used
            .get(type_label)
            .map(|values| values.contains(&value.fingerprint()))
            .unwrap_or(false)
    }

    /// Record a value; false when it was already used
    pub fn insert(&mut self, type_label: &str, value: &Value) -> bool {
        self.used
            .entry(type_label.to_string())
            .or_default()
            .insert(value.fingerprint())
    }

    /// Number of values recorded across all labels
    pub fn len(&self) -> usize {
        self.used.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for UniqueScope {
    fn drop(&mut self) {
        if !self.used.is_empty() {
            tracing::debug!(labels = self.used.len(), values = self.len(), "unique scope closed");
        }
    }
}

/// Rejects values already used in the current scope
pub struct UniqueCombinableArbitrary {
    upstream: BoxedArbitrary,
    type_label: String,
}

impl UniqueCombinableArbitrary {
    pub fn new(upstream: BoxedArbitrary, type_label: impl Into<String>) -> Self {
        Self {
            upstream,
            type_label: type_label.into(),
        }
    }

    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    /// Whether a shrunk candidate may replace the current value
    ///
    /// Generation never shrinks. This is the hook for a shrinker driving
    /// the same scope: a candidate already used in the scope is refused,
    /// and an accepted one is recorded so later shrinks cannot repeat it.
    pub fn accept_shrink(&self, scope: &mut UniqueScope, candidate: &Value) -> bool {
        scope.insert(&self.type_label, candidate)
    }
}

impl CombinableArbitrary for UniqueCombinableArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let tries = ctx.max_tries;
        for _ in 0..tries {
            let value = self.upstream.combined(ctx)?;
            if ctx.scope.insert(&self.type_label, &value) {
                return Ok(value);
            }
            if self.upstream.fixed() {
                break;
            }
            self.upstream.clear();
        }
        Err(Error::UniqueExhausted {
            type_label: self.type_label.clone(),
            tries,
        })
    }

    fn clear(&mut self) {
        self.upstream.clear();
    }

    fn fixed(&self) -> bool {
        false
    }
}
