//! Terminal operations of ArbitraryBuilder
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::ArbitraryBuilder;
use crate::arbitrary::{
    BoxedArbitrary, CombinableArbitrary, CombinableArbitraryExt, FilteredCombinableArbitrary,
    FixedCombinableArbitrary, GenerationContext, PostCondition, UniqueCombinableArbitrary, UniqueScope,
};
use crate::generator::ArbitraryGenerator;
use crate::manipulator::{ArbitraryManipulator, ManipulateContext};
use crate::options::GenerateOptions;
use crate::property::Property;
use crate::tree::{ArbitraryTraverser, TraverseContext};
use crate::types::Value;
use crate::validator::validation_condition;
use crate::{Result, StrictMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::trace;

/// Traverses, manipulates and combines a fresh tree on every call
struct TreeArbitrary {
    options: Arc<GenerateOptions>,
    root: Property,
    manipulators: Vec<ArbitraryManipulator>,
    traverse_context: TraverseContext,
    strict_mode: StrictMode,
}

impl CombinableArbitrary for TreeArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let traverser = ArbitraryTraverser::new(Arc::clone(&self.options));
        let mut tree = traverser.traverse(&self.root, &self.traverse_context, ctx.rng);
        {
            let mut manipulate = ManipulateContext {
                traverser: &traverser,
                traverse_context: &self.traverse_context,
                rng: &mut *ctx.rng,
            };
            for manipulator in &self.manipulators {
                manipulator.apply(&mut tree, &mut manipulate, self.strict_mode)?;
            }
        }
        let mut arbitrary = ArbitraryGenerator::new(&self.options).generate(&mut tree)?;
        arbitrary.combined(ctx)
    }

    fn clear(&mut self) {}

    fn fixed(&self) -> bool {
        false
    }
}

/// A builder snapshot that can be sampled without further configuration
pub struct BuiltArbitrary {
    arbitrary: BoxedArbitrary,
    rng: StdRng,
    max_tries: usize,
}

impl BuiltArbitrary {
    pub fn sample(&mut self) -> Result<Value> {
        let mut scope = UniqueScope::new();
        self.sample_in(&mut scope)
    }

    pub fn sample_in(&mut self, scope: &mut UniqueScope) -> Result<Value> {
        let mut ctx = GenerationContext::new(&mut self.rng, scope, self.max_tries);
        let value = self.arbitrary.combined(&mut ctx);
        self.arbitrary.clear();
        value
    }

    pub fn is_fixed(&self) -> bool {
        self.arbitrary.fixed()
    }
}

impl ArbitraryBuilder {
    /// Generate one value
    pub fn sample(&mut self) -> Result<Value> {
        let mut scope = UniqueScope::new();
        self.sample_in(&mut scope)
    }

    /// Generate one value, sharing uniqueness with other samples in `scope`
    pub fn sample_in(&mut self, scope: &mut UniqueScope) -> Result<Value> {
        let mut arbitrary = self.assemble(scope)?;
        let max_tries = self.options.settings.max_tries;
        let mut ctx = GenerationContext::new(&mut self.rng, scope, max_tries);
        arbitrary.combined(&mut ctx)
    }

    /// Generate `size` values within one unique scope
    pub fn sample_list(&mut self, size: usize) -> Result<Vec<Value>> {
        let mut scope = UniqueScope::new();
        (0..size).map(|_| self.sample_in(&mut scope)).collect()
    }

    /// Generate one value and deserialize it
    pub fn sample_as<T: DeserializeOwned>(&mut self) -> Result<T> {
        let value = self.sample()?;
        Ok(serde_json::from_value(value.to_json())?)
    }

    /// Snapshot the current configuration
    ///
    /// A fixed builder generates its value here; the snapshot returns it
    /// from every sample.
    pub fn build(&mut self) -> Result<BuiltArbitrary> {
        let mut scope = UniqueScope::new();
        let arbitrary = self.assemble(&mut scope)?;
        Ok(BuiltArbitrary {
            arbitrary,
            rng: StdRng::seed_from_u64(self.rng.gen()),
            max_tries: self.options.settings.max_tries,
        })
    }

    fn tree_arbitrary(&self) -> TreeArbitrary {
        TreeArbitrary {
            options: Arc::clone(&self.options),
            root: self.root.clone(),
            manipulators: self.context.ordered_manipulators(),
            traverse_context: self.context.traverse_context(),
            strict_mode: self.context.strict_mode,
        }
    }

    fn validation(&self) -> Option<PostCondition> {
        self.context
            .valid_only
            .then(|| validation_condition(Arc::clone(&self.options.validator)))
    }

    fn max_tries(&self) -> usize {
        self.options.settings.max_tries
    }

    /// Root arbitrary: the tree, then filters and validation, then uniqueness
    fn assemble(&mut self, scope: &mut UniqueScope) -> Result<BoxedArbitrary> {
        if let Some(deferred) = &self.context.deferred {
            return Err(deferred.to_error());
        }

        let base = if self.context.fixed {
            FixedCombinableArbitrary::new(self.fixed_value(scope)?).boxed()
        } else {
            self.tree_arbitrary().boxed()
        };

        let mut conditions = self.context.filters.clone();
        conditions.extend(self.validation());
        let filtered = if conditions.is_empty() {
            base
        } else {
            FilteredCombinableArbitrary::new(base, conditions)
                .with_max_tries(self.max_tries())
                .boxed()
        };

        Ok(if self.context.unique {
            UniqueCombinableArbitrary::new(filtered, self.root.ty.raw_name()).boxed()
        } else {
            filtered
        })
    }

    /// Value of a fixed builder, generated once per manipulator revision
    fn fixed_value(&mut self, scope: &mut UniqueScope) -> Result<Value> {
        if let Some(value) = self.context.current_fixed_value() {
            return Ok(value.clone());
        }

        let mut arbitrary = self.tree_arbitrary().boxed();
        if let Some(validation) = self.validation() {
            arbitrary = FilteredCombinableArbitrary::new(arbitrary, vec![validation])
                .with_max_tries(self.max_tries())
                .boxed();
        }
        let max_tries = self.max_tries();
        let value = arbitrary.combined(&mut GenerationContext::new(&mut self.rng, scope, max_tries))?;
        trace!(revision = self.context.revision(), "fixed builder value generated");
        self.context.fixed_value = Some((value.clone(), self.context.revision()));
        Ok(value)
    }
}
