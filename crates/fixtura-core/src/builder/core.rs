//! Core ArbitraryBuilder structure and fluent operations
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::derived::DerivedValueManipulator;
use super::types::{ArbitraryBuilderContext, DeferredError};
use crate::arbitrary::{BoxedArbitrary, PostCondition};
use crate::manipulator::{
    ArbitraryManipulator, LimitedNodeManipulator, ManipulatorCategory, NodeAddMapEntryManipulator,
    NodeFilterManipulator, NodeManipulator, NodeNullityManipulator, NodeSetArbitraryManipulator,
    NodeSetDecomposedValueManipulator, NodeSetLazyManipulator, NodeSetMapEntryManipulator,
    NodeSizeManipulator,
};
use crate::options::{GenerateOptions, DEFAULT_ELEMENT_MAX_SIZE};
use crate::property::{ArbitraryContainerInfo, Property};
use crate::resolver::NodeResolver;
use crate::tree::ContainerSizeConstraint;
use crate::types::{Type, Value};
use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;

/// Fluent description of how to generate one type
///
/// Every call records a manipulator; nothing is generated until a terminal
/// operation runs. Each sample traverses a fresh tree, applies the recorded
/// manipulators to it and combines the result, so builders can be sampled
/// any number of times.
///
/// Expression errors are not reported by the fluent calls themselves; the
/// first one is kept and returned by the next terminal operation.
pub struct ArbitraryBuilder {
    pub(super) options: Arc<GenerateOptions>,
    pub(super) root: Property,
    pub(super) context: ArbitraryBuilderContext,
    pub(super) rng: StdRng,
}

impl ArbitraryBuilder {
    pub fn new(options: Arc<GenerateOptions>, root: Property, rng: StdRng) -> Self {
        let context = ArbitraryBuilderContext::new(options.settings.valid_only, options.settings.strict_mode);
        Self {
            options,
            root,
            context,
            rng,
        }
    }

    pub fn root_type(&self) -> &Type {
        &self.root.ty
    }

    pub fn context(&self) -> &ArbitraryBuilderContext {
        &self.context
    }

    fn manipulate(self, expression: &str, manipulator: Arc<dyn NodeManipulator>, category: ManipulatorCategory) -> Self {
        match NodeResolver::parse(expression) {
            Ok(resolver) => self.manipulate_resolved(resolver, manipulator, category),
            Err(error) => self.defer(DeferredError::from_error(expression, error)),
        }
    }

    fn manipulate_resolved(
        mut self,
        resolver: NodeResolver,
        manipulator: Arc<dyn NodeManipulator>,
        category: ManipulatorCategory,
    ) -> Self {
        self.context
            .push_manipulator(ArbitraryManipulator::new(resolver, manipulator, category));
        self
    }

    fn defer(mut self, error: DeferredError) -> Self {
        self.context.defer(error);
        self
    }

    /// Fix the selected nodes to `value`, decomposing it into their subtrees
    pub fn set(self, expression: &str, value: impl Into<Value>) -> Self {
        let manipulator = NodeSetDecomposedValueManipulator::new(value.into());
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::Value)
    }

    /// Fix the whole value, still allowing later calls to override parts of it
    pub fn set_root(self, value: impl Into<Value>) -> Self {
        let manipulator = NodeSetDecomposedValueManipulator::new(value.into());
        self.manipulate_resolved(NodeResolver::root(), Arc::new(manipulator), ManipulatorCategory::Value)
    }

    /// Set the selected nodes to a value computed at each sample
    pub fn set_lazy<F>(self, expression: &str, supplier: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        let manipulator = NodeSetLazyManipulator::new(Arc::new(move || Ok(supplier())));
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::Value)
    }

    /// Set the selected nodes to samples of another builder
    pub fn set_builder(mut self, expression: &str, other: &ArbitraryBuilder) -> Self {
        let source = self.derive_source(other);
        let manipulator = DerivedValueManipulator::new(vec![source], Arc::new(single));
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::Value)
    }

    pub fn set_null(self, expression: &str) -> Self {
        self.manipulate(expression, Arc::new(NodeNullityManipulator::new(true)), ManipulatorCategory::Value)
    }

    pub fn set_not_null(self, expression: &str) -> Self {
        self.manipulate(expression, Arc::new(NodeNullityManipulator::new(false)), ManipulatorCategory::Value)
    }

    /// Like `set`, but for at most `limit` of the selected nodes
    pub fn set_limited(self, expression: &str, value: impl Into<Value>, limit: usize) -> Self {
        let delegate = Arc::new(NodeSetDecomposedValueManipulator::new(value.into()));
        let manipulator = LimitedNodeManipulator::new(delegate, limit);
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::Value)
    }

    /// Bound the element count of the selected containers
    pub fn size(self, expression: &str, min: usize, max: usize) -> Self {
        if min > max {
            return self.defer(DeferredError::Size {
                expression: expression.to_string(),
                min,
                max,
            });
        }
        let resolver = match NodeResolver::parse(expression) {
            Ok(resolver) => resolver,
            Err(error) => return self.defer(DeferredError::from_error(expression, error)),
        };
        let mut builder = self;
        builder.context.push_size_constraint(ContainerSizeConstraint::new(
            resolver.clone(),
            ArbitraryContainerInfo::new(min, max, true),
        ));
        builder.manipulate_resolved(
            resolver,
            Arc::new(NodeSizeManipulator::new(min, max)),
            ManipulatorCategory::ContainerSize,
        )
    }

    pub fn min_size(self, expression: &str, min: usize) -> Self {
        self.size(expression, min, min.saturating_add(DEFAULT_ELEMENT_MAX_SIZE))
    }

    pub fn max_size(self, expression: &str, max: usize) -> Self {
        self.size(expression, max.saturating_sub(DEFAULT_ELEMENT_MAX_SIZE), max)
    }

    /// Require the values generated at the selected nodes to satisfy `predicate`
    pub fn set_post_condition<F>(self, expression: &str, description: &str, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let manipulator = NodeFilterManipulator::new(PostCondition::new(description, predicate));
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::PostCondition)
    }

    /// Generate the selected nodes with a custom arbitrary
    ///
    /// `factory` runs once per sample since arbitraries are consumed by generation.
    pub fn set_arbitrary<F>(self, expression: &str, factory: F) -> Self
    where
        F: Fn() -> BoxedArbitrary + Send + Sync + 'static,
    {
        let manipulator = NodeSetArbitraryManipulator::new(Arc::new(move || Ok(factory())));
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::Value)
    }

    /// Store `value` under `key` in the selected maps, inserting the entry if needed
    pub fn set_map_entry(self, expression: &str, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        let manipulator = NodeSetMapEntryManipulator::new(key.into(), value.into());
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::Value)
    }

    /// Append an entry to the selected maps
    pub fn add_map_entry(self, expression: &str, key: impl Into<Value>, value: impl Into<Value>) -> Self {
        let manipulator = NodeAddMapEntryManipulator::new(key.into(), value.into());
        self.manipulate(expression, Arc::new(manipulator), ManipulatorCategory::Value)
    }

    /// Keep only samples satisfying `predicate`
    pub fn filter<F>(mut self, description: &str, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.context.filters.push(PostCondition::new(description, predicate));
        self
    }

    /// Builder of `target` whose root is this builder's sample passed through `f`
    ///
    /// The derived builder owns a copy of this one; later changes to either
    /// are not seen by the other.
    pub fn map<F>(&self, target: Type, f: F) -> ArbitraryBuilder
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        let mut source = self.copy();
        let rng = StdRng::seed_from_u64(source.rng.gen());
        let combine = move |values: Vec<Value>| -> Result<Value> { f(single(values)?) };
        let manipulator = DerivedValueManipulator::new(vec![source], Arc::new(combine));
        ArbitraryBuilder::new(Arc::clone(&self.options), Property::root(target), rng).manipulate_resolved(
            NodeResolver::root(),
            Arc::new(manipulator),
            ManipulatorCategory::Value,
        )
    }

    /// Builder of `target` combining samples of this builder and `other`
    pub fn zip_with<F>(&self, other: &ArbitraryBuilder, target: Type, f: F) -> ArbitraryBuilder
    where
        F: Fn(Value, Value) -> Result<Value> + Send + Sync + 'static,
    {
        let mut left = self.copy();
        let rng = StdRng::seed_from_u64(left.rng.gen());
        let right = left.derive_source(other);
        let combine = move |values: Vec<Value>| -> Result<Value> {
            let mut values = values.into_iter();
            match (values.next(), values.next()) {
                (Some(left), Some(right)) => f(left, right),
                _ => Err(anyhow::anyhow!("zip_with expects two source samples").into()),
            }
        };
        let manipulator = DerivedValueManipulator::new(vec![left, right], Arc::new(combine));
        ArbitraryBuilder::new(Arc::clone(&self.options), Property::root(target), rng).manipulate_resolved(
            NodeResolver::root(),
            Arc::new(manipulator),
            ManipulatorCategory::Value,
        )
    }

    /// Independent builder with the same manipulators and random state
    ///
    /// Builders captured by `set_builder`, `map` and `zip_with` are copied
    /// too, so the copy replays the original's samples without consuming them.
    pub fn copy(&self) -> ArbitraryBuilder {
        Self {
            options: Arc::clone(&self.options),
            root: self.root.clone(),
            context: self.context.duplicate(),
            rng: self.rng.clone(),
        }
    }

    /// Generate one value and return it on every later sample
    ///
    /// The value is regenerated once the manipulators change.
    pub fn fixed(mut self) -> Self {
        self.context.fixed = true;
        self
    }

    pub fn valid_only(mut self, valid_only: bool) -> Self {
        self.context.valid_only = valid_only;
        self
    }

    /// Never repeat a value within one unique scope
    pub fn unique(mut self) -> Self {
        self.context.unique = true;
        self
    }

    /// Copy of `other` reseeded from this builder
    fn derive_source(&mut self, other: &ArbitraryBuilder) -> ArbitraryBuilder {
        let mut source = other.copy();
        source.rng = StdRng::seed_from_u64(self.rng.gen());
        source
    }
}

fn single(values: Vec<Value>) -> Result<Value> {
    values
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("derived builder produced no sample").into())
}

impl fmt::Debug for ArbitraryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArbitraryBuilder")
            .field("root", &self.root.ty)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
