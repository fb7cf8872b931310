//! Node manipulators
//!
//! A manipulator rewrites the nodes a resolver selects in a freshly traversed
//! tree: it fixes values, changes null probabilities, resizes containers,
//! inserts map entries, or attaches filters and generators. The builder
//! applies them by category: container sizes first, then values in
//! registration order, then post-conditions.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod container;
pub mod node;
pub mod value;

pub use container::{NodeAddMapEntryManipulator, NodeSetMapEntryManipulator, NodeSizeManipulator};
pub use node::{LimitedNodeManipulator, NodeFilterManipulator, NodeNullityManipulator};
pub use value::{
    decompose_value, NodeSetArbitraryManipulator, NodeSetDecomposedValueManipulator,
    NodeSetLazyManipulator,
};

use crate::resolver::NodeResolver;
use crate::tree::{ArbitraryTraverser, ArbitraryTree, NodeId, TraverseContext};
use crate::{Error, Result, StrictMode};
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a manipulator needs besides the tree
pub struct ManipulateContext<'a> {
    pub traverser: &'a ArbitraryTraverser,
    pub traverse_context: &'a TraverseContext,
    pub rng: &'a mut StdRng,
}

pub trait NodeManipulator: Send + Sync {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()>;

    /// Apply to every resolved node
    fn manipulate_all(&self, tree: &mut ArbitraryTree, nodes: &[NodeId], ctx: &mut ManipulateContext<'_>) -> Result<()> {
        nodes.iter().try_for_each(|node| self.manipulate(tree, *node, ctx))
    }

    /// Copy carrying its own state, for manipulators that hold some
    ///
    /// Stateless manipulators return `None` and are shared between copies.
    fn duplicate(&self) -> Option<Arc<dyn NodeManipulator>> {
        None
    }
}

/// Application phase of a manipulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ManipulatorCategory {
    ContainerSize,
    Value,
    PostCondition,
}

/// A manipulator bound to the nodes a resolver selects
#[derive(Clone)]
pub struct ArbitraryManipulator {
    resolver: NodeResolver,
    manipulator: Arc<dyn NodeManipulator>,
    category: ManipulatorCategory,
}

impl ArbitraryManipulator {
    pub fn new(resolver: NodeResolver, manipulator: Arc<dyn NodeManipulator>, category: ManipulatorCategory) -> Self {
        Self {
            resolver,
            manipulator,
            category,
        }
    }

    pub fn resolver(&self) -> &NodeResolver {
        &self.resolver
    }

    pub fn category(&self) -> ManipulatorCategory {
        self.category
    }

    /// Same binding with the manipulator's state copied, if it has any
    pub fn duplicate(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            manipulator: self
                .manipulator
                .duplicate()
                .unwrap_or_else(|| Arc::clone(&self.manipulator)),
            category: self.category,
        }
    }

    /// Resolve the nodes and manipulate them
    ///
    /// An expression matching nothing is an error only in strict mode.
    pub fn apply(&self, tree: &mut ArbitraryTree, ctx: &mut ManipulateContext<'_>, strict_mode: StrictMode) -> Result<()> {
        let nodes = tree.find_all(&self.resolver, ctx.rng)?;
        if nodes.is_empty() {
            return match strict_mode {
                StrictMode::Strict => Err(Error::NoMatchingNode {
                    expression: self.resolver.expression().to_string(),
                }),
                StrictMode::Warn => {
                    log::warn!("Expression '{}' matches no node, skipping", self.resolver);
                    Ok(())
                }
                StrictMode::Lenient => Ok(()),
            };
        }
        debug!(expression = %self.resolver, category = ?self.category, nodes = nodes.len(), "applying manipulator");
        self.manipulator.manipulate_all(tree, &nodes, ctx)
    }
}

impl fmt::Debug for ArbitraryManipulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArbitraryManipulator")
            .field("resolver", &self.resolver.expression())
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::options::{FixtureSettings, GenerateOptions};
    use crate::property::{ArbitraryContainerInfo, Property};
    use crate::resolver::NodeResolver;
    use crate::tree::{ArbitraryTraverser, ArbitraryTree, ContainerSizeConstraint, TraverseContext};
    use crate::types::{InterfaceDef, StructDef, Type};
    use rand::rngs::StdRng;
    use std::sync::Arc;

    pub fn item() -> Type {
        Type::of_struct(
            StructDef::new("Item")
                .field("id", Type::String)
                .field("qty", Type::U32),
        )
    }

    pub fn shape() -> Type {
        let circle = Type::of_struct(StructDef::new("Circle").field("radius", Type::F64));
        let square = Type::of_struct(StructDef::new("Square").field("side", Type::F64));
        Type::of_interface(InterfaceDef::new("Shape").implementation(circle).implementation(square))
    }

    pub fn order() -> Type {
        Type::of_struct(
            StructDef::new("Order")
                .field("id", Type::String)
                .field("items", Type::list(item()))
                .field("tags", Type::map(Type::String, Type::I32))
                .field("shape", shape())
                .field("note", Type::optional(Type::String)),
        )
    }

    pub fn traverser() -> ArbitraryTraverser {
        let settings = FixtureSettings::default().with_default_null_inject(0.5);
        ArbitraryTraverser::new(Arc::new(GenerateOptions::new(settings)))
    }

    pub fn sized(items: usize, tags: usize) -> TraverseContext {
        TraverseContext::new(vec![
            ContainerSizeConstraint::new(
                NodeResolver::parse("items").unwrap(),
                ArbitraryContainerInfo::exact(items, true),
            ),
            ContainerSizeConstraint::new(
                NodeResolver::parse("tags").unwrap(),
                ArbitraryContainerInfo::exact(tags, true),
            ),
        ])
    }

    pub fn order_tree(traverser: &ArbitraryTraverser, context: &TraverseContext, rng: &mut StdRng) -> ArbitraryTree {
        traverser.traverse(&Property::root(order()), context, rng)
    }
}
