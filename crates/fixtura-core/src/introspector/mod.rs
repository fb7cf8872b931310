//! Introspectors
//!
//! An introspector turns one tree node, together with the arbitraries already
//! generated for its children, into the node's combinable arbitrary. The
//! generator asks each registered introspector in order; the first one
//! returning `Some` wins.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod container;
pub mod object;
pub mod primitive;

pub use container::ContainerIntrospector;
pub use object::ObjectIntrospector;
pub use primitive::{EnumIntrospector, PrimitiveIntrospector};

use crate::arbitrary::BoxedArbitrary;
use crate::options::FixtureSettings;
use crate::property::Property;
use crate::tree::{ArbitraryNode, ArbitraryTree, NodeId};
use crate::types::Type;
use crate::Result;
use std::sync::Arc;

/// Arbitrary generated for one child node
pub struct ChildArbitrary {
    /// Property name, for children addressed by name
    pub name: Option<String>,
    pub arbitrary: BoxedArbitrary,
}

/// Everything an introspector may look at for one node
pub struct ArbitraryGeneratorContext<'a> {
    pub tree: &'a ArbitraryTree,
    pub node: NodeId,
    pub children: Vec<ChildArbitrary>,
    pub settings: &'a FixtureSettings,
}

impl<'a> ArbitraryGeneratorContext<'a> {
    pub fn new(
        tree: &'a ArbitraryTree,
        node: NodeId,
        children: Vec<ChildArbitrary>,
        settings: &'a FixtureSettings,
    ) -> Self {
        Self {
            tree,
            node,
            children,
            settings,
        }
    }

    pub fn arbitrary_node(&self) -> &ArbitraryNode {
        self.tree.node(self.node)
    }

    pub fn resolved_property(&self) -> &Property {
        self.arbitrary_node().resolved_property()
    }

    pub fn resolved_type(&self) -> &Type {
        self.arbitrary_node().resolved_type()
    }

    pub fn path(&self) -> String {
        self.tree.path_of(self.node)
    }

    /// Move the child arbitraries out of the context
    pub fn take_children(&mut self) -> Vec<ChildArbitrary> {
        std::mem::take(&mut self.children)
    }
}

/// Produces the arbitrary of a node, or `None` when it does not handle the type
pub trait ArbitraryIntrospector: Send + Sync {
    fn introspect(&self, ctx: &mut ArbitraryGeneratorContext<'_>) -> Result<Option<BoxedArbitrary>>;
}

/// Introspectors consulted after any user registrations
pub fn default_introspectors() -> Vec<Arc<dyn ArbitraryIntrospector>> {
    vec![
        Arc::new(PrimitiveIntrospector),
        Arc::new(EnumIntrospector),
        Arc::new(ContainerIntrospector),
        Arc::new(ObjectIntrospector),
    ]
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::arbitrary::{CombinableArbitrary, GenerationContext, UniqueScope, DEFAULT_MAX_TRIES};
    use crate::options::GenerateOptions;
    use crate::tree::{ArbitraryTraverser, TraverseContext};
    use crate::types::Value;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub fn single_node_tree(ty: Type) -> ArbitraryTree {
        let traverser = ArbitraryTraverser::new(Arc::new(GenerateOptions::new(FixtureSettings::default())));
        let mut rng = StdRng::seed_from_u64(0);
        traverser.traverse(&Property::root(ty), &TraverseContext::default(), &mut rng)
    }

    pub fn draw(arbitrary: &mut BoxedArbitrary, seed: u64) -> Value {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut scope = UniqueScope::new();
        let mut ctx = GenerationContext::new(&mut rng, &mut scope, DEFAULT_MAX_TRIES);
        arbitrary.combined(&mut ctx).unwrap()
    }
}
