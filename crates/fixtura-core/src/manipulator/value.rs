//! Value manipulators
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{ManipulateContext, NodeManipulator};
use crate::arbitrary::BoxedArbitrary;
use crate::property::ArbitraryContainerInfo;
use crate::tree::{ArbitraryTree, NodeArbitrary, NodeId};
use crate::types::{Type, Value};
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Fix a node, and every node below it, to the parts of `value`
///
/// Abstract nodes switch to the candidate named by an object's type name.
/// Containers are re-traversed to the value's element count unless their
/// size came from a user directive, in which case only the elements that
/// exist in both are set.
pub fn decompose_value(
    tree: &mut ArbitraryTree,
    id: NodeId,
    value: &Value,
    ctx: &mut ManipulateContext<'_>,
) -> Result<()> {
    {
        let node = tree.node_mut(id);
        node.set_null_inject(0.0);
        node.arbitrary_property.manipulated = true;
        if value.is_null() {
            node.arbitrary = Some(NodeArbitrary::Fixed(Value::Null));
            return Ok(());
        }
        node.arbitrary = None;
    }

    resolve_concrete(tree, id, value, ctx)?;

    let node = tree.node(id);
    let ty = node.resolved_type().clone();
    if !value.is_assignable_to(&ty) {
        return Err(Error::type_mismatch(tree.path_of(id), &ty, value.type_label()));
    }

    if let Some(info) = node.container_info().copied() {
        let count = element_count(&ty, value);
        if !info.manipulated && tree.children(id).len() != count && !matches!(ty, Type::Entry(_, _)) {
            ctx.traverser.traverse_subtree(
                tree,
                id,
                ctx.traverse_context,
                None,
                Some(ArbitraryContainerInfo::exact(count, false)),
                ctx.rng,
            );
        }
        let children: Vec<NodeId> = tree.children(id).iter().take(count).copied().collect();
        return decompose_children(tree, &children, value, ctx);
    }

    let children = tree.children(id).to_vec();
    if children.is_empty() {
        tree.node_mut(id).arbitrary = Some(NodeArbitrary::Fixed(value.clone()));
        return Ok(());
    }
    decompose_children(tree, &children, value, ctx)
}

fn decompose_children(
    tree: &mut ArbitraryTree,
    children: &[NodeId],
    value: &Value,
    ctx: &mut ManipulateContext<'_>,
) -> Result<()> {
    for child in children {
        let part = tree
            .node(*child)
            .property
            .get_value(value)
            .map_err(|e| match e {
                Error::TypeMismatch { expected, found, .. } => Error::TypeMismatch {
                    path: tree.path_of(*child),
                    expected,
                    found,
                },
                other => other,
            })?;
        decompose_value(tree, *child, &part, ctx)?;
    }
    Ok(())
}

/// Switch an abstract node to the candidate the value names
fn resolve_concrete(tree: &mut ArbitraryTree, id: NodeId, value: &Value, ctx: &mut ManipulateContext<'_>) -> Result<()> {
    let node = tree.node(id);
    let Some(type_name) = value.type_name() else {
        return Ok(());
    };
    if node.candidates.is_empty() || node.resolved_type().raw_name() == type_name {
        return Ok(());
    }
    let candidate = node
        .candidates
        .iter()
        .find(|candidate| candidate.ty.raw_name() == type_name)
        .cloned()
        .ok_or_else(|| Error::type_mismatch(tree.path_of(id), &node.property.ty, type_name))?;
    ctx.traverser
        .traverse_subtree(tree, id, ctx.traverse_context, Some(candidate), None, ctx.rng);
    Ok(())
}

fn element_count(ty: &Type, value: &Value) -> usize {
    match ty {
        Type::Optional(_) | Type::Supplier(_) => usize::from(!value.is_null()),
        _ => value.element_count().unwrap_or(0),
    }
}

/// Sets a node to a concrete value
#[derive(Debug, Clone)]
pub struct NodeSetDecomposedValueManipulator {
    value: Value,
}

impl NodeSetDecomposedValueManipulator {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl NodeManipulator for NodeSetDecomposedValueManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()> {
        decompose_value(tree, node, &self.value, ctx)
    }
}

pub type ValueSupplier = Arc<dyn Fn() -> Result<Value> + Send + Sync>;

/// Sets nodes to a value computed when the manipulator is applied
///
/// The supplier runs once per application, shared by every matched node.
#[derive(Clone)]
pub struct NodeSetLazyManipulator {
    supplier: ValueSupplier,
}

impl NodeSetLazyManipulator {
    pub fn new(supplier: ValueSupplier) -> Self {
        Self { supplier }
    }
}

impl NodeManipulator for NodeSetLazyManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()> {
        self.manipulate_all(tree, &[node], ctx)
    }

    fn manipulate_all(&self, tree: &mut ArbitraryTree, nodes: &[NodeId], ctx: &mut ManipulateContext<'_>) -> Result<()> {
        let value = (self.supplier)()?;
        nodes
            .iter()
            .try_for_each(|node| decompose_value(tree, *node, &value, ctx))
    }
}

impl fmt::Debug for NodeSetLazyManipulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSetLazyManipulator").finish_non_exhaustive()
    }
}

pub type ArbitraryFactory = Arc<dyn Fn() -> Result<BoxedArbitrary> + Send + Sync>;

/// Attaches a generator to each node, replacing its subtree
#[derive(Clone)]
pub struct NodeSetArbitraryManipulator {
    factory: ArbitraryFactory,
}

impl NodeSetArbitraryManipulator {
    pub fn new(factory: ArbitraryFactory) -> Self {
        Self { factory }
    }
}

impl NodeManipulator for NodeSetArbitraryManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, _ctx: &mut ManipulateContext<'_>) -> Result<()> {
        let arbitrary = (self.factory)()?;
        let node = tree.node_mut(node);
        node.arbitrary = Some(NodeArbitrary::Combinable(arbitrary));
        node.arbitrary_property.manipulated = true;
        Ok(())
    }
}

impl fmt::Debug for NodeSetArbitraryManipulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSetArbitraryManipulator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use crate::arbitrary::{CombinableArbitraryExt, FixedCombinableArbitrary};
    use crate::resolver::NodeResolver;
    use crate::tree::TraverseContext;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn find_one(tree: &mut ArbitraryTree, expression: &str, rng: &mut StdRng) -> NodeId {
        let found = tree.find_all(&NodeResolver::parse(expression).unwrap(), rng).unwrap();
        assert_eq!(found.len(), 1, "{expression}");
        found[0]
    }

    fn item_value(id: &str, qty: u32) -> Value {
        Value::object("Item", [("id", Value::from(id)), ("qty", Value::from(qty))])
    }

    #[test]
    fn test_leaf_is_fixed() {
        let traverser = traverser();
        let context = sized(2, 0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let id = find_one(&mut tree, "items[0].id", &mut rng);
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        NodeSetDecomposedValueManipulator::new(Value::from("fixed-id"))
            .manipulate(&mut tree, id, &mut ctx)
            .unwrap();
        assert_eq!(tree.node(id).fixed_value(), Some(&Value::from("fixed-id")));
        assert!(tree.node(id).arbitrary_property.manipulated);
    }

    #[test]
    fn test_type_mismatch_names_path_and_types() {
        let traverser = traverser();
        let context = sized(1, 0);
        let mut rng = StdRng::seed_from_u64(2);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let id = find_one(&mut tree, "items[0].qty", &mut rng);
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        match decompose_value(&mut tree, id, &Value::from("many"), &mut ctx) {
            Err(Error::TypeMismatch { path, expected, found }) => {
                assert_eq!(path, "$.items[0].qty");
                assert_eq!(expected, "u32");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unsized_container_follows_value() {
        let traverser = traverser();
        let context = TraverseContext::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let items = find_one(&mut tree, "items", &mut rng);
        let value = Value::List(vec![item_value("a", 1), item_value("b", 2), item_value("c", 3), item_value("d", 4)]);
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        decompose_value(&mut tree, items, &value, &mut ctx).unwrap();
        assert_eq!(tree.children(items).len(), 4);
        assert_eq!(tree.materialized_value(items), Some(value));
    }

    #[test]
    fn test_user_sized_container_keeps_size() {
        let traverser = traverser();
        let context = sized(2, 0);
        let mut rng = StdRng::seed_from_u64(4);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let items = find_one(&mut tree, "items", &mut rng);
        let value = Value::List(vec![item_value("a", 1), item_value("b", 2), item_value("c", 3)]);
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        decompose_value(&mut tree, items, &value, &mut ctx).unwrap();
        assert_eq!(tree.children(items).len(), 2);
        assert_eq!(
            tree.materialized_value(items),
            Some(Value::List(vec![item_value("a", 1), item_value("b", 2)]))
        );
    }

    #[test]
    fn test_interface_switches_to_named_candidate() {
        let traverser = traverser();
        let context = sized(0, 0);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..5 {
            let mut tree = order_tree(&traverser, &context, &mut rng);
            let shape = find_one(&mut tree, "shape", &mut rng);
            let square = Value::object("Square", [("side", Value::Float(2.0))]);
            let mut ctx = ManipulateContext {
                traverser: &traverser,
                traverse_context: &context,
                rng: &mut rng,
            };
            decompose_value(&mut tree, shape, &square, &mut ctx).unwrap();
            assert_eq!(tree.node(shape).resolved_type().raw_name(), "Square");
            assert_eq!(tree.materialized_value(shape), Some(square));
        }
    }

    #[test]
    fn test_unknown_implementation_is_a_mismatch() {
        let traverser = traverser();
        let context = sized(0, 0);
        let mut rng = StdRng::seed_from_u64(6);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let shape = find_one(&mut tree, "shape", &mut rng);
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        let triangle = Value::object("Triangle", [("base", Value::Float(1.0))]);
        assert!(matches!(
            decompose_value(&mut tree, shape, &triangle, &mut ctx),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_null_and_optional() {
        let traverser = traverser();
        let context = sized(0, 0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let note = find_one(&mut tree, "note", &mut rng);
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        decompose_value(&mut tree, note, &Value::from("hello"), &mut ctx).unwrap();
        assert_eq!(tree.materialized_value(note), Some(Value::from("hello")));

        decompose_value(&mut tree, note, &Value::Null, &mut ctx).unwrap();
        assert_eq!(tree.node(note).fixed_value(), Some(&Value::Null));
    }

    #[test]
    fn test_lazy_supplier_runs_once_per_application() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let traverser = traverser();
        let context = sized(3, 0);
        let mut rng = StdRng::seed_from_u64(8);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let ids = tree
            .find_all(&NodeResolver::parse("items[*].id").unwrap(), &mut rng)
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let manipulator = NodeSetLazyManipulator::new(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from("lazy"))
        }));
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        manipulator.manipulate_all(&mut tree, &ids, &mut ctx).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for id in ids {
            assert_eq!(tree.node(id).fixed_value(), Some(&Value::from("lazy")));
        }
    }

    #[test]
    fn test_set_arbitrary_attaches_generator() {
        let traverser = traverser();
        let context = sized(0, 0);
        let mut rng = StdRng::seed_from_u64(9);
        let mut tree = order_tree(&traverser, &context, &mut rng);
        let id = find_one(&mut tree, "id", &mut rng);
        let manipulator = NodeSetArbitraryManipulator::new(Arc::new(|| {
            Ok(FixedCombinableArbitrary::new(Value::from("generated")).boxed())
        }));
        let mut ctx = ManipulateContext {
            traverser: &traverser,
            traverse_context: &context,
            rng: &mut rng,
        };
        manipulator.manipulate(&mut tree, id, &mut ctx).unwrap();
        assert!(matches!(tree.node(id).arbitrary, Some(NodeArbitrary::Combinable(_))));
    }
}
