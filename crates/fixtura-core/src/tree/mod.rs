//! Arbitrary tree
//!
//! The tree is an arena of `ArbitraryNode`s addressed by `NodeId`. Replacing
//! a subtree writes the fresh node into the same slot, so handles held by
//! callers stay valid across resizes and concrete-type re-resolution.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod entry_slot;
pub mod null_inject;
pub mod traverser;

pub use entry_slot::MapPart;
pub use null_inject::{DefaultNullInjectGenerator, NullInjectGenerator};
pub use traverser::{ArbitraryTraverser, ContainerSizeConstraint, TraverseContext};

use crate::arbitrary::{BoxedArbitrary, PostCondition};
use crate::property::{ArbitraryContainerInfo, ArbitraryProperty, Property, PropertyKind};
use crate::types::{Type, Value};
use indexmap::IndexMap;
use std::fmt;

/// Stable handle of a node inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One step of a node's path from the root
#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    Root,
    Property(String),
    Element(usize),
    MapEntry(usize),
    MapPart(MapPart),
    Single,
}

impl PathStep {
    pub fn of(property: &Property) -> Self {
        match &property.kind {
            PropertyKind::Root => PathStep::Root,
            PropertyKind::Field { name }
            | PropertyKind::Constructor { name, .. }
            | PropertyKind::Accessor { name }
            | PropertyKind::Constant { name, .. }
            | PropertyKind::TypeParameter { name }
            | PropertyKind::TypeName { name } => PathStep::Property(name.clone()),
            PropertyKind::Element { sequence, .. } => PathStep::Element(*sequence),
            PropertyKind::MapEntry { sequence } => PathStep::MapEntry(*sequence),
            PropertyKind::MapKey { slot } | PropertyKind::MapValue { slot } => {
                PathStep::MapPart(entry_slot::slot_part(*slot))
            }
            PropertyKind::Single => PathStep::Single,
            PropertyKind::Concrete { abstract_property } => PathStep::of(abstract_property),
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Root => write!(f, "$"),
            PathStep::Property(name) => write!(f, ".{}", name),
            PathStep::Element(index) | PathStep::MapEntry(index) => write!(f, "[{}]", index),
            PathStep::MapPart(part) => write!(f, "{{{}}}", part),
            PathStep::Single => Ok(()),
        }
    }
}

/// Render a path the way expressions address it
pub fn render_path(path: &[PathStep]) -> String {
    let rendered: String = path.iter().map(ToString::to_string).collect();
    if rendered.is_empty() {
        "$".to_string()
    } else {
        rendered
    }
}

/// A generator attached directly to a node, short-circuiting its subtree
pub enum NodeArbitrary {
    Fixed(Value),
    Combinable(BoxedArbitrary),
}

impl fmt::Debug for NodeArbitrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeArbitrary::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            NodeArbitrary::Combinable(_) => write!(f, "Combinable"),
        }
    }
}

/// A generation node
pub struct ArbitraryNode {
    /// The property as declared by the parent
    pub property: Property,
    pub arbitrary_property: ArbitraryProperty,
    /// Concrete candidates of an abstract property, the property itself otherwise
    pub candidates: Vec<Property>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Path from the root, ending with this node's step
    pub path: Vec<PathStep>,
    pub arbitrary: Option<NodeArbitrary>,
    pub post_conditions: Vec<PostCondition>,
}

impl ArbitraryNode {
    pub fn resolved_property(&self) -> &Property {
        self.arbitrary_property.resolved_property()
    }

    pub fn resolved_type(&self) -> &Type {
        &self.resolved_property().ty
    }

    pub fn is_container(&self) -> bool {
        self.arbitrary_property.is_container()
    }

    pub fn container_info(&self) -> Option<&ArbitraryContainerInfo> {
        self.arbitrary_property.container_info()
    }

    pub fn null_inject(&self) -> f64 {
        self.arbitrary_property.null_inject
    }

    pub fn set_null_inject(&mut self, null_inject: f64) {
        self.arbitrary_property.null_inject = null_inject.clamp(0.0, 1.0);
    }

    pub fn step(&self) -> Option<&PathStep> {
        self.path.last()
    }

    pub fn fixed_value(&self) -> Option<&Value> {
        match &self.arbitrary {
            Some(NodeArbitrary::Fixed(value)) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Debug for ArbitraryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArbitraryNode")
            .field("path", &render_path(&self.path))
            .field("type", &self.resolved_type().to_string())
            .field("children", &self.children)
            .field("null_inject", &self.null_inject())
            .field("arbitrary", &self.arbitrary)
            .field("post_conditions", &self.post_conditions.len())
            .finish()
    }
}

/// Arena of nodes with a designated root
#[derive(Debug, Default)]
pub struct ArbitraryTree {
    nodes: Vec<ArbitraryNode>,
    root: Option<NodeId>,
}

impl ArbitraryTree {
    pub(crate) fn push(&mut self, node: ArbitraryNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> NodeId {
        self.root.unwrap_or(NodeId(0))
    }

    pub fn node(&self, id: NodeId) -> &ArbitraryNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ArbitraryNode {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn path_of(&self, id: NodeId) -> String {
        render_path(&self.node(id).path)
    }

    /// Nodes reachable from the root, depth first
    pub fn live_nodes(&self) -> Vec<NodeId> {
        let mut live = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            live.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        live
    }

    /// Put the freshly traversed node `fresh` in the slot of `target`
    ///
    /// The target keeps its parent, null-inject rate and post-conditions; the
    /// displaced node stays in the arena detached from the tree.
    pub(crate) fn graft(&mut self, target: NodeId, fresh: NodeId) {
        if target == fresh {
            return;
        }
        self.nodes.swap(target.0, fresh.0);

        let retired = &mut self.nodes[fresh.0];
        let parent = retired.parent.take();
        let post_conditions = std::mem::take(&mut retired.post_conditions);
        let null_inject = retired.null_inject();
        let manipulated = retired.arbitrary_property.manipulated;
        retired.children.clear();

        let node = &mut self.nodes[target.0];
        node.parent = parent;
        node.post_conditions = post_conditions;
        node.set_null_inject(null_inject);
        node.arbitrary_property.manipulated |= manipulated;

        let children = node.children.clone();
        for child in children {
            self.nodes[child.0].parent = Some(target);
        }
    }

    /// Value of a subtree when every leaf of it is fixed
    pub fn materialized_value(&self, id: NodeId) -> Option<Value> {
        let node = self.node(id);
        if let Some(value) = node.fixed_value() {
            return Some(value.clone());
        }
        if node.children.is_empty() && !node.is_container() {
            return None;
        }
        let values = node
            .children
            .iter()
            .map(|child| self.materialized_value(*child))
            .collect::<Option<Vec<_>>>()?;

        match node.resolved_type() {
            Type::Struct(def, _) => {
                let fields: IndexMap<String, Value> = node
                    .children
                    .iter()
                    .zip(values)
                    .filter_map(|(child, value)| {
                        self.node(*child).property.name().map(|name| (name.to_string(), value))
                    })
                    .collect();
                Some(Value::Object {
                    type_name: def.name.clone(),
                    fields,
                })
            }
            Type::Map(_, _) => values
                .into_iter()
                .map(|entry| match entry {
                    Value::List(mut pair) if pair.len() == 2 => {
                        let value = pair.pop()?;
                        let key = pair.pop()?;
                        Some((key, value))
                    }
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(Value::Map),
            Type::Optional(_) | Type::Supplier(_) => {
                Some(values.into_iter().next().unwrap_or(Value::Null))
            }
            _ => Some(Value::List(values)),
        }
    }

    /// Key or value node of the entry whose materialized key equals `key`
    ///
    /// Entries are never synthesized here; a missing key yields `None`.
    pub fn find_map_entry(&self, map: NodeId, key: &Value, part: MapPart) -> Option<NodeId> {
        self.children(map).iter().find_map(|entry| {
            let slots = self.children(*entry);
            let key_node = slots
                .iter()
                .find(|slot| self.node(**slot).step() == Some(&PathStep::MapPart(MapPart::Key)))?;
            if self.materialized_value(*key_node).as_ref() != Some(key) {
                return None;
            }
            slots
                .iter()
                .find(|slot| self.node(**slot).step() == Some(&PathStep::MapPart(part)))
                .copied()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_path() {
        let path = vec![
            PathStep::Root,
            PathStep::Property("items".into()),
            PathStep::Element(0),
            PathStep::Property("id".into()),
        ];
        assert_eq!(render_path(&path), "$.items[0].id");
        assert_eq!(
            render_path(&[PathStep::Root, PathStep::MapEntry(1), PathStep::MapPart(MapPart::Key)]),
            "$[1]{key}"
        );
        assert_eq!(render_path(&[]), "$");
    }

    #[test]
    fn test_step_of_concrete_uses_origin() {
        let field = Property::field("shape", Type::String, Vec::new());
        let concrete = Property::concrete(&field, Type::I32);
        assert_eq!(PathStep::of(&concrete), PathStep::Property("shape".into()));
        let key = Property::map_key(Type::String, 3);
        assert_eq!(PathStep::of(&key), PathStep::MapPart(MapPart::Key));
    }
}
