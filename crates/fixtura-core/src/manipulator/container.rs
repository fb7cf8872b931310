//! Container manipulators
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::value::decompose_value;
use super::{ManipulateContext, NodeManipulator};
use crate::property::ArbitraryContainerInfo;
use crate::tree::{ArbitraryTree, MapPart, NodeId};
use crate::types::{Type, Value};
use crate::{Error, Result};

/// Re-traverses a container node with new size bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeSizeManipulator {
    min_size: usize,
    max_size: usize,
}

impl NodeSizeManipulator {
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self { min_size, max_size }
    }
}

impl NodeManipulator for NodeSizeManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()> {
        let info = ArbitraryContainerInfo::new(self.min_size, self.max_size, true);
        let current = tree.node(node);
        let Some(existing) = current.container_info().copied() else {
            return Err(Error::type_mismatch(
                tree.path_of(node),
                "container",
                current.resolved_type(),
            ));
        };
        if existing == info && info.accepts(current.children.len()) {
            return Ok(());
        }
        ctx.traverser
            .traverse_subtree(tree, node, ctx.traverse_context, None, Some(info), ctx.rng);
        Ok(())
    }
}

fn require_map(tree: &ArbitraryTree, node: NodeId) -> Result<()> {
    match tree.node(node).resolved_type() {
        Type::Map(_, _) => Ok(()),
        other => Err(Error::type_mismatch(tree.path_of(node), "map", other)),
    }
}

fn add_entry(
    tree: &mut ArbitraryTree,
    node: NodeId,
    key: &Value,
    value: &Value,
    ctx: &mut ManipulateContext<'_>,
) -> Result<()> {
    require_map(tree, node)?;
    let entry = ctx
        .traverser
        .append_element(tree, node, ctx.traverse_context, ctx.rng)
        .ok_or_else(|| Error::unsupported(format!("no entry generated for map at {}", tree.path_of(node))))?;
    decompose_value(tree, entry, &Value::List(vec![key.clone(), value.clone()]), ctx)
}

/// Appends one entry to a map
#[derive(Debug, Clone)]
pub struct NodeAddMapEntryManipulator {
    key: Value,
    value: Value,
}

impl NodeAddMapEntryManipulator {
    pub fn new(key: Value, value: Value) -> Self {
        Self { key, value }
    }
}

impl NodeManipulator for NodeAddMapEntryManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()> {
        add_entry(tree, node, &self.key, &self.value, ctx)
    }
}

/// Sets the value stored under a key, inserting the entry when the key is absent
#[derive(Debug, Clone)]
pub struct NodeSetMapEntryManipulator {
    key: Value,
    value: Value,
}

impl NodeSetMapEntryManipulator {
    pub fn new(key: Value, value: Value) -> Self {
        Self { key, value }
    }
}

impl NodeManipulator for NodeSetMapEntryManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()> {
        require_map(tree, node)?;
        match tree.find_map_entry(node, &self.key, MapPart::Value) {
            Some(value_node) => decompose_value(tree, value_node, &self.value, ctx),
            None => add_entry(tree, node, &self.key, &self.value, ctx),
        }
    }
}
