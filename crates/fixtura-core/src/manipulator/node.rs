//! Nullity, filter and limiting manipulators
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{ManipulateContext, NodeManipulator};
use crate::arbitrary::PostCondition;
use crate::tree::{ArbitraryTree, NodeArbitrary, NodeId};
use crate::types::Value;
use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Forces a node to be always null or never null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeNullityManipulator {
    to_null: bool,
}

impl NodeNullityManipulator {
    pub fn new(to_null: bool) -> Self {
        Self { to_null }
    }
}

impl NodeManipulator for NodeNullityManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, _ctx: &mut ManipulateContext<'_>) -> Result<()> {
        let node = tree.node_mut(node);
        node.arbitrary_property.manipulated = true;
        if self.to_null {
            node.set_null_inject(1.0);
        } else {
            node.set_null_inject(0.0);
            if matches!(node.arbitrary, Some(NodeArbitrary::Fixed(Value::Null))) {
                node.arbitrary = None;
            }
        }
        Ok(())
    }
}

/// Adds a post-condition to each node
#[derive(Debug, Clone)]
pub struct NodeFilterManipulator {
    condition: PostCondition,
}

impl NodeFilterManipulator {
    pub fn new(condition: PostCondition) -> Self {
        Self { condition }
    }
}

impl NodeManipulator for NodeFilterManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, _ctx: &mut ManipulateContext<'_>) -> Result<()> {
        tree.node_mut(node).post_conditions.push(self.condition.clone());
        Ok(())
    }
}

/// Applies its delegate to at most `limit` of the resolved nodes
#[derive(Clone)]
pub struct LimitedNodeManipulator {
    delegate: Arc<dyn NodeManipulator>,
    limit: usize,
}

impl LimitedNodeManipulator {
    pub fn new(delegate: Arc<dyn NodeManipulator>, limit: usize) -> Self {
        Self { delegate, limit }
    }
}

impl NodeManipulator for LimitedNodeManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()> {
        self.manipulate_all(tree, &[node], ctx)
    }

    fn manipulate_all(&self, tree: &mut ArbitraryTree, nodes: &[NodeId], ctx: &mut ManipulateContext<'_>) -> Result<()> {
        let limited = &nodes[..nodes.len().min(self.limit)];
        self.delegate.manipulate_all(tree, limited, ctx)
    }

    fn duplicate(&self) -> Option<Arc<dyn NodeManipulator>> {
        let delegate = self.delegate.duplicate()?;
        Some(Arc::new(Self::new(delegate, self.limit)))
    }
}

impl fmt::Debug for LimitedNodeManipulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitedNodeManipulator")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
