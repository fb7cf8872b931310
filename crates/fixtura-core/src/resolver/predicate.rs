//! Next-node predicates
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::tree::{ArbitraryTree, MapPart, NodeId, PathStep};
use crate::types::{Type, Value};
use crate::{Error, Result};
use std::fmt;

/// Container position selected by an index token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerIndex {
    At(usize),
    All,
}

impl ContainerIndex {
    pub fn matches(&self, index: usize) -> bool {
        match self {
            ContainerIndex::At(expected) => *expected == index,
            ContainerIndex::All => true,
        }
    }
}

/// One link of a resolver's predicate chain
#[derive(Debug, Clone, PartialEq)]
pub enum NextNodePredicate {
    Root,
    Property(String),
    AnyProperty,
    Index(ContainerIndex),
    MapPart(MapPart),
    /// Most recently added element of a container
    LastEntry,
    /// Entry whose materialized key equals the value
    EntryWithKey(Value),
}

impl NextNodePredicate {
    /// Positional test used when matching a whole path
    pub fn test_step(&self, step: &PathStep) -> bool {
        match (self, step) {
            (NextNodePredicate::Root, PathStep::Root) => true,
            (NextNodePredicate::Property(name), PathStep::Property(actual)) => name == actual,
            (NextNodePredicate::AnyProperty, PathStep::Property(_)) => true,
            (NextNodePredicate::Index(index), PathStep::Element(actual))
            | (NextNodePredicate::Index(index), PathStep::MapEntry(actual)) => index.matches(*actual),
            (NextNodePredicate::Index(index), PathStep::Single) => index.matches(0),
            (NextNodePredicate::MapPart(part), PathStep::MapPart(actual)) => part == actual,
            (NextNodePredicate::LastEntry, PathStep::Element(_))
            | (NextNodePredicate::LastEntry, PathStep::MapEntry(_)) => true,
            _ => false,
        }
    }

    /// Nodes reached from `id` by this predicate in a live tree
    pub fn select(&self, tree: &ArbitraryTree, id: NodeId, expression: &str) -> Result<Vec<NodeId>> {
        let node = tree.node(id);
        let step_matches = |child: &NodeId| {
            tree.node(*child)
                .step()
                .map(|step| self.test_step(step))
                .unwrap_or(false)
        };

        match self {
            NextNodePredicate::Root => Ok(if id == tree.root() { vec![id] } else { Vec::new() }),
            NextNodePredicate::Property(_) | NextNodePredicate::AnyProperty => Ok(object_children(tree, id)
                .into_iter()
                .filter(step_matches)
                .collect()),
            NextNodePredicate::Index(_) => {
                require_container(tree, id, expression, "index")?;
                Ok(node.children.iter().filter(|c| step_matches(*c)).copied().collect())
            }
            NextNodePredicate::MapPart(part) => {
                if !matches!(node.resolved_type(), Type::Entry(_, _)) {
                    return Err(Error::invalid_expression(
                        expression,
                        format!(
                            "map part {{{}}} applied to non-entry node {} of type {}",
                            part,
                            tree.path_of(id),
                            node.resolved_type()
                        ),
                        None,
                    ));
                }
                Ok(node.children.iter().filter(|c| step_matches(*c)).copied().collect())
            }
            NextNodePredicate::LastEntry => {
                require_container(tree, id, expression, "last entry")?;
                Ok(node.children.last().copied().into_iter().collect())
            }
            NextNodePredicate::EntryWithKey(key) => {
                require_container(tree, id, expression, "entry key")?;
                Ok(tree
                    .find_map_entry(id, key, MapPart::Key)
                    .and_then(|key_node| tree.node(key_node).parent)
                    .into_iter()
                    .collect())
            }
        }
    }
}

fn require_container(tree: &ArbitraryTree, id: NodeId, expression: &str, selector: &str) -> Result<()> {
    let node = tree.node(id);
    if node.is_container() {
        Ok(())
    } else {
        Err(Error::invalid_expression(
            expression,
            format!(
                "{} selector applied to non-container node {} of type {}",
                selector,
                tree.path_of(id),
                node.resolved_type()
            ),
            None,
        ))
    }
}

/// Children addressed by property names, looking through optional wrappers
fn object_children(tree: &ArbitraryTree, id: NodeId) -> Vec<NodeId> {
    let node = tree.node(id);
    match node.resolved_type() {
        Type::Optional(_) | Type::Supplier(_) => node
            .children
            .iter()
            .flat_map(|child| object_children(tree, *child))
            .collect(),
        _ => node.children.clone(),
    }
}

impl fmt::Display for NextNodePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextNodePredicate::Root => write!(f, "$"),
            NextNodePredicate::Property(name) => write!(f, ".{}", name),
            NextNodePredicate::AnyProperty => write!(f, ".*"),
            NextNodePredicate::Index(ContainerIndex::At(index)) => write!(f, "[{}]", index),
            NextNodePredicate::Index(ContainerIndex::All) => write!(f, "[*]"),
            NextNodePredicate::MapPart(part) => write!(f, "{{{}}}", part),
            NextNodePredicate::LastEntry => write!(f, "[last]"),
            NextNodePredicate::EntryWithKey(Value::Str(key)) => write!(f, "['{}']", key),
            NextNodePredicate::EntryWithKey(key) => write!(f, "[key={}]", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_matching() {
        let items = NextNodePredicate::Property("items".into());
        assert!(items.test_step(&PathStep::Property("items".into())));
        assert!(!items.test_step(&PathStep::Property("other".into())));
        assert!(NextNodePredicate::AnyProperty.test_step(&PathStep::Property("x".into())));
        assert!(!NextNodePredicate::AnyProperty.test_step(&PathStep::Element(0)));

        let all = NextNodePredicate::Index(ContainerIndex::All);
        assert!(all.test_step(&PathStep::Element(4)));
        assert!(all.test_step(&PathStep::MapEntry(1)));
        let second = NextNodePredicate::Index(ContainerIndex::At(1));
        assert!(second.test_step(&PathStep::Element(1)));
        assert!(!second.test_step(&PathStep::Element(0)));

        let key = NextNodePredicate::MapPart(MapPart::Key);
        assert!(key.test_step(&PathStep::MapPart(MapPart::Key)));
        assert!(!key.test_step(&PathStep::MapPart(MapPart::Value)));
    }

    #[test]
    fn test_display() {
        let rendered: String = [
            NextNodePredicate::Root,
            NextNodePredicate::Property("a".into()),
            NextNodePredicate::Index(ContainerIndex::All),
            NextNodePredicate::MapPart(MapPart::Value),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(rendered, "$.a[*]{value}");
    }
}
