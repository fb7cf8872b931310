//! Node resolution
//!
//! A `NodeResolver` is a chain of `NextNodePredicate`s parsed from a path
//! expression such as `items[*].tags{key}`. It either matches whole paths
//! positionally (size constraints, applied while the tree is built) or walks
//! a live tree level by level (manipulators, applied after it is built).
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod parser;
pub mod predicate;

pub use parser::Parser;
pub use predicate::{ContainerIndex, NextNodePredicate};

use crate::tree::{ArbitraryTree, NodeId, PathStep};
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;

/// Predicate chain selecting tree nodes
#[derive(Debug, Clone, PartialEq)]
pub struct NodeResolver {
    expression: String,
    predicates: Vec<NextNodePredicate>,
}

impl NodeResolver {
    /// Parse a path expression
    pub fn parse(expression: &str) -> Result<Self> {
        let predicates = Parser::new(expression)?.parse()?;
        Ok(Self {
            expression: expression.to_string(),
            predicates,
        })
    }

    /// Resolver selecting only the root
    pub fn root() -> Self {
        Self {
            expression: "$".to_string(),
            predicates: vec![NextNodePredicate::Root],
        }
    }

    /// Extend the chain with one more predicate
    pub fn then(mut self, predicate: NextNodePredicate) -> Self {
        self.expression.push_str(&predicate.to_string());
        self.predicates.push(predicate);
        self
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn predicates(&self) -> &[NextNodePredicate] {
        &self.predicates
    }

    /// Whether the chain matches a full path, with exactly one predicate per step
    pub fn matches_path(&self, path: &[PathStep]) -> bool {
        self.predicates.len() == path.len()
            && self
                .predicates
                .iter()
                .zip(path)
                .all(|(predicate, step)| predicate.test_step(step))
    }
}

impl fmt::Display for NodeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

impl ArbitraryTree {
    /// Every node the resolver reaches, in shuffled order
    ///
    /// Each node visited along the way is marked not-null.
    pub fn find_all(&mut self, resolver: &NodeResolver, rng: &mut StdRng) -> Result<Vec<NodeId>> {
        let mut current = vec![self.root()];
        for predicate in resolver.predicates() {
            let mut next = Vec::new();
            for id in &current {
                next.extend(predicate.select(self, *id, resolver.expression())?);
            }
            for id in &next {
                self.node_mut(*id).set_null_inject(0.0);
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }
        current.shuffle(rng);
        Ok(current)
    }
}
