//! Manipulator fed by samples of other builders
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::ArbitraryBuilder;
use crate::manipulator::{decompose_value, ManipulateContext, NodeManipulator};
use crate::tree::{ArbitraryTree, NodeId};
use crate::types::Value;
use crate::Result;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub(crate) type Combine = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// Samples each source once per application and decomposes the combined value
///
/// Each source builder is owned. `duplicate` copies them, so a copied parent
/// builder replays the same sequence as the original instead of sharing it.
pub(crate) struct DerivedValueManipulator {
    sources: Vec<Mutex<ArbitraryBuilder>>,
    combine: Combine,
}

impl DerivedValueManipulator {
    pub(crate) fn new(sources: Vec<ArbitraryBuilder>, combine: Combine) -> Self {
        Self {
            sources: sources.into_iter().map(Mutex::new).collect(),
            combine,
        }
    }

    fn sample_sources(&self) -> Result<Vec<Value>> {
        self.sources
            .iter()
            .map(|source| {
                let mut builder = source
                    .lock()
                    .map_err(|_| anyhow::anyhow!("derived builder lock poisoned"))?;
                builder.sample()
            })
            .collect()
    }
}

impl NodeManipulator for DerivedValueManipulator {
    fn manipulate(&self, tree: &mut ArbitraryTree, node: NodeId, ctx: &mut ManipulateContext<'_>) -> Result<()> {
        self.manipulate_all(tree, &[node], ctx)
    }

    fn manipulate_all(&self, tree: &mut ArbitraryTree, nodes: &[NodeId], ctx: &mut ManipulateContext<'_>) -> Result<()> {
        let value = (self.combine)(self.sample_sources()?)?;
        nodes
            .iter()
            .try_for_each(|node| decompose_value(tree, *node, &value, ctx))
    }

    fn duplicate(&self) -> Option<Arc<dyn NodeManipulator>> {
        let sources = self
            .sources
            .iter()
            .map(|source| source.lock().unwrap_or_else(PoisonError::into_inner).copy())
            .collect();
        Some(Arc::new(Self::new(sources, Arc::clone(&self.combine))))
    }
}

impl fmt::Debug for DerivedValueManipulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedValueManipulator")
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}
