//! Type definitions and concrete variant selection
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{Property, PropertyGenerator};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fmt;
use std::sync::Arc;

/// A resolved property bound to the generator expanding its children
#[derive(Clone)]
pub struct TypeDefinition {
    pub resolved_property: Property,
    pub property_generator: Arc<dyn PropertyGenerator>,
}

impl TypeDefinition {
    pub fn new(resolved_property: Property, property_generator: Arc<dyn PropertyGenerator>) -> Self {
        Self {
            resolved_property,
            property_generator,
        }
    }

    pub fn child_properties(&self) -> Vec<Property> {
        self.property_generator
            .generate_child_properties(&self.resolved_property)
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("resolved_property", &self.resolved_property)
            .finish_non_exhaustive()
    }
}

/// Pick one candidate uniformly at random
pub fn choose_variant<'a, T>(candidates: &'a [T], rng: &mut StdRng) -> Option<&'a T> {
    candidates.choose(rng)
}
