//! Initial null-inject probabilities
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::property::{Property, PropertyKind};
use crate::types::annotation::{NOT_NULL, NULLABLE};

/// Decides the null probability a freshly traversed node starts with
pub trait NullInjectGenerator: Send + Sync {
    fn generate(&self, property: &Property) -> f64;
}

/// Roots and container slots are never null, annotations decide the rest
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefaultNullInjectGenerator {
    pub default_null_inject: f64,
    pub nullable_null_inject: f64,
}

impl DefaultNullInjectGenerator {
    pub fn new(default_null_inject: f64, nullable_null_inject: f64) -> Self {
        Self {
            default_null_inject,
            nullable_null_inject,
        }
    }
}

impl NullInjectGenerator for DefaultNullInjectGenerator {
    fn generate(&self, property: &Property) -> f64 {
        if matches!(property.origin().kind, PropertyKind::Root) || property.is_container_element() {
            return 0.0;
        }
        if property.has_annotation(NOT_NULL) {
            0.0
        } else if property.has_annotation(NULLABLE) {
            self.nullable_null_inject
        } else {
            self.default_null_inject
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Annotation, Type};

    #[test]
    fn test_default_rules() {
        let generator = DefaultNullInjectGenerator::new(0.3, 0.6);
        assert_eq!(generator.generate(&Property::root(Type::String)), 0.0);
        assert_eq!(generator.generate(&Property::element(Type::String, 0)), 0.0);
        assert_eq!(
            generator.generate(&Property::field("a", Type::String, Vec::new())),
            0.3
        );
        assert_eq!(
            generator.generate(&Property::field("b", Type::String, vec![Annotation::not_null()])),
            0.0
        );
        assert_eq!(
            generator.generate(&Property::field("c", Type::String, vec![Annotation::nullable()])),
            0.6
        );
    }
}
