//! Per-node generation metadata
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{ArbitraryContainerInfo, ContainerProperty, Property};

/// Object shape of a node: its property, the chosen concrete property and the children
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectProperty {
    pub property: Property,
    pub resolved_property: Property,
    pub child_properties: Vec<Property>,
}

/// Object shape plus, for containers, the container shape
///
/// The null-inject rate and whether a user directive touched the node are
/// kept here, not on the underlying property.
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitraryProperty {
    pub object_property: ObjectProperty,
    pub container_property: Option<ContainerProperty>,
    pub null_inject: f64,
    pub manipulated: bool,
}

impl ArbitraryProperty {
    pub fn new(object_property: ObjectProperty, container_property: Option<ContainerProperty>) -> Self {
        Self {
            object_property,
            container_property,
            null_inject: 0.0,
            manipulated: false,
        }
    }

    pub fn with_null_inject(mut self, null_inject: f64) -> Self {
        self.null_inject = null_inject.clamp(0.0, 1.0);
        self
    }

    pub fn is_container(&self) -> bool {
        self.container_property.is_some()
    }

    pub fn container_info(&self) -> Option<&ArbitraryContainerInfo> {
        self.container_property.as_ref().map(|c| &c.container_info)
    }

    pub fn resolved_property(&self) -> &Property {
        &self.object_property.resolved_property
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn test_null_inject_is_clamped() {
        let property = Property::root(Type::String);
        let arbitrary = ArbitraryProperty::new(
            ObjectProperty {
                property: property.clone(),
                resolved_property: property,
                child_properties: Vec::new(),
            },
            None,
        )
        .with_null_inject(1.5);
        assert_eq!(arbitrary.null_inject, 1.0);
        assert!(!arbitrary.is_container());
        assert!(arbitrary.container_info().is_none());
    }
}
