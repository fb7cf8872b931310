//! Declarative metadata attached to fields
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use std::collections::BTreeMap;

/// Marker annotation excluding a property from null injection
pub const NOT_NULL: &str = "NotNull";

/// Marker annotation opting a property into the nullable probability
pub const NULLABLE: &str = "Nullable";

/// A named annotation with optional string attributes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
}

impl Annotation {
    /// Annotation without attributes
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn not_null() -> Self {
        Self::marker(NOT_NULL)
    }

    pub fn nullable() -> Self {
        Self::marker(NULLABLE)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}
