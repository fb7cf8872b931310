//! Container shapes: element properties plus a size constraint
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::Property;
use crate::types::Type;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Size bounds of a container node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitraryContainerInfo {
    pub min_size: usize,
    pub max_size: usize,
    /// Set when the bounds come from a user directive
    pub manipulated: bool,
}

impl ArbitraryContainerInfo {
    pub fn new(min_size: usize, max_size: usize, manipulated: bool) -> Self {
        Self {
            min_size,
            max_size: max_size.max(min_size),
            manipulated,
        }
    }

    /// Bounds pinned to exactly `size` elements
    pub fn exact(size: usize, manipulated: bool) -> Self {
        Self::new(size, size, manipulated)
    }

    pub fn random_size(&self, rng: &mut StdRng) -> usize {
        if self.min_size >= self.max_size {
            self.min_size
        } else {
            rng.gen_range(self.min_size..=self.max_size)
        }
    }

    pub fn accepts(&self, size: usize) -> bool {
        size >= self.min_size && size <= self.max_size
    }
}

/// Element properties of one container node
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerProperty {
    pub element_properties: Vec<Property>,
    pub container_info: ArbitraryContainerInfo,
}

/// Expands a container property into its element properties
pub trait ContainerPropertyGenerator: Send + Sync {
    fn generate(
        &self,
        property: &Property,
        info: &ArbitraryContainerInfo,
        rng: &mut StdRng,
    ) -> ContainerProperty;
}

/// Lists, sets, arrays and streams
#[derive(Debug, Clone, Default)]
pub struct SequenceContainerPropertyGenerator;

impl ContainerPropertyGenerator for SequenceContainerPropertyGenerator {
    fn generate(
        &self,
        property: &Property,
        info: &ArbitraryContainerInfo,
        rng: &mut StdRng,
    ) -> ContainerProperty {
        let element_type = match &property.ty {
            Type::List(e) | Type::Set(e) | Type::Array(e) | Type::Stream(e) => (**e).clone(),
            _ => {
                return ContainerProperty {
                    element_properties: Vec::new(),
                    container_info: *info,
                }
            }
        };
        let size = info.random_size(rng);
        ContainerProperty {
            element_properties: (0..size)
                .map(|sequence| Property::element(element_type.clone(), sequence))
                .collect(),
            container_info: *info,
        }
    }
}

/// Maps expand into entries; each entry is itself a two-slot container
#[derive(Debug, Clone, Default)]
pub struct MapContainerPropertyGenerator;

impl ContainerPropertyGenerator for MapContainerPropertyGenerator {
    fn generate(
        &self,
        property: &Property,
        info: &ArbitraryContainerInfo,
        rng: &mut StdRng,
    ) -> ContainerProperty {
        let Type::Map(key, value) = &property.ty else {
            return ContainerProperty {
                element_properties: Vec::new(),
                container_info: *info,
            };
        };
        let entry_type = Type::Entry(key.clone(), value.clone());
        let size = info.random_size(rng);
        ContainerProperty {
            element_properties: (0..size)
                .map(|sequence| Property::map_entry(entry_type.clone(), sequence))
                .collect(),
            container_info: *info,
        }
    }
}

/// Key and value slots of one entry
#[derive(Debug, Clone, Default)]
pub struct EntryContainerPropertyGenerator;

impl ContainerPropertyGenerator for EntryContainerPropertyGenerator {
    fn generate(
        &self,
        property: &Property,
        _info: &ArbitraryContainerInfo,
        _rng: &mut StdRng,
    ) -> ContainerProperty {
        let Type::Entry(key, value) = &property.ty else {
            return ContainerProperty {
                element_properties: Vec::new(),
                container_info: ArbitraryContainerInfo::exact(0, false),
            };
        };
        let entry_index = property.sequence().unwrap_or(0);
        ContainerProperty {
            element_properties: vec![
                Property::map_key((**key).clone(), entry_index),
                Property::map_value((**value).clone(), entry_index),
            ],
            container_info: ArbitraryContainerInfo::exact(2, false),
        }
    }
}

/// Optionals hold zero or one value, suppliers exactly one
#[derive(Debug, Clone, Default)]
pub struct SingleValueContainerPropertyGenerator;

impl ContainerPropertyGenerator for SingleValueContainerPropertyGenerator {
    fn generate(
        &self,
        property: &Property,
        info: &ArbitraryContainerInfo,
        rng: &mut StdRng,
    ) -> ContainerProperty {
        let (inner, info) = match &property.ty {
            Type::Optional(inner) => (
                (**inner).clone(),
                ArbitraryContainerInfo::new(info.min_size.min(1), info.max_size.min(1), info.manipulated),
            ),
            Type::Supplier(inner) => ((**inner).clone(), ArbitraryContainerInfo::exact(1, info.manipulated)),
            _ => {
                return ContainerProperty {
                    element_properties: Vec::new(),
                    container_info: *info,
                }
            }
        };
        let size = info.random_size(rng);
        ContainerProperty {
            element_properties: (0..size).map(|_| Property::single(inner.clone())).collect(),
            container_info: info,
        }
    }
}
