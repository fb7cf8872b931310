//! Property model
//!
//! A `Property` describes a location with a type: the generation root, a
//! struct field, a constructor parameter, a container element, a map key or
//! value, or an abstract location resolved to one concrete type. Properties
//! are immutable and know how to read their slice out of a parent value.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod arbitrary_property;
pub mod cache;
pub mod candidate;
pub mod container;
pub mod definition;
pub mod generator;
pub mod matcher;

pub use arbitrary_property::{ArbitraryProperty, ObjectProperty};
pub use cache::{LazyPropertyGenerator, PropertyCache};
pub use candidate::{
    CandidateConcretePropertyResolver, ConcreteTypeCandidateConcretePropertyResolver,
    DefaultCandidateConcretePropertyResolver, GenericCandidateConcretePropertyResolver,
};
pub use container::{ArbitraryContainerInfo, ContainerProperty, ContainerPropertyGenerator};
pub use definition::{choose_variant, TypeDefinition};
pub use generator::{
    BeanPropertyGenerator, CompositePropertyGenerator, ConstructorPropertyGenerator,
    FieldPropertyGenerator, PropertyGenerator,
};
pub use matcher::TypeMatcher;

use crate::tree::entry_slot::{self, MapPart};
use crate::types::{Annotation, Type, Value};
use crate::{Error, Result};

/// The kinds of location a property can describe
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    /// The generation target itself
    Root,
    /// Struct field read directly
    Field { name: String },
    /// Constructor parameter, paired with the field of the same name when one exists
    Constructor {
        name: String,
        index: usize,
        field: Option<Box<Property>>,
    },
    /// Field exposed through a read accessor
    Accessor { name: String },
    /// Positional slot of a list, set, array or stream
    Element { sequence: usize, index: Option<usize> },
    /// Unindexed contents of an optional or supplier
    Single,
    /// One entry of a map
    MapEntry { sequence: usize },
    /// Key slot of a map entry, numbered in physical slots
    MapKey { slot: usize },
    /// Value slot of a map entry, numbered in physical slots
    MapValue { slot: usize },
    /// Abstract property resolved to one concrete type
    Concrete { abstract_property: Box<Property> },
    /// Static value attached to a struct; `None` when unreadable
    Constant { name: String, value: Option<Value> },
    /// Synthetic, describes a type variable
    TypeParameter { name: String },
    /// Synthetic, describes a type name
    TypeName { name: String },
}

/// A typed location descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub kind: PropertyKind,
    pub ty: Type,
    pub annotations: Vec<Annotation>,
}

impl Property {
    fn of(kind: PropertyKind, ty: Type) -> Self {
        Self {
            kind,
            ty,
            annotations: Vec::new(),
        }
    }

    pub fn root(ty: Type) -> Self {
        Self::of(PropertyKind::Root, ty)
    }

    pub fn field(name: impl Into<String>, ty: Type, annotations: Vec<Annotation>) -> Self {
        Self {
            kind: PropertyKind::Field { name: name.into() },
            ty,
            annotations,
        }
    }

    pub fn accessor(name: impl Into<String>, ty: Type, annotations: Vec<Annotation>) -> Self {
        Self {
            kind: PropertyKind::Accessor { name: name.into() },
            ty,
            annotations,
        }
    }

    pub fn element(ty: Type, sequence: usize) -> Self {
        Self::of(
            PropertyKind::Element {
                sequence,
                index: Some(sequence),
            },
            ty,
        )
    }

    pub fn single(ty: Type) -> Self {
        Self::of(PropertyKind::Single, ty)
    }

    pub fn map_entry(ty: Type, sequence: usize) -> Self {
        Self::of(PropertyKind::MapEntry { sequence }, ty)
    }

    pub fn map_key(ty: Type, entry_index: usize) -> Self {
        Self::of(
            PropertyKind::MapKey {
                slot: entry_slot::key_slot(entry_index),
            },
            ty,
        )
    }

    pub fn map_value(ty: Type, entry_index: usize) -> Self {
        Self::of(
            PropertyKind::MapValue {
                slot: entry_slot::value_slot(entry_index),
            },
            ty,
        )
    }

    pub fn constant(name: impl Into<String>, ty: Type, value: Option<Value>) -> Self {
        Self::of(
            PropertyKind::Constant {
                name: name.into(),
                value,
            },
            ty,
        )
    }

    /// Wrap an abstract property with one concrete type, keeping its annotations
    pub fn concrete(abstract_property: &Property, ty: Type) -> Self {
        Self {
            kind: PropertyKind::Concrete {
                abstract_property: Box::new(abstract_property.clone()),
            },
            ty,
            annotations: abstract_property.annotations.clone(),
        }
    }

    /// The same container slot moved to another position
    pub fn resequenced(&self, sequence: usize) -> Self {
        let kind = match &self.kind {
            PropertyKind::Element { .. } => PropertyKind::Element {
                sequence,
                index: Some(sequence),
            },
            PropertyKind::MapEntry { .. } => PropertyKind::MapEntry { sequence },
            other => other.clone(),
        };
        Self {
            kind,
            ty: self.ty.clone(),
            annotations: self.annotations.clone(),
        }
    }

    /// The location this property stands for, looking through concrete wrappers
    pub fn origin(&self) -> &Property {
        match &self.kind {
            PropertyKind::Concrete { abstract_property } => abstract_property.origin(),
            _ => self,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Field { name }
            | PropertyKind::Constructor { name, .. }
            | PropertyKind::Accessor { name }
            | PropertyKind::Constant { name, .. }
            | PropertyKind::TypeParameter { name }
            | PropertyKind::TypeName { name } => Some(name),
            PropertyKind::Concrete { abstract_property } => abstract_property.name(),
            _ => None,
        }
    }

    /// Position inside the parent container
    pub fn sequence(&self) -> Option<usize> {
        match &self.kind {
            PropertyKind::Element { sequence, .. } | PropertyKind::MapEntry { sequence } => {
                Some(*sequence)
            }
            PropertyKind::MapKey { slot } | PropertyKind::MapValue { slot } => {
                Some(entry_slot::entry_index(*slot))
            }
            PropertyKind::Concrete { abstract_property } => abstract_property.sequence(),
            _ => None,
        }
    }

    pub fn map_part(&self) -> Option<MapPart> {
        match &self.origin().kind {
            PropertyKind::MapKey { slot } | PropertyKind::MapValue { slot } => {
                Some(entry_slot::slot_part(*slot))
            }
            _ => None,
        }
    }

    /// Whether this property is a slot owned by a container
    pub fn is_container_element(&self) -> bool {
        matches!(
            self.origin().kind,
            PropertyKind::Element { .. }
                | PropertyKind::Single
                | PropertyKind::MapEntry { .. }
                | PropertyKind::MapKey { .. }
                | PropertyKind::MapValue { .. }
        )
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.is(name))
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    /// Read this property's slice out of the parent instance
    pub fn get_value(&self, instance: &Value) -> Result<Value> {
        if instance.is_null() {
            return Ok(Value::Null);
        }

        match &self.kind {
            PropertyKind::Root | PropertyKind::Single => Ok(instance.clone()),
            PropertyKind::Field { name }
            | PropertyKind::Constructor { name, .. }
            | PropertyKind::Accessor { name } => match instance {
                Value::Object { fields, .. } => {
                    Ok(fields.get(name).cloned().unwrap_or(Value::Null))
                }
                other => Err(Error::type_mismatch(name.as_str(), "object", other.type_label())),
            },
            PropertyKind::Element { sequence, .. } => match instance {
                Value::List(items) => Ok(items.get(*sequence).cloned().unwrap_or(Value::Null)),
                other => Err(Error::type_mismatch(
                    format!("[{}]", sequence),
                    "list",
                    other.type_label(),
                )),
            },
            PropertyKind::MapEntry { sequence } => match instance {
                Value::Map(entries) => Ok(entries
                    .get(*sequence)
                    .map(|(k, v)| Value::List(vec![k.clone(), v.clone()]))
                    .unwrap_or(Value::Null)),
                other => Err(Error::type_mismatch(
                    format!("[{}]", sequence),
                    "map",
                    other.type_label(),
                )),
            },
            PropertyKind::MapKey { slot } | PropertyKind::MapValue { slot } => {
                entry_part(instance, *slot)
            }
            PropertyKind::Concrete { abstract_property } => abstract_property.get_value(instance),
            PropertyKind::Constant { value, .. } => Ok(value.clone().unwrap_or(Value::Null)),
            PropertyKind::TypeParameter { name } | PropertyKind::TypeName { name } => {
                Err(Error::Unsupported {
                    message: format!("synthetic property '{}' has no value", name),
                    feature: Some("get_value".to_string()),
                })
            }
        }
    }
}

/// Key or value out of either one entry (`[k, v]`) or the whole map
fn entry_part(instance: &Value, slot: usize) -> Result<Value> {
    let part = entry_slot::slot_part(slot);
    let pick = |k: &Value, v: &Value| match part {
        MapPart::Key => k.clone(),
        MapPart::Value => v.clone(),
    };
    match instance {
        Value::List(pair) if pair.len() == 2 => Ok(pick(&pair[0], &pair[1])),
        Value::Map(entries) => Ok(entries
            .get(entry_slot::entry_index(slot))
            .map(|(k, v)| pick(k, v))
            .unwrap_or(Value::Null)),
        other => Err(Error::type_mismatch(
            format!("{{{}}}", part),
            "map entry",
            other.type_label(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_value() -> Value {
        Value::Map(vec![
            (Value::from("a"), Value::Int(1)),
            (Value::from("b"), Value::Int(2)),
        ])
    }

    #[test]
    fn test_field_get_value() {
        let item = Value::object("Item", [("id", Value::from("x"))]);
        let id = Property::field("id", Type::String, Vec::new());
        assert_eq!(id.get_value(&item).unwrap(), Value::from("x"));
        assert_eq!(id.get_value(&Value::Null).unwrap(), Value::Null);
        assert!(id.get_value(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_map_slots_read_entries() {
        let entry = Property::map_entry(Type::entry(Type::String, Type::I32), 1);
        assert_eq!(
            entry.get_value(&map_value()).unwrap(),
            Value::List(vec![Value::from("b"), Value::Int(2)])
        );

        let key = Property::map_key(Type::String, 1);
        let value = Property::map_value(Type::I32, 1);
        assert_eq!(key.get_value(&map_value()).unwrap(), Value::from("b"));
        assert_eq!(value.get_value(&map_value()).unwrap(), Value::Int(2));
        assert_eq!(key.sequence(), Some(1));
        assert_eq!(value.map_part(), Some(MapPart::Value));
    }

    #[test]
    fn test_concrete_delegates_to_abstract() {
        let field = Property::field("shape", Type::String, vec![Annotation::not_null()]);
        let concrete = Property::concrete(&field, Type::I32);
        assert_eq!(concrete.name(), Some("shape"));
        assert!(concrete.has_annotation(crate::types::annotation::NOT_NULL));
        let owner = Value::object("Holder", [("shape", Value::Int(5))]);
        assert_eq!(concrete.get_value(&owner).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_synthetic_property_has_no_value() {
        let synthetic = Property {
            kind: PropertyKind::TypeParameter { name: "T".into() },
            ty: Type::param("T"),
            annotations: Vec::new(),
        };
        assert!(matches!(
            synthetic.get_value(&Value::Int(1)),
            Err(Error::Unsupported { .. })
        ));
    }
}
