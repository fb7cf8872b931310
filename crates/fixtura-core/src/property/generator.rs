//! Child property generation strategies
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{Property, PropertyKind};
use crate::types::{StructDef, Type};
use std::collections::HashSet;
use std::sync::Arc;

/// Produces the child properties of a property
pub trait PropertyGenerator: Send + Sync {
    fn generate_child_properties(&self, property: &Property) -> Vec<Property>;
}

fn struct_of(property: &Property) -> Option<&Arc<StructDef>> {
    match &property.ty {
        Type::Struct(def, _) => Some(def),
        _ => None,
    }
}

/// Instance fields of a struct, optionally followed by its constants
#[derive(Debug, Clone, Default)]
pub struct FieldPropertyGenerator {
    include_constants: bool,
}

impl FieldPropertyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_constants(mut self) -> Self {
        self.include_constants = true;
        self
    }

    /// Constants of the struct as `Constant` properties
    ///
    /// A constant whose value can not be read is kept without a value.
    pub fn generate_constant_properties(&self, property: &Property) -> Vec<Property> {
        let Some(def) = struct_of(property) else {
            return Vec::new();
        };
        def.constants
            .iter()
            .map(|constant| {
                if constant.value.is_none() {
                    log::warn!(
                        "Constant {}.{} is not accessible, treating it as valueless",
                        def.name,
                        constant.name
                    );
                }
                Property::constant(constant.name.clone(), constant.ty.clone(), constant.value.clone())
            })
            .collect()
    }
}

impl PropertyGenerator for FieldPropertyGenerator {
    fn generate_child_properties(&self, property: &Property) -> Vec<Property> {
        let Some(def) = struct_of(property) else {
            return Vec::new();
        };
        let bindings = property.ty.bindings();
        let mut properties: Vec<Property> = def
            .fields
            .iter()
            .map(|field| {
                Property::field(
                    field.name.clone(),
                    field.ty.substitute(&bindings),
                    field.annotations.clone(),
                )
            })
            .collect();

        if self.include_constants {
            properties.extend(self.generate_constant_properties(property));
        }
        properties
    }
}

/// Parameters of the primary constructor
///
/// Names come from the explicit constructor-properties list, else from the
/// parameters themselves. A parameter declared as a bare type variable takes
/// the resolved type of the field it is paired with.
#[derive(Debug, Clone, Default)]
pub struct ConstructorPropertyGenerator;

impl PropertyGenerator for ConstructorPropertyGenerator {
    fn generate_child_properties(&self, property: &Property) -> Vec<Property> {
        let Some(def) = struct_of(property) else {
            return Vec::new();
        };
        let Some(constructor) = &def.constructor else {
            return Vec::new();
        };
        let bindings = property.ty.bindings();

        constructor
            .params
            .iter()
            .enumerate()
            .filter_map(|(index, param)| {
                let name = constructor
                    .constructor_properties
                    .as_ref()
                    .and_then(|names| names.get(index).cloned())
                    .or_else(|| param.name.clone());
                let Some(name) = name else {
                    log::warn!(
                        "Constructor parameter {} of {} has no name, skipping it",
                        index,
                        def.name
                    );
                    return None;
                };

                let field = def.find_field(&name).map(|field| {
                    Property::field(
                        field.name.clone(),
                        field.ty.substitute(&bindings),
                        field.annotations.clone(),
                    )
                });
                let ty = match (&param.ty, &field) {
                    (Type::Param(_), Some(field)) => field.ty.clone(),
                    _ => param.ty.substitute(&bindings),
                };
                let annotations = field
                    .as_ref()
                    .map(|f| f.annotations.clone())
                    .unwrap_or_default();

                Some(Property {
                    kind: PropertyKind::Constructor {
                        name,
                        index,
                        field: field.map(Box::new),
                    },
                    ty,
                    annotations,
                })
            })
            .collect()
    }
}

/// Fields exposed through read accessors
#[derive(Debug, Clone, Default)]
pub struct BeanPropertyGenerator;

impl PropertyGenerator for BeanPropertyGenerator {
    fn generate_child_properties(&self, property: &Property) -> Vec<Property> {
        let Some(def) = struct_of(property) else {
            return Vec::new();
        };
        let bindings = property.ty.bindings();
        def.fields
            .iter()
            .filter(|field| field.has_accessor)
            .map(|field| {
                Property::accessor(
                    field.name.clone(),
                    field.ty.substitute(&bindings),
                    field.annotations.clone(),
                )
            })
            .collect()
    }
}

/// Runs generators in order and concatenates their results
///
/// When two generators produce a property with the same name the first one
/// wins, so a constructor generator followed by a field generator yields the
/// constructor parameters plus the remaining fields.
#[derive(Clone, Default)]
pub struct CompositePropertyGenerator {
    generators: Vec<Arc<dyn PropertyGenerator>>,
}

impl CompositePropertyGenerator {
    pub fn new(generators: Vec<Arc<dyn PropertyGenerator>>) -> Self {
        Self { generators }
    }

    pub fn push(mut self, generator: Arc<dyn PropertyGenerator>) -> Self {
        self.generators.push(generator);
        self
    }
}

impl PropertyGenerator for CompositePropertyGenerator {
    fn generate_child_properties(&self, property: &Property) -> Vec<Property> {
        let mut seen = HashSet::new();
        let mut properties = Vec::new();
        for generator in &self.generators {
            let generated = generator.generate_child_properties(property);
            for child in generated {
                let fresh = match child.name() {
                    Some(name) => seen.insert(name.to_string()),
                    None => true,
                };
                if fresh {
                    properties.push(child);
                }
            }
        }
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Annotation, ConstructorDef, FieldDef};

    fn account() -> Type {
        Type::of_struct(
            StructDef::new("Account")
                .field_def(FieldDef::new("id", Type::String).annotated(Annotation::not_null()))
                .field_def(FieldDef::new("secret", Type::String).without_accessor())
                .field("balance", Type::I64)
                .constant("VERSION", Type::I32, Some(crate::types::Value::Int(2)))
                .constant("HIDDEN", Type::I32, None)
                .constructor(
                    ConstructorDef::new()
                        .param("id", Type::String)
                        .param("balance", Type::I64),
                ),
        )
    }

    fn names(properties: &[Property]) -> Vec<&str> {
        properties.iter().filter_map(Property::name).collect()
    }

    #[test]
    fn test_field_generator_substitutes_bindings() {
        let boxed = Arc::new(
            StructDef::new("Boxed")
                .type_param("T")
                .field("inner", Type::list(Type::param("T"))),
        );
        let property = Property::root(Type::generic(boxed, vec![Type::U8]));
        let children = FieldPropertyGenerator::new().generate_child_properties(&property);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].ty, Type::list(Type::U8));
    }

    #[test]
    fn test_constants_are_separate() {
        let property = Property::root(account());
        let generator = FieldPropertyGenerator::new();
        assert_eq!(names(&generator.generate_child_properties(&property)), ["id", "secret", "balance"]);

        let constants = generator.generate_constant_properties(&property);
        assert_eq!(names(&constants), ["VERSION", "HIDDEN"]);
        let hidden = constants[1].get_value(&crate::types::Value::Int(0)).unwrap();
        assert!(hidden.is_null());

        let with_constants = FieldPropertyGenerator::new().with_constants();
        assert_eq!(with_constants.generate_child_properties(&property).len(), 5);
    }

    #[test]
    fn test_constructor_pairs_fields() {
        let property = Property::root(account());
        let params = ConstructorPropertyGenerator.generate_child_properties(&property);
        assert_eq!(names(&params), ["id", "balance"]);
        match &params[0].kind {
            PropertyKind::Constructor { field, index, .. } => {
                assert_eq!(*index, 0);
                assert!(field.is_some());
            }
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(params[0].has_annotation(crate::types::annotation::NOT_NULL));
    }

    #[test]
    fn test_constructor_type_variable_takes_field_type() {
        let wrapper = Arc::new(
            StructDef::new("Wrapper")
                .type_param("T")
                .field("value", Type::param("T"))
                .constructor(
                    ConstructorDef::new()
                        .unnamed_param(Type::param("T"))
                        .with_constructor_properties(["value"]),
                ),
        );
        let property = Property::root(Type::generic(wrapper, vec![Type::Bool]));
        let params = ConstructorPropertyGenerator.generate_child_properties(&property);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name(), Some("value"));
        assert_eq!(params[0].ty, Type::Bool);
    }

    #[test]
    fn test_bean_generator_skips_fields_without_accessor() {
        let property = Property::root(account());
        let accessors = BeanPropertyGenerator.generate_child_properties(&property);
        assert_eq!(names(&accessors), ["id", "balance"]);
    }

    #[test]
    fn test_composite_first_name_wins() {
        let composite = CompositePropertyGenerator::new(vec![
            Arc::new(ConstructorPropertyGenerator),
            Arc::new(FieldPropertyGenerator::new()),
        ]);
        let children = composite.generate_child_properties(&Property::root(account()));
        assert_eq!(names(&children), ["id", "balance", "secret"]);
        assert!(matches!(children[0].kind, PropertyKind::Constructor { .. }));
        assert!(matches!(children[2].kind, PropertyKind::Field { .. }));
    }
}
