//! Candidate concrete types for abstract properties
//!
//! Resolution returns the whole candidate set; one candidate is picked per
//! traversal so repeated samples can vary in concrete type.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::Property;
use crate::types::{StructDef, Type};
use std::sync::Arc;

/// Resolves an abstract property to its concrete candidates
pub trait CandidateConcretePropertyResolver: Send + Sync {
    fn resolve(&self, property: &Property) -> Vec<Property>;
}

/// Fixed list of concrete types
#[derive(Debug, Clone)]
pub struct ConcreteTypeCandidateConcretePropertyResolver {
    types: Vec<Type>,
}

impl ConcreteTypeCandidateConcretePropertyResolver {
    pub fn new(types: Vec<Type>) -> Self {
        Self { types }
    }
}

impl CandidateConcretePropertyResolver for ConcreteTypeCandidateConcretePropertyResolver {
    fn resolve(&self, property: &Property) -> Vec<Property> {
        self.types
            .iter()
            .map(|ty| Property::concrete(property, ty.clone()))
            .collect()
    }
}

/// Generic struct definitions that inherit the abstract property's type arguments
#[derive(Debug, Clone)]
pub struct GenericCandidateConcretePropertyResolver {
    definitions: Vec<Arc<StructDef>>,
}

impl GenericCandidateConcretePropertyResolver {
    pub fn new(definitions: Vec<Arc<StructDef>>) -> Self {
        Self { definitions }
    }
}

impl CandidateConcretePropertyResolver for GenericCandidateConcretePropertyResolver {
    fn resolve(&self, property: &Property) -> Vec<Property> {
        let arguments = property.ty.type_arguments();
        self.definitions
            .iter()
            .filter_map(|def| {
                if def.type_params.len() != arguments.len() {
                    log::warn!(
                        "Skipping candidate {} for {}: expects {} type arguments, found {}",
                        def.name,
                        property.ty,
                        def.type_params.len(),
                        arguments.len()
                    );
                    return None;
                }
                Some(Property::concrete(
                    property,
                    Type::generic(def.clone(), arguments.clone()),
                ))
            })
            .collect()
    }
}

/// Implementations declared on the interface definition
#[derive(Debug, Clone, Default)]
pub struct DefaultCandidateConcretePropertyResolver;

impl CandidateConcretePropertyResolver for DefaultCandidateConcretePropertyResolver {
    fn resolve(&self, property: &Property) -> Vec<Property> {
        let Type::Interface(def, _) = &property.ty else {
            return Vec::new();
        };
        let bindings = property.ty.bindings();
        def.implementations
            .iter()
            .map(|implementation| Property::concrete(property, implementation.substitute(&bindings)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyKind;
    use crate::types::InterfaceDef;

    fn container_interface(args: Vec<Type>) -> Type {
        let def = InterfaceDef::new("Container")
            .type_param("T")
            .implementation(Type::generic(
                Arc::new(StructDef::new("Boxed").type_param("T").field("value", Type::param("T"))),
                vec![Type::param("T")],
            ));
        Type::Interface(Arc::new(def), args)
    }

    #[test]
    fn test_default_resolver_binds_interface_arguments() {
        let property = Property::field("holder", container_interface(vec![Type::String]), Vec::new());
        let candidates = DefaultCandidateConcretePropertyResolver.resolve(&property);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].ty.to_string(), "Boxed<String>");
        assert!(matches!(candidates[0].kind, PropertyKind::Concrete { .. }));
        assert_eq!(candidates[0].name(), Some("holder"));
    }

    #[test]
    fn test_generic_resolver_carries_arguments_and_skips_arity_mismatch() {
        let one = Arc::new(StructDef::new("Single").type_param("T"));
        let two = Arc::new(StructDef::new("Pair").type_param("A").type_param("B"));
        let resolver = GenericCandidateConcretePropertyResolver::new(vec![one, two]);
        let property = Property::root(container_interface(vec![Type::I64]));
        let candidates = resolver.resolve(&property);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].ty.to_string(), "Single<i64>");
    }

    #[test]
    fn test_concrete_type_resolver() {
        let resolver = ConcreteTypeCandidateConcretePropertyResolver::new(vec![Type::I32, Type::String]);
        let candidates = resolver.resolve(&Property::root(container_interface(Vec::new())));
        let types: Vec<_> = candidates.into_iter().map(|p| p.ty).collect();
        assert_eq!(types, [Type::I32, Type::String]);
    }
}
