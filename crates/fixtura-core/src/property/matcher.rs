//! Type matchers used to register pluggable operators
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::types::Type;
use std::fmt;
use std::sync::Arc;

/// Decides whether an operator applies to a type
#[derive(Clone)]
pub enum TypeMatcher {
    /// Exactly this type, type arguments included
    Exact(Type),
    /// Any type with this raw name
    Named(String),
    /// Custom predicate
    Predicate(Arc<dyn Fn(&Type) -> bool + Send + Sync>),
}

impl TypeMatcher {
    pub fn exact(ty: Type) -> Self {
        TypeMatcher::Exact(ty)
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeMatcher::Named(name.into())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Type) -> bool + Send + Sync + 'static,
    {
        TypeMatcher::Predicate(Arc::new(predicate))
    }

    pub fn matches(&self, ty: &Type) -> bool {
        match self {
            TypeMatcher::Exact(expected) => expected == ty,
            TypeMatcher::Named(name) => ty.raw_name() == *name,
            TypeMatcher::Predicate(predicate) => predicate(ty),
        }
    }
}

impl fmt::Debug for TypeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeMatcher::Exact(ty) => write!(f, "Exact({})", ty),
            TypeMatcher::Named(name) => write!(f, "Named({})", name),
            TypeMatcher::Predicate(_) => write!(f, "Predicate"),
        }
    }
}

/// First operator whose matcher accepts the type
pub fn find_operator<'a, T: ?Sized>(
    operators: &'a [(TypeMatcher, Arc<T>)],
    ty: &Type,
) -> Option<&'a Arc<T>> {
    operators
        .iter()
        .find(|(matcher, _)| matcher.matches(ty))
        .map(|(_, operator)| operator)
}
