//! Mapping from Rust types to their runtime `Type` description
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::Type;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// Rust types that can describe their own generation shape
///
/// Implemented for std scalars and collections; user structs implement it by
/// hand, usually returning a `Type::of_struct` built from a `StructDef`.
pub trait Describe {
    fn describe() -> Type;
}

macro_rules! describe_scalar {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(impl Describe for $t {
            fn describe() -> Type {
                Type::$variant
            }
        })*
    };
}

describe_scalar!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> Type {
        Type::list(T::describe())
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> Type {
        Type::list(T::describe())
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> Type {
        Type::array(T::describe())
    }
}

impl<T: Describe> Describe for HashSet<T> {
    fn describe() -> Type {
        Type::set(T::describe())
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> Type {
        Type::set(T::describe())
    }
}

impl<K: Describe, V: Describe> Describe for HashMap<K, V> {
    fn describe() -> Type {
        Type::map(K::describe(), V::describe())
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> Type {
        Type::map(K::describe(), V::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> Type {
        Type::optional(T::describe())
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe() -> Type {
        T::describe()
    }
}

impl<A: Describe, B: Describe> Describe for (A, B) {
    fn describe() -> Type {
        Type::entry(A::describe(), B::describe())
    }
}
