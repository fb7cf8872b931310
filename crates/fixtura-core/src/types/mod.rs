//! Runtime type model for generation targets
//!
//! Rust carries no runtime reflection, so generation targets are described
//! by a closed `Type` sum type. Structs, enums and interfaces are described
//! by definitions shared behind `Arc`; their identity is their name.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod annotation;
pub mod describe;
pub mod value;

pub use annotation::Annotation;
pub use describe::Describe;
pub use value::Value;

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Description of a generation target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    /// Ordered collection
    List(Box<Type>),
    /// Collection of distinct elements
    Set(Box<Type>),
    /// Fixed-shape sequence
    Array(Box<Type>),
    /// Lazily consumed sequence
    Stream(Box<Type>),
    /// Key/value collection
    Map(Box<Type>, Box<Type>),
    /// A single key/value pair
    Entry(Box<Type>, Box<Type>),
    /// Zero or one value
    Optional(Box<Type>),
    /// Exactly one deferred value
    Supplier(Box<Type>),
    /// User struct with type arguments bound to its parameters
    Struct(Arc<StructDef>, Vec<Type>),
    /// Unit-variant enumeration
    Enum(Arc<EnumDef>),
    /// Abstract type resolved to one implementation per generation
    Interface(Arc<InterfaceDef>, Vec<Type>),
    /// Bare type variable
    Param(String),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn stream(element: Type) -> Self {
        Type::Stream(Box::new(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn entry(key: Type, value: Type) -> Self {
        Type::Entry(Box::new(key), Box::new(value))
    }

    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    pub fn supplier(inner: Type) -> Self {
        Type::Supplier(Box::new(inner))
    }

    pub fn param(name: impl Into<String>) -> Self {
        Type::Param(name.into())
    }

    /// Struct type without type arguments
    pub fn of_struct(def: StructDef) -> Self {
        Type::Struct(Arc::new(def), Vec::new())
    }

    /// Struct type with type arguments
    pub fn generic(def: Arc<StructDef>, args: Vec<Type>) -> Self {
        Type::Struct(def, args)
    }

    pub fn of_enum(def: EnumDef) -> Self {
        Type::Enum(Arc::new(def))
    }

    pub fn of_interface(def: InterfaceDef) -> Self {
        Type::Interface(Arc::new(def), Vec::new())
    }

    /// Name of the type without type arguments
    pub fn raw_name(&self) -> String {
        match self {
            Type::Struct(def, _) => def.name.clone(),
            Type::Enum(def) => def.name.clone(),
            Type::Interface(def, _) => def.name.clone(),
            Type::Param(name) => name.clone(),
            Type::List(_) => "List".to_string(),
            Type::Set(_) => "Set".to_string(),
            Type::Array(_) => "Array".to_string(),
            Type::Stream(_) => "Stream".to_string(),
            Type::Map(_, _) => "Map".to_string(),
            Type::Entry(_, _) => "Entry".to_string(),
            Type::Optional(_) => "Optional".to_string(),
            Type::Supplier(_) => "Supplier".to_string(),
            other => other.to_string(),
        }
    }

    /// Type arguments carried by this type
    pub fn type_arguments(&self) -> Vec<Type> {
        match self {
            Type::List(e) | Type::Set(e) | Type::Array(e) | Type::Stream(e) => vec![(**e).clone()],
            Type::Optional(e) | Type::Supplier(e) => vec![(**e).clone()],
            Type::Map(k, v) | Type::Entry(k, v) => vec![(**k).clone(), (**v).clone()],
            Type::Struct(_, args) | Type::Interface(_, args) => args.clone(),
            _ => Vec::new(),
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::U8 | Type::U16 | Type::U32 | Type::U64
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Type::F32 | Type::F64)
    }

    /// Scalars generated directly by an introspector
    pub fn is_scalar(&self) -> bool {
        self.is_integral()
            || self.is_floating()
            || matches!(self, Type::Bool | Type::Char | Type::String | Type::Enum(_))
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, Type::Interface(_, _))
    }

    /// Replace type parameters using the given bindings
    pub fn substitute(&self, bindings: &HashMap<String, Type>) -> Type {
        if bindings.is_empty() {
            return self.clone();
        }
        let sub = |t: &Type| Box::new(t.substitute(bindings));
        match self {
            Type::Param(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Type::List(e) => Type::List(sub(e)),
            Type::Set(e) => Type::Set(sub(e)),
            Type::Array(e) => Type::Array(sub(e)),
            Type::Stream(e) => Type::Stream(sub(e)),
            Type::Optional(e) => Type::Optional(sub(e)),
            Type::Supplier(e) => Type::Supplier(sub(e)),
            Type::Map(k, v) => Type::Map(sub(k), sub(v)),
            Type::Entry(k, v) => Type::Entry(sub(k), sub(v)),
            Type::Struct(def, args) => Type::Struct(
                def.clone(),
                args.iter().map(|a| a.substitute(bindings)).collect(),
            ),
            Type::Interface(def, args) => Type::Interface(
                def.clone(),
                args.iter().map(|a| a.substitute(bindings)).collect(),
            ),
            other => other.clone(),
        }
    }

    /// Bindings from the type parameters of a generic definition to this type's arguments
    pub fn bindings(&self) -> HashMap<String, Type> {
        let params = match self {
            Type::Struct(def, _) => &def.type_params,
            Type::Interface(def, _) => &def.type_params,
            _ => return HashMap::new(),
        };
        params
            .iter()
            .cloned()
            .zip(self.type_arguments())
            .collect()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::I8 => write!(f, "i8"),
            Type::I16 => write!(f, "i16"),
            Type::I32 => write!(f, "i32"),
            Type::I64 => write!(f, "i64"),
            Type::U8 => write!(f, "u8"),
            Type::U16 => write!(f, "u16"),
            Type::U32 => write!(f, "u32"),
            Type::U64 => write!(f, "u64"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "String"),
            Type::List(e) => write!(f, "List<{}>", e),
            Type::Set(e) => write!(f, "Set<{}>", e),
            Type::Array(e) => write!(f, "[{}]", e),
            Type::Stream(e) => write!(f, "Stream<{}>", e),
            Type::Map(k, v) => write!(f, "Map<{}, {}>", k, v),
            Type::Entry(k, v) => write!(f, "Entry<{}, {}>", k, v),
            Type::Optional(e) => write!(f, "Optional<{}>", e),
            Type::Supplier(e) => write!(f, "Supplier<{}>", e),
            Type::Struct(def, args) => write_generic(f, &def.name, args),
            Type::Enum(def) => write!(f, "{}", def.name),
            Type::Interface(def, args) => write_generic(f, &def.name, args),
            Type::Param(name) => write!(f, "{}", name),
        }
    }
}

fn write_generic(f: &mut fmt::Formatter<'_>, name: &str, args: &[Type]) -> fmt::Result {
    write!(f, "{}", name)?;
    if !args.is_empty() {
        let rendered: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        write!(f, "<{}>", rendered.join(", "))?;
    }
    Ok(())
}

/// A struct field
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub annotations: Vec<Annotation>,
    /// Whether a bean-style read accessor exposes the field
    pub has_accessor: bool,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            annotations: Vec::new(),
            has_accessor: true,
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn without_accessor(mut self) -> Self {
        self.has_accessor = false;
        self
    }
}

/// A static value attached to a struct
#[derive(Debug, Clone)]
pub struct ConstantDef {
    pub name: String,
    pub ty: Type,
    /// `None` when the value can not be read
    pub value: Option<Value>,
}

/// A constructor parameter
#[derive(Debug, Clone)]
pub struct ParamDef {
    pub name: Option<String>,
    pub ty: Type,
}

/// The primary constructor of a struct
#[derive(Debug, Clone, Default)]
pub struct ConstructorDef {
    pub params: Vec<ParamDef>,
    /// Explicit parameter names, taking precedence over `ParamDef::name`
    pub constructor_properties: Option<Vec<String>>,
}

impl ConstructorDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.params.push(ParamDef {
            name: Some(name.into()),
            ty,
        });
        self
    }

    pub fn unnamed_param(mut self, ty: Type) -> Self {
        self.params.push(ParamDef { name: None, ty });
        self
    }

    pub fn with_constructor_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constructor_properties = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Struct description
#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<FieldDef>,
    pub constants: Vec<ConstantDef>,
    pub constructor: Option<ConstructorDef>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            fields: Vec::new(),
            constants: Vec::new(),
            constructor: None,
        }
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    pub fn field_def(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn constant(mut self, name: impl Into<String>, ty: Type, value: Option<Value>) -> Self {
        self.constants.push(ConstantDef {
            name: name.into(),
            ty,
            value,
        });
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDef) -> Self {
        self.constructor = Some(constructor);
        self
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl PartialEq for StructDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for StructDef {}

impl Hash for StructDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Unit-variant enumeration description
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumDef {
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

impl PartialEq for EnumDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for EnumDef {}

impl Hash for EnumDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Interface description with its known implementations
///
/// Implementations may mention the interface's type parameters; they are
/// bound to the interface's type arguments when candidates are resolved.
#[derive(Debug, Clone)]
pub struct InterfaceDef {
    pub name: String,
    pub type_params: Vec<String>,
    pub implementations: Vec<Type>,
}

impl InterfaceDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_params: Vec::new(),
            implementations: Vec::new(),
        }
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn implementation(mut self, ty: Type) -> Self {
        self.implementations.push(ty);
        self
    }
}

impl PartialEq for InterfaceDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for InterfaceDef {}

impl Hash for InterfaceDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_def() -> Arc<StructDef> {
        Arc::new(
            StructDef::new("Pair")
                .type_param("A")
                .type_param("B")
                .field("first", Type::param("A"))
                .field("second", Type::list(Type::param("B"))),
        )
    }

    #[test]
    fn test_display_generic_type() {
        let ty = Type::generic(pair_def(), vec![Type::String, Type::I32]);
        assert_eq!(ty.to_string(), "Pair<String, i32>");
        assert_eq!(Type::map(Type::String, Type::list(Type::U8)).to_string(), "Map<String, List<u8>>");
    }

    #[test]
    fn test_substitute_binds_parameters() {
        let ty = Type::generic(pair_def(), vec![Type::String, Type::I32]);
        let bindings = ty.bindings();
        assert_eq!(bindings.get("A"), Some(&Type::String));
        assert_eq!(
            Type::list(Type::param("B")).substitute(&bindings),
            Type::list(Type::I32)
        );
        assert_eq!(Type::param("C").substitute(&bindings), Type::param("C"));
    }

    #[test]
    fn test_struct_identity_is_name() {
        let a = Type::of_struct(StructDef::new("Item").field("id", Type::String));
        let b = Type::of_struct(StructDef::new("Item"));
        assert_eq!(a, b);
        assert_eq!(a.raw_name(), "Item");
    }

    #[test]
    fn test_scalar_classification() {
        assert!(Type::U16.is_integral());
        assert!(Type::F32.is_floating());
        assert!(Type::String.is_scalar());
        assert!(!Type::list(Type::String).is_scalar());
        assert!(Type::of_interface(InterfaceDef::new("Shape")).is_abstract());
    }
}
