//! Dynamic values produced by generation
//!
//! Values convert to and from `serde_json::Value`; the conversion from JSON
//! is guided by a `Type` so map keys, unsigned integers and interface
//! implementations are recovered faithfully.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::Type;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fmt;

/// A generated (or decomposed) value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    /// Enum variant name
    Enum(String),
    /// Elements of a list, set, array or stream
    List(Vec<Value>),
    /// Map entries in insertion order
    Map(Vec<(Value, Value)>),
    /// Struct instance
    Object {
        type_name: String,
        fields: IndexMap<String, Value>,
    },
}

impl Value {
    /// Build an object value from field pairs
    pub fn object<I, K>(type_name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object {
            type_name: type_name.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Field of an object value
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object { fields, .. } => fields.get(name),
            _ => None,
        }
    }

    /// Type name of an object value
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Value::Object { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// Number of elements or entries of a container value
    pub fn element_count(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Short description of the runtime shape, used in error messages
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::UInt(_) => "uint".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Char(_) => "char".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::Enum(variant) => format!("enum variant {}", variant),
            Value::List(_) => "list".to_string(),
            Value::Map(_) => "map".to_string(),
            Value::Object { type_name, .. } => type_name.clone(),
        }
    }

    /// Canonical text of the value, stable for equal values
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Whether this runtime value may be placed at a location of type `ty`
    ///
    /// Interfaces accept any object; the concrete implementation is checked
    /// against the candidate set at decomposition time.
    pub fn is_assignable_to(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Null, _) | (_, Type::Param(_)) => true,
            (value, Type::Optional(inner)) | (value, Type::Supplier(inner)) => {
                value.is_assignable_to(inner)
            }
            (Value::Bool(_), Type::Bool) => true,
            (Value::Int(i), t) if t.is_integral() => integer_fits(*i as i128, t),
            (Value::UInt(u), t) if t.is_integral() => integer_fits(*u as i128, t),
            (Value::Float(_), t) if t.is_floating() => true,
            (Value::Char(_), Type::Char) => true,
            (Value::Str(_), Type::String) => true,
            (Value::Enum(variant), Type::Enum(def)) => def.variants.contains(variant),
            (Value::List(items), Type::List(e))
            | (Value::List(items), Type::Set(e))
            | (Value::List(items), Type::Array(e))
            | (Value::List(items), Type::Stream(e)) => items.iter().all(|v| v.is_assignable_to(e)),
            (Value::List(items), Type::Entry(k, v)) => {
                items.len() == 2 && items[0].is_assignable_to(k) && items[1].is_assignable_to(v)
            }
            (Value::Map(entries), Type::Map(k, v)) => entries
                .iter()
                .all(|(key, value)| key.is_assignable_to(k) && value.is_assignable_to(v)),
            (Value::Object { type_name, .. }, Type::Struct(def, _)) => *type_name == def.name,
            (Value::Object { .. }, Type::Interface(_, _)) => true,
            _ => false,
        }
    }

    /// Navigate a dotted path such as `items[0].id`
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty() && *s != "$") {
            let (name, indices) = match segment.find('[') {
                Some(pos) => (&segment[..pos], &segment[pos..]),
                None => (segment, ""),
            };
            if !name.is_empty() {
                current = current.field(name)?;
            }
            for index in indices
                .split(|c| c == '[' || c == ']')
                .filter(|s| !s.is_empty())
            {
                let index: usize = index.parse().ok()?;
                current = match current {
                    Value::List(items) => items.get(index)?,
                    Value::Map(entries) => &entries.get(index)?.1,
                    _ => return None,
                };
            }
        }
        Some(current)
    }

    /// Convert into a JSON value; map keys are rendered as strings
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::UInt(u) => Json::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Char(c) => Json::String(c.to_string()),
            Value::Str(s) | Value::Enum(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => Json::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.key_string(), v.to_json()))
                    .collect(),
            ),
            Value::Object { fields, .. } => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn key_string(&self) -> String {
        match self {
            Value::Str(s) | Value::Enum(s) => s.clone(),
            Value::Char(c) => c.to_string(),
            other => other.to_json().to_string(),
        }
    }

    /// Convert a JSON value into a value of the given type
    pub fn from_json(json: &Json, ty: &Type) -> Result<Value> {
        from_json_at(json, ty, "$")
    }

    /// Convert a JSON value without type guidance
    pub fn from_json_untyped(json: &Json) -> Value {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => Value::List(items.iter().map(Value::from_json_untyped).collect()),
            Json::Object(fields) => Value::Object {
                type_name: String::new(),
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::from_json_untyped(v)))
                    .collect(),
            },
        }
    }
}

fn integer_fits(value: i128, ty: &Type) -> bool {
    let (min, max): (i128, i128) = match ty {
        Type::I8 => (i8::MIN as i128, i8::MAX as i128),
        Type::I16 => (i16::MIN as i128, i16::MAX as i128),
        Type::I32 => (i32::MIN as i128, i32::MAX as i128),
        Type::I64 => (i64::MIN as i128, i64::MAX as i128),
        Type::U8 => (0, u8::MAX as i128),
        Type::U16 => (0, u16::MAX as i128),
        Type::U32 => (0, u32::MAX as i128),
        Type::U64 => (0, u64::MAX as i128),
        _ => return false,
    };
    value >= min && value <= max
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn from_json_at(json: &Json, ty: &Type, path: &str) -> Result<Value> {
    let mismatch = || Error::type_mismatch(path, ty, json_kind(json));

    if json.is_null() {
        return Ok(Value::Null);
    }

    match ty {
        Type::Bool => json.as_bool().map(Value::Bool).ok_or_else(mismatch),
        Type::I8 | Type::I16 | Type::I32 | Type::I64 => {
            json.as_i64().map(Value::Int).ok_or_else(mismatch)
        }
        Type::U8 | Type::U16 | Type::U32 => {
            json.as_u64().map(|u| Value::Int(u as i64)).ok_or_else(mismatch)
        }
        Type::U64 => json.as_u64().map(Value::UInt).ok_or_else(mismatch),
        Type::F32 | Type::F64 => json.as_f64().map(Value::Float).ok_or_else(mismatch),
        Type::Char => {
            let s = json.as_str().ok_or_else(mismatch)?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(mismatch()),
            }
        }
        Type::String => json
            .as_str()
            .map(|s| Value::Str(s.to_string()))
            .ok_or_else(mismatch),
        Type::Enum(def) => {
            let s = json.as_str().ok_or_else(mismatch)?;
            if def.variants.iter().any(|v| v == s) {
                Ok(Value::Enum(s.to_string()))
            } else {
                Err(Error::type_mismatch(path, ty, format!("variant {}", s)))
            }
        }
        Type::List(e) | Type::Set(e) | Type::Array(e) | Type::Stream(e) => {
            let items = json.as_array().ok_or_else(mismatch)?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| from_json_at(item, e, &format!("{}[{}]", path, i)))
                .collect::<Result<Vec<_>>>()
                .map(Value::List)
        }
        Type::Map(k, v) => match json {
            Json::Object(fields) => fields
                .iter()
                .map(|(key, value)| {
                    let entry_path = format!("{}{{{}}}", path, key);
                    Ok((
                        key_from_str(key, k, &entry_path)?,
                        from_json_at(value, v, &entry_path)?,
                    ))
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
            Json::Array(pairs) => pairs
                .iter()
                .enumerate()
                .map(|(i, pair)| {
                    let entry_path = format!("{}[{}]", path, i);
                    match pair.as_array().map(Vec::as_slice) {
                        Some([key, value]) => Ok((
                            from_json_at(key, k, &entry_path)?,
                            from_json_at(value, v, &entry_path)?,
                        )),
                        _ => Err(Error::type_mismatch(entry_path, "[key, value]", json_kind(pair))),
                    }
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Map),
            _ => Err(mismatch()),
        },
        Type::Entry(k, v) => match json.as_array().map(Vec::as_slice) {
            Some([key, value]) => Ok(Value::List(vec![
                from_json_at(key, k, &format!("{}{{key}}", path))?,
                from_json_at(value, v, &format!("{}{{value}}", path))?,
            ])),
            _ => Err(mismatch()),
        },
        Type::Optional(inner) | Type::Supplier(inner) => from_json_at(json, inner, path),
        Type::Struct(def, _) => {
            let fields = json.as_object().ok_or_else(mismatch)?;
            let bindings = ty.bindings();
            let mut values = IndexMap::new();
            for field in &def.fields {
                let field_type = field.ty.substitute(&bindings);
                let field_path = format!("{}.{}", path, field.name);
                let value = match fields.get(&field.name) {
                    Some(json_field) => from_json_at(json_field, &field_type, &field_path)?,
                    None => Value::Null,
                };
                values.insert(field.name.clone(), value);
            }
            Ok(Value::Object {
                type_name: def.name.clone(),
                fields: values,
            })
        }
        Type::Interface(def, _) => {
            let fields = json.as_object().ok_or_else(mismatch)?;
            let bindings = ty.bindings();
            let candidates: Vec<Type> = def
                .implementations
                .iter()
                .map(|t| t.substitute(&bindings))
                .collect();
            let keys: Vec<&String> = fields.keys().collect();
            let exact = candidates.iter().find(|candidate| match candidate {
                Type::Struct(sd, _) => {
                    sd.fields.len() == keys.len() && keys.iter().all(|k| sd.find_field(k).is_some())
                }
                _ => false,
            });
            let chosen = exact.or_else(|| {
                candidates.iter().find(|candidate| match candidate {
                    Type::Struct(sd, _) => keys.iter().all(|k| sd.find_field(k).is_some()),
                    _ => false,
                })
            });
            match chosen {
                Some(concrete) => from_json_at(json, concrete, path),
                None => Err(Error::type_mismatch(
                    path,
                    ty,
                    "object matching no implementation",
                )),
            }
        }
        Type::Param(_) => Ok(Value::from_json_untyped(json)),
    }
}

fn key_from_str(key: &str, ty: &Type, path: &str) -> Result<Value> {
    match ty {
        Type::String => Ok(Value::Str(key.to_string())),
        Type::Char | Type::Enum(_) => from_json_at(&Json::String(key.to_string()), ty, path),
        _ => {
            let parsed: Json = serde_json::from_str(key)
                .map_err(|_| Error::type_mismatch(path, ty, format!("key '{}'", key)))?;
            from_json_at(&parsed, ty, path)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "'{}'", c),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Enum(v) => write!(f, "{}", v),
            _ => write!(f, "{}", self.to_json()),
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
