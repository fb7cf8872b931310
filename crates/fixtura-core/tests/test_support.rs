//! Shared test support utilities for integration tests

#![allow(dead_code)]

use fixtura_core::{Describe, FixtureMonkey, InterfaceDef, StructDef, Type, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub qty: u32,
}

impl Describe for Item {
    fn describe() -> Type {
        Type::of_struct(
            StructDef::new("Item")
                .field("id", Type::String)
                .field("qty", Type::U32),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Shape {
    Circle { radius: f64 },
    Square { side: f64 },
}

pub fn circle() -> Type {
    Type::of_struct(StructDef::new("Circle").field("radius", Type::F64))
}

pub fn square() -> Type {
    Type::of_struct(StructDef::new("Square").field("side", Type::F64))
}

impl Describe for Shape {
    fn describe() -> Type {
        Type::of_interface(
            InterfaceDef::new("Shape")
                .implementation(circle())
                .implementation(square()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub items: Vec<Item>,
    pub tags: BTreeMap<String, i32>,
    pub shape: Shape,
    pub note: Option<String>,
}

impl Describe for Order {
    fn describe() -> Type {
        Type::of_struct(
            StructDef::new("Order")
                .field("id", Type::String)
                .field("items", Vec::<Item>::describe())
                .field("tags", BTreeMap::<String, i32>::describe())
                .field("shape", Shape::describe())
                .field("note", Option::<String>::describe()),
        )
    }
}

/// Seeded fixture with default settings
pub fn fixture(seed: u64) -> FixtureMonkey {
    FixtureMonkey::builder()
        .seed(seed)
        .build()
        .expect("default settings are valid")
}

pub fn sample_order() -> Order {
    let mut tags = BTreeMap::new();
    tags.insert("priority".to_string(), 3);
    tags.insert("region".to_string(), -1);
    Order {
        id: "order-7".to_string(),
        items: vec![
            Item {
                id: "a".to_string(),
                qty: 1,
            },
            Item {
                id: "b".to_string(),
                qty: 20,
            },
        ],
        tags,
        shape: Shape::Square { side: 2.5 },
        note: None,
    }
}

/// Element count of a container field, zero when absent or null
pub fn count(value: &Value, field: &str) -> usize {
    value.field(field).and_then(Value::element_count).unwrap_or(0)
}
