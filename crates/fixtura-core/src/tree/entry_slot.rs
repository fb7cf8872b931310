//! Map entry slot arithmetic
//!
//! A map with `n` entries exposes `2n` physical slots: entry `i` owns the key
//! slot `2i` and the value slot `2i + 1`. All conversions between logical
//! entry indices and physical slots go through these functions.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half of a map entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapPart {
    Key,
    Value,
}

impl fmt::Display for MapPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapPart::Key => write!(f, "key"),
            MapPart::Value => write!(f, "value"),
        }
    }
}

/// Slots per logical entry
pub const SLOTS_PER_ENTRY: usize = 2;

pub fn key_slot(entry_index: usize) -> usize {
    entry_index * SLOTS_PER_ENTRY
}

pub fn value_slot(entry_index: usize) -> usize {
    entry_index * SLOTS_PER_ENTRY + 1
}

pub fn slot_of(entry_index: usize, part: MapPart) -> usize {
    match part {
        MapPart::Key => key_slot(entry_index),
        MapPart::Value => value_slot(entry_index),
    }
}

/// Logical entry owning a physical slot
pub fn entry_index(slot: usize) -> usize {
    slot / SLOTS_PER_ENTRY
}

pub fn slot_part(slot: usize) -> MapPart {
    if slot % SLOTS_PER_ENTRY == 0 {
        MapPart::Key
    } else {
        MapPart::Value
    }
}
