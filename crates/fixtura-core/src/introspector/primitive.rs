//! Scalar and enum introspection
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{ArbitraryGeneratorContext, ArbitraryIntrospector};
use crate::arbitrary::{BoxedArbitrary, CombinableArbitraryExt, LazyCombinableArbitrary};
use crate::property::choose_variant;
use crate::types::{Type, Value};
use crate::{Error, Result};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::Rng;

const FLOAT_BOUND: f64 = 10_000.0;

/// Bounds applied to scalar draws
#[derive(Debug, Clone, Copy)]
struct ScalarLimits {
    string_max_length: usize,
    int_range: Option<(i64, i64)>,
}

/// Booleans, numbers, characters and strings
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveIntrospector;

impl ArbitraryIntrospector for PrimitiveIntrospector {
    fn introspect(&self, ctx: &mut ArbitraryGeneratorContext<'_>) -> Result<Option<BoxedArbitrary>> {
        let ty = ctx.resolved_type().clone();
        if !ty.is_scalar() || matches!(ty, Type::Enum(_)) {
            return Ok(None);
        }
        let limits = ScalarLimits {
            string_max_length: ctx.settings.string_max_length,
            int_range: ctx.settings.int_range,
        };
        let arbitrary =
            LazyCombinableArbitrary::new(move |generation| Ok(random_scalar(&ty, &limits, generation.rng)));
        Ok(Some(arbitrary.boxed()))
    }
}

fn random_scalar(ty: &Type, limits: &ScalarLimits, rng: &mut StdRng) -> Value {
    match ty {
        Type::Bool => Value::Bool(rng.gen()),
        Type::F32 | Type::F64 => {
            let (low, high) = limits
                .int_range
                .map(|(low, high)| (low as f64, high as f64))
                .unwrap_or((-FLOAT_BOUND, FLOAT_BOUND));
            let value: f64 = rng.gen_range(low..=high);
            if matches!(ty, Type::F32) {
                Value::Float(value as f32 as f64)
            } else {
                Value::Float(value)
            }
        }
        Type::Char => Value::Char(rng.sample(Alphanumeric) as char),
        Type::String => {
            let length = rng.gen_range(0..=limits.string_max_length);
            Value::Str((0..length).map(|_| rng.sample(Alphanumeric) as char).collect())
        }
        integral => {
            let (low, high) = integral_bounds(integral, limits.int_range);
            let value = rng.gen_range(low..=high);
            if matches!(integral, Type::U64) {
                Value::UInt(value as u64)
            } else {
                Value::Int(value as i64)
            }
        }
    }
}

/// Inclusive bounds of an integral type, narrowed by the configured range
fn integral_bounds(ty: &Type, int_range: Option<(i64, i64)>) -> (i128, i128) {
    let (type_low, type_high): (i128, i128) = match ty {
        Type::I8 => (i8::MIN.into(), i8::MAX.into()),
        Type::I16 => (i16::MIN.into(), i16::MAX.into()),
        Type::I32 => (i32::MIN.into(), i32::MAX.into()),
        Type::U8 => (0, u8::MAX.into()),
        Type::U16 => (0, u16::MAX.into()),
        Type::U32 => (0, u32::MAX.into()),
        Type::U64 => (0, u64::MAX.into()),
        _ => (i64::MIN.into(), i64::MAX.into()),
    };
    let Some((range_low, range_high)) = int_range else {
        return (type_low, type_high);
    };
    let (low, high) = (type_low.max(range_low.into()), type_high.min(range_high.into()));
    if low > high {
        log::warn!("int_range ({}, {}) lies outside {}, using the full range", range_low, range_high, ty);
        (type_low, type_high)
    } else {
        (low, high)
    }
}

/// Unit-variant enums, uniformly over the variants
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumIntrospector;

impl ArbitraryIntrospector for EnumIntrospector {
    fn introspect(&self, ctx: &mut ArbitraryGeneratorContext<'_>) -> Result<Option<BoxedArbitrary>> {
        let Type::Enum(def) = ctx.resolved_type() else {
            return Ok(None);
        };
        if def.variants.is_empty() {
            return Err(Error::Unsupported {
                message: format!("enum {} at {} has no variants", def.name, ctx.path()),
                feature: Some("enum".to_string()),
            });
        }
        let variants = def.variants.clone();
        let arbitrary = LazyCombinableArbitrary::new(move |generation| {
            Ok(choose_variant(&variants, generation.rng)
                .map(|variant| Value::Enum(variant.clone()))
                .unwrap_or(Value::Null))
        });
        Ok(Some(arbitrary.boxed()))
    }
}
