//! Validation of generated values
//!
//! When valid-only mode is on, every sample is passed to the configured
//! `ArbitraryValidator`. Violations surface as `Error::ConstraintViolation`
//! and are absorbed by the root filter, which regenerates the value.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::arbitrary::PostCondition;
use crate::types::Value;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Dotted path of the offending property, `$` for the whole value
    pub property_path: String,
    /// Name of the rule that was violated
    pub rule: String,
    pub message: String,
}

impl ConstraintViolation {
    pub fn new(property_path: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property_path: property_path.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule '{}' violated at '{}': {}", self.rule, self.property_path, self.message)
    }
}

pub trait ArbitraryValidator: Send + Sync {
    fn validate(&self, value: &Value) -> Result<(), Vec<ConstraintViolation>>;
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl ArbitraryValidator for NoopValidator {
    fn validate(&self, _value: &Value) -> Result<(), Vec<ConstraintViolation>> {
        Ok(())
    }
}

type FieldCheck = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
struct FieldRule {
    path: String,
    rule: String,
    check: FieldCheck,
}

/// Rules keyed by dotted value paths such as `items[0].id`
///
/// A path that does not resolve in the value is checked against `Null`.
#[derive(Clone, Default)]
pub struct FieldConstraintValidator {
    rules: Vec<FieldRule>,
}

impl FieldConstraintValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<F>(mut self, path: impl Into<String>, rule: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.rules.push(FieldRule {
            path: path.into(),
            rule: rule.into(),
            check: Arc::new(check),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl ArbitraryValidator for FieldConstraintValidator {
    fn validate(&self, value: &Value) -> Result<(), Vec<ConstraintViolation>> {
        let violations: Vec<ConstraintViolation> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let field = value.get_path(&rule.path).unwrap_or(&Value::Null);
                if (rule.check)(field) {
                    None
                } else {
                    Some(ConstraintViolation::new(
                        rule.path.clone(),
                        rule.rule.clone(),
                        format!("value {} rejected", field),
                    ))
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl fmt::Debug for FieldConstraintValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldConstraintValidator")
            .field("rules", &self.rules.iter().map(|r| r.path.as_str()).collect::<Vec<_>>())
            .finish()
    }
}

/// Collapse violations into one retryable error
pub fn violations_to_error(violations: Vec<ConstraintViolation>) -> Error {
    let property_names = violations.iter().map(|v| v.property_path.clone()).collect();
    let message = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Error::ConstraintViolation {
        property_names,
        message,
    }
}

/// Post-condition running a validator
pub fn validation_condition(validator: Arc<dyn ArbitraryValidator>) -> PostCondition {
    PostCondition::checked("valid", move |value| {
        validator.validate(value).map_err(violations_to_error)
    })
}
