//! Error types for the Fixtura core library
//!
//! This module defines the error handling system for Fixtura, using thiserror
//! for ergonomic error definitions and anyhow for foreign error sources.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Main error type for Fixtura operations
#[derive(Error, Debug)]
pub enum Error {
    /// A decomposed value does not fit the declared type of its node
    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A user filter or post-condition rejected a generated value
    #[error("Filter rejected value: {description}")]
    FilterRejected {
        description: String,
    },

    /// The validator reported constraint violations
    #[error("Constraint violation on [{}]: {message}", .property_names.join(", "))]
    ConstraintViolation {
        property_names: Vec<String>,
        message: String,
    },

    /// A retryable generation gave up after the tries budget
    #[error("Given up generating after {tries} tries{}", describe_constrained(.property_names))]
    RetryExhausted {
        tries: usize,
        property_names: Vec<String>,
        #[source]
        source: Option<Box<Error>>,
    },

    /// A filter was applied to a value that can never be regenerated
    #[error("Fixed value can not satisfy filter: {description}")]
    FixedValueFilterMiss {
        description: String,
    },

    /// No unused value could be produced inside a unique scope
    #[error("Could not generate a unique value of {type_label} after {tries} tries")]
    UniqueExhausted {
        type_label: String,
        tries: usize,
    },

    /// Malformed path expression or an expression applied to the wrong node shape
    #[error("Invalid expression '{expression}': {message}")]
    InvalidExpression {
        expression: String,
        message: String,
        position: Option<usize>,
    },

    /// Strict mode resolved zero nodes for an expression
    #[error("No node matches expression '{expression}'")]
    NoMatchingNode {
        expression: String,
    },

    /// Inconsistent container size directive
    #[error("Invalid size for '{expression}': min {min} is greater than max {max}")]
    InvalidSize {
        expression: String,
        min: usize,
        max: usize,
    },

    /// A mapping function could not handle the upstream value
    #[error("Mapping failed at {path}: {message}")]
    Mapping {
        path: String,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// No introspector knows how to generate the type
    #[error("No introspector generates type {type_name} at {path}")]
    NoIntrospector {
        type_name: String,
        path: String,
    },

    /// Unsupported feature or operation
    #[error("Unsupported operation: {message}")]
    Unsupported {
        message: String,
        feature: Option<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

fn describe_constrained(property_names: &[String]) -> String {
    if property_names.is_empty() {
        String::new()
    } else {
        format!(", constrained properties: [{}]", property_names.join(", "))
    }
}

impl Error {
    /// Create a type mismatch error
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl fmt::Display,
        found: impl fmt::Display,
    ) -> Self {
        Error::TypeMismatch {
            path: path.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Create an invalid expression error
    pub fn invalid_expression(
        expression: impl Into<String>,
        message: impl Into<String>,
        position: Option<usize>,
    ) -> Self {
        Error::InvalidExpression {
            expression: expression.into(),
            message: message.into(),
            position,
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::Unsupported {
            message: message.into(),
            feature: None,
        }
    }

    /// Whether a filter may absorb this error and try again
    ///
    /// Exhaustion is final: an inner filter that ran out of tries is not
    /// retried by an enclosing one.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::FilterRejected { .. } | Error::ConstraintViolation { .. })
    }

    /// Whether a tries budget ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::RetryExhausted { .. } | Error::UniqueExhausted { .. })
    }

    /// Property names blamed by this error, searching nested causes
    pub fn constrained_property_names(&self) -> Vec<String> {
        match self {
            Error::ConstraintViolation { property_names, .. } => property_names.clone(),
            Error::RetryExhausted { property_names, source, .. } => {
                if !property_names.is_empty() {
                    property_names.clone()
                } else {
                    source
                        .as_ref()
                        .map(|e| e.constrained_property_names())
                        .unwrap_or_default()
                }
            }
            _ => Vec::new(),
        }
    }
}

/// Strictness modes for expression resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrictMode {
    /// Fail when an expression matches no node
    Strict,
    /// Log a warning and skip the manipulation
    Warn,
    /// Silently skip the manipulation
    #[default]
    Lenient,
}

impl fmt::Display for StrictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrictMode::Strict => write!(f, "Strict"),
            StrictMode::Warn => write!(f, "Warn"),
            StrictMode::Lenient => write!(f, "Lenient"),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
