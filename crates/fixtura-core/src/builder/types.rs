//! Builder state shared by every derivation of a builder
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::arbitrary::PostCondition;
use crate::manipulator::ArbitraryManipulator;
use crate::tree::{ContainerSizeConstraint, TraverseContext};
use crate::types::Value;
use crate::{Error, StrictMode};

/// Configuration error recorded by a fluent call and reported at sample time
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeferredError {
    Expression {
        expression: String,
        message: String,
        position: Option<usize>,
    },
    Size {
        expression: String,
        min: usize,
        max: usize,
    },
}

impl DeferredError {
    /// Keep the parts of an expression error that can be replayed
    pub(crate) fn from_error(expression: &str, error: Error) -> Self {
        match error {
            Error::InvalidExpression {
                expression,
                message,
                position,
            } => DeferredError::Expression {
                expression,
                message,
                position,
            },
            other => DeferredError::Expression {
                expression: expression.to_string(),
                message: other.to_string(),
                position: None,
            },
        }
    }

    pub(crate) fn to_error(&self) -> Error {
        match self {
            DeferredError::Expression {
                expression,
                message,
                position,
            } => Error::invalid_expression(expression.clone(), message.clone(), *position),
            DeferredError::Size { expression, min, max } => Error::InvalidSize {
                expression: expression.clone(),
                min: *min,
                max: *max,
            },
        }
    }
}

/// Everything a builder has been told, copied on every derivation
#[derive(Debug, Clone)]
pub struct ArbitraryBuilderContext {
    pub(crate) manipulators: Vec<ArbitraryManipulator>,
    pub(crate) size_constraints: Vec<ContainerSizeConstraint>,
    pub(crate) filters: Vec<PostCondition>,
    pub(crate) fixed: bool,
    /// Value of a fixed builder and the revision it was generated at
    pub(crate) fixed_value: Option<(Value, u64)>,
    pub(crate) valid_only: bool,
    pub(crate) unique: bool,
    pub(crate) strict_mode: StrictMode,
    pub(crate) deferred: Option<DeferredError>,
    revision: u64,
}

impl ArbitraryBuilderContext {
    pub fn new(valid_only: bool, strict_mode: StrictMode) -> Self {
        Self {
            manipulators: Vec::new(),
            size_constraints: Vec::new(),
            filters: Vec::new(),
            fixed: false,
            fixed_value: None,
            valid_only,
            unique: false,
            strict_mode,
            deferred: None,
            revision: 0,
        }
    }

    pub(crate) fn push_manipulator(&mut self, manipulator: ArbitraryManipulator) {
        self.manipulators.push(manipulator);
        self.revision += 1;
    }

    pub(crate) fn push_size_constraint(&mut self, constraint: ContainerSizeConstraint) {
        self.size_constraints.push(constraint);
        self.revision += 1;
    }

    /// Only the first configuration error is kept
    pub(crate) fn defer(&mut self, error: DeferredError) {
        if self.deferred.is_none() {
            self.deferred = Some(error);
        }
    }

    /// Deep copy: stateful manipulators get their own state
    pub fn duplicate(&self) -> Self {
        Self {
            manipulators: self.manipulators.iter().map(ArbitraryManipulator::duplicate).collect(),
            ..self.clone()
        }
    }

    /// Bumped by every change to the manipulators or size constraints
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn manipulators(&self) -> &[ArbitraryManipulator] {
        &self.manipulators
    }

    /// Manipulators in application order: sizes, then values, then post-conditions
    ///
    /// The sort is stable, so registration order holds within a category.
    pub fn ordered_manipulators(&self) -> Vec<ArbitraryManipulator> {
        let mut ordered = self.manipulators.clone();
        ordered.sort_by_key(ArbitraryManipulator::category);
        ordered
    }

    pub fn traverse_context(&self) -> TraverseContext {
        TraverseContext::new(self.size_constraints.clone())
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Cached fixed value, if still current
    pub(crate) fn current_fixed_value(&self) -> Option<&Value> {
        match &self.fixed_value {
            Some((value, revision)) if *revision == self.revision => Some(value),
            _ => None,
        }
    }
}
