//! Validation formulas
//!
//! Covariate definitions and domain constraints carry an [`Operation`] that is
//! evaluated against a single numeric input, the covariate value expressed in
//! the definition's unit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for operation evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Input value {0} is not a finite number")]
    NonFiniteInput(f64),
    #[error("Empty '{0}' operation")]
    EmptyOperation(&'static str),
}

/// Comparison operator of a [`Operation::Compare`] node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
        }
    }
}

/// A boolean formula over one numeric input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
    /// `input <cmp> value`
    Compare { cmp: Comparison, value: f64 },
    /// `min <= input <= max`
    Between { min: f64, max: f64 },
    All { operations: Vec<Operation> },
    Any { operations: Vec<Operation> },
    Not { operation: Box<Operation> },
}

impl Operation {
    pub fn compare(cmp: Comparison, value: f64) -> Self {
        Operation::Compare { cmp, value }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Operation::Between { min, max }
    }

    /// Evaluate the formula for `input`
    pub fn evaluate(&self, input: f64) -> Result<bool, OperationError> {
        if !input.is_finite() {
            return Err(OperationError::NonFiniteInput(input));
        }
        self.evaluate_finite(input)
    }

    fn evaluate_finite(&self, input: f64) -> Result<bool, OperationError> {
        match self {
            Operation::Compare { cmp, value } => Ok(cmp.apply(input, *value)),
            Operation::Between { min, max } => Ok(*min <= input && input <= *max),
            Operation::All { operations } => {
                if operations.is_empty() {
                    return Err(OperationError::EmptyOperation("all"));
                }
                for op in operations {
                    if !op.evaluate_finite(input)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Operation::Any { operations } => {
                if operations.is_empty() {
                    return Err(OperationError::EmptyOperation("any"));
                }
                for op in operations {
                    if op.evaluate_finite(input)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Operation::Not { operation } => Ok(!operation.evaluate_finite(input)?),
        }
    }
}
