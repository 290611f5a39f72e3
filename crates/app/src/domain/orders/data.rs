//! Orders Data

use serde_json::Value;
use thiserror::Error;

/// Product lines attached to an order, stored as given. Items may be any JSON value.
pub type Products = Vec<Value>;

const MAX_TEXT_LENGTH: usize = 255;

/// New Order Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    pub email: String,
    pub products: Products,
    pub address: String,
}

impl NewOrder {
    /// Check the entity rules that apply before an order is stored.
    ///
    /// # Errors
    ///
    /// Returns every violated rule at once.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        let mut violations = Vec::new();

        for (field, value, required) in [
            ("customerName", &self.customer_name, true),
            ("email", &self.email, false),
            ("address", &self.address, true),
        ] {
            if required && value.trim().is_empty() {
                violations.push(FieldViolation {
                    field,
                    reason: ViolationReason::Blank,
                });
            }

            if value.chars().count() > MAX_TEXT_LENGTH {
                violations.push(FieldViolation {
                    field,
                    reason: ViolationReason::TooLong(MAX_TEXT_LENGTH),
                });
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(OrderValidationError { violations })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViolationReason {
    #[error("must not be blank")]
    Blank,

    #[error("must be at most {0} characters")]
    TooLong(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: ViolationReason,
}

/// One or more entity rules rejected a new order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_violations(.violations))]
pub struct OrderValidationError {
    violations: Vec<FieldViolation>,
}

impl OrderValidationError {
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
