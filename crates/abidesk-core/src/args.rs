//! User-supplied constructor arguments and the aggregated validation result.

use serde::{Deserialize, Serialize};

/// A raw, user-supplied argument for a constructor input.
///
/// Matched 1:1, by name and ABI declaration order, to the schema's
/// constructor inputs. Instances are transient: created per edit, discarded
/// on submit or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorArg {
    pub name: String,
    /// Declared type token as the caller supplied it. Informational; the
    /// schema's parsed type is authoritative during validation.
    #[serde(rename = "type", default)]
    pub ty: String,
    pub value: String,
}

impl ConstructorArg {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            value: value.into(),
        }
    }
}

/// A single per-field validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path: the input name, extended for composites
    /// (`balances[2]`, `order.maker`).
    pub field: String,
    pub message: String,
}

/// The aggregated outcome of validating one argument set.
///
/// Field-level failures are never thrown past the validator boundary; they
/// are collected here, ordered by ABI input declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    /// Build a result from collected errors, maintaining the invariant
    /// `valid == errors.is_empty()`.
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }
}
