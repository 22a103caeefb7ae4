//! Constructor-argument validation.
//!
//! Inputs are walked in ABI declaration order, never the order arguments were
//! supplied, and validation never short-circuits: every invalid field is
//! reported, with path-extended field labels for composite elements
//! (`balances[2]`, `order.maker`).

use serde_json::Value;

use abidesk_core::{
    args::{ConstructorArg, FieldError, ValidationResult},
    schema::Param,
    types::ParamType,
};

use crate::coerce;

/// Validate a provided argument set against the schema's constructor inputs.
///
/// A schema with zero declared inputs is satisfied by an empty provided set.
/// Unknown extra arguments are ignored.
pub fn validate_constructor_args(
    inputs: &[Param],
    provided: &[ConstructorArg],
) -> ValidationResult {
    let mut errors = Vec::new();

    for (position, input) in inputs.iter().enumerate() {
        let field = input.display_name(position);
        let arg = provided.iter().find(|a| a.name == field);

        // Absent, or present with an empty value: required. The rule applies
        // uniformly, string inputs included.
        let raw = match arg {
            Some(a) if !a.value.is_empty() => a.value.as_str(),
            _ => {
                errors.push(required(&field));
                continue;
            }
        };

        check_text(&input.ty, raw, &field, &mut errors);
    }

    ValidationResult::from_errors(errors)
}

fn required(field: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: "required".to_string(),
    }
}

fn fail(field: &str, message: impl Into<String>) -> FieldError {
    FieldError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Check a raw text value. Composites parse as JSON literals and recurse.
fn check_text(ty: &ParamType, raw: &str, field: &str, errors: &mut Vec<FieldError>) {
    match ty {
        ParamType::Array(_) | ParamType::FixedArray(_, _) | ParamType::Tuple(_) => {
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => check_json(ty, &value, field, errors),
                Err(_) => errors.push(fail(field, coerce::composite_expectation(ty))),
            }
        }
        _ => {
            if let Err(message) = check_scalar(ty, raw) {
                errors.push(fail(field, message));
            }
        }
    }
}

/// Check a JSON value at `path`, recursing into composites and collecting
/// one error per offending element.
fn check_json(ty: &ParamType, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
    match ty {
        ParamType::Array(elem) => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_json(elem, item, &format!("{path}[{i}]"), errors);
                }
            }
            None => errors.push(fail(path, "expected a JSON array")),
        },
        ParamType::FixedArray(elem, len) => match value.as_array() {
            Some(items) => {
                if items.len() != *len {
                    errors.push(fail(
                        path,
                        format!("expected exactly {len} elements, got {}", items.len()),
                    ));
                }
                for (i, item) in items.iter().enumerate() {
                    check_json(elem, item, &format!("{path}[{i}]"), errors);
                }
            }
            None => errors.push(fail(path, "expected a JSON array")),
        },
        ParamType::Tuple(comps) => match value {
            Value::Array(items) => {
                if items.len() != comps.len() {
                    errors.push(fail(
                        path,
                        format!("expected {} components, got {}", comps.len(), items.len()),
                    ));
                }
                for (i, ((name, cty), item)) in comps.iter().zip(items).enumerate() {
                    check_json(cty, item, &component_path(path, name, i), errors);
                }
            }
            Value::Object(map) => {
                for (i, (name, cty)) in comps.iter().enumerate() {
                    let comp_path = component_path(path, name, i);
                    match map.get(name) {
                        Some(item) => check_json(cty, item, &comp_path, errors),
                        None => errors.push(required(&comp_path)),
                    }
                }
            }
            _ => errors.push(fail(path, "expected a JSON array or object")),
        },
        // Scalar leaf.
        _ => match value {
            Value::String(s) => {
                if s.is_empty() {
                    errors.push(required(path));
                } else if let Err(message) = check_scalar(ty, s) {
                    errors.push(fail(path, message));
                }
            }
            Value::Number(n) => match ty {
                ParamType::Uint(_) | ParamType::Int(_) => {
                    if let Err(message) = check_scalar(ty, &n.to_string()) {
                        errors.push(fail(path, message));
                    }
                }
                _ => errors.push(fail(path, format!("expected a {ty} value, got a number"))),
            },
            Value::Bool(_) => {
                if !matches!(ty, ParamType::Bool) {
                    errors.push(fail(path, format!("expected a {ty} value, got a boolean")));
                }
            }
            _ => errors.push(fail(path, format!("expected a {ty} value"))),
        },
    }
}

fn component_path(path: &str, name: &str, position: usize) -> String {
    if name.is_empty() {
        format!("{path}[{position}]")
    } else {
        format!("{path}.{name}")
    }
}

/// Scalar checks delegate to the shared coercion parsers.
fn check_scalar(ty: &ParamType, raw: &str) -> Result<(), String> {
    match ty {
        ParamType::Uint(width) => coerce::parse_uint(raw, *width).map(|_| ()),
        ParamType::Int(width) => coerce::parse_int(raw, *width).map(|_| ()),
        ParamType::Address => coerce::parse_address(raw).map(|_| ()),
        ParamType::Bool => coerce::parse_bool(raw).map(|_| ()),
        ParamType::Str => Ok(()),
        ParamType::Bytes => coerce::parse_bytes(raw, None).map(|_| ()),
        ParamType::FixedBytes(n) => coerce::parse_bytes(raw, Some(*n)).map(|_| ()),
        // Composites are handled before this point.
        _ => Ok(()),
    }
}
