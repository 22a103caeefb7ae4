//! Textual and JSON input → [`AbiValue`] coercion.
//!
//! This module owns the scalar parsers; the validator calls the same
//! functions to check, the encoder calls them to convert. Values that fit in
//! 128 bits narrow to the machine variants, wider values stay decimal text.

use alloy_primitives::{Sign, I256, U256};
use serde_json::Value;

use abidesk_core::{types::ParamType, value::AbiValue};

/// Coerce a raw text value against its declared type.
/// Composite types expect a JSON array/object literal.
pub fn from_text(ty: &ParamType, raw: &str) -> Result<AbiValue, String> {
    match ty {
        ParamType::Uint(width) => parse_uint(raw, *width).map(narrow_uint),
        ParamType::Int(width) => parse_int(raw, *width).map(narrow_int),
        ParamType::Address => parse_address(raw).map(AbiValue::Address),
        ParamType::Bool => parse_bool(raw).map(AbiValue::Bool),
        ParamType::Str => Ok(AbiValue::Str(raw.to_string())),
        ParamType::Bytes => parse_bytes(raw, None).map(AbiValue::Bytes),
        ParamType::FixedBytes(n) => parse_bytes(raw, Some(*n)).map(AbiValue::Bytes),
        ParamType::Array(_) | ParamType::FixedArray(_, _) | ParamType::Tuple(_) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|_| composite_expectation(ty).to_string())?;
            from_json(ty, &value)
        }
    }
}

/// Coerce a JSON value (an element of a composite literal) against its type.
pub fn from_json(ty: &ParamType, value: &Value) -> Result<AbiValue, String> {
    match ty {
        ParamType::Array(elem) => {
            let items = value
                .as_array()
                .ok_or_else(|| "expected a JSON array".to_string())?;
            let coerced: Result<Vec<AbiValue>, String> =
                items.iter().map(|item| from_json(elem, item)).collect();
            Ok(AbiValue::Array(coerced?))
        }
        ParamType::FixedArray(elem, len) => {
            let items = value
                .as_array()
                .ok_or_else(|| "expected a JSON array".to_string())?;
            if items.len() != *len {
                return Err(format!("expected exactly {len} elements, got {}", items.len()));
            }
            let coerced: Result<Vec<AbiValue>, String> =
                items.iter().map(|item| from_json(elem, item)).collect();
            Ok(AbiValue::Array(coerced?))
        }
        ParamType::Tuple(comps) => {
            let mut fields = Vec::with_capacity(comps.len());
            match value {
                Value::Array(items) => {
                    if items.len() != comps.len() {
                        return Err(format!(
                            "expected {} components, got {}",
                            comps.len(),
                            items.len()
                        ));
                    }
                    for ((name, cty), item) in comps.iter().zip(items) {
                        fields.push((name.clone(), from_json(cty, item)?));
                    }
                }
                Value::Object(map) => {
                    for (name, cty) in comps {
                        let item = map
                            .get(name)
                            .ok_or_else(|| format!("missing component '{name}'"))?;
                        fields.push((name.clone(), from_json(cty, item)?));
                    }
                }
                _ => return Err("expected a JSON array or object".to_string()),
            }
            Ok(AbiValue::Tuple(fields))
        }
        // Scalar leaf: strings carry the textual form; bare JSON numbers and
        // booleans are accepted where they are unambiguous.
        _ => match value {
            Value::String(s) => from_text(ty, s),
            Value::Number(n) => match ty {
                ParamType::Uint(_) | ParamType::Int(_) => from_text(ty, &n.to_string()),
                _ => Err(format!("expected a {ty} value, got a number")),
            },
            Value::Bool(b) => match ty {
                ParamType::Bool => Ok(AbiValue::Bool(*b)),
                _ => Err(format!("expected a {ty} value, got a boolean")),
            },
            _ => Err(format!("expected a {ty} value")),
        },
    }
}

pub(crate) fn composite_expectation(ty: &ParamType) -> &'static str {
    match ty {
        ParamType::Tuple(_) => "expected a JSON array or object",
        _ => "expected a JSON array",
    }
}

// ─── Scalar parsers ──────────────────────────────────────────────────────────

/// Parse an unsigned integer literal (base-10 or 0x-hex) and range-check it
/// against the declared width.
pub fn parse_uint(raw: &str, width: u16) -> Result<U256, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("expected an integer".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("negative value not allowed for uint{width}"));
    }
    let magnitude = parse_magnitude(s)?;
    if width < 256 {
        let max = (U256::from(1u64) << (width as usize)) - U256::from(1u64);
        if magnitude > max {
            return Err(format!("value out of range for uint{width}"));
        }
    }
    Ok(magnitude)
}

/// Parse a signed integer literal (base-10 or 0x-hex magnitude with optional
/// leading minus) and range-check it against the declared width.
pub fn parse_int(raw: &str, width: u16) -> Result<I256, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("expected an integer".to_string());
    }
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (Sign::Negative, rest),
        None => (Sign::Positive, s),
    };
    let magnitude = parse_magnitude(rest)?;
    // Signed range: [-2^(w-1), 2^(w-1) - 1].
    let limit = U256::from(1u64) << ((width - 1) as usize);
    let in_range = match sign {
        Sign::Negative => magnitude <= limit,
        Sign::Positive => magnitude < limit,
    };
    if !in_range {
        return Err(format!("value out of range for int{width}"));
    }
    I256::checked_from_sign_and_abs(sign, magnitude)
        .ok_or_else(|| format!("value out of range for int{width}"))
}

fn parse_magnitude(s: &str) -> Result<U256, String> {
    if let Some(hex_part) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex_part.is_empty() {
            return Err(format!("invalid hexadecimal integer '{s}'"));
        }
        U256::from_str_radix(hex_part, 16)
            .map_err(|_| format!("invalid hexadecimal integer '{s}'"))
    } else {
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid integer '{s}'"));
        }
        U256::from_str_radix(s, 10).map_err(|_| format!("invalid integer '{s}'"))
    }
}

/// Validate an address literal: 0x followed by exactly 40 hex characters,
/// case-insensitive. Checksum is not enforced; the text round-trips as-is.
pub fn parse_address(raw: &str) -> Result<String, String> {
    let s = raw.trim();
    let hex_part = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| "expected a 0x-prefixed address".to_string())?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err("expected a 0x-prefixed address of 40 hex characters".to_string());
    }
    Ok(s.to_string())
}

pub fn parse_bool(raw: &str) -> Result<bool, String> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected 'true' or 'false'".to_string())
    }
}

/// Parse a 0x-prefixed hex byte string of even length.
/// `exact` pins the decoded length (bytesN).
pub fn parse_bytes(raw: &str, exact: Option<u8>) -> Result<Vec<u8>, String> {
    let s = raw.trim();
    let hex_part = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| "expected 0x-prefixed hex bytes".to_string())?;
    if hex_part.len() % 2 != 0 {
        return Err("odd-length hex string".to_string());
    }
    if let Some(n) = exact {
        if hex_part.len() != 2 * n as usize {
            return Err(format!(
                "expected exactly {n} bytes ({} hex characters)",
                2 * n as usize
            ));
        }
    }
    hex::decode(hex_part).map_err(|_| format!("invalid hex string '{s}'"))
}

fn narrow_uint(u: U256) -> AbiValue {
    match u128::try_from(u) {
        Ok(v) => AbiValue::Uint(v),
        Err(_) => AbiValue::BigUint(u.to_string()),
    }
}

fn narrow_int(i: I256) -> AbiValue {
    match i128::try_from(i) {
        Ok(v) => AbiValue::Int(v),
        Err(_) => AbiValue::BigInt(i.to_string()),
    }
}
