//! The normalized runtime value model.
//!
//! Every decoded log argument and every coerced user input becomes an
//! [`AbiValue`]. Integers never pass through native floating point: values
//! that fit in 128 bits use the machine variants, anything wider is carried
//! as decimal text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded, normalized ABI value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AbiValue {
    Uint(u128),
    /// Unsigned integers wider than u128, as decimal text.
    BigUint(String),
    Int(i128),
    /// Signed integers wider than i128, as decimal text.
    BigInt(String),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    /// 20-byte EVM address, hex with 0x prefix.
    Address(String),
    Array(Vec<AbiValue>),
    Tuple(Vec<(String, AbiValue)>),
}

impl AbiValue {
    /// Returns the inner string if this is an Address value.
    pub fn as_address(&self) -> Option<&str> {
        match self {
            AbiValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Coerce to a u128 if this is a small Uint.
    pub fn as_u128(&self) -> Option<u128> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Project into the display JSON used in [`EventLogRecord`] args and
    /// exports: integers become decimal strings (a 256-bit amount survives
    /// any JSON consumer intact), bytes become 0x-hex, tuples become
    /// positional arrays.
    ///
    /// [`EventLogRecord`]: crate::event::EventLogRecord
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            AbiValue::Uint(v) => Value::String(v.to_string()),
            AbiValue::BigUint(s) => Value::String(s.clone()),
            AbiValue::Int(v) => Value::String(v.to_string()),
            AbiValue::BigInt(s) => Value::String(s.clone()),
            AbiValue::Bool(b) => Value::Bool(*b),
            AbiValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
            AbiValue::Str(s) => Value::String(s.clone()),
            AbiValue::Address(a) => Value::String(a.clone()),
            AbiValue::Array(items) => Value::Array(items.iter().map(AbiValue::to_json).collect()),
            AbiValue::Tuple(fields) => {
                Value::Array(fields.iter().map(|(_, v)| v.to_json()).collect())
            }
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::BigUint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::BigInt(v) => write!(f, "{v}"),
            AbiValue::Bool(v) => write!(f, "{v}"),
            AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::Str(s) => write!(f, "{s}"),
            AbiValue::Address(a) => write!(f, "{a}"),
            AbiValue::Array(items) => {
                let parts: Vec<_> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::Tuple(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}
