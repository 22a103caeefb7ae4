//! The closed parameter-type grammar.
//!
//! Every textual ABI type token is parsed exactly once into a [`ParamType`],
//! and validation, encoding, and decoding all dispatch on the parsed form.
//! There is no string comparison on type tags outside this module.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchemaError;

/// A parsed ABI parameter type.
///
/// The grammar is closed: elementary `uintN`/`intN` for N ∈ {8, 16, …, 256},
/// `address`, `bool`, `string`, `bytes`, `bytesN` for N ∈ 1..=32, the array
/// suffixes `T[]` and `T[k]` applicable to any type (including arrays and
/// tuples), and `tuple` with an ordered component list. Nesting depth is
/// unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// Unsigned integer. Width in bits.
    Uint(u16),
    /// Signed integer. Width in bits.
    Int(u16),
    /// 20-byte EVM address, hex with 0x prefix.
    Address,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Str,
    /// Variable-length byte array.
    Bytes,
    /// Fixed-size byte array (bytes1 .. bytes32). Length in bytes.
    FixedBytes(u8),
    /// Variable-length array of a type.
    Array(Box<ParamType>),
    /// Fixed-length array of a type.
    FixedArray(Box<ParamType>, usize),
    /// Tuple / struct with named, ordered components.
    Tuple(Vec<(String, ParamType)>),
}

impl ParamType {
    /// Parse a textual type token into the grammar.
    ///
    /// `components` supplies the ordered component list for `tuple` base
    /// tokens (a tuple token without components is rejected); it is ignored
    /// for every other base type.
    pub fn parse(
        token: &str,
        components: Option<&[(String, ParamType)]>,
    ) -> Result<Self, SchemaError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid(token, "empty type token"));
        }

        // Peel the outermost array suffix; the element recurses.
        if let Some(stripped) = token.strip_suffix(']') {
            let open = stripped
                .rfind('[')
                .ok_or_else(|| invalid(token, "unbalanced array brackets"))?;
            let elem = Self::parse(&stripped[..open], components)?;
            let len_part = &stripped[open + 1..];
            if len_part.is_empty() {
                return Ok(ParamType::Array(Box::new(elem)));
            }
            let len = parse_digits(len_part)
                .ok_or_else(|| invalid(token, "array length must be a decimal integer"))?;
            return Ok(ParamType::FixedArray(Box::new(elem), len));
        }

        match token {
            "address" => Ok(ParamType::Address),
            "bool" => Ok(ParamType::Bool),
            "string" => Ok(ParamType::Str),
            "bytes" => Ok(ParamType::Bytes),
            "tuple" => match components {
                Some(comps) => Ok(ParamType::Tuple(comps.to_vec())),
                None => Err(invalid(token, "tuple type requires components")),
            },
            _ => {
                if let Some(width) = token.strip_prefix("uint") {
                    return int_width(width)
                        .map(ParamType::Uint)
                        .ok_or_else(|| invalid(token, "uint width must be 8..=256 in steps of 8"));
                }
                if let Some(width) = token.strip_prefix("int") {
                    return int_width(width)
                        .map(ParamType::Int)
                        .ok_or_else(|| invalid(token, "int width must be 8..=256 in steps of 8"));
                }
                if let Some(width) = token.strip_prefix("bytes") {
                    return bytes_width(width)
                        .map(ParamType::FixedBytes)
                        .ok_or_else(|| invalid(token, "bytes width must be 1..=32"));
                }
                Err(invalid(token, "unknown elementary type"))
            }
        }
    }

    /// The canonical signature fragment for this type: tuples render as a
    /// parenthesized component list, exactly as they appear in event
    /// signatures (`(address,uint256)[]` rather than `tuple[]`).
    pub fn canonical(&self) -> String {
        match self {
            ParamType::Tuple(comps) => {
                let inner: Vec<String> = comps.iter().map(|(_, t)| t.canonical()).collect();
                format!("({})", inner.join(","))
            }
            ParamType::Array(elem) => format!("{}[]", elem.canonical()),
            ParamType::FixedArray(elem, len) => format!("{}[{len}]", elem.canonical()),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Address => write!(f, "address"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Str => write!(f, "string"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(n) => write!(f, "bytes{n}"),
            ParamType::Array(elem) => write!(f, "{elem}[]"),
            ParamType::FixedArray(elem, len) => write!(f, "{elem}[{len}]"),
            ParamType::Tuple(_) => write!(f, "tuple"),
        }
    }
}

fn invalid(token: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidType {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

/// Strict decimal parse: digits only, no leading zeros.
fn parse_digits(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn int_width(s: &str) -> Option<u16> {
    let w = parse_digits(s)? as u16;
    if (8..=256).contains(&w) && w % 8 == 0 {
        Some(w)
    } else {
        None
    }
}

fn bytes_width(s: &str) -> Option<u8> {
    let w = parse_digits(s)?;
    if (1..=32).contains(&w) {
        Some(w as u8)
    } else {
        None
    }
}
