//! Constructor-calldata encoding — the inverse of event decoding.
//!
//! Validated textual arguments are coerced to [`AbiValue`]s, lowered to
//! alloy `DynSolValue`s, and ABI-encoded as the constructor argument tuple.
//! Deployment data is the creation bytecode with the encoded tuple appended.

use std::str::FromStr;

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, I256, U256};

use abidesk_core::{
    args::ConstructorArg,
    error::EncodeError,
    schema::Param,
    types::ParamType,
    value::AbiValue,
};

use crate::coerce;

/// Lower a grammar type to the alloy dynamic type. Total: every grammar type
/// has an EVM representation.
pub fn dyn_type(ty: &ParamType) -> DynSolType {
    match ty {
        ParamType::Uint(bits) => DynSolType::Uint(*bits as usize),
        ParamType::Int(bits) => DynSolType::Int(*bits as usize),
        ParamType::Address => DynSolType::Address,
        ParamType::Bool => DynSolType::Bool,
        ParamType::Str => DynSolType::String,
        ParamType::Bytes => DynSolType::Bytes,
        ParamType::FixedBytes(n) => DynSolType::FixedBytes(*n as usize),
        ParamType::Array(elem) => DynSolType::Array(Box::new(dyn_type(elem))),
        ParamType::FixedArray(elem, len) => {
            DynSolType::FixedArray(Box::new(dyn_type(elem)), *len)
        }
        ParamType::Tuple(comps) => {
            DynSolType::Tuple(comps.iter().map(|(_, t)| dyn_type(t)).collect())
        }
    }
}

/// Convert an [`AbiValue`] to the alloy value for the given grammar type.
pub fn to_dyn_value(val: &AbiValue, ty: &ParamType) -> Result<DynSolValue, String> {
    match (val, ty) {
        (AbiValue::Bool(b), ParamType::Bool) => Ok(DynSolValue::Bool(*b)),

        (AbiValue::Uint(u), ParamType::Uint(bits)) => {
            Ok(DynSolValue::Uint(U256::from(*u), *bits as usize))
        }
        (AbiValue::BigUint(s), ParamType::Uint(bits)) => {
            let u = U256::from_str(s).map_err(|e| format!("uint parse: {e}"))?;
            Ok(DynSolValue::Uint(u, *bits as usize))
        }

        (AbiValue::Int(i), ParamType::Int(bits)) => {
            let v = I256::try_from(*i).map_err(|e| e.to_string())?;
            Ok(DynSolValue::Int(v, *bits as usize))
        }
        (AbiValue::BigInt(s), ParamType::Int(bits)) => {
            let v = I256::from_str(s).map_err(|e| format!("int parse: {e}"))?;
            Ok(DynSolValue::Int(v, *bits as usize))
        }

        (AbiValue::Address(s), ParamType::Address) => {
            let addr = Address::from_str(s).map_err(|e| format!("address parse: {e}"))?;
            Ok(DynSolValue::Address(addr))
        }

        (AbiValue::Bytes(b), ParamType::Bytes) => Ok(DynSolValue::Bytes(b.clone())),

        (AbiValue::Bytes(b), ParamType::FixedBytes(n)) => {
            let n = *n as usize;
            if b.len() != n {
                return Err(format!("bytes{n}: got {} bytes", b.len()));
            }
            let mut word = [0u8; 32];
            word[..n].copy_from_slice(b);
            Ok(DynSolValue::FixedBytes(B256::from(word), n))
        }

        (AbiValue::Str(s), ParamType::Str) => Ok(DynSolValue::String(s.clone())),

        (AbiValue::Array(elems), ParamType::Array(inner)) => {
            let lowered: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::Array(lowered?))
        }

        (AbiValue::Array(elems), ParamType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(format!(
                    "fixed array length mismatch: expected {len}, got {}",
                    elems.len()
                ));
            }
            let lowered: Result<Vec<_>, _> =
                elems.iter().map(|e| to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::FixedArray(lowered?))
        }

        (AbiValue::Tuple(fields), ParamType::Tuple(comps)) => {
            if fields.len() != comps.len() {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    comps.len(),
                    fields.len()
                ));
            }
            let lowered: Result<Vec<_>, _> = fields
                .iter()
                .zip(comps.iter())
                .map(|((_, v), (_, t))| to_dyn_value(v, t))
                .collect();
            Ok(DynSolValue::Tuple(lowered?))
        }

        _ => Err(format!("cannot encode {val} as {ty}")),
    }
}

/// ABI-encode constructor arguments against the declared inputs.
///
/// Arguments are matched by name, coerced through the shared parsers, and
/// encoded as a head/tail tuple — the bytes appended to creation bytecode.
pub fn constructor_calldata(
    inputs: &[Param],
    provided: &[ConstructorArg],
) -> Result<Vec<u8>, EncodeError> {
    let mut values = Vec::with_capacity(inputs.len());

    for (position, input) in inputs.iter().enumerate() {
        let field = input.display_name(position);
        let arg = provided
            .iter()
            .find(|a| a.name == field)
            .ok_or_else(|| EncodeError::MissingArgument {
                field: field.clone(),
            })?;
        let coerced = coerce::from_text(&input.ty, &arg.value).map_err(|reason| {
            EncodeError::InvalidArgument {
                field: field.clone(),
                reason,
            }
        })?;
        let lowered = to_dyn_value(&coerced, &input.ty).map_err(|reason| {
            EncodeError::InvalidArgument {
                field: field.clone(),
                reason,
            }
        })?;
        values.push(lowered);
    }

    if values.is_empty() {
        return Ok(Vec::new());
    }
    Ok(DynSolValue::Tuple(values).abi_encode())
}

/// Full deployment payload: creation bytecode followed by the ABI-encoded
/// constructor arguments.
pub fn deploy_data(
    bytecode: &[u8],
    inputs: &[Param],
    provided: &[ConstructorArg],
) -> Result<Vec<u8>, EncodeError> {
    let mut data = bytecode.to_vec();
    data.extend_from_slice(&constructor_calldata(inputs, provided)?);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use abidesk_core::schema::ContractAbi;

    const TOKEN_ABI: &str = r#"[
        {"type": "constructor", "inputs": [
            {"name": "owner", "type": "address"},
            {"name": "supply", "type": "uint256"}
        ]}
    ]"#;

    #[test]
    fn encode_address_and_uint() {
        let abi = ContractAbi::parse(TOKEN_ABI).unwrap();
        let data = constructor_calldata(
            abi.constructor_inputs(),
            &[
                ConstructorArg::new(
                    "owner",
                    "address",
                    "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
                ),
                ConstructorArg::new("supply", "uint256", "1000000"),
            ],
        )
        .unwrap();

        // Two static words.
        assert_eq!(data.len(), 64);
        // Address is right-aligned in the first word.
        assert_eq!(
            hex::encode(&data[12..32]),
            "d8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
        // 1_000_000 = 0x0f4240 big-endian in the second word.
        assert_eq!(hex::encode(&data[61..64]), "0f4240");
    }

    #[test]
    fn missing_argument_is_an_error() {
        let abi = ContractAbi::parse(TOKEN_ABI).unwrap();
        let err = constructor_calldata(
            abi.constructor_inputs(),
            &[ConstructorArg::new("supply", "uint256", "1")],
        )
        .unwrap_err();
        assert!(matches!(err, EncodeError::MissingArgument { ref field } if field == "owner"));
    }

    #[test]
    fn no_constructor_encodes_to_empty() {
        assert!(constructor_calldata(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn deploy_data_appends_args() {
        let abi = ContractAbi::parse(TOKEN_ABI).unwrap();
        let bytecode = vec![0x60, 0x80, 0x60, 0x40];
        let data = deploy_data(
            &bytecode,
            abi.constructor_inputs(),
            &[
                ConstructorArg::new(
                    "owner",
                    "address",
                    "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045",
                ),
                ConstructorArg::new("supply", "uint256", "1"),
            ],
        )
        .unwrap();
        assert_eq!(&data[..4], &bytecode[..]);
        assert_eq!(data.len(), 4 + 64);
    }

    #[test]
    fn fixed_bytes_padding() {
        let v = AbiValue::Bytes(vec![0xde, 0xad]);
        let lowered = to_dyn_value(&v, &ParamType::FixedBytes(2)).unwrap();
        match lowered {
            DynSolValue::FixedBytes(word, size) => {
                assert_eq!(size, 2);
                assert_eq!(word[0], 0xde);
                assert_eq!(word[1], 0xad);
                assert_eq!(word[2], 0x00);
            }
            other => panic!("expected fixed bytes, got {other:?}"),
        }
        assert!(to_dyn_value(&v, &ParamType::FixedBytes(4)).is_err());
    }

    #[test]
    fn roundtrip_encode_decode() {
        let abi = ContractAbi::parse(TOKEN_ABI).unwrap();
        let owner = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

        let data = constructor_calldata(
            abi.constructor_inputs(),
            &[
                ConstructorArg::new("owner", "address", owner),
                ConstructorArg::new("supply", "uint256", "999888"),
            ],
        )
        .unwrap();

        let tuple = DynSolType::Tuple(vec![DynSolType::Address, DynSolType::Uint(256)]);
        let decoded = tuple.abi_decode_params(&data).unwrap();
        match decoded {
            DynSolValue::Tuple(vals) => {
                match &vals[0] {
                    // Canonical lowercase text survives the round trip.
                    DynSolValue::Address(addr) => assert_eq!(format!("{addr:#x}"), owner),
                    other => panic!("expected address, got {other:?}"),
                }
                match &vals[1] {
                    DynSolValue::Uint(u, _) => assert_eq!(*u, U256::from(999_888u64)),
                    other => panic!("expected uint, got {other:?}"),
                }
            }
            other => panic!("expected tuple, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_array_of_uints() {
        let abi = r#"[
            {"type": "constructor", "inputs": [{"name": "balances", "type": "uint256[]"}]}
        ]"#;
        let abi = ContractAbi::parse(abi).unwrap();
        let data = constructor_calldata(
            abi.constructor_inputs(),
            &[ConstructorArg::new("balances", "uint256[]", "[\"1\", \"2\"]")],
        )
        .unwrap();
        // offset word + length word + two elements
        assert_eq!(data.len(), 32 * 4);
        assert_eq!(data[63], 2); // length
    }
}
