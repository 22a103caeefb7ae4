//! The parsed ABI schema index.
//!
//! [`ContractAbi::parse`] turns a standard Ethereum ABI JSON array into a
//! typed, indexed in-memory form: every parameter type token is parsed into
//! the closed [`ParamType`] grammar up front, so the validator, encoder, and
//! event decoder never touch the textual tags again. The index is immutable
//! once built.

use serde::Deserialize;
use tiny_keccak::{Hasher, Keccak};

use crate::error::SchemaError;
use crate::types::ParamType;

/// A single declared parameter: constructor/function input or event input.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Declared name. May be empty for unnamed parameters.
    pub name: String,
    /// Parsed type.
    pub ty: ParamType,
    /// EVM events: is this an indexed topic? Accepted and stored, but the
    /// decoder treats all inputs positionally — topic splitting belongs to
    /// the provider layer.
    pub indexed: bool,
}

impl Param {
    /// The label used for argument matching and decoded-field naming:
    /// the declared name, or `argN` for unnamed parameters.
    pub fn display_name(&self, position: usize) -> String {
        if self.name.is_empty() {
            format!("arg{position}")
        } else {
            self.name.clone()
        }
    }
}

/// Constructor definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDef {
    pub inputs: Vec<Param>,
}

/// Function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: Option<String>,
}

/// Event definition.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDef {
    pub name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

impl EventDef {
    /// Canonical ABI signature, e.g. `Transfer(address,address,uint256)`.
    /// Tuples render as parenthesized component lists.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|p| p.ty.canonical()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// keccak256 of the canonical signature — the topic-0 value for
    /// non-anonymous events, 0x-prefixed hex.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Keccak::v256();
        let mut output = [0u8; 32];
        hasher.update(self.signature().as_bytes());
        hasher.finalize(&mut output);
        format!("0x{}", hex::encode(output))
    }
}

// ─── Raw JSON shapes ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(default)]
    anonymous: bool,
    #[serde(default, rename = "stateMutability")]
    state_mutability: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Option<Vec<RawParam>>,
    #[serde(default)]
    indexed: bool,
}

fn convert_param(raw: &RawParam) -> Result<Param, SchemaError> {
    let components = match &raw.components {
        Some(list) => {
            let mut comps = Vec::with_capacity(list.len());
            for c in list {
                let p = convert_param(c)?;
                comps.push((p.name, p.ty));
            }
            Some(comps)
        }
        None => None,
    };
    let ty = ParamType::parse(&raw.ty, components.as_deref())?;
    Ok(Param {
        name: raw.name.clone(),
        ty,
        indexed: raw.indexed,
    })
}

fn convert_params(raw: &[RawParam]) -> Result<Vec<Param>, SchemaError> {
    raw.iter().map(convert_param).collect()
}

// ─── The index ───────────────────────────────────────────────────────────────

/// A parsed, indexed contract ABI. Built once per contract; immutable.
#[derive(Debug, Clone, Default)]
pub struct ContractAbi {
    constructor: Option<ConstructorDef>,
    functions: Vec<FunctionDef>,
    events: Vec<EventDef>,
}

impl ContractAbi {
    /// Parse an ABI JSON array.
    ///
    /// Accepted entry kinds are `constructor`, `function`, `event`,
    /// `fallback`, and `receive` (the last two carry no parameters this core
    /// cares about). Anything else, malformed JSON, or a parameter whose
    /// type token falls outside the grammar fails the whole load.
    pub fn parse(abi_json: &str) -> Result<Self, SchemaError> {
        let raw: Vec<RawEntry> = serde_json::from_str(abi_json)?;

        let mut abi = ContractAbi::default();
        for entry in &raw {
            match entry.kind.as_str() {
                "constructor" => {
                    // Solidity emits at most one; keep the first declaration.
                    if abi.constructor.is_none() {
                        abi.constructor = Some(ConstructorDef {
                            inputs: convert_params(&entry.inputs)?,
                        });
                    }
                }
                "function" => {
                    abi.functions.push(FunctionDef {
                        name: entry.name.clone(),
                        inputs: convert_params(&entry.inputs)?,
                        outputs: convert_params(&entry.outputs)?,
                        state_mutability: entry.state_mutability.clone(),
                    });
                }
                "event" => {
                    abi.events.push(EventDef {
                        name: entry.name.clone(),
                        inputs: convert_params(&entry.inputs)?,
                        anonymous: entry.anonymous,
                    });
                }
                "fallback" | "receive" => {}
                other => {
                    return Err(SchemaError::UnknownEntry {
                        kind: other.to_string(),
                    });
                }
            }
        }
        Ok(abi)
    }

    /// The constructor definition, if the ABI declares one.
    pub fn constructor(&self) -> Option<&ConstructorDef> {
        self.constructor.as_ref()
    }

    /// Constructor inputs; empty for the degenerate no-constructor case.
    pub fn constructor_inputs(&self) -> &[Param] {
        self.constructor
            .as_ref()
            .map(|c| c.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a function by name. Overloads resolve to the first declaration.
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Look up an event by name.
    pub fn event(&self, name: &str) -> Option<&EventDef> {
        self.events.iter().find(|e| e.name == name)
    }

    /// All event definitions in declaration order.
    pub fn events(&self) -> &[EventDef] {
        &self.events
    }

    /// All function definitions in declaration order.
    pub fn functions(&self) -> &[FunctionDef] {
        &self.functions
    }
}
