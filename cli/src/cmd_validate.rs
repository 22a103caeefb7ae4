//! `abidesk validate` / `abidesk encode` — constructor argument handling.

use anyhow::{Context, Result};

use abidesk_codec::{constructor_calldata, deploy_data, validate_constructor_args};
use abidesk_core::{args::ConstructorArg, schema::ContractAbi};

fn load(abi_path: &str, args_path: &str) -> Result<(ContractAbi, Vec<ConstructorArg>)> {
    let abi_json = std::fs::read_to_string(abi_path)
        .with_context(|| format!("read ABI file '{abi_path}'"))?;
    let abi = ContractAbi::parse(&abi_json).with_context(|| format!("parse ABI '{abi_path}'"))?;

    let args_json = std::fs::read_to_string(args_path)
        .with_context(|| format!("read args file '{args_path}'"))?;
    let args: Vec<ConstructorArg> =
        serde_json::from_str(&args_json).with_context(|| format!("parse args '{args_path}'"))?;

    Ok((abi, args))
}

pub fn validate(abi_path: &str, args_path: &str, as_json: bool) -> Result<()> {
    let (abi, args) = load(abi_path, args_path)?;
    let result = validate_constructor_args(abi.constructor_inputs(), &args);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.valid {
        println!("ok");
    } else {
        for error in &result.errors {
            eprintln!("  {}: {}", error.field, error.message);
        }
    }

    if !result.valid {
        anyhow::bail!("{} invalid field(s)", result.errors.len());
    }
    Ok(())
}

pub fn encode(abi_path: &str, args_path: &str, bytecode: Option<&str>) -> Result<()> {
    let (abi, args) = load(abi_path, args_path)?;

    // Validate first so the caller gets field-level messages instead of a
    // bare encode failure.
    let result = validate_constructor_args(abi.constructor_inputs(), &args);
    if !result.valid {
        for error in &result.errors {
            eprintln!("  {}: {}", error.field, error.message);
        }
        anyhow::bail!("{} invalid field(s)", result.errors.len());
    }

    let data = match bytecode {
        Some(code) => {
            let code_hex = code.strip_prefix("0x").unwrap_or(code);
            let code_bytes = hex::decode(code_hex).context("invalid bytecode hex")?;
            deploy_data(&code_bytes, abi.constructor_inputs(), &args)?
        }
        None => constructor_calldata(abi.constructor_inputs(), &args)?,
    };

    println!("0x{}", hex::encode(&data));
    Ok(())
}
