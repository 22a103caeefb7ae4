//! `abidesk inspect` / `abidesk events` — schema summaries.

use anyhow::{Context, Result};

use abidesk_core::schema::ContractAbi;

fn load_abi(path: &str) -> Result<ContractAbi> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("read ABI file '{path}'"))?;
    ContractAbi::parse(&json).with_context(|| format!("parse ABI file '{path}'"))
}

pub fn inspect(abi_path: &str, as_json: bool) -> Result<()> {
    let abi = load_abi(abi_path)?;

    if as_json {
        let summary = serde_json::json!({
            "constructorInputs": abi
                .constructor_inputs()
                .iter()
                .enumerate()
                .map(|(i, p)| serde_json::json!({
                    "name": p.display_name(i),
                    "type": p.ty.to_string(),
                }))
                .collect::<Vec<_>>(),
            "functions": abi.functions().iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
            "events": abi.events().iter().map(|e| e.signature()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    match abi.constructor() {
        Some(ctor) if !ctor.inputs.is_empty() => {
            println!("Constructor:");
            for (i, input) in ctor.inputs.iter().enumerate() {
                println!("  {}: {}", input.display_name(i), input.ty);
            }
        }
        _ => println!("Constructor: (no arguments)"),
    }

    println!("Functions:");
    for func in abi.functions() {
        let inputs: Vec<String> = func
            .inputs
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} {}", p.ty, p.display_name(i)))
            .collect();
        println!("  {}({})", func.name, inputs.join(", "));
    }

    println!("Events:");
    for event in abi.events() {
        println!("  {}", event.signature());
    }
    Ok(())
}

pub fn events(abi_path: &str, as_json: bool) -> Result<()> {
    let abi = load_abi(abi_path)?;

    if as_json {
        let list: Vec<_> = abi
            .events()
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "signature": e.signature(),
                    "fingerprint": e.fingerprint(),
                    "anonymous": e.anonymous,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    for event in abi.events() {
        println!("{}", event.signature());
        println!("  topic0: {}", event.fingerprint());
    }
    Ok(())
}
