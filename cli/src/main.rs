//! AbiDesk CLI — inspect contract ABIs, validate constructor arguments, and
//! encode deployment calldata.
//!
//! # Commands
//! ```
//! abidesk inspect  --abi <path.json>
//! abidesk events   --abi <path.json>
//! abidesk validate --abi <path.json> --args <args.json>
//! abidesk encode   --abi <path.json> --args <args.json> [--bytecode <hex>]
//! abidesk history  list --db <path>
//! abidesk history  show --db <path> --id <id>
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd_inspect;
mod cmd_validate;

#[derive(Parser)]
#[command(
    name = "abidesk",
    about = "ABI schema inspection, argument validation, and calldata encoding",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an ABI file and summarize its schema
    Inspect {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List event signatures and their topic-0 fingerprints
    Events {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate constructor arguments against an ABI
    Validate {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Path to a JSON array of {name, type, value} arguments
        #[arg(long)]
        args: String,
        /// Output the full ValidationResult as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encode constructor calldata (optionally appended to creation bytecode)
    Encode {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Path to a JSON array of {name, type, value} arguments
        #[arg(long)]
        args: String,
        /// Creation bytecode (0x-prefixed hex) to prepend
        #[arg(long)]
        bytecode: Option<String>,
    },

    /// Deployment history management
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recorded deployments
    List {
        /// Path to the history database
        #[arg(long)]
        db: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one deployment by id
    Show {
        /// Path to the history database
        #[arg(long)]
        db: String,
        /// Deployment id
        #[arg(long)]
        id: String,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { abi, json } => cmd_inspect::inspect(&abi, json),
        Commands::Events { abi, json } => cmd_inspect::events(&abi, json),
        Commands::Validate { abi, args, json } => cmd_validate::validate(&abi, &args, json),
        Commands::Encode {
            abi,
            args,
            bytecode,
        } => cmd_validate::encode(&abi, &args, bytecode.as_deref()),
        Commands::History { action } => match action {
            HistoryAction::List { db, json } => cmd_history_list(&db, json),
            HistoryAction::Show { db, id } => cmd_history_show(&db, &id),
        },
    }
}

fn cmd_history_list(db: &str, as_json: bool) -> Result<()> {
    use abidesk_core::history::HistoryStore;
    use abidesk_history::SqliteHistory;

    let store = SqliteHistory::open(db).with_context(|| format!("open history db '{db}'"))?;
    let all = store.all()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("{} deployments", all.len());
    for entry in &all {
        println!(
            "  {}  {:24} {:12} {}",
            entry.id, entry.contract_name, entry.network, entry.address
        );
    }
    Ok(())
}

fn cmd_history_show(db: &str, id: &str) -> Result<()> {
    use abidesk_core::history::HistoryStore;
    use abidesk_history::SqliteHistory;

    let store = SqliteHistory::open(db).with_context(|| format!("open history db '{db}'"))?;
    match store.get(id)? {
        Some(entry) => {
            println!("{}", serde_json::to_string_pretty(&entry)?);
            Ok(())
        }
        None => anyhow::bail!("no deployment with id '{id}'"),
    }
}
