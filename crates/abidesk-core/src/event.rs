//! Decoded event log records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Positioning metadata for a single delivered log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMeta {
    pub block_number: u64,
    pub transaction_hash: String,
    pub log_index: u32,
    /// Block timestamp, Unix seconds UTC.
    pub timestamp: i64,
}

impl LogMeta {
    /// The record id: `<transactionHash>-<logIndex>`, unique per log.
    pub fn record_id(&self) -> String {
        format!("{}-{}", self.transaction_hash, self.log_index)
    }
}

/// A fully decoded event log — the primary output of the event pipeline.
///
/// Append-only: once created a record is never mutated; the shared log it
/// lands in is cleared only by explicit caller action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLogRecord {
    /// `<transactionHash>-<logIndex>` — unique.
    pub id: String,
    pub event_name: String,
    /// Decoded values keyed by input name, in declaration order. Integer
    /// values are decimal text; composites are canonical JSON.
    pub args: IndexMap<String, serde_json::Value>,
    pub block_number: u64,
    pub transaction_hash: String,
    /// Block timestamp, Unix seconds UTC.
    pub timestamp: i64,
}

impl EventLogRecord {
    /// Get a decoded argument by name.
    pub fn arg(&self, name: &str) -> Option<&serde_json::Value> {
        self.args.get(name)
    }
}
