//! `EventDecoder` — turns provider-delivered logs into named records.
//!
//! The live path maps positional argument values onto event-input names as
//! each callback fires; the historical path queries a bounded block window
//! through a [`ChainProvider`] and feeds the same mapping. `merge` combines
//! both streams into one deduplicated, block-ordered view.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;
use tracing::debug;

use abidesk_core::{
    error::ProviderError,
    event::{EventLogRecord, LogMeta},
    provider::{ChainProvider, ProviderLog},
    schema::EventDef,
    value::AbiValue,
};

/// Bounded-lookback policy for historical queries: at most this many blocks
/// behind the current head are scanned.
pub const DEFAULT_LOOKBACK_BLOCKS: u64 = 1_000;

/// Decodes logs for one contract.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    address: String,
    lookback_blocks: u64,
}

impl EventDecoder {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            lookback_blocks: DEFAULT_LOOKBACK_BLOCKS,
        }
    }

    pub fn with_lookback(mut self, blocks: u64) -> Self {
        self.lookback_blocks = blocks;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Decode one live delivery: `values[i]` maps to `event.inputs[i]`,
    /// with `argN` synthesized for unnamed inputs.
    pub fn decode_live(
        &self,
        event: &EventDef,
        values: &[AbiValue],
        meta: &LogMeta,
    ) -> EventLogRecord {
        let mut args = IndexMap::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            let name = match event.inputs.get(i) {
                Some(input) => input.display_name(i),
                None => format!("arg{i}"),
            };
            args.insert(name, value.to_json());
        }
        EventLogRecord {
            id: meta.record_id(),
            event_name: event.name.clone(),
            args,
            block_number: meta.block_number,
            transaction_hash: meta.transaction_hash.clone(),
            timestamp: meta.timestamp,
        }
    }

    /// Decode one provider log through the same positional mapping.
    pub fn decode_provider_log(&self, event: &EventDef, log: &ProviderLog) -> EventLogRecord {
        let meta = LogMeta {
            block_number: log.block_number,
            transaction_hash: log.transaction_hash.clone(),
            log_index: log.log_index,
            timestamp: log.timestamp,
        };
        self.decode_live(event, &log.values, &meta)
    }

    /// Fetch and decode historical logs over the window
    /// `[current_block - lookback, current_block]`.
    ///
    /// Provider rejections (`RangeTooLarge`, RPC failures) are surfaced
    /// as-is; the caller may narrow the window and retry. The `cancel` flag
    /// aborts the fetch with [`ProviderError::Cancelled`] — checked before
    /// the query and again before results are returned, so work resolving
    /// after cancellation is discarded.
    pub async fn decode_historical(
        &self,
        provider: &dyn ChainProvider,
        event: &EventDef,
        current_block: u64,
        cancel: &AtomicBool,
    ) -> Result<Vec<EventLogRecord>, ProviderError> {
        if cancel.load(Ordering::SeqCst) {
            return Err(ProviderError::Cancelled);
        }

        let from_block = current_block.saturating_sub(self.lookback_blocks);
        debug!(
            address = %self.address,
            event = %event.name,
            from_block,
            to_block = current_block,
            "querying historical logs"
        );
        let logs = provider
            .query_logs(&self.address, &event.signature(), from_block, current_block)
            .await?;

        if cancel.load(Ordering::SeqCst) {
            return Err(ProviderError::Cancelled);
        }

        Ok(logs
            .iter()
            .map(|log| self.decode_provider_log(event, log))
            .collect())
    }
}

/// Merge live and historical records: exactly one record per unique id
/// (first occurrence wins), ordered by descending block number with ties
/// keeping their original relative order.
pub fn merge(live: &[EventLogRecord], historical: &[EventLogRecord]) -> Vec<EventLogRecord> {
    let mut seen = HashSet::new();
    let mut merged: Vec<EventLogRecord> = live
        .iter()
        .chain(historical.iter())
        .filter(|record| seen.insert(record.id.clone()))
        .cloned()
        .collect();
    // Vec::sort_by is stable, so equal block numbers keep insertion order.
    merged.sort_by(|a, b| b.block_number.cmp(&a.block_number));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use abidesk_core::provider::{LogCallback, SubscriptionToken};
    use abidesk_core::schema::ContractAbi;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    const TRANSFER_ABI: &str = r#"[
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        }
    ]"#;

    const FROM: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
    const TO: &str = "0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B";

    fn transfer_event() -> EventDef {
        ContractAbi::parse(TRANSFER_ABI)
            .unwrap()
            .event("Transfer")
            .unwrap()
            .clone()
    }

    fn record(id: &str, block: u64) -> EventLogRecord {
        EventLogRecord {
            id: id.to_string(),
            event_name: "Transfer".into(),
            args: IndexMap::new(),
            block_number: block,
            transaction_hash: "0x0".into(),
            timestamp: 0,
        }
    }

    #[test]
    fn decode_live_names_positional_args() {
        let decoder = EventDecoder::new("0xc0ffee");
        let meta = LogMeta {
            block_number: 10,
            transaction_hash: "T".into(),
            log_index: 4,
            timestamp: 1_700_000_000,
        };
        let values = vec![
            AbiValue::Address(FROM.into()),
            AbiValue::Address(TO.into()),
            AbiValue::Uint(123),
        ];
        let rec = decoder.decode_live(&transfer_event(), &values, &meta);

        assert_eq!(rec.id, "T-4");
        assert_eq!(rec.event_name, "Transfer");
        assert_eq!(rec.block_number, 10);
        assert_eq!(rec.arg("from"), Some(&serde_json::Value::String(FROM.into())));
        assert_eq!(rec.arg("to"), Some(&serde_json::Value::String(TO.into())));
        assert_eq!(rec.arg("value"), Some(&serde_json::Value::String("123".into())));
    }

    #[test]
    fn unnamed_inputs_synthesize_labels() {
        let abi = r#"[
            {"type": "event", "name": "Ping", "inputs": [{"name": "", "type": "uint256"}]}
        ]"#;
        let event = ContractAbi::parse(abi).unwrap().event("Ping").unwrap().clone();
        let decoder = EventDecoder::new("0xc0ffee");
        let meta = LogMeta {
            block_number: 1,
            transaction_hash: "0xaa".into(),
            log_index: 0,
            timestamp: 0,
        };
        let rec = decoder.decode_live(&event, &[AbiValue::Uint(7)], &meta);
        assert_eq!(rec.arg("arg0"), Some(&serde_json::Value::String("7".into())));
    }

    #[test]
    fn merge_dedupes_and_orders() {
        let live = vec![record("a-0", 5), record("b-0", 9)];
        let historical = vec![record("a-0", 5), record("c-0", 7), record("d-0", 9)];
        let merged = merge(&live, &historical);

        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        // One record per id; descending block; the block-9 tie keeps
        // live-before-historical order.
        assert_eq!(ids, vec!["b-0", "d-0", "c-0", "a-0"]);
    }

    // ─── Historical path ─────────────────────────────────────────────────────

    struct ScriptedProvider {
        head: u64,
        logs: Vec<ProviderLog>,
        reject_range: bool,
    }

    #[async_trait]
    impl ChainProvider for ScriptedProvider {
        async fn block_number(&self) -> Result<u64, ProviderError> {
            Ok(self.head)
        }

        async fn query_logs(
            &self,
            _address: &str,
            _event_signature: &str,
            from_block: u64,
            to_block: u64,
        ) -> Result<Vec<ProviderLog>, ProviderError> {
            if self.reject_range {
                return Err(ProviderError::RangeTooLarge {
                    from_block,
                    to_block,
                });
            }
            Ok(self.logs.clone())
        }

        async fn subscribe(
            &self,
            _address: &str,
            _event_signature: &str,
            _callback: LogCallback,
        ) -> Result<SubscriptionToken, ProviderError> {
            Err(ProviderError::Rpc("not supported".into()))
        }

        async fn unsubscribe(&self, _token: SubscriptionToken) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn sample_log(block: u64, index: u32) -> ProviderLog {
        ProviderLog {
            values: vec![
                AbiValue::Address(FROM.into()),
                AbiValue::Address(TO.into()),
                AbiValue::Uint(1),
            ],
            block_number: block,
            transaction_hash: format!("0x{block:x}"),
            log_index: index,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn historical_window_is_bounded() {
        let provider = ScriptedProvider {
            head: 20_000,
            logs: vec![sample_log(19_500, 0), sample_log(19_999, 1)],
            reject_range: false,
        };
        let decoder = EventDecoder::new("0xc0ffee");
        let cancel = AtomicBool::new(false);
        let records = decoder
            .decode_historical(&provider, &transfer_event(), 20_000, &cancel)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_name, "Transfer");
    }

    #[tokio::test]
    async fn range_rejection_is_surfaced() {
        let provider = ScriptedProvider {
            head: 20_000,
            logs: vec![],
            reject_range: true,
        };
        let decoder = EventDecoder::new("0xc0ffee");
        let cancel = AtomicBool::new(false);
        let err = decoder
            .decode_historical(&provider, &transfer_event(), 20_000, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RangeTooLarge { .. }));
    }

    #[tokio::test]
    async fn cancellation_discards_results() {
        let provider = ScriptedProvider {
            head: 100,
            logs: vec![sample_log(90, 0)],
            reject_range: false,
        };
        let decoder = EventDecoder::new("0xc0ffee");
        let cancel = AtomicBool::new(true);
        let err = decoder
            .decode_historical(&provider, &transfer_event(), 100, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
    }
}
