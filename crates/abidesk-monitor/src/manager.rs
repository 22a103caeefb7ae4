//! `EventMonitor` — owns the lifecycle of active log subscriptions.
//!
//! State machine: `Idle` ⇄ `Monitoring`. `start` registers exactly one
//! listener per event definition, all-or-nothing; `stop` releases exactly
//! the tokens that `start` acquired and is idempotent. A historical fetch is
//! only legal while idle, and at most one may be in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use abidesk_codec::decode::EventDecoder;
use abidesk_core::{
    error::MonitorError,
    event::{EventLogRecord, LogMeta},
    provider::{ChainProvider, LogCallback, ProviderLog, SubscriptionToken},
    schema::EventDef,
};

use crate::config::MonitorConfig;
use crate::log::EventLogStore;

/// Subscription lifecycle manager for one contract.
pub struct EventMonitor {
    address: String,
    decoder: EventDecoder,
    log: Arc<EventLogStore>,
    /// (event name, owned registration) pairs from the active `start` call.
    subscriptions: Vec<(String, SubscriptionToken)>,
    monitoring: Arc<AtomicBool>,
    fetch_in_flight: Arc<AtomicBool>,
}

impl EventMonitor {
    pub fn new(address: impl Into<String>, config: MonitorConfig) -> Self {
        let address = address.into();
        let decoder = EventDecoder::new(address.clone()).with_lookback(config.lookback_blocks);
        Self {
            address,
            decoder,
            log: Arc::new(EventLogStore::new()),
            subscriptions: Vec::new(),
            monitoring: Arc::new(AtomicBool::new(false)),
            fetch_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The shared event log this monitor appends to.
    pub fn log(&self) -> Arc<EventLogStore> {
        Arc::clone(&self.log)
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }

    /// Names of the events currently being watched.
    pub fn watched_events(&self) -> Result<Vec<String>, MonitorError> {
        if !self.is_monitoring() {
            return Err(MonitorError::NotMonitoring);
        }
        Ok(self
            .subscriptions
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    /// Begin live monitoring: one listener per distinct event name.
    ///
    /// Registration is all-or-nothing. If any individual registration fails,
    /// every listener registered so far in this call is torn down, the
    /// monitor stays `Idle`, and the failure is returned. Calling `start`
    /// while already `Monitoring` performs no new registrations.
    pub async fn start(
        &mut self,
        provider: &dyn ChainProvider,
        events: &[EventDef],
    ) -> Result<(), MonitorError> {
        if self.monitoring.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyMonitoring);
        }

        let mut registered: Vec<(String, SubscriptionToken)> = Vec::new();
        for event in events {
            // At most one listener per event name.
            if registered.iter().any(|(name, _)| name == &event.name) {
                continue;
            }
            let callback = self.live_callback(event);
            match provider
                .subscribe(&self.address, &event.signature(), callback)
                .await
            {
                Ok(token) => {
                    debug!(event = %event.name, "listener registered");
                    registered.push((event.name.clone(), token));
                }
                Err(e) => {
                    warn!(event = %event.name, error = %e, "registration failed, rolling back");
                    for (name, token) in registered.drain(..).rev() {
                        if let Err(err) = provider.unsubscribe(token).await {
                            warn!(event = %name, error = %err, "rollback unsubscribe failed");
                        }
                    }
                    self.monitoring.store(false, Ordering::SeqCst);
                    return Err(MonitorError::Subscription(e.to_string()));
                }
            }
        }

        self.subscriptions = registered;
        info!(
            address = %self.address,
            listeners = self.subscriptions.len(),
            "monitoring started"
        );
        Ok(())
    }

    /// Stop monitoring: release every token acquired by the matching
    /// `start`, clear the registry, return to `Idle`. Calling `stop` while
    /// already `Idle` is a no-op.
    pub async fn stop(&mut self, provider: &dyn ChainProvider) {
        // Flip the flag first so in-flight deliveries are discarded before
        // their callbacks race the unsubscribe calls below.
        self.monitoring.store(false, Ordering::SeqCst);
        if self.subscriptions.is_empty() {
            return;
        }
        for (name, token) in self.subscriptions.drain(..) {
            if let Err(e) = provider.unsubscribe(token).await {
                warn!(event = %name, error = %e, "unsubscribe failed");
            }
        }
        info!(address = %self.address, "monitoring stopped");
    }

    /// Fetch and decode historical logs for one event, appending new records
    /// to the shared log.
    ///
    /// Rejected while live monitoring is active (two sources writing the
    /// same log would duplicate records) and while another fetch is in
    /// flight. The `cancel` flag aborts mid-fetch; cancelled results are
    /// discarded, never appended.
    pub async fn fetch_history(
        &self,
        provider: &dyn ChainProvider,
        event: &EventDef,
        cancel: Arc<AtomicBool>,
    ) -> Result<Vec<EventLogRecord>, MonitorError> {
        if self.is_monitoring() {
            return Err(MonitorError::AlreadyMonitoring);
        }
        if self.fetch_in_flight.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::FetchInFlight);
        }

        let result = async {
            let current_block = provider.block_number().await?;
            self.decoder
                .decode_historical(provider, event, current_block, &cancel)
                .await
        }
        .await;
        self.fetch_in_flight.store(false, Ordering::SeqCst);

        let records = result?;
        let appended = self.log.extend(records.iter().cloned());
        debug!(
            event = %event.name,
            fetched = records.len(),
            appended,
            "historical records appended"
        );
        Ok(records)
    }

    fn live_callback(&self, event: &EventDef) -> LogCallback {
        let event = event.clone();
        let decoder = self.decoder.clone();
        let log = Arc::clone(&self.log);
        let monitoring = Arc::clone(&self.monitoring);
        Arc::new(move |raw: ProviderLog| {
            // Deliveries resolving after stop() are discarded.
            if !monitoring.load(Ordering::SeqCst) {
                debug!(event = %event.name, "dropping log delivered after stop");
                return;
            }
            let meta = LogMeta {
                block_number: raw.block_number,
                transaction_hash: raw.transaction_hash.clone(),
                log_index: raw.log_index,
                timestamp: raw.timestamp,
            };
            let record = decoder.decode_live(&event, &raw.values, &meta);
            if !log.append(record) {
                debug!(event = %event.name, "duplicate log id ignored");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abidesk_core::error::ProviderError;
    use abidesk_core::provider::ProviderLog;
    use abidesk_core::schema::ContractAbi;
    use abidesk_core::value::AbiValue;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex;

    const ABI: &str = r#"[
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                {"name": "from", "type": "address", "indexed": true},
                {"name": "to", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        },
        {
            "type": "event",
            "name": "Approval",
            "inputs": [
                {"name": "owner", "type": "address", "indexed": true},
                {"name": "spender", "type": "address", "indexed": true},
                {"name": "value", "type": "uint256", "indexed": false}
            ]
        }
    ]"#;

    fn events() -> Vec<EventDef> {
        ContractAbi::parse(ABI).unwrap().events().to_vec()
    }

    /// A scripted provider that records registrations and can be told to
    /// fail the Nth subscribe call.
    struct ScriptedProvider {
        next_token: AtomicU64,
        fail_subscribe_at: Option<u64>,
        /// event signature → callback, for manual delivery from tests
        callbacks: Mutex<HashMap<String, (u64, LogCallback)>>,
        unsubscribed: Mutex<Vec<u64>>,
        logs: Vec<ProviderLog>,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                next_token: AtomicU64::new(1),
                fail_subscribe_at: None,
                callbacks: Mutex::new(HashMap::new()),
                unsubscribed: Mutex::new(Vec::new()),
                logs: Vec::new(),
            }
        }

        fn failing_at(call: u64) -> Self {
            Self {
                fail_subscribe_at: Some(call),
                ..Self::new()
            }
        }

        fn deliver(&self, signature: &str, log: ProviderLog) {
            let callbacks = self.callbacks.lock().unwrap();
            let (_, callback) = callbacks.get(signature).expect("no listener registered");
            callback(log);
        }

        fn active_count(&self) -> usize {
            let registered = self.callbacks.lock().unwrap();
            let gone = self.unsubscribed.lock().unwrap();
            registered
                .values()
                .filter(|(id, _)| !gone.contains(id))
                .count()
        }
    }

    #[async_trait]
    impl ChainProvider for ScriptedProvider {
        async fn block_number(&self) -> Result<u64, ProviderError> {
            Ok(10_000)
        }

        async fn query_logs(
            &self,
            _address: &str,
            _event_signature: &str,
            _from_block: u64,
            _to_block: u64,
        ) -> Result<Vec<ProviderLog>, ProviderError> {
            Ok(self.logs.clone())
        }

        async fn subscribe(
            &self,
            _address: &str,
            event_signature: &str,
            callback: LogCallback,
        ) -> Result<SubscriptionToken, ProviderError> {
            let id = self.next_token.fetch_add(1, Ordering::SeqCst);
            if self.fail_subscribe_at == Some(id) {
                return Err(ProviderError::Rpc("subscription refused".into()));
            }
            self.callbacks
                .lock()
                .unwrap()
                .insert(event_signature.to_string(), (id, callback));
            Ok(SubscriptionToken::new(id))
        }

        async fn unsubscribe(&self, token: SubscriptionToken) -> Result<(), ProviderError> {
            self.unsubscribed.lock().unwrap().push(token.id());
            Ok(())
        }
    }

    fn transfer_log(block: u64, index: u32) -> ProviderLog {
        ProviderLog {
            values: vec![
                AbiValue::Address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into()),
                AbiValue::Address("0xAb5801a7D398351b8bE11C439e05C5B3259aeC9B".into()),
                AbiValue::Uint(42),
            ],
            block_number: block,
            transaction_hash: format!("0x{block:x}"),
            log_index: index,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn start_registers_one_listener_per_event() {
        let provider = ScriptedProvider::new();
        let mut monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());

        monitor.start(&provider, &events()).await.unwrap();
        assert!(monitor.is_monitoring());
        assert_eq!(provider.active_count(), 2);
        assert_eq!(monitor.watched_events().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn double_start_is_rejected_without_new_registrations() {
        let provider = ScriptedProvider::new();
        let mut monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());

        monitor.start(&provider, &events()).await.unwrap();
        let err = monitor.start(&provider, &events()).await.unwrap_err();
        assert!(matches!(err, MonitorError::AlreadyMonitoring));
        assert_eq!(provider.active_count(), 2);
        assert!(monitor.is_monitoring());
    }

    #[tokio::test]
    async fn failed_registration_rolls_back_fully() {
        // Second subscribe call fails: the first listener must be released
        // and the monitor must stay idle.
        let provider = ScriptedProvider::failing_at(2);
        let mut monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());

        let err = monitor.start(&provider, &events()).await.unwrap_err();
        assert!(matches!(err, MonitorError::Subscription(_)));
        assert!(!monitor.is_monitoring());
        assert_eq!(provider.active_count(), 0);
        assert_eq!(provider.unsubscribed.lock().unwrap().as_slice(), &[1]);
    }

    #[tokio::test]
    async fn stop_releases_every_token_and_is_idempotent() {
        let provider = ScriptedProvider::new();
        let mut monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());

        monitor.start(&provider, &events()).await.unwrap();
        monitor.stop(&provider).await;
        assert!(!monitor.is_monitoring());
        assert_eq!(provider.active_count(), 0);

        // Second stop: Idle → Idle, no error, no extra unsubscribes.
        monitor.stop(&provider).await;
        assert!(!monitor.is_monitoring());
        assert_eq!(provider.unsubscribed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn live_deliveries_append_and_post_stop_deliveries_are_discarded() {
        let provider = ScriptedProvider::new();
        let mut monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());
        let signature = events()[0].signature();

        monitor.start(&provider, &events()).await.unwrap();
        provider.deliver(&signature, transfer_log(9_990, 0));
        provider.deliver(&signature, transfer_log(9_991, 1));
        // Duplicate id: dropped.
        provider.deliver(&signature, transfer_log(9_990, 0));
        assert_eq!(monitor.log().len(), 2);

        let record = &monitor.log().snapshot()[0];
        assert_eq!(record.event_name, "Transfer");
        assert_eq!(
            record.arg("value"),
            Some(&serde_json::Value::String("42".into()))
        );

        monitor.stop(&provider).await;
        provider.deliver(&signature, transfer_log(9_992, 2));
        assert_eq!(monitor.log().len(), 2);
    }

    #[tokio::test]
    async fn fetch_history_rejected_while_monitoring() {
        let provider = ScriptedProvider::new();
        let mut monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());
        let event = events()[0].clone();

        monitor.start(&provider, &events()).await.unwrap();
        let err = monitor
            .fetch_history(&provider, &event, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::AlreadyMonitoring));
    }

    #[tokio::test]
    async fn fetch_history_appends_while_idle() {
        let mut provider = ScriptedProvider::new();
        provider.logs = vec![transfer_log(9_000, 0), transfer_log(9_001, 0)];
        let monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());
        let event = events()[0].clone();

        let records = monitor
            .fetch_history(&provider, &event, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(monitor.log().len(), 2);
    }

    #[tokio::test]
    async fn cancelled_fetch_appends_nothing() {
        let mut provider = ScriptedProvider::new();
        provider.logs = vec![transfer_log(9_000, 0)];
        let monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());
        let event = events()[0].clone();

        let err = monitor
            .fetch_history(&provider, &event, Arc::new(AtomicBool::new(true)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MonitorError::Provider(ProviderError::Cancelled)
        ));
        assert!(monitor.log().is_empty());
    }

    /// Provider whose `block_number` blocks on a gate, so a fetch can be
    /// held in flight while a second one is attempted.
    struct GatedProvider {
        gate: tokio::sync::Notify,
    }

    #[async_trait]
    impl ChainProvider for GatedProvider {
        async fn block_number(&self) -> Result<u64, ProviderError> {
            self.gate.notified().await;
            Ok(10_000)
        }

        async fn query_logs(
            &self,
            _address: &str,
            _event_signature: &str,
            _from_block: u64,
            _to_block: u64,
        ) -> Result<Vec<ProviderLog>, ProviderError> {
            Ok(vec![])
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

    #[tokio::test]
    async fn only_one_fetch_outstanding_at_a_time() {
        let monitor = Arc::new(EventMonitor::new("0xc0ffee", MonitorConfig::default()));
        let provider = Arc::new(GatedProvider {
            gate: tokio::sync::Notify::new(),
        });
        let event = events()[0].clone();

        let bg_monitor = Arc::clone(&monitor);
        let bg_provider = Arc::clone(&provider);
        let bg_event = event.clone();
        let first = tokio::spawn(async move {
            bg_monitor
                .fetch_history(
                    bg_provider.as_ref(),
                    &bg_event,
                    Arc::new(AtomicBool::new(false)),
                )
                .await
        });
        // Single-threaded test runtime: yielding runs the spawned fetch up
        // to the provider gate.
        tokio::task::yield_now().await;

        let err = monitor
            .fetch_history(provider.as_ref(), &event, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::FetchInFlight));

        provider.gate.notify_one();
        first.await.unwrap().unwrap();

        // The slot is free again once the first fetch resolves.
        provider.gate.notify_one();
        let records = monitor
            .fetch_history(provider.as_ref(), &event, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn watched_events_requires_monitoring() {
        let monitor = EventMonitor::new("0xc0ffee", MonitorConfig::default());
        assert!(matches!(
            monitor.watched_events(),
            Err(MonitorError::NotMonitoring)
        ));
    }
}
