//! The `ChainProvider` capability — the injected boundary to a node.
//!
//! This core never resolves a provider from ambient state; callers hand one
//! in explicitly. Providers deliver logs with their argument values already
//! split positionally (topic handling is their concern); this core names,
//! normalizes, records, and merges them.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::value::AbiValue;

/// A single matched log as delivered by a provider, live or historical.
#[derive(Debug, Clone)]
pub struct ProviderLog {
    /// Argument values in event-input declaration order.
    pub values: Vec<AbiValue>,
    pub block_number: u64,
    pub transaction_hash: String,
    pub log_index: u32,
    /// Block timestamp, Unix seconds UTC.
    pub timestamp: i64,
}

/// Callback invoked once per delivered live log. Deliveries for distinct
/// event names carry no mutual ordering guarantee.
pub type LogCallback = Arc<dyn Fn(ProviderLog) + Send + Sync>;

/// Owned handle for one active log subscription.
///
/// Tokens are not cloneable; passing one to [`ChainProvider::unsubscribe`]
/// consumes it, so a registration can be released exactly once and a
/// released registration cannot leak.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a token leaks the provider-side registration; pass it to unsubscribe"]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Abstracts over a chain RPC backend.
///
/// # Thread Safety
/// Implementations must be `Send + Sync`; callbacks may fire on any task.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Current head block number.
    async fn block_number(&self) -> Result<u64, ProviderError>;

    /// Query historical logs for one event over an inclusive block window.
    /// `event_signature` is the canonical ABI signature string.
    async fn query_logs(
        &self,
        address: &str,
        event_signature: &str,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<ProviderLog>, ProviderError>;

    /// Register a live listener for one event. The returned token owns the
    /// registration.
    async fn subscribe(
        &self,
        address: &str,
        event_signature: &str,
        callback: LogCallback,
    ) -> Result<SubscriptionToken, ProviderError>;

    /// Release a registration. Consumes the token.
    async fn unsubscribe(&self, token: SubscriptionToken) -> Result<(), ProviderError>;
}
