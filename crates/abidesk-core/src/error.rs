//! Error types for the AbiDesk validation and event pipeline.

use thiserror::Error;

/// Errors raised while parsing an ABI definition into a [`ContractAbi`].
/// Fatal to schema load — a schema is either fully indexed or rejected.
///
/// [`ContractAbi`]: crate::schema::ContractAbi
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid ABI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid parameter type '{token}': {reason}")]
    InvalidType { token: String, reason: String },

    #[error("unsupported ABI entry kind '{kind}'")]
    UnknownEntry { kind: String },
}

/// Errors raised while lowering validated arguments to ABI-encoded calldata.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("missing argument '{field}'")]
    MissingArgument { field: String },

    #[error("argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },
}

/// Errors surfaced by a [`ChainProvider`] implementation.
///
/// A failed historical fetch is abandoned and reported to the caller; it
/// never affects monitor state. `RangeTooLarge` is recoverable by narrowing
/// the queried window.
///
/// [`ChainProvider`]: crate::provider::ChainProvider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("block range {from_block}..={to_block} too large for provider")]
    RangeTooLarge { from_block: u64, to_block: u64 },

    #[error("provider error: {0}")]
    Rpc(String),

    #[error("historical fetch cancelled")]
    Cancelled,
}

/// Errors from the subscription lifecycle manager.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// `start` while already monitoring, or a historical fetch attempted
    /// while live listeners are active.
    #[error("monitoring is already active")]
    AlreadyMonitoring,

    /// An operation that requires active monitoring was called while idle.
    #[error("monitoring is not active")]
    NotMonitoring,

    #[error("a historical fetch is already in flight")]
    FetchInFlight,

    /// A listener registration failed; every listener registered so far in
    /// the same `start` call has been torn down.
    #[error("subscription registration failed: {0}")]
    Subscription(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors from the deployment history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("deployment '{id}' already recorded")]
    AlreadyExists { id: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
