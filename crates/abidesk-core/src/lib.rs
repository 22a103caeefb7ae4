//! # abidesk-core
//!
//! Core types and traits shared across all AbiDesk crates: the closed
//! parameter-type grammar, the parsed ABI schema index, the normalized value
//! model, event log records, and the capability traits (`ChainProvider`,
//! `HistoryStore`) the codec and monitor crates are built on.

pub mod args;
pub mod error;
pub mod event;
pub mod history;
pub mod provider;
pub mod schema;
pub mod types;
pub mod value;

pub use args::{ConstructorArg, FieldError, ValidationResult};
pub use error::{EncodeError, HistoryError, MonitorError, ProviderError, SchemaError};
pub use event::{EventLogRecord, LogMeta};
pub use history::{DeploymentRecord, HistoryStore};
pub use provider::{ChainProvider, LogCallback, ProviderLog, SubscriptionToken};
pub use schema::{ConstructorDef, ContractAbi, EventDef, FunctionDef, Param};
pub use types::ParamType;
pub use value::AbiValue;
