//! # abidesk-codec
//!
//! The codec layer of AbiDesk: validates user-supplied textual arguments
//! against a parsed schema, lowers them to ABI-encoded constructor calldata,
//! and turns provider-delivered event logs into named [`EventLogRecord`]s.
//!
//! All three paths dispatch on the parsed [`ParamType`] grammar and share
//! one set of scalar parsers (`coerce`) — no string comparison on type tags.
//!
//! [`EventLogRecord`]: abidesk_core::EventLogRecord
//! [`ParamType`]: abidesk_core::ParamType

pub mod coerce;
pub mod decode;
pub mod encode;
pub mod validate;

pub use decode::{merge, EventDecoder, DEFAULT_LOOKBACK_BLOCKS};
pub use encode::{constructor_calldata, deploy_data};
pub use validate::validate_constructor_args;
