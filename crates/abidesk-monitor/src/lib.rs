//! # abidesk-monitor
//!
//! Subscription lifecycle management for contract event logs.
//!
//! ## Architecture
//! ```text
//! ChainProvider (injected)
//!       │  callback per delivered log
//!       ▼
//! EventMonitor ── decode_live ──► EventLogStore (Mutex-serialized appends)
//!       │                              ▲
//!       └── fetch_history ─────────────┘  (idle-only, bounded window)
//! ```
//!
//! The monitor is either `Idle` or `Monitoring`; registration is
//! all-or-nothing and `stop` is the exact inverse of the matching `start`.

pub mod config;
pub mod log;
pub mod manager;

pub use config::MonitorConfig;
pub use log::EventLogStore;
pub use manager::EventMonitor;
