//! # abidesk-history
//!
//! Concrete [`HistoryStore`] implementations: [`MemoryHistory`] for tests and
//! embedded use, [`SqliteHistory`] for durable storage in long-running
//! processes.
//!
//! [`HistoryStore`]: abidesk_core::history::HistoryStore

pub mod memory;
pub mod sqlite;

pub use memory::MemoryHistory;
pub use sqlite::SqliteHistory;
