//! In-memory `HistoryStore` implementation.
//!
//! Suitable for testing and embedded deployments. Thread-safe via
//! `Arc<RwLock<Inner>>`.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use abidesk_core::{
    error::HistoryError,
    history::{DeploymentRecord, HistoryStore},
};

struct Inner {
    /// id → record
    by_id: HashMap<String, DeploymentRecord>,
    /// ids in insertion order
    order: Vec<String>,
}

/// Thread-safe in-memory deployment history.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                by_id: HashMap::new(),
                order: Vec::new(),
            })),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for MemoryHistory {
    fn save(&self, entry: DeploymentRecord) -> Result<(), HistoryError> {
        let mut inner = self.inner.write().unwrap();
        if inner.by_id.contains_key(&entry.id) {
            return Err(HistoryError::AlreadyExists {
                id: entry.id.clone(),
            });
        }
        inner.order.push(entry.id.clone());
        inner.by_id.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<DeploymentRecord>, HistoryError> {
        Ok(self.inner.read().unwrap().by_id.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<DeploymentRecord>, HistoryError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id))
            .cloned()
            .collect())
    }
}
