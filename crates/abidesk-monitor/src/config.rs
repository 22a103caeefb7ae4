//! Monitor configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one contract monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Historical queries scan at most this many blocks behind the head.
    #[serde(default = "default_lookback_blocks")]
    pub lookback_blocks: u64,
}

fn default_lookback_blocks() -> u64 {
    1_000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            lookback_blocks: default_lookback_blocks(),
        }
    }
}
