//! Expiry sweeper configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic release of expired locks and bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Whether the server runs the sweeper in the background.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds between two sweeps.
    #[serde(default = "default_interval")]
    pub sweep_interval_seconds: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            sweep_interval_seconds: default_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> u64 {
    300
}
