//! System configuration parameters
//!
//! All tunable parameters for the pool controller.  Values are read from
//! a JSON file at startup; any field left out takes its default.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::plan::ModeId;
use crate::wiring::{AUX_CONTROLLER_ADDR, DEFAULT_BUS_PATH};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Bus ---
    /// Character device of the I2C bus
    pub bus_path: String,
    /// 7-bit address of the auxiliary controller
    pub slave_address: u8,

    // --- Modes ---
    /// Mode to enter at startup; `None` leaves the equipment alone
    pub startup_mode: Option<String>,

    // --- Timing ---
    /// Mode/telemetry report interval (seconds)
    pub status_interval_secs: u32,
    /// Quiescence budget when a valve's travel times cannot be read (seconds)
    pub fallback_quiescence_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Bus
            bus_path: String::from(DEFAULT_BUS_PATH),
            slave_address: AUX_CONTROLLER_ADDR,

            // Modes
            startup_mode: Some(String::from(ModeId::AllOff.name())),

            // Timing
            status_interval_secs: 60,     // 1/min
            fallback_quiescence_secs: 60, // longer than any calibrated sweep
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Out-of-range values are rejected, never
    /// clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bus_path.is_empty() {
            return Err(ConfigError::ValidationFailed("bus_path must not be empty"));
        }
        if !(0x08..=0x77).contains(&self.slave_address) {
            return Err(ConfigError::ValidationFailed(
                "slave_address must be 0x08–0x77",
            ));
        }
        if self
            .startup_mode
            .as_deref()
            .is_some_and(|m| m.parse::<ModeId>().is_err())
        {
            return Err(ConfigError::ValidationFailed(
                "startup_mode is not a known mode",
            ));
        }
        if !(1..=86_400).contains(&self.status_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "status_interval_secs must be 1–86400",
            ));
        }
        if !(1..=600).contains(&self.fallback_quiescence_secs) {
            return Err(ConfigError::ValidationFailed(
                "fallback_quiescence_secs must be 1–600",
            ));
        }
        Ok(())
    }
}
