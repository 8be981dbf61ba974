//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (I2C bus, timers, event sinks, config storage)
//! implement these traits.  The [`Controller`](super::service::Controller)
//! consumes them via generics, so the plan engine and reconciler never
//! touch hardware directly and every port can be replaced by a test
//! double.

use core::future::Future;
use core::time::Duration;

use crate::config::SystemConfig;
use crate::error::BusError;

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: domain ↔ auxiliary controller)
// ───────────────────────────────────────────────────────────────

/// Raw byte transport to the auxiliary controller.
///
/// Implementations are not required to be reentrant; the
/// [`SharedBus`](crate::bus::SharedBus) guarantees that at most one call
/// is in flight at a time.
pub trait BusPort {
    /// Write `bytes` (register byte first) in a single transaction.
    fn write(&mut self, bytes: &[u8]) -> Result<(), BusError>;

    /// Select `register` and read `buf.len()` bytes back without
    /// releasing the bus in between.
    fn write_read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Delay port (driven adapter: domain → timer)
// ───────────────────────────────────────────────────────────────

/// Suspends the calling flow without touching the bus.
pub trait DelayPort {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Sink that drops every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &super::events::AppEvent) {}
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
