//! Unified error types for the pool controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! plan engine's failure handling uniform.  All variants are `Copy` so
//! they can be stored in the plan execution state and reported back
//! through the command surface without allocation.

use core::fmt;

use crate::plan::Resource;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus transaction to the auxiliary controller failed.
    Bus(BusError),
    /// A mode name that is not in the plan table.
    UnknownMode,
    /// A valve did not settle within its travel-time budget.
    QuiescenceTimeout {
        resource: Resource,
        budget_secs: u32,
    },
    /// A command was offered while another one was still outstanding.
    BusContention,
    /// A plan is already running; mode changes are rejected until it ends.
    PlanInProgress,
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::UnknownMode => write!(f, "unknown mode"),
            Self::QuiescenceTimeout {
                resource,
                budget_secs,
            } => write!(f, "{resource} did not settle within {budget_secs}s"),
            Self::BusContention => write!(f, "bus busy"),
            Self::PlanInProgress => write!(f, "a mode change is already in progress"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Transport-level failures, independent of the concrete I2C backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The auxiliary controller did not acknowledge (address or data).
    Nack,
    /// Another bus master won arbitration.
    ArbitrationLost,
    /// Misplaced start/stop or other electrical fault.
    BusFault,
    /// Receive buffer overrun.
    Overrun,
    /// Generic I/O error from the host driver.
    Io,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::ArbitrationLost => write!(f, "arbitration lost"),
            Self::BusFault => write!(f, "bus fault"),
            Self::Overrun => write!(f, "overrun"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

impl From<embedded_hal::i2c::ErrorKind> for BusError {
    fn from(kind: embedded_hal::i2c::ErrorKind) -> Self {
        use embedded_hal::i2c::ErrorKind;
        match kind {
            ErrorKind::NoAcknowledge(_) => Self::Nack,
            ErrorKind::ArbitrationLoss => Self::ArbitrationLost,
            ErrorKind::Bus => Self::BusFault,
            ErrorKind::Overrun => Self::Overrun,
            _ => Self::Io,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
