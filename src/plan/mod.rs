//! Static mode plans.
//!
//! A plan is a strictly ordered list of [`Instruction`]s that moves the
//! equipment into one operating mode.  Plans are authored so valves are
//! seated before any pump changes speed and the heater only fires once
//! flow is established:
//!
//! ```text
//!   set valves ──▶ wait quiescent ──▶ set pumps ──▶ delay ──▶ heater on
//! ```
//!
//! The table is `'static` data; [`PlanTable`] is the lookup wrapper the
//! engine and reconciler are constructed with, so tests can hand them a
//! table of their own.

pub mod engine;
pub mod quiescence;
pub mod settings;

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

use crate::error::Error;
use crate::wiring::{VALVE_0_BOTH, VALVE_0_POOL, VALVE_0_SPA, VALVE_1_BOTH, VALVE_1_POOL, VALVE_1_SPA};

pub use engine::{PlanEngine, PlanFailure, PlanReport, PlanState};
pub use settings::{Settings, expected_settings};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A named controllable unit that plans assign values to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Resource {
    Heater = 0,
    Valve0 = 1,
    Valve1 = 2,
    Pump0 = 3,
    Pump1 = 4,
    Light = 5,
}

impl Resource {
    /// Total number of resources; sizes every settings snapshot.
    pub const COUNT: usize = 6;

    /// Every resource, in snapshot key order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Heater,
        Self::Valve0,
        Self::Valve1,
        Self::Pump0,
        Self::Pump1,
        Self::Light,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Heater => "heater",
            Self::Valve0 => "valve0",
            Self::Valve1 => "valve1",
            Self::Pump0 => "pump0",
            Self::Pump1 => "pump1",
            Self::Light => "light",
        }
    }

    /// Slot in a [`Settings`] array.
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Hardware instance index within the resource's equipment class.
    pub fn instance(self) -> usize {
        match self {
            Self::Heater | Self::Valve0 | Self::Pump0 | Self::Light => 0,
            Self::Valve1 | Self::Pump1 => 1,
        }
    }

    pub fn is_valve(self) -> bool {
        matches!(self, Self::Valve0 | Self::Valve1)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Resource {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Identity of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeId {
    AllOff,
    High,
    Low,
    Spa,
    SpaClean,
    WarmPool,
}

impl ModeId {
    pub const ALL: [Self; 6] = [
        Self::AllOff,
        Self::High,
        Self::Low,
        Self::Spa,
        Self::SpaClean,
        Self::WarmPool,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AllOff => "allOff",
            Self::High => "high",
            Self::Low => "low",
            Self::Spa => "spa",
            Self::SpaClean => "spaClean",
            Self::WarmPool => "warmPool",
        }
    }
}

impl FromStr for ModeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or(Error::UnknownMode)
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ModeId {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Instructions and plans
// ---------------------------------------------------------------------------

/// One step of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Assign a value through the resource's adapter.
    Set(Resource, u16),
    /// Block until the valve reports inactive, bounded by its travel time.
    WaitQuiescent(Resource),
    /// Suspend for whole seconds without touching the bus.
    Delay(u32),
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(r, v) => write!(f, "set {r}={v}"),
            Self::WaitQuiescent(r) => write!(f, "wait {r}"),
            Self::Delay(s) => write!(f, "delay {s}s"),
        }
    }
}

/// A named, ordered instruction list.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub mode: ModeId,
    pub steps: &'static [Instruction],
}

/// Lookup over a static plan list.  Declaration order is the
/// reconciliation precedence.
#[derive(Debug, Clone, Copy)]
pub struct PlanTable {
    plans: &'static [Plan],
}

impl PlanTable {
    pub const fn new(plans: &'static [Plan]) -> Self {
        Self { plans }
    }

    /// The authored pool/spa plans.
    pub const fn builtin() -> Self {
        Self::new(PLANS)
    }

    pub fn get(&self, mode: ModeId) -> Option<&'static Plan> {
        self.plans.iter().find(|p| p.mode == mode)
    }

    /// Resolve a mode name to its plan.
    pub fn lookup(&self, name: &str) -> Result<&'static Plan, Error> {
        let mode: ModeId = name.parse()?;
        self.get(mode).ok_or(Error::UnknownMode)
    }

    pub fn plans(&self) -> &'static [Plan] {
        self.plans
    }
}

impl Default for PlanTable {
    fn default() -> Self {
        Self::builtin()
    }
}

use Instruction::{Delay, Set, WaitQuiescent};
use Resource::{Heater, Light, Pump0, Pump1, Valve0, Valve1};

/// Seconds between establishing flow and firing the heater.
const HEATER_FLOW_DELAY_SECS: u32 = 5;

pub static PLANS: &[Plan] = &[
    Plan {
        mode: ModeId::AllOff,
        steps: &[Set(Heater, 0), Set(Pump1, 0), Set(Pump0, 0), Set(Light, 0)],
    },
    Plan {
        mode: ModeId::High,
        steps: &[
            Set(Heater, 0),
            Set(Valve0, VALVE_0_BOTH),
            Set(Valve1, VALVE_1_POOL),
            WaitQuiescent(Valve0),
            WaitQuiescent(Valve1),
            Set(Pump1, 0),
            Set(Pump0, 2),
        ],
    },
    Plan {
        mode: ModeId::Low,
        steps: &[
            Set(Heater, 0),
            Set(Valve0, VALVE_0_BOTH),
            Set(Valve1, VALVE_1_POOL),
            WaitQuiescent(Valve0),
            WaitQuiescent(Valve1),
            Set(Pump1, 0),
            Set(Pump0, 1),
        ],
    },
    Plan {
        mode: ModeId::Spa,
        steps: &[
            Set(Valve0, VALVE_0_SPA),
            Set(Valve1, VALVE_1_SPA),
            WaitQuiescent(Valve0),
            WaitQuiescent(Valve1),
            Set(Pump1, 0),
            Set(Pump0, 2),
            Delay(HEATER_FLOW_DELAY_SECS),
            Set(Heater, 1),
        ],
    },
    Plan {
        mode: ModeId::SpaClean,
        steps: &[
            Set(Heater, 0),
            Set(Valve0, VALVE_0_POOL),
            Set(Valve1, VALVE_1_BOTH),
            WaitQuiescent(Valve0),
            WaitQuiescent(Valve1),
            Set(Pump1, 0),
            Set(Pump0, 2),
        ],
    },
    Plan {
        mode: ModeId::WarmPool,
        steps: &[
            Set(Valve0, VALVE_0_BOTH),
            Set(Valve1, VALVE_1_POOL),
            WaitQuiescent(Valve0),
            WaitQuiescent(Valve1),
            Set(Pump1, 0),
            Set(Pump0, 2),
            Delay(HEATER_FLOW_DELAY_SECS),
            Set(Heater, 1),
        ],
    },
];
