//! Application service, the hexagonal core.
//!
//! [`Controller`] owns the equipment registry, the plan engine and the
//! mode reconciler.  It exposes a hardware-agnostic API; all I/O flows
//! through the port traits it is constructed with, so the whole service
//! runs against a simulated bus in tests.
//!
//! ```text
//!   AppCommand ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │        Controller         │
//!    DelayPort ◀── │ PlanEngine · Reconciler   │ ──▶ BusPort
//!                  └──────────────────────────┘
//! ```
//!
//! Methods take `&self`; independent flows (a running plan, a status
//! query, the telemetry monitor) share one controller and meet only at
//! the bus mutex and the plan-state guard.

use core::cell::RefCell;
use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::bus::BusStats;
use crate::config::SystemConfig;
use crate::drivers::Equipment;
use crate::error::{Error, Result};
use crate::plan::{Plan, PlanEngine, PlanFailure, PlanReport, PlanState, PlanTable};
use crate::protocol::{
    DegreeLimits, HeaterStatus, LightStatus, PumpStatus, Temperature, TravelTimes, ValveStatus,
};
use crate::reconcile::{ModeCheck, Reconciler};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{BusPort, DelayPort, EventSink};

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

/// Outcome of a mode change request:
/// `{accepted, completed?, rejectedSteps?, failedStep?, reason?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeSet {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Steps whose write was refused; the plan ran past them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected_steps: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModeSet {
    pub fn rejected(reason: Error) -> Self {
        Self {
            accepted: false,
            completed: None,
            rejected_steps: Vec::new(),
            failed_step: None,
            reason: Some(reason.to_string()),
        }
    }

    /// Accepted; the plan runs on.
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            completed: None,
            rejected_steps: Vec::new(),
            failed_step: None,
            reason: None,
        }
    }

    pub fn finished(outcome: &core::result::Result<PlanReport, PlanFailure>) -> Self {
        match outcome {
            Ok(report) => Self {
                completed: Some(true),
                rejected_steps: report.rejected.clone(),
                ..Self::accepted()
            },
            Err(f) => Self {
                completed: Some(false),
                failed_step: Some(f.step),
                reason: Some(f.reason.to_string()),
                ..Self::accepted()
            },
        }
    }
}

/// JSON-shaped reply to one [`AppCommand`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    ModeSet(ModeSet),
    ModeCheck(ModeCheck),
    Valve(ValveStatus),
    TravelTimes(TravelTimes),
    Degrees(DegreeLimits),
    Pump(PumpStatus),
    Heater(HeaterStatus),
    Light(LightStatus),
    Temperature(Temperature),
    /// Heater and thermometer writes: `{status: 1|0}`.
    Status { status: u8 },
    /// Relay, valve and reset writes: `{result: bool}`.
    Result { result: bool },
    Error { error: String },
}

impl Response {
    fn status<T>(r: &Result<T>) -> Self {
        Self::Status {
            status: u8::from(r.is_ok()),
        }
    }

    fn result<T>(r: &Result<T>) -> Self {
        Self::Result { result: r.is_ok() }
    }
}

// ───────────────────────────────────────────────────────────────
// Event fan-in
// ───────────────────────────────────────────────────────────────

/// Borrows the shared sink for one event at a time, so flows suspended
/// mid-plan never hold it.
struct SharedSink<'a, S>(&'a RefCell<S>);

impl<S: EventSink> EventSink for SharedSink<'_, S> {
    fn emit(&mut self, event: &AppEvent) {
        self.0.borrow_mut().emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller<B, D, S> {
    equipment: Arc<Equipment<B>>,
    engine: PlanEngine<B, D>,
    reconciler: Reconciler<B>,
    sink: RefCell<S>,
}

impl<B: BusPort, D: DelayPort, S: EventSink> Controller<B, D, S> {
    /// Build the service around the authored plan table.
    pub fn new(port: B, delay: D, sink: S, config: &SystemConfig) -> Self {
        Self::with_table(port, delay, sink, config, PlanTable::builtin())
    }

    pub fn with_table(port: B, delay: D, sink: S, config: &SystemConfig, table: PlanTable) -> Self {
        let equipment = Arc::new(Equipment::new(port));
        let engine = PlanEngine::new(
            equipment.clone(),
            table,
            delay,
            config.fallback_quiescence_secs,
        );
        let reconciler = Reconciler::new(equipment.clone(), &table);
        Self {
            equipment,
            engine,
            reconciler,
            sink: RefCell::new(sink),
        }
    }

    // ── Mode control ──────────────────────────────────────────

    /// Validate `name` and claim the engine.  No bus traffic.
    pub fn accept_mode(&self, name: &str) -> Result<&'static Plan> {
        self.engine.begin(name).inspect_err(|e| {
            warn!("mode {:?} refused: {}", name, e);
        })
    }

    /// Run a plan claimed by [`accept_mode`](Self::accept_mode).
    pub async fn run_mode(
        &self,
        plan: &'static Plan,
    ) -> core::result::Result<PlanReport, PlanFailure> {
        self.engine.run(plan, &mut SharedSink(&self.sink)).await
    }

    /// Accept and run to the end.
    pub async fn set_mode(&self, name: &str) -> ModeSet {
        match self.accept_mode(name) {
            Ok(plan) => ModeSet::finished(&self.run_mode(plan).await),
            Err(e) => ModeSet::rejected(e),
        }
    }

    /// Identify the active mode.  Never fails; unmatched is `"custom"`.
    pub async fn check_mode(&self) -> ModeCheck {
        let check = self.reconciler.find_mode().await;
        let mut sink = self.sink.borrow_mut();
        for &resource in &check.stale {
            sink.emit(&AppEvent::StaleReading(resource));
        }
        sink.emit(&AppEvent::ModeDetected(check.clone()));
        check
    }

    pub fn plan_state(&self) -> PlanState {
        self.engine.state()
    }

    // ── Telemetry ─────────────────────────────────────────────

    /// Mode, pool temperature and bus counters, emitted as one event.
    pub async fn telemetry(&self) -> TelemetryData {
        let mode = self.reconciler.find_mode().await;
        let temperature = match self.equipment.thermometer(0) {
            Some(t) => {
                let reading = t.read().await;
                (!reading.stale).then_some(reading.temp)
            }
            None => None,
        };
        let data = TelemetryData {
            mode,
            temperature,
            bus: self.bus_stats(),
        };
        self.sink
            .borrow_mut()
            .emit(&AppEvent::Telemetry(data.clone()));
        data
    }

    pub fn bus_stats(&self) -> BusStats {
        self.equipment.bus().stats()
    }

    pub fn equipment(&self) -> &Equipment<B> {
        &self.equipment
    }

    // ── Command handling ──────────────────────────────────────

    /// Execute one command and shape its reply.
    ///
    /// Index bounds were checked when the command was parsed; an index
    /// that still misses the registry yields an error reply.
    pub async fn handle(&self, cmd: AppCommand) -> Response {
        let eq = &*self.equipment;
        let unknown = || Response::Error {
            error: String::from("unknown device"),
        };
        match cmd {
            AppCommand::SetMode(name) => Response::ModeSet(self.set_mode(&name).await),
            AppCommand::CheckMode => Response::ModeCheck(self.check_mode().await),

            AppCommand::ValveStatus(i) => match eq.valve(i) {
                Some(v) => Response::Valve(v.status().await),
                None => unknown(),
            },
            AppCommand::ValveCalibrate(i) => match eq.valve(i) {
                Some(v) => Response::result(&v.calibrate().await),
                None => unknown(),
            },
            AppCommand::ValveDegrees(i) => match eq.valve(i) {
                Some(v) => Response::Degrees(v.degrees().await),
                None => unknown(),
            },
            AppCommand::ValveTravelTimes(i) => match eq.valve(i) {
                Some(v) => Response::TravelTimes(v.travel_times().await),
                None => unknown(),
            },
            AppCommand::ValveMove(i, degrees) => match eq.valve(i) {
                Some(v) => Response::result(&v.move_to(degrees).await),
                None => unknown(),
            },

            AppCommand::PumpStatus(i) => match eq.pump(i) {
                Some(p) => Response::Pump(p.status().await),
                None => unknown(),
            },
            AppCommand::PumpSet(i, speed) => match eq.pump(i) {
                Some(p) => Response::result(&p.set_speed(speed).await),
                None => unknown(),
            },

            AppCommand::HeaterStatus(i) => match eq.heater(i) {
                Some(h) => Response::Heater(h.status().await),
                None => unknown(),
            },
            AppCommand::HeaterEnable(i, on) => match eq.heater(i) {
                Some(h) => Response::status(&h.enable(on).await),
                None => unknown(),
            },
            AppCommand::HeaterConfig(i, tenths) => match eq.heater(i) {
                Some(h) => Response::status(&h.config(tenths).await),
                None => unknown(),
            },

            AppCommand::LightStatus(i) => match eq.light(i) {
                Some(l) => Response::Light(l.status().await),
                None => unknown(),
            },
            AppCommand::LightControl(i, on) => match eq.light(i) {
                Some(l) => Response::result(&l.control(on).await),
                None => unknown(),
            },

            AppCommand::ThermometerRead(i) => match eq.thermometer(i) {
                Some(t) => Response::Temperature(t.read().await),
                None => unknown(),
            },
            AppCommand::ThermometerConfig(i, coefficients) => match eq.thermometer(i) {
                Some(t) => Response::status(&t.config(coefficients).await),
                None => unknown(),
            },

            AppCommand::SystemReset => {
                info!("system reset");
                Response::result(&eq.factory_reset().await)
            }
        }
    }
}
