//! Outbound application events.
//!
//! The plan engine and [`Controller`](super::service::Controller) emit
//! these through the [`EventSink`](super::ports::EventSink) port.
//! Adapters on the other side decide what to do with them: log to the
//! console, push to a dashboard, etc.

use crate::bus::BusStats;
use crate::error::Error;
use crate::plan::{Instruction, ModeId, PlanFailure, Resource};
use crate::reconcile::ModeCheck;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A plan was claimed and its first step is about to be issued.
    PlanStarted { mode: ModeId, steps: usize },

    /// One instruction finished successfully.
    StepCompleted {
        mode: ModeId,
        step: usize,
        instruction: Instruction,
    },

    /// The controller refused a write.  The plan carries on with the
    /// next step.
    StepRejected {
        mode: ModeId,
        step: usize,
        instruction: Instruction,
        reason: Error,
    },

    /// Every instruction of the plan ran.
    PlanCompleted { mode: ModeId },

    /// A quiescence wait failed; the rest of the plan was not issued.
    PlanFailed(PlanFailure),

    /// Result of a mode query.
    ModeDetected(ModeCheck),

    /// A resource read failed and was reported as zero.
    StaleReading(Resource),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    pub mode: ModeCheck,
    /// Pool water temperature in tenths of a degree.
    pub temperature: Option<u16>,
    pub bus: BusStats,
}
