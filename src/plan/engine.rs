//! Sequential plan executor.
//!
//! ```text
//!   Idle ──begin──▶ Running(0) ──▶ Running(1) ──▶ … ──▶ Completed
//!                        │               │
//!                        └─── timeout ───┴──────────▶ Failed(step, reason)
//! ```
//!
//! Each instruction is awaited to completion before the next is issued,
//! so a plan never has two commands outstanding.  A rejected write is
//! recorded against its step and the plan moves on; only a quiescence
//! wait can halt it.  There is no pause and no cancellation, and while a
//! plan runs every other mode change is rejected with
//! [`Error::PlanInProgress`].

use core::cell::Cell;
use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::app::events::AppEvent;
use crate::app::ports::{BusPort, DelayPort, EventSink};
use crate::drivers::Equipment;
use crate::error::{Error, Result};

use super::quiescence::wait_quiescent;
use super::{Instruction, ModeId, Plan, PlanTable};

/// Execution state of the most recent plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanState {
    #[default]
    Idle,
    Running { mode: ModeId, step: usize },
    /// `rejected` counts steps whose write the controller refused.
    Completed { mode: ModeId, rejected: usize },
    Failed { mode: ModeId, step: usize, reason: Error },
}

impl PlanState {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// A plan that ran every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub mode: ModeId,
    pub steps: usize,
    /// Steps whose write was refused, in order.
    pub rejected: Vec<usize>,
}

impl PlanReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Which step halted a plan and why.  Steps after it were not issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanFailure {
    pub mode: ModeId,
    pub step: usize,
    pub instruction: Instruction,
    pub reason: Error,
}

impl fmt::Display for PlanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed at step {} ({}): {}",
            self.mode, self.step, self.instruction, self.reason
        )
    }
}

impl std::error::Error for PlanFailure {}

pub struct PlanEngine<B, D> {
    equipment: Arc<Equipment<B>>,
    table: PlanTable,
    delay: D,
    fallback_quiescence_secs: u32,
    state: Mutex<CriticalSectionRawMutex, Cell<PlanState>>,
}

impl<B: BusPort, D: DelayPort> PlanEngine<B, D> {
    pub fn new(
        equipment: Arc<Equipment<B>>,
        table: PlanTable,
        delay: D,
        fallback_quiescence_secs: u32,
    ) -> Self {
        Self {
            equipment,
            table,
            delay,
            fallback_quiescence_secs,
            state: Mutex::new(Cell::new(PlanState::Idle)),
        }
    }

    pub fn state(&self) -> PlanState {
        self.state.lock(Cell::get)
    }

    pub fn table(&self) -> &PlanTable {
        &self.table
    }

    /// Resolve `name` and claim the engine for it.
    ///
    /// Touches no hardware: an unknown name or a plan already running is
    /// refused before a single command is issued.
    pub fn begin(&self, name: &str) -> Result<&'static Plan> {
        let plan = self.table.lookup(name)?;
        self.state.lock(|s| {
            if let PlanState::Running { mode, step } = s.get() {
                debug!("refusing {}: {} running at step {}", plan.mode, mode, step);
                return Err(Error::PlanInProgress);
            }
            s.set(PlanState::Running {
                mode: plan.mode,
                step: 0,
            });
            Ok(plan)
        })
    }

    /// Execute a plan previously claimed with [`begin`](Self::begin).
    pub async fn run(
        &self,
        plan: &'static Plan,
        sink: &mut impl EventSink,
    ) -> core::result::Result<PlanReport, PlanFailure> {
        let mode = plan.mode;
        info!("mode {} starting, {} steps", mode, plan.steps.len());
        sink.emit(&AppEvent::PlanStarted {
            mode,
            steps: plan.steps.len(),
        });

        let mut rejected = Vec::new();
        for (step, &instruction) in plan.steps.iter().enumerate() {
            self.state
                .lock(|s| s.set(PlanState::Running { mode, step }));

            match self.step(instruction).await {
                Ok(()) => sink.emit(&AppEvent::StepCompleted {
                    mode,
                    step,
                    instruction,
                }),
                Err(reason) if matches!(instruction, Instruction::Set(..)) => {
                    warn!("{} step {} ({}) rejected: {}", mode, step, instruction, reason);
                    rejected.push(step);
                    sink.emit(&AppEvent::StepRejected {
                        mode,
                        step,
                        instruction,
                        reason,
                    });
                }
                Err(reason) => {
                    let failure = PlanFailure {
                        mode,
                        step,
                        instruction,
                        reason,
                    };
                    error!("{}", failure);
                    self.state.lock(|s| {
                        s.set(PlanState::Failed { mode, step, reason });
                    });
                    sink.emit(&AppEvent::PlanFailed(failure));
                    return Err(failure);
                }
            }
        }

        self.state.lock(|s| {
            s.set(PlanState::Completed {
                mode,
                rejected: rejected.len(),
            })
        });
        if rejected.is_empty() {
            info!("mode {} complete", mode);
        } else {
            warn!("mode {} complete, steps {:?} rejected", mode, rejected);
        }
        sink.emit(&AppEvent::PlanCompleted { mode });
        Ok(PlanReport {
            mode,
            steps: plan.steps.len(),
            rejected,
        })
    }

    async fn step(&self, instruction: Instruction) -> Result<()> {
        match instruction {
            Instruction::Set(resource, value) => {
                let sent = self.equipment.set(resource, value).await?;
                debug!("{} <- {}", resource, sent);
            }
            Instruction::WaitQuiescent(resource) => {
                let valve = self
                    .equipment
                    .valve_for(resource)
                    .ok_or(Error::Config("quiescence wait on a non-valve resource"))?;
                wait_quiescent(valve, resource, &self.delay, self.fallback_quiescence_secs).await?;
            }
            Instruction::Delay(secs) => {
                debug!("delay {}s", secs);
                self.delay.delay(Duration::from_secs(u64::from(secs))).await;
            }
        }
        Ok(())
    }
}
