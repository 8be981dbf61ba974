//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in production).  A future
//! MQTT or dashboard adapter would implement the same trait.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one line.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::PlanStarted { mode, steps } => {
                info!("PLAN | {} started, {} steps", mode, steps);
            }
            AppEvent::StepCompleted {
                mode,
                step,
                instruction,
            } => {
                info!("PLAN | {} step {} ok: {}", mode, step, instruction);
            }
            AppEvent::StepRejected {
                mode,
                step,
                instruction,
                reason,
            } => {
                warn!("PLAN | {} step {} rejected: {} ({})", mode, step, instruction, reason);
            }
            AppEvent::PlanCompleted { mode } => {
                info!("PLAN | {} complete", mode);
            }
            AppEvent::PlanFailed(failure) => {
                error!("PLAN | {}", failure);
            }
            AppEvent::ModeDetected(check) => {
                info!("MODE | {}", check.mode_name());
            }
            AppEvent::StaleReading(resource) => {
                warn!("MODE | {} reading stale", resource);
            }
            AppEvent::Telemetry(t) => {
                let settings = serde_json::to_string(&t.mode.settings).unwrap_or_default();
                match t.temperature {
                    Some(tenths) => info!(
                        "TELEM | mode={} | {} | T={}.{}\u{00b0} | bus tx={} rfail={} wfail={}",
                        t.mode.mode_name(),
                        settings,
                        tenths / 10,
                        tenths % 10,
                        t.bus.transactions,
                        t.bus.read_failures,
                        t.bus.write_failures,
                    ),
                    None => info!(
                        "TELEM | mode={} | {} | T=? | bus tx={} rfail={} wfail={}",
                        t.mode.mode_name(),
                        settings,
                        t.bus.transactions,
                        t.bus.read_failures,
                        t.bus.write_failures,
                    ),
                }
            }
        }
    }
}
