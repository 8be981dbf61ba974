//! Line console: stdin reader thread to async tasks.
//!
//! Uses `embassy-sync` bounded channels to bridge the blocking stdin
//! reader with the executor, and to hand accepted plans from the command
//! task to the plan runner.
//!
//! ```text
//! ┌──────────────┐   Input    ┌──────────────┐  &Plan   ┌─────────────┐
//! │ stdin thread │──────────▶│ command task  │────────▶│ plan runner │
//! │  (blocking)  │            │   (async)    │          │   (async)   │
//! └──────────────┘            └──────────────┘          └─────────────┘
//! ```

use std::io::BufRead;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use poolctl::plan::Plan;

/// Longest accepted command line.
pub const MAX_LINE: usize = 128;

pub type Line = heapless::String<MAX_LINE>;

pub enum Input {
    Line(Line),
    Closed,
}

/// Channel depth for console lines.
const INPUT_DEPTH: usize = 8;

/// stdin thread → command task.
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, Input, INPUT_DEPTH> = Channel::new();

/// Command/startup task → plan runner.  A plan is only queued after the
/// engine accepted it, so one slot is enough.
pub static PLAN_CHANNEL: Channel<CriticalSectionRawMutex, &'static Plan, 1> = Channel::new();

/// Spawn the blocking stdin reader.  Blank lines are skipped; over-long
/// lines are dropped with a warning.
pub fn spawn_reader() -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".into())
        .spawn(|| {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(e) => {
                        warn!("console: read failed: {}", e);
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match Line::try_from(line) {
                    Ok(l) => futures_lite::future::block_on(INPUT_CHANNEL.send(Input::Line(l))),
                    Err(()) => warn!("console: dropping {}-byte line", line.len()),
                }
            }
            info!("console: stdin closed");
            futures_lite::future::block_on(INPUT_CHANNEL.send(Input::Closed));
        })
}
