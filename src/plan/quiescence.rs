//! Bounded wait for a valve to finish moving.
//!
//! The budget comes from the valve's own calibrated sweep times rather
//! than a fixed guess:
//!
//! ```text
//!   budget = ceil((pos + neg) / 10)     (travel times are in 0.1 s)
//! ```
//!
//! The valve is then polled once per [`QUIESCENCE_POLL_INTERVAL`].  Each
//! poll that does not see `Inactive` spends one unit of budget; an
//! exhausted budget is a hard [`Error::QuiescenceTimeout`].  With a
//! budget of N the wait issues at most N status reads and N-1 delays.

use core::time::Duration;

use log::{debug, warn};

use crate::app::ports::{BusPort, DelayPort};
use crate::drivers::valve::Valve;
use crate::error::{Error, Result};
use crate::protocol::TravelTimes;

use super::Resource;

/// Time between status polls.  Also the unit of the budget.
pub const QUIESCENCE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Whole-second poll budget for a full sweep in both directions.
/// Never less than one poll.
pub fn budget_secs(travel: &TravelTimes) -> u32 {
    let tenths = u32::from(travel.pos) + u32::from(travel.neg);
    tenths.div_ceil(10).max(1)
}

/// Block until `valve` reports inactive.  Returns the number of polls
/// it took.
///
/// `fallback_secs` replaces the computed budget when the travel-time
/// read itself fails.  A stale status never counts as inactive.
pub async fn wait_quiescent<B: BusPort, D: DelayPort>(
    valve: &Valve<B>,
    resource: Resource,
    delay: &D,
    fallback_secs: u32,
) -> Result<u32> {
    let travel = valve.travel_times().await;
    let budget = if travel.stale {
        warn!(
            "{} travel times unavailable, allowing {}s",
            resource, fallback_secs
        );
        fallback_secs.max(1)
    } else {
        budget_secs(&travel)
    };

    let mut remaining = budget;
    loop {
        let status = valve.status().await;
        if !status.stale && status.state.is_inactive() {
            let polls = budget - remaining + 1;
            debug!("{} quiescent after {} poll(s)", resource, polls);
            return Ok(polls);
        }
        remaining -= 1;
        if remaining == 0 {
            warn!(
                "{} still {:?} after {}s",
                resource, status.state, budget
            );
            return Err(Error::QuiescenceTimeout {
                resource,
                budget_secs: budget,
            });
        }
        delay.delay(QUIESCENCE_POLL_INTERVAL).await;
    }
}
