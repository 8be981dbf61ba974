//! Timer adapter.
//!
//! Implements [`DelayPort`] with `async-io-mini` timers, so plan delays
//! and quiescence polls suspend only the flow that awaits them.

use core::future::Future;
use core::time::Duration;

use async_io_mini::Timer;

use crate::app::ports::DelayPort;

/// Wall-clock delays backed by the `async-io-mini` reactor.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimerDelay;

impl TimerDelay {
    pub fn new() -> Self {
        Self
    }
}

impl DelayPort for TimerDelay {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> {
        async move {
            Timer::after(duration).await;
        }
    }
}
