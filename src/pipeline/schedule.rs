//! Deadline timers
//!
//! A deadline far in the future is never armed as one long sleep. The wait
//! is split into arms of at most `max_arm`, and the wall clock is re-read
//! before each arm so clock adjustments are picked up.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

/// Time left until `deadline`, clamped to zero once it has passed
pub fn delay_until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Duration {
    (deadline - now).to_std().unwrap_or(Duration::ZERO)
}

/// Sleep until the clock reaches `deadline`. Returns how many timers were armed.
pub async fn wait_until(clock: &dyn Clock, deadline: DateTime<Utc>, max_arm: Duration) -> u32 {
    let max_arm = if max_arm.is_zero() {
        Duration::from_secs(1)
    } else {
        max_arm
    };

    let mut arms = 0;
    loop {
        let remaining = delay_until(clock.now(), deadline);
        if remaining.is_zero() {
            return arms;
        }
        let arm = remaining.min(max_arm);
        debug!(
            remaining_secs = remaining.as_secs(),
            arm_secs = arm.as_secs(),
            "Arming deadline timer"
        );
        tokio::time::sleep(arm).await;
        arms += 1;
    }
}
