use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::ports::Clock;

/// Enforces a minimum spacing between successive AI calls.
///
/// The first [`IntervalGate::wait`] returns immediately. Each later call
/// sleeps for whatever is left of `min_interval` since the previous one.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    min_interval: Duration,
    last: Option<DateTime<Utc>>,
}

impl IntervalGate {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Block until the next call is allowed, then mark it as taken.
    pub async fn wait(&mut self, clock: &dyn Clock) {
        if let Some(last) = self.last {
            // A clock that moved backwards counts as no time elapsed.
            let elapsed = (clock.now() - last).to_std().unwrap_or(Duration::ZERO);
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                tracing::debug!(wait_ms = remaining.as_millis(), "interval gate: waiting");
                clock.sleep(remaining).await;
            }
        }
        self.last = Some(clock.now());
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
