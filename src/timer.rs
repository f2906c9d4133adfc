use std::time::{Duration, Instant};

/// Fixed-period timer polled from the event loop. A disabled interval never fires.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    last: Instant,
    enabled: bool,
}

impl Interval {
    pub fn new(period: Duration, enabled: bool, now: Instant) -> Self {
        Self {
            period,
            last: now,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enabling restarts the period from `now`
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if enabled && !self.enabled {
            self.last = now;
        }
        self.enabled = enabled;
    }

    /// True at most once per call when a period has elapsed
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.enabled || now.duration_since(self.last) < self.period {
            return false;
        }
        self.last = now;
        true
    }

    /// Time until the next fire, for sizing the input poll timeout
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.enabled
            .then(|| self.period.saturating_sub(now.duration_since(self.last)))
    }
}
