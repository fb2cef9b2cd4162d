use web_time::{Duration, Instant};

/// Period of the tick driving both the elapsed-time counter and the sampler
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// A periodic deadline schedule
///
/// The ticker never reads the clock itself. Callers hand it the current time, and
/// it reports every deadline that has passed, one at a time and in order, so a
/// late poll catches up on all missed ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    next: Instant,
    period: Duration,
}

impl Ticker {
    /// Create a ticker whose first deadline is one period after `now`
    pub fn start(now: Instant, period: Duration) -> Self {
        Self {
            next: now + period,
            period,
        }
    }

    /// Returns the oldest deadline at or before `now`, and advances past it
    pub fn due(&mut self, now: Instant) -> Option<Instant> {
        if self.next > now {
            return None;
        }

        let deadline = self.next;
        self.next += self.period;
        Some(deadline)
    }

    /// The next deadline that hasn't fired yet
    pub const fn next_deadline(&self) -> Instant {
        self.next
    }
}
