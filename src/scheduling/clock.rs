use chrono::{DateTime, Utc};

/// Source of "now" for date/time validation. Injected so tests can pin
/// the current instant instead of reading the system clock.
///
/// All calendar-day comparisons in the engine use the UTC day of this
/// instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
