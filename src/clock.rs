//! Wall-clock access, injected so time-dependent logic can be tested.

use time::{Date, OffsetDateTime};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;

    /// Calendar date of `now` in the clock's own offset.
    fn today(&self) -> Date {
        self.now().date()
    }
}

/// The system clock, in the local offset when it can be determined and UTC
/// otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
pub(crate) use fixed::FixedClock;
