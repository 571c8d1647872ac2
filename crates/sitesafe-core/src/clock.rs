//! Clock port
//!
//! Record timestamps and "today" for the trailing-window counters come from a
//! `Clock` so that callers (and tests) control time explicitly.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

pub trait Clock: Send + Sync {
    /// Current local time, truncated to whole seconds.
    fn now(&self) -> NaiveDateTime;

    /// Current calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall clock in the process's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(NaiveDateTime);

impl FixedClock {
    pub fn at(instant: NaiveDateTime) -> Self {
        Self(instant)
    }

    /// Pin the clock to noon on the given day.
    pub fn on(day: NaiveDate) -> Self {
        Self(day.and_hms_opt(12, 0, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_has_second_precision() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }

    #[test]
    fn fixed_clock_reports_its_day() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        let clock = FixedClock::on(day);
        assert_eq!(clock.today(), day);
        assert_eq!(clock.now().hour(), 12);
    }
}
