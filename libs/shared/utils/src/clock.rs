use chrono::{Local, NaiveDate, NaiveDateTime};

/// Source of the wall-clock reference that booking rules compare against.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Clinic-local system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to one instant, for tests and replayed requests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Midnight at the start of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let clock = FixedClock::at_date(date);

        assert_eq!(clock.today(), date);
        assert_eq!(clock.now(), date.and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_system_clock_is_object_safe() {
        let clock: Box<dyn Clock> = Box::new(SystemClock);
        assert!(clock.today() > NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
    }
}
