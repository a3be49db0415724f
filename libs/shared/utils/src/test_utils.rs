use std::sync::Arc;
use chrono::{NaiveDate, NaiveDateTime};

use shared_config::{AppConfig, CalendarDefaults};

use crate::clock::{Clock, FixedClock};

pub struct TestConfig {
    pub working_hours_start: String,
    pub working_hours_end: String,
    pub slot_duration_minutes: i32,
    pub allow_weekend_booking: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            working_hours_start: "08:00".to_string(),
            working_hours_end: "18:00".to_string(),
            slot_duration_minutes: 60,
            allow_weekend_booking: false,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            calendar: CalendarDefaults {
                working_hours_start: self.working_hours_start.clone(),
                working_hours_end: self.working_hours_end.clone(),
                slot_duration_minutes: self.slot_duration_minutes,
                allow_weekend_booking: self.allow_weekend_booking,
                ..CalendarDefaults::default()
            },
        }
    }
}

pub struct TestClock;

impl TestClock {
    /// A clock fixed at 08:00 on the given day.
    pub fn morning_of(year: i32, month: u32, day: u32) -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(at(year, month, day, 8, 0)))
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day)
        .and_hms_opt(hour, minute, 0)
        .expect("valid test time")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.calendar.working_hours_start, "08:00");
        assert_eq!(app_config.calendar.slot_duration_minutes, 60);
        assert_eq!(app_config.calendar.max_advance_booking_days, 90);
    }

    #[test]
    fn test_clock_fixture() {
        let clock = TestClock::morning_of(2024, 1, 15);
        assert_eq!(clock.today(), date(2024, 1, 15));
        assert_eq!(clock.now(), at(2024, 1, 15, 8, 0));
    }
}
