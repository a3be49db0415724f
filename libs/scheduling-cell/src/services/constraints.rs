// libs/scheduling-cell/src/services/constraints.rs
use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::debug;

use crate::models::{BookingRuleViolation, CalendarSettings, TimeOfDay, ValidationResult};

pub const MIN_DURATION_MINUTES: i32 = 5;
pub const MAX_DURATION_MINUTES: i32 = 480;

pub struct BookingRulesService {
    settings: CalendarSettings,
}

impl BookingRulesService {
    pub fn new(settings: CalendarSettings) -> Self {
        Self { settings }
    }

    /// Checks a candidate booking against every policy rule relative to
    /// `today` and reports all violations together.
    pub fn validate(
        &self,
        date: NaiveDate,
        time: TimeOfDay,
        duration_minutes: i32,
        today: NaiveDate,
    ) -> ValidationResult {
        debug!("Validating booking on {} at {} for {} minutes", date, time, duration_minutes);

        let mut violations = self.date_violations(date, today);
        violations.extend(self.time_violations(time, duration_minutes));

        ValidationResult::from_violations(violations)
    }

    /// Same as [`validate`](Self::validate) for a time still in its raw
    /// "HH:MM" form; an unparseable time becomes one more reported error.
    pub fn validate_raw(
        &self,
        date: NaiveDate,
        raw_time: &str,
        duration_minutes: i32,
        today: NaiveDate,
    ) -> ValidationResult {
        match TimeOfDay::parse(raw_time) {
            Ok(time) => self.validate(date, time, duration_minutes, today),
            Err(_) => {
                let mut violations = self.date_violations(date, today);
                violations.push(BookingRuleViolation::MalformedTime(raw_time.to_string()));
                if let Some(duration) = duration_violation(duration_minutes) {
                    violations.push(duration);
                }
                ValidationResult::from_violations(violations)
            }
        }
    }

    pub fn is_bookable(&self, date: NaiveDate, time: TimeOfDay, duration_minutes: i32, today: NaiveDate) -> bool {
        self.validate(date, time, duration_minutes, today).is_valid
    }

    fn date_violations(&self, date: NaiveDate, today: NaiveDate) -> Vec<BookingRuleViolation> {
        let mut violations = Vec::new();

        if date < today {
            violations.push(BookingRuleViolation::PastDate(date));
        }

        let max_days = self.settings.max_advance_booking_days;
        let beyond_window = match u64::try_from(max_days) {
            Ok(days) => today.checked_add_days(Days::new(days)).map_or(false, |last| date > last),
            Err(_) => date > today,
        };
        if beyond_window {
            violations.push(BookingRuleViolation::BeyondAdvanceWindow { date, max_days });
        }

        let weekday = date.weekday();
        if !self.settings.allow_weekend_booking && matches!(weekday, Weekday::Sat | Weekday::Sun) {
            violations.push(BookingRuleViolation::WeekendNotAllowed(weekday));
        }

        violations
    }

    fn time_violations(&self, time: TimeOfDay, duration_minutes: i32) -> Vec<BookingRuleViolation> {
        let mut violations = Vec::new();
        let hours = self.settings.working_hours;

        if time < hours.start {
            violations.push(BookingRuleViolation::BeforeOpening { start: time, opens: hours.start });
        }

        let end = i64::from(time.minutes()) + i64::from(duration_minutes.max(0));
        if end > i64::from(hours.end.minutes()) {
            violations.push(BookingRuleViolation::AfterClosing { closes: hours.end });
        }

        if let Some(duration) = duration_violation(duration_minutes) {
            violations.push(duration);
        }

        violations
    }
}

fn duration_violation(duration_minutes: i32) -> Option<BookingRuleViolation> {
    if (MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        None
    } else {
        Some(BookingRuleViolation::InvalidDuration {
            duration: duration_minutes,
            min: MIN_DURATION_MINUTES,
            max: MAX_DURATION_MINUTES,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn t(raw: &str) -> TimeOfDay {
        TimeOfDay::parse(raw).unwrap()
    }

    // Monday
    fn today() -> NaiveDate {
        d(2024, 1, 15)
    }

    fn service() -> BookingRulesService {
        BookingRulesService::new(CalendarSettings::default())
    }

    #[test]
    fn test_valid_booking() {
        let result = service().validate(d(2024, 1, 16), t("09:00"), 60, today());

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_today_is_not_in_the_past() {
        assert!(service().is_bookable(today(), t("17:00"), 60, today()));
    }

    #[test]
    fn test_yesterday_is_rejected() {
        let result = service().validate(d(2024, 1, 12), t("09:00"), 60, today());

        assert!(!result.is_valid);
        assert!(result.violations.contains(&BookingRuleViolation::PastDate(d(2024, 1, 12))));
    }

    #[test]
    fn test_far_future_exceeds_advance_window() {
        let far = today().checked_add_days(Days::new(1000)).unwrap();
        let result = service().validate(far, t("09:00"), 60, today());

        assert!(result.violations.iter().any(|v| matches!(
            v,
            BookingRuleViolation::BeyondAdvanceWindow { max_days: 90, .. }
        )));
    }

    #[test]
    fn test_last_day_of_window_is_allowed() {
        let last = today().checked_add_days(Days::new(90)).unwrap();
        let result = service().validate(last, t("09:00"), 60, today());

        assert!(!result.violations.iter().any(|v| matches!(v, BookingRuleViolation::BeyondAdvanceWindow { .. })));
    }

    #[test]
    fn test_weekend_policy() {
        let saturday = d(2024, 1, 20);
        let result = service().validate(saturday, t("09:00"), 60, today());
        assert_eq!(result.violations, vec![BookingRuleViolation::WeekendNotAllowed(Weekday::Sat)]);

        let open_weekends = BookingRulesService::new(CalendarSettings {
            allow_weekend_booking: true,
            ..CalendarSettings::default()
        });
        assert!(open_weekends.is_bookable(saturday, t("09:00"), 60, today()));
    }

    #[test]
    fn test_working_hours_bounds() {
        let early = service().validate(d(2024, 1, 16), t("07:30"), 30, today());
        assert_eq!(
            early.violations,
            vec![BookingRuleViolation::BeforeOpening { start: t("07:30"), opens: t("08:00") }]
        );

        let late = service().validate(d(2024, 1, 16), t("17:30"), 60, today());
        assert_eq!(late.violations, vec![BookingRuleViolation::AfterClosing { closes: t("18:00") }]);

        assert!(service().is_bookable(d(2024, 1, 16), t("17:00"), 60, today()));
    }

    #[test]
    fn test_every_violation_is_reported() {
        let past_sunday = d(2024, 1, 14);
        let result = service().validate(past_sunday, t("07:00"), 720, today());

        assert_eq!(result.errors.len(), 5);
        assert_eq!(
            result.errors,
            vec![
                "Appointment date 2024-01-14 is in the past".to_string(),
                "Weekend bookings are not allowed (Sun)".to_string(),
                "Appointment starts at 07:00, before opening time 08:00".to_string(),
                "Appointment ends after closing time 18:00".to_string(),
                "Appointment duration of 720 minutes must be between 5 and 480 minutes".to_string(),
            ]
        );
    }

    #[test]
    fn test_non_positive_duration_is_reported() {
        let result = service().validate(d(2024, 1, 16), t("09:00"), 0, today());

        assert_eq!(
            result.violations,
            vec![BookingRuleViolation::InvalidDuration { duration: 0, min: 5, max: 480 }]
        );
    }

    #[test]
    fn test_raw_time_parse_failure_is_data() {
        let result = service().validate_raw(d(2024, 1, 12), "9h", 60, today());

        assert!(!result.is_valid);
        assert_eq!(
            result.violations,
            vec![
                BookingRuleViolation::PastDate(d(2024, 1, 12)),
                BookingRuleViolation::MalformedTime("9h".to_string()),
            ]
        );

        assert!(service().validate_raw(d(2024, 1, 16), "09:00", 60, today()).is_valid);
    }

    #[test]
    fn test_huge_duration_is_reported_not_wrapped() {
        let result = service().validate(d(2024, 1, 16), t("09:00"), i32::MAX, today());

        assert!(!result.is_valid);
        assert_eq!(
            result.violations,
            vec![
                BookingRuleViolation::AfterClosing { closes: t("18:00") },
                BookingRuleViolation::InvalidDuration {
                    duration: i32::MAX,
                    min: MIN_DURATION_MINUTES,
                    max: MAX_DURATION_MINUTES,
                },
            ]
        );
    }
}
