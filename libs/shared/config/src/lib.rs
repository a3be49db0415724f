use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub calendar: CalendarDefaults,
}

/// Tenant calendar policy as read from the environment. Working hours stay
/// raw "HH:MM" strings here; the scheduling cell parses them.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDefaults {
    pub working_hours_start: String,
    pub working_hours_end: String,
    pub slot_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub max_advance_booking_days: i32,
    pub allow_weekend_booking: bool,
    pub default_duration_minutes: i32,
    pub cancellation_deadline_hours: i32,
    pub reschedule_deadline_hours: i32,
}

impl Default for CalendarDefaults {
    fn default() -> Self {
        Self {
            working_hours_start: "08:00".to_string(),
            working_hours_end: "18:00".to_string(),
            slot_duration_minutes: 30,
            buffer_minutes: 0,
            max_advance_booking_days: 90,
            allow_weekend_booking: false,
            default_duration_minutes: 60,
            cancellation_deadline_hours: 24,
            reschedule_deadline_hours: 48,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            calendar: CalendarDefaults::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = CalendarDefaults::default();

        let config = Self {
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| {
                    warn!("SERVER_HOST not set, using default");
                    "0.0.0.0".to_string()
                }),
            server_port: parse_var("SERVER_PORT", 3000),
            calendar: CalendarDefaults {
                working_hours_start: env::var("CALENDAR_WORKING_HOURS_START")
                    .unwrap_or_else(|_| {
                        warn!("CALENDAR_WORKING_HOURS_START not set, using default");
                        defaults.working_hours_start.clone()
                    }),
                working_hours_end: env::var("CALENDAR_WORKING_HOURS_END")
                    .unwrap_or_else(|_| {
                        warn!("CALENDAR_WORKING_HOURS_END not set, using default");
                        defaults.working_hours_end.clone()
                    }),
                slot_duration_minutes: parse_var(
                    "CALENDAR_SLOT_DURATION_MINUTES",
                    defaults.slot_duration_minutes,
                ),
                buffer_minutes: parse_var("CALENDAR_BUFFER_MINUTES", defaults.buffer_minutes),
                max_advance_booking_days: parse_var(
                    "CALENDAR_MAX_ADVANCE_BOOKING_DAYS",
                    defaults.max_advance_booking_days,
                ),
                allow_weekend_booking: parse_var(
                    "CALENDAR_ALLOW_WEEKEND_BOOKING",
                    defaults.allow_weekend_booking,
                ),
                default_duration_minutes: parse_var(
                    "CALENDAR_DEFAULT_DURATION_MINUTES",
                    defaults.default_duration_minutes,
                ),
                cancellation_deadline_hours: parse_var(
                    "CALENDAR_CANCELLATION_DEADLINE_HOURS",
                    defaults.cancellation_deadline_hours,
                ),
                reschedule_deadline_hours: parse_var(
                    "CALENDAR_RESCHEDULE_DEADLINE_HOURS",
                    defaults.reschedule_deadline_hours,
                ),
            },
        };

        if !config.is_configured() {
            warn!("Calendar configuration is inconsistent - slot duration must be positive");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        self.calendar.slot_duration_minutes > 0 && self.calendar.default_duration_minutes > 0
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Debug,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {:?}", name, raw, default);
            default
        }),
        Err(_) => {
            warn!("{} not set, using default", name);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_clinic_policy() {
        let config = AppConfig::default();

        assert_eq!(config.calendar.working_hours_start, "08:00");
        assert_eq!(config.calendar.working_hours_end, "18:00");
        assert_eq!(config.calendar.max_advance_booking_days, 90);
        assert!(!config.calendar.allow_weekend_booking);
        assert!(config.is_configured());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_zero_slot_duration_is_not_configured() {
        let mut config = AppConfig::default();
        config.calendar.slot_duration_minutes = 0;

        assert!(!config.is_configured());
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("SHARED_CONFIG_TEST_GARBAGE", "not-a-number");
        assert_eq!(parse_var("SHARED_CONFIG_TEST_GARBAGE", 42), 42);

        env::set_var("SHARED_CONFIG_TEST_BOOL", "true");
        assert!(parse_var("SHARED_CONFIG_TEST_BOOL", false));

        assert_eq!(parse_var("SHARED_CONFIG_TEST_MISSING_VAR", 7), 7);
    }
}
