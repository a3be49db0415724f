// libs/scheduling-cell/src/services/slots.rs
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{CalendarSettings, TimeSlot};

pub struct SlotGenerator {
    settings: CalendarSettings,
}

impl SlotGenerator {
    pub fn new(settings: CalendarSettings) -> Self {
        Self { settings }
    }

    /// Contiguous slots of `slot_duration_minutes` covering the working day.
    /// A trailing slot that would run past closing time is dropped.
    pub fn generate(&self, date: NaiveDate) -> Vec<TimeSlot> {
        let step = self.settings.slot_duration_minutes;
        let opens = self.settings.working_hours.start;
        let closes = self.settings.working_hours.end;

        debug!("Generating {}-minute slots for {} between {} and {}", step, date, opens, closes);

        if step <= 0 || opens >= closes {
            warn!("Cannot generate slots: slot duration {} with working hours {}-{}", step, opens, closes);
            return Vec::new();
        }

        let mut slots = Vec::new();
        let mut current = opens;

        while let Some(slot_end) = current.add_minutes(step).filter(|end| *end <= closes) {
            slots.push(TimeSlot {
                date,
                start_time: current,
                end_time: slot_end,
                is_available: true,
                occupying_appointments: Vec::new(),
            });

            current = slot_end;
        }

        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TimeOfDay, WorkingHours};

    fn settings(start: &str, end: &str, step: i32) -> CalendarSettings {
        CalendarSettings {
            working_hours: WorkingHours {
                start: TimeOfDay::parse(start).unwrap(),
                end: TimeOfDay::parse(end).unwrap(),
            },
            slot_duration_minutes: step,
            ..CalendarSettings::default()
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_hourly_slots_cover_working_day() {
        let slots = SlotGenerator::new(settings("08:00", "18:00", 60)).generate(date());

        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0].start_time.to_string(), "08:00");
        assert_eq!(slots[0].end_time.to_string(), "09:00");
        assert_eq!(slots[9].start_time.to_string(), "17:00");
        assert_eq!(slots[9].end_time.to_string(), "18:00");
        assert!(slots.iter().all(|s| s.is_available && s.occupying_appointments.is_empty()));
    }

    #[test]
    fn test_slots_are_contiguous_and_bounded() {
        for step in [5, 15, 25, 30, 45, 50, 90] {
            let config = settings("07:30", "19:10", step);
            let slots = SlotGenerator::new(config.clone()).generate(date());

            assert!(!slots.is_empty());
            for pair in slots.windows(2) {
                assert_eq!(pair[0].end_time, pair[1].start_time);
            }
            assert!(slots.iter().all(|s| s.end_time <= config.working_hours.end));
            assert_eq!(slots[0].start_time, config.working_hours.start);
        }
    }

    #[test]
    fn test_partial_trailing_slot_is_dropped() {
        let slots = SlotGenerator::new(settings("08:00", "09:40", 30)).generate(date());

        let starts: Vec<String> = slots.iter().map(|s| s.start_time.to_string()).collect();
        assert_eq!(starts, vec!["08:00", "08:30", "09:00"]);
    }

    #[test]
    fn test_degenerate_settings_yield_nothing() {
        assert!(SlotGenerator::new(settings("08:00", "18:00", 0)).generate(date()).is_empty());
        assert!(SlotGenerator::new(settings("08:00", "18:00", -15)).generate(date()).is_empty());
        assert!(SlotGenerator::new(settings("18:00", "08:00", 30)).generate(date()).is_empty());
        assert!(SlotGenerator::new(settings("08:00", "08:00", 30)).generate(date()).is_empty());
    }

    #[test]
    fn test_slot_can_end_at_last_minute_of_day() {
        let slots = SlotGenerator::new(settings("22:00", "23:59", 60)).generate(date());
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end_time.to_string(), "23:00");
    }

    #[test]
    fn test_step_longer_than_day_yields_nothing() {
        assert!(SlotGenerator::new(settings("08:00", "18:00", i32::MAX)).generate(date()).is_empty());
        assert!(SlotGenerator::new(settings("08:00", "18:00", 601)).generate(date()).is_empty());
        assert_eq!(SlotGenerator::new(settings("08:00", "18:00", 600)).generate(date()).len(), 1);
    }
}
