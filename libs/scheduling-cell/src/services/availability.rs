// libs/scheduling-cell/src/services/availability.rs
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::models::{Appointment, CalendarSettings, TimeSlot};
use crate::services::conflict::ConflictDetectionService;
use crate::services::slots::SlotGenerator;

pub struct AvailabilityService {
    slot_generator: SlotGenerator,
    conflict_service: ConflictDetectionService,
}

impl AvailabilityService {
    pub fn new(settings: CalendarSettings) -> Self {
        Self {
            slot_generator: SlotGenerator::new(settings),
            conflict_service: ConflictDetectionService::new(),
        }
    }

    /// The day's slots, each marked free when an appointment of
    /// `duration_minutes` starting there would not overlap any booking.
    pub fn calculate(
        &self,
        date: NaiveDate,
        appointments: &[Appointment],
        duration_minutes: i32,
    ) -> Vec<TimeSlot> {
        debug!("Calculating availability for {} ({} minute appointment)", date, duration_minutes);

        if duration_minutes <= 0 {
            warn!("Requested non-positive duration {} - no availability", duration_minutes);
            return Vec::new();
        }

        let same_day: Vec<Appointment> = appointments
            .iter()
            .filter(|apt| apt.date == date)
            .cloned()
            .collect();

        let mut slots = self.slot_generator.generate(date);

        for slot in &mut slots {
            slot.is_available = !self.conflict_service.has_conflict(
                date,
                slot.start_time,
                duration_minutes,
                &same_day,
                None,
            );

            // Display only: a booking is listed under the slot it starts in.
            slot.occupying_appointments = same_day
                .iter()
                .filter(|apt| apt.time == slot.start_time)
                .cloned()
                .collect();
        }

        debug!(
            "Found {} of {} slots available on {}",
            slots.iter().filter(|s| s.is_available).count(),
            slots.len(),
            date
        );

        slots
    }
}
