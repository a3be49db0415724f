// libs/scheduling-cell/src/services/statistics.rs
use chrono::NaiveDate;
use tracing::debug;

use crate::models::{Appointment, AppointmentStats};

#[derive(Debug, Clone, Copy, Default)]
pub struct AppointmentStatsService;

impl AppointmentStatsService {
    pub fn new() -> Self {
        Self
    }

    /// Aggregates appointments dated within `from..=to`.
    pub fn summarize(&self, appointments: &[Appointment], from: NaiveDate, to: NaiveDate) -> AppointmentStats {
        let mut stats = AppointmentStats::default();

        for appointment in appointments.iter().filter(|apt| apt.date >= from && apt.date <= to) {
            stats.total += 1;
            *stats.by_status.entry(appointment.status).or_insert(0) += 1;
            *stats.by_type.entry(appointment.appointment_type).or_insert(0) += 1;
            stats.total_duration_minutes += i64::from(appointment.duration_minutes);
        }

        if stats.total > 0 {
            stats.average_duration_minutes =
                (stats.total_duration_minutes as f64 / stats.total as f64).round() as i64;
        }

        debug!("Summarized {} appointments between {} and {}", stats.total, from, to);
        stats
    }
}
