// libs/scheduling-cell/src/services/lifecycle.rs
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::models::{Appointment, AppointmentStatus, CalendarSettings, SchedulingError};

pub struct AppointmentLifecycleService {
    settings: CalendarSettings,
}

impl AppointmentLifecycleService {
    pub fn new(settings: CalendarSettings) -> Self {
        Self { settings }
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), SchedulingError> {
        debug!("Validating status transition from {:?} to {:?}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(new_status) {
            warn!("Invalid status transition attempted: {:?} -> {:?}", current_status, new_status);
            return Err(SchedulingError::InvalidStatusTransition(*current_status));
        }

        info!("Status transition validated: {:?} -> {:?}", current_status, new_status);
        Ok(())
    }

    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
                AppointmentStatus::Rescheduled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
                AppointmentStatus::Rescheduled,
            ],
            AppointmentStatus::InProgress => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Rescheduled => vec![
                AppointmentStatus::Scheduled,
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
            AppointmentStatus::NoShow => vec![],
        }
    }

    /// Cancellation needs `cancellation_deadline_hours` of notice before the
    /// scheduled start.
    pub fn check_cancellation(&self, appointment: &Appointment, now: NaiveDateTime) -> Result<(), SchedulingError> {
        self.validate_status_transition(&appointment.status, &AppointmentStatus::Cancelled)?;
        check_notice("Cancellation", appointment, now, self.settings.cancellation_deadline_hours)
    }

    pub fn check_reschedule(&self, appointment: &Appointment, now: NaiveDateTime) -> Result<(), SchedulingError> {
        self.validate_status_transition(&appointment.status, &AppointmentStatus::Rescheduled)?;
        check_notice("Reschedule", appointment, now, self.settings.reschedule_deadline_hours)
    }

    pub fn can_cancel(&self, appointment: &Appointment, now: NaiveDateTime) -> bool {
        self.check_cancellation(appointment, now).is_ok()
    }

    pub fn can_reschedule(&self, appointment: &Appointment, now: NaiveDateTime) -> bool {
        self.check_reschedule(appointment, now).is_ok()
    }
}

fn check_notice(
    action: &'static str,
    appointment: &Appointment,
    now: NaiveDateTime,
    required_hours: i32,
) -> Result<(), SchedulingError> {
    let remaining = appointment.scheduled_start() - now;

    if remaining < Duration::hours(i64::from(required_hours)) {
        warn!(
            "{} of appointment {} refused: {} minutes before start, {}h required",
            action,
            appointment.id,
            remaining.num_minutes(),
            required_hours
        );
        return Err(SchedulingError::DeadlinePassed {
            action,
            required_hours,
            remaining_minutes: remaining.num_minutes(),
        });
    }

    Ok(())
}
