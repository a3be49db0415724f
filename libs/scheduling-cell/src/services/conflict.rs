// libs/scheduling-cell/src/services/conflict.rs
use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, ConflictCandidate, TimeOfDay};

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetectionService;

impl ConflictDetectionService {
    pub fn new() -> Self {
        Self
    }

    /// True when `[start, start + duration)` overlaps any appointment on `date`,
    /// regardless of therapist or room. `exclude_appointment_id` lets an
    /// appointment being moved ignore its own current booking.
    pub fn has_conflict(
        &self,
        date: NaiveDate,
        start: TimeOfDay,
        duration_minutes: i32,
        existing: &[Appointment],
        exclude_appointment_id: Option<Uuid>,
    ) -> bool {
        if duration_minutes <= 0 {
            warn!("Ignoring conflict check with non-positive duration {}", duration_minutes);
            return false;
        }

        let candidate_start = i64::from(start.minutes());
        let candidate_end = candidate_start + i64::from(duration_minutes);

        existing
            .iter()
            .filter(|apt| apt.date == date)
            .filter(|apt| Some(apt.id) != exclude_appointment_id)
            .any(|apt| overlaps(candidate_start, candidate_end, apt))
    }

    /// Every existing appointment that overlaps the candidate and shares its
    /// therapist or its room.
    pub fn find_conflicts(
        &self,
        candidate: &ConflictCandidate,
        existing: &[Appointment],
    ) -> Vec<Appointment> {
        self.find_buffered_conflicts(candidate, existing, 0)
    }

    /// Resource-scoped check with the candidate widened by `buffer_minutes`
    /// on both sides, so back-to-back bookings leave room to turn over.
    pub fn has_buffered_conflict(
        &self,
        candidate: &ConflictCandidate,
        existing: &[Appointment],
        buffer_minutes: i32,
    ) -> bool {
        !self.find_buffered_conflicts(candidate, existing, buffer_minutes).is_empty()
    }

    /// Resource-scoped conflicts with the candidate widened by `buffer_minutes`.
    pub fn find_buffered_conflicts(
        &self,
        candidate: &ConflictCandidate,
        existing: &[Appointment],
        buffer_minutes: i32,
    ) -> Vec<Appointment> {
        debug!(
            "Checking conflicts for {} {} ({} min, therapist {:?}, room {:?}, buffer {})",
            candidate.date,
            candidate.time,
            candidate.duration_minutes,
            candidate.therapist_id,
            candidate.room_id,
            buffer_minutes
        );

        if candidate.duration_minutes <= 0 {
            warn!("Ignoring conflict listing with non-positive duration {}", candidate.duration_minutes);
            return Vec::new();
        }

        let buffer = i64::from(buffer_minutes.max(0));
        let candidate_start = candidate.start_minutes() - buffer;
        let candidate_end = candidate.end_minutes() + buffer;

        let conflicts: Vec<Appointment> = existing
            .iter()
            .filter(|apt| apt.date == candidate.date)
            .filter(|apt| Some(apt.id) != candidate.exclude_appointment_id)
            .filter(|apt| apt.shares_resource_with(candidate.therapist_id, candidate.room_id.as_deref()))
            .filter(|apt| overlaps(candidate_start, candidate_end, apt))
            .cloned()
            .collect();

        if !conflicts.is_empty() {
            warn!(
                "Conflict detected on {} at {} - {} conflicting appointments",
                candidate.date,
                candidate.time,
                conflicts.len()
            );
        }

        conflicts
    }
}

/// Half-open interval overlap; touching boundaries do not conflict.
fn overlaps(candidate_start: i64, candidate_end: i64, existing: &Appointment) -> bool {
    if existing.duration_minutes <= 0 {
        return false;
    }

    candidate_start < existing.end_minutes() && candidate_end > existing.start_minutes()
}
