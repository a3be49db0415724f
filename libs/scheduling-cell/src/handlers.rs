// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::debug;

use shared_models::error::AppError;

use crate::models::{
    Appointment, AvailabilityRequest, BestSlotRequest, ConflictCheckRequest, ConflictCheckResponse,
    LifecycleCheckRequest, RecurrenceRequest, RecurrenceResponse, SchedulingError, SlotsRequest,
    StatsRequest, ValidateBookingRequest,
};
use crate::router::SchedulingState;
use crate::services::{
    AppointmentLifecycleService, AppointmentStatsService, AvailabilityService, BookingRulesService,
    ConflictDetectionService, RecurrenceService, SlotGenerator, SlotRecommendationService,
};

/// Alternatives offered alongside a detected conflict.
const SUGGESTION_LIMIT: usize = 3;

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::InvalidTime(_) => AppError::ValidationError(err.to_string()),
            SchedulingError::InvalidSettings(_) => AppError::Configuration(err.to_string()),
            SchedulingError::InvalidStatusTransition(_) | SchedulingError::DeadlinePassed { .. } => {
                AppError::Conflict(err.to_string())
            }
        }
    }
}

/// Only bookings that still hold their slot take part in availability.
fn active_only(appointments: Vec<Appointment>) -> Vec<Appointment> {
    appointments.into_iter().filter(|apt| apt.status.is_active()).collect()
}

// ==============================================================================
// SLOT HANDLERS
// ==============================================================================

pub async fn generate_slots(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<SlotsRequest>,
) -> Result<Json<Value>, AppError> {
    let settings = state.settings_or_default(request.settings);
    let slots = SlotGenerator::new(settings).generate(request.date);

    Ok(Json(json!({
        "date": request.date,
        "total": slots.len(),
        "slots": slots,
    })))
}

pub async fn calculate_availability(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let settings = state.settings_or_default(request.settings);
    let duration = request.duration_minutes.unwrap_or(settings.default_duration_minutes);
    let appointments = active_only(request.appointments);

    let slots = AvailabilityService::new(settings).calculate(request.date, &appointments, duration);
    let available = slots.iter().filter(|slot| slot.is_available).count();

    Ok(Json(json!({
        "date": request.date,
        "duration_minutes": duration,
        "available": available,
        "slots": slots,
    })))
}

pub async fn find_best_slot(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<BestSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let settings = state.settings_or_default(request.settings);
    let duration = request.duration_minutes.unwrap_or(settings.default_duration_minutes);
    let today = request.today.unwrap_or_else(|| state.clock.today());
    let appointments = active_only(request.appointments);

    let best = SlotRecommendationService::new(settings).find_best_slot(
        &request.preference,
        duration,
        &appointments,
        today,
    );

    Ok(Json(json!({
        "found": best.is_some(),
        "slot": best,
    })))
}

// ==============================================================================
// CONFLICT HANDLERS
// ==============================================================================

pub async fn check_conflicts(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictCheckResponse>, AppError> {
    let settings = state.settings_or_default(request.settings);
    let today = request.today.unwrap_or_else(|| state.clock.today());
    let candidate = request.candidate;
    let appointments = active_only(request.appointments);
    let conflict_service = ConflictDetectionService::new();

    let buffer = request.buffer_minutes.unwrap_or(settings.buffer_minutes).max(0);
    let conflicting_appointments = conflict_service.find_buffered_conflicts(&candidate, &appointments, buffer);

    let overlaps_any = conflict_service.has_conflict(
        candidate.date,
        candidate.time,
        candidate.duration_minutes,
        &appointments,
        candidate.exclude_appointment_id,
    );
    let has_conflict = !conflicting_appointments.is_empty();

    let suggested_alternatives = if has_conflict {
        // Alternatives only need to be free for the candidate's own resources.
        let has_resources = candidate.therapist_id.is_some() || candidate.room_id.is_some();
        let blocking: Vec<Appointment> = appointments
            .into_iter()
            .filter(|apt| Some(apt.id) != candidate.exclude_appointment_id)
            .filter(|apt| !has_resources || apt.shares_resource_with(candidate.therapist_id, candidate.room_id.as_deref()))
            .collect();

        SlotRecommendationService::new(settings).suggest_alternatives(
            candidate.date,
            candidate.time,
            candidate.duration_minutes,
            &blocking,
            today,
            SUGGESTION_LIMIT,
        )
    } else {
        Vec::new()
    };

    debug!(
        "Conflict check on {} {}: resource conflict {}, any overlap {}",
        candidate.date, candidate.time, has_conflict, overlaps_any
    );

    Ok(Json(ConflictCheckResponse {
        has_conflict,
        overlaps_any,
        conflicting_appointments,
        suggested_alternatives,
    }))
}

// ==============================================================================
// RECURRENCE, VALIDATION AND REPORTING HANDLERS
// ==============================================================================

pub async fn expand_recurrence(
    Json(request): Json<RecurrenceRequest>,
) -> Result<Json<RecurrenceResponse>, AppError> {
    let dates = RecurrenceService::new().expand(request.start_date, &request.pattern);

    Ok(Json(RecurrenceResponse {
        count: dates.len(),
        dates,
    }))
}

pub async fn validate_booking(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ValidateBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let settings = state.settings_or_default(request.settings);
    let duration = request.duration_minutes.unwrap_or(settings.default_duration_minutes);
    let today = request.today.unwrap_or_else(|| state.clock.today());

    let result = BookingRulesService::new(settings).validate_raw(request.date, &request.time, duration, today);

    Ok(Json(json!({
        "is_valid": result.is_valid,
        "errors": result.errors,
    })))
}

pub async fn appointment_stats(
    Json(request): Json<StatsRequest>,
) -> Result<Json<Value>, AppError> {
    if request.from > request.to {
        return Err(AppError::BadRequest(format!(
            "Range start {} is after range end {}",
            request.from, request.to
        )));
    }

    let stats = AppointmentStatsService::new().summarize(&request.appointments, request.from, request.to);

    Ok(Json(json!({
        "from": request.from,
        "to": request.to,
        "stats": stats,
    })))
}

// ==============================================================================
// LIFECYCLE HANDLERS
// ==============================================================================

pub async fn check_cancellation(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<LifecycleCheckRequest>,
) -> Result<Json<Value>, AppError> {
    let settings = state.settings_or_default(request.settings);
    let now = request.now.unwrap_or_else(|| state.clock.now());

    AppointmentLifecycleService::new(settings).check_cancellation(&request.appointment, now)?;

    Ok(Json(json!({
        "allowed": true,
        "appointment_id": request.appointment.id,
    })))
}

pub async fn check_reschedule(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<LifecycleCheckRequest>,
) -> Result<Json<Value>, AppError> {
    let settings = state.settings_or_default(request.settings);
    let now = request.now.unwrap_or_else(|| state.clock.now());

    AppointmentLifecycleService::new(settings).check_reschedule(&request.appointment, now)?;

    Ok(Json(json!({
        "allowed": true,
        "appointment_id": request.appointment.id,
    })))
}
