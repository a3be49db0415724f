// libs/scheduling-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::post,
};

use shared_config::AppConfig;
use shared_utils::clock::Clock;

use crate::handlers;
use crate::models::{CalendarSettings, SchedulingError};

/// Read-only state shared by every scheduling request.
pub struct SchedulingState {
    pub settings: CalendarSettings,
    pub clock: Arc<dyn Clock>,
}

impl SchedulingState {
    pub fn new(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, SchedulingError> {
        let settings = CalendarSettings::try_from(config)?;
        Ok(Self { settings, clock })
    }

    /// Request-supplied settings win over the tenant defaults.
    pub fn settings_or_default(&self, requested: Option<CalendarSettings>) -> CalendarSettings {
        requested.unwrap_or_else(|| self.settings.clone())
    }
}

pub fn scheduling_routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/slots", post(handlers::generate_slots))
        .route("/slots/best", post(handlers::find_best_slot))
        .route("/availability", post(handlers::calculate_availability))
        .route("/conflicts/check", post(handlers::check_conflicts))
        .route("/recurrence/expand", post(handlers::expand_recurrence))
        .route("/validate", post(handlers::validate_booking))
        .route("/stats", post(handlers::appointment_stats))
        .route("/lifecycle/cancel-check", post(handlers::check_cancellation))
        .route("/lifecycle/reschedule-check", post(handlers::check_reschedule))
        .with_state(state)
}
