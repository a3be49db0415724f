pub mod slots;
pub mod availability;
pub mod conflict;
pub mod recurrence;
pub mod scoring;
pub mod constraints;
pub mod statistics;
pub mod lifecycle;

pub use slots::SlotGenerator;
pub use availability::AvailabilityService;
pub use conflict::ConflictDetectionService;
pub use recurrence::RecurrenceService;
pub use scoring::SlotRecommendationService;
pub use constraints::BookingRulesService;
pub use statistics::AppointmentStatsService;
pub use lifecycle::AppointmentLifecycleService;
