// libs/scheduling-cell/src/models.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveTime, Timelike, Weekday};
use std::fmt;
use std::str::FromStr;

use shared_config::AppConfig;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

// ==============================================================================
// TIME OF DAY
// ==============================================================================

/// Wall-clock time as minutes since midnight. Crosses the API boundary as a
/// strict two-digit "HH:MM" string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: i32) -> Option<Self> {
        if (0..MINUTES_PER_DAY).contains(&minutes) {
            Some(Self(minutes as u16))
        } else {
            None
        }
    }

    pub fn parse(raw: &str) -> Result<Self, SchedulingError> {
        let invalid = || SchedulingError::InvalidTime(raw.to_string());

        if raw.len() != 5 {
            return Err(invalid());
        }

        let time = NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| invalid())?;
        Self::from_hm(time.hour(), time.minute()).ok_or_else(invalid)
    }

    pub fn minutes(self) -> i32 {
        self.0 as i32
    }

    pub fn hour(self) -> u32 {
        (self.0 / 60) as u32
    }

    pub fn minute(self) -> u32 {
        (self.0 % 60) as u32
    }

    /// `self + minutes`, or `None` when the result leaves the day.
    pub fn add_minutes(self, minutes: i32) -> Option<Self> {
        Self::from_minutes(self.minutes().checked_add(minutes)?)
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeOfDay::parse(&raw).map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub duration_minutes: i32,
    #[serde(default)]
    pub therapist_id: Option<Uuid>,
    #[serde(default)]
    pub room_id: Option<String>,
    pub status: AppointmentStatus,
    pub appointment_type: AppointmentType,
}

impl Appointment {
    pub fn start_minutes(&self) -> i64 {
        i64::from(self.time.minutes())
    }

    /// End as minutes since midnight; may run past 24:00.
    pub fn end_minutes(&self) -> i64 {
        self.start_minutes() + i64::from(self.duration_minutes)
    }

    pub fn scheduled_start(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.time.to_naive_time())
    }

    pub fn shares_resource_with(&self, therapist_id: Option<Uuid>, room_id: Option<&str>) -> bool {
        let same_therapist = matches!(
            (self.therapist_id, therapist_id),
            (Some(a), Some(b)) if a == b
        );
        let same_room = matches!(
            (self.room_id.as_deref(), room_id),
            (Some(a), Some(b)) if a == b
        );

        same_therapist || same_room
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[serde(alias = "agendado", alias = "pending")]
    Scheduled,
    #[serde(alias = "confirmado")]
    Confirmed,
    #[serde(alias = "em_andamento")]
    InProgress,
    #[serde(alias = "concluido")]
    Completed,
    #[serde(alias = "cancelado")]
    Cancelled,
    #[serde(alias = "falta")]
    NoShow,
    #[serde(alias = "remarcado")]
    Rescheduled,
}

impl AppointmentStatus {
    /// Statuses that still hold their slot on the calendar.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed | AppointmentStatus::InProgress
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
            AppointmentStatus::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum AppointmentType {
    #[serde(alias = "initial_consultation", alias = "Consulta Inicial")]
    InitialConsultation,

    #[serde(alias = "evaluation", alias = "Avaliação", alias = "Avaliação Funcional")]
    Evaluation,

    #[serde(alias = "reevaluation", alias = "Reavaliação")]
    Reevaluation,

    #[serde(alias = "physiotherapy", alias = "Fisioterapia", alias = "Sessão")]
    Physiotherapy,

    #[serde(alias = "follow_up", alias = "Retorno", alias = "Consulta de Retorno")]
    FollowUp,

    #[serde(alias = "manual_therapy", alias = "Terapia Manual")]
    ManualTherapy,

    #[serde(alias = "clinical_pilates", alias = "Pilates Clínico")]
    ClinicalPilates,

    #[serde(alias = "postural_reeducation", alias = "RPG")]
    PosturalReeducation,

    #[serde(alias = "group_session", alias = "Grupo")]
    GroupSession,

    #[serde(alias = "other", alias = "Outro")]
    Other,
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::InitialConsultation => write!(f, "InitialConsultation"),
            AppointmentType::Evaluation => write!(f, "Evaluation"),
            AppointmentType::Reevaluation => write!(f, "Reevaluation"),
            AppointmentType::Physiotherapy => write!(f, "Physiotherapy"),
            AppointmentType::FollowUp => write!(f, "FollowUp"),
            AppointmentType::ManualTherapy => write!(f, "ManualTherapy"),
            AppointmentType::ClinicalPilates => write!(f, "ClinicalPilates"),
            AppointmentType::PosturalReeducation => write!(f, "PosturalReeducation"),
            AppointmentType::GroupSession => write!(f, "GroupSession"),
            AppointmentType::Other => write!(f, "Other"),
        }
    }
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub is_available: bool,
    pub occupying_appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoredSlot {
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub score: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotPreference {
    pub preferred_date: NaiveDate,
    #[serde(default)]
    pub preferred_time: Option<TimeOfDay>,
    #[serde(default)]
    pub preferred_days: Vec<Weekday>,
}

// ==============================================================================
// CALENDAR SETTINGS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkingHours {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// Per-tenant booking policy. Read-only for the duration of a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarSettings {
    pub working_hours: WorkingHours,
    pub slot_duration_minutes: i32,
    #[serde(default)]
    pub buffer_minutes: i32,
    pub max_advance_booking_days: i32,
    #[serde(default)]
    pub allow_weekend_booking: bool,
    pub default_duration_minutes: i32,
    pub cancellation_deadline_hours: i32,
    pub reschedule_deadline_hours: i32,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours {
                start: TimeOfDay(8 * 60),
                end: TimeOfDay(18 * 60),
            },
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

impl TryFrom<&AppConfig> for CalendarSettings {
    type Error = SchedulingError;

    fn try_from(config: &AppConfig) -> Result<Self, Self::Error> {
        let calendar = &config.calendar;
        let start = TimeOfDay::parse(&calendar.working_hours_start)?;
        let end = TimeOfDay::parse(&calendar.working_hours_end)?;

        if start >= end {
            return Err(SchedulingError::InvalidSettings(format!(
                "working hours start {} must be before end {}",
                start, end
            )));
        }

        Ok(Self {
            working_hours: WorkingHours { start, end },
            slot_duration_minutes: calendar.slot_duration_minutes,
            buffer_minutes: calendar.buffer_minutes,
            max_advance_booking_days: calendar.max_advance_booking_days,
            allow_weekend_booking: calendar.allow_weekend_booking,
            default_duration_minutes: calendar.default_duration_minutes,
            cancellation_deadline_hours: calendar.cancellation_deadline_hours,
            reschedule_deadline_hours: calendar.reschedule_deadline_hours,
        })
    }
}

// ==============================================================================
// RECURRENCE MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrencePattern {
    pub recurrence_type: RecurrenceType,
    pub frequency: i32,
    #[serde(default)]
    pub days_of_week: Vec<Weekday>,
    #[serde(default)]
    pub day_of_month: Option<u32>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_occurrences: Option<u32>,
    #[serde(default)]
    pub excluded_dates: Vec<NaiveDate>,
}

impl RecurrencePattern {
    pub fn new(recurrence_type: RecurrenceType, frequency: i32) -> Self {
        Self {
            recurrence_type,
            frequency,
            days_of_week: Vec::new(),
            day_of_month: None,
            end_date: None,
            max_occurrences: None,
            excluded_dates: Vec::new(),
        }
    }
}

// ==============================================================================
// CONFLICT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictCandidate {
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub duration_minutes: i32,
    #[serde(default)]
    pub therapist_id: Option<Uuid>,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub exclude_appointment_id: Option<Uuid>,
}

impl ConflictCandidate {
    pub fn start_minutes(&self) -> i64 {
        i64::from(self.time.minutes())
    }

    pub fn end_minutes(&self) -> i64 {
        self.start_minutes() + i64::from(self.duration_minutes)
    }
}

// ==============================================================================
// VALIDATION MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingRuleViolation {
    #[error("Appointment date {0} is in the past")]
    PastDate(NaiveDate),

    #[error("Appointment date {date} is more than {max_days} days in advance")]
    BeyondAdvanceWindow { date: NaiveDate, max_days: i32 },

    #[error("Weekend bookings are not allowed ({0})")]
    WeekendNotAllowed(Weekday),

    #[error("Appointment starts at {start}, before opening time {opens}")]
    BeforeOpening { start: TimeOfDay, opens: TimeOfDay },

    #[error("Appointment ends after closing time {closes}")]
    AfterClosing { closes: TimeOfDay },

    #[error("Appointment duration of {duration} minutes must be between {min} and {max} minutes")]
    InvalidDuration { duration: i32, min: i32, max: i32 },

    #[error("Invalid appointment time: {0}")]
    MalformedTime(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    #[serde(skip)]
    pub violations: Vec<BookingRuleViolation>,
}

impl ValidationResult {
    pub fn from_violations(violations: Vec<BookingRuleViolation>) -> Self {
        Self {
            is_valid: violations.is_empty(),
            errors: violations.iter().map(ToString::to_string).collect(),
            violations,
        }
    }
}

// ==============================================================================
// STATISTICS MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentStats {
    pub total: usize,
    pub by_status: std::collections::BTreeMap<AppointmentStatus, usize>,
    pub by_type: std::collections::BTreeMap<AppointmentType, usize>,
    pub total_duration_minutes: i64,
    pub average_duration_minutes: i64,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================
//
// Every request carries its full input. `settings` falls back to the tenant
// calendar, `today`/`now` to the server clock.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub settings: Option<CalendarSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub settings: Option<CalendarSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub candidate: ConflictCandidate,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub buffer_minutes: Option<i32>,
    #[serde(default)]
    pub settings: Option<CalendarSettings>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckResponse {
    /// Overlap with a booking that shares the therapist or the room.
    pub has_conflict: bool,
    /// Overlap with any booking that day, whatever its resources.
    pub overlaps_any: bool,
    pub conflicting_appointments: Vec<Appointment>,
    pub suggested_alternatives: Vec<ScoredSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRequest {
    pub start_date: NaiveDate,
    pub pattern: RecurrencePattern,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceResponse {
    pub count: usize,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestSlotRequest {
    pub preference: SlotPreference,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub settings: Option<CalendarSettings>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateBookingRequest {
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub settings: Option<CalendarSettings>,
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsRequest {
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleCheckRequest {
    pub appointment: Appointment,
    #[serde(default)]
    pub now: Option<chrono::NaiveDateTime>,
    #[serde(default)]
    pub settings: Option<CalendarSettings>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulingError {
    #[error("Invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("Invalid calendar settings: {0}")]
    InvalidSettings(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("{action} deadline passed: requires {required_hours}h notice, {remaining_minutes} minutes remain")]
    DeadlinePassed {
        action: &'static str,
        required_hours: i32,
        remaining_minutes: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_of_day_parse_and_format() {
        let time = TimeOfDay::parse("09:05").unwrap();
        assert_eq!(time.minutes(), 9 * 60 + 5);
        assert_eq!(time.to_string(), "09:05");

        assert!(TimeOfDay::parse("9:05").is_err());
        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("12:60").is_err());
        assert!(TimeOfDay::parse("noon!").is_err());
        assert_eq!(
            TimeOfDay::parse("ab:cd"),
            Err(SchedulingError::InvalidTime("ab:cd".to_string()))
        );
    }

    #[test]
    fn test_time_of_day_arithmetic() {
        let time = TimeOfDay::from_hm(23, 30).unwrap();
        assert_eq!(time.add_minutes(29), TimeOfDay::from_hm(23, 59));
        assert_eq!(time.add_minutes(30), None);
        assert_eq!(time.add_minutes(-30), TimeOfDay::from_hm(23, 0));
    }

    #[test]
    fn test_appointment_deserializes_clinic_labels() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "date": "2024-01-15",
            "time": "14:30",
            "duration_minutes": 45,
            "room_id": "Sala 2",
            "status": "agendado",
            "appointment_type": "Fisioterapia"
        }))
        .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.appointment_type, AppointmentType::Physiotherapy);
        assert_eq!(appointment.therapist_id, None);
        assert_eq!(appointment.end_minutes(), 15 * 60 + 15);
    }

    #[test]
    fn test_appointment_rejects_malformed_time() {
        let result: Result<Appointment, _> = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "date": "2024-01-15",
            "time": "2pm",
            "duration_minutes": 45,
            "status": "scheduled",
            "appointment_type": "Evaluation"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_active_statuses() {
        assert!(AppointmentStatus::Scheduled.is_active());
        assert!(AppointmentStatus::InProgress.is_active());
        assert!(!AppointmentStatus::Cancelled.is_active());
        assert!(!AppointmentStatus::NoShow.is_active());
        assert!(!AppointmentStatus::Rescheduled.is_active());
    }

    #[test]
    fn test_settings_from_config() {
        let config = AppConfig::default();
        let settings = CalendarSettings::try_from(&config).unwrap();
        assert_eq!(settings, CalendarSettings::default());

        let mut inverted = AppConfig::default();
        inverted.calendar.working_hours_start = "19:00".to_string();
        assert!(matches!(
            CalendarSettings::try_from(&inverted),
            Err(SchedulingError::InvalidSettings(_))
        ));

        let mut garbage = AppConfig::default();
        garbage.calendar.working_hours_end = "late".to_string();
        assert_eq!(
            CalendarSettings::try_from(&garbage),
            Err(SchedulingError::InvalidTime("late".to_string()))
        );
    }

    #[test]
    fn test_validation_result_from_violations() {
        let result = ValidationResult::from_violations(vec![BookingRuleViolation::AfterClosing {
            closes: TimeOfDay::from_hm(18, 0).unwrap(),
        }]);

        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Appointment ends after closing time 18:00".to_string()]);
    }
}
