// libs/scheduling-cell/src/services/scoring.rs
use chrono::{Datelike, Days, NaiveDate};
use tracing::{debug, info};

use crate::models::{Appointment, CalendarSettings, ScoredSlot, SlotPreference, TimeOfDay};
use crate::services::availability::AvailabilityService;
use crate::services::constraints::BookingRulesService;

/// How far past the preferred date weekday matches are searched.
pub const DAY_OF_WEEK_LOOKAHEAD_DAYS: u64 = 14;

pub const SCORE_EXACT_DATE_AND_TIME: u8 = 100;
pub const SCORE_EXACT_DATE: u8 = 80;
pub const SCORE_PREFERRED_DAY_AND_TIME: u8 = 70;
pub const SCORE_PREFERRED_DAY: u8 = 60;

pub struct SlotRecommendationService {
    availability_service: AvailabilityService,
    rules_service: BookingRulesService,
}

impl SlotRecommendationService {
    pub fn new(settings: CalendarSettings) -> Self {
        Self {
            availability_service: AvailabilityService::new(settings.clone()),
            rules_service: BookingRulesService::new(settings),
        }
    }

    /// Every free, policy-valid candidate scored against the preference,
    /// best first. Equal scores keep chronological order: earlier date, then
    /// earlier time.
    pub fn rank_slots(
        &self,
        preference: &SlotPreference,
        duration_minutes: i32,
        appointments: &[Appointment],
        today: NaiveDate,
    ) -> Vec<ScoredSlot> {
        debug!(
            "Ranking slots around {} (time {:?}, days {:?})",
            preference.preferred_date, preference.preferred_time, preference.preferred_days
        );

        let mut candidates = self.score_day(
            preference.preferred_date,
            preference.preferred_time,
            duration_minutes,
            appointments,
            today,
            (SCORE_EXACT_DATE_AND_TIME, SCORE_EXACT_DATE),
        );

        if !preference.preferred_days.is_empty() {
            for offset in 1..=DAY_OF_WEEK_LOOKAHEAD_DAYS {
                let Some(date) = preference.preferred_date.checked_add_days(Days::new(offset)) else {
                    break;
                };
                if !preference.preferred_days.contains(&date.weekday()) {
                    continue;
                }

                candidates.extend(self.score_day(
                    date,
                    preference.preferred_time,
                    duration_minutes,
                    appointments,
                    today,
                    (SCORE_PREFERRED_DAY_AND_TIME, SCORE_PREFERRED_DAY),
                ));
            }
        }

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.date.cmp(&b.date))
                .then_with(|| a.time.cmp(&b.time))
        });

        candidates
    }

    /// The single highest-scoring candidate, if any slot qualifies.
    pub fn find_best_slot(
        &self,
        preference: &SlotPreference,
        duration_minutes: i32,
        appointments: &[Appointment],
        today: NaiveDate,
    ) -> Option<ScoredSlot> {
        let best = self
            .rank_slots(preference, duration_minutes, appointments, today)
            .into_iter()
            .next();

        match &best {
            Some(slot) => info!("Best slot {} {} scored {}", slot.date, slot.time, slot.score),
            None => info!("No slot available around {}", preference.preferred_date),
        }

        best
    }

    /// Up to `limit` bookable alternatives to a requested slot: the rest of
    /// the same day first, then the following days in the look-ahead window.
    pub fn suggest_alternatives(
        &self,
        date: NaiveDate,
        time: TimeOfDay,
        duration_minutes: i32,
        appointments: &[Appointment],
        today: NaiveDate,
        limit: usize,
    ) -> Vec<ScoredSlot> {
        let mut suggestions = Vec::new();

        for offset in 0..=DAY_OF_WEEK_LOOKAHEAD_DAYS {
            if suggestions.len() >= limit {
                break;
            }
            let Some(day) = date.checked_add_days(Days::new(offset)) else {
                break;
            };

            let remaining = limit - suggestions.len();
            let score = if offset == 0 { SCORE_EXACT_DATE } else { SCORE_PREFERRED_DAY };
            let free = self
                .bookable_starts(day, duration_minutes, appointments, today)
                .into_iter()
                .filter(|start| offset > 0 || *start != time)
                .map(|start| ScoredSlot { date: day, time: start, score });

            suggestions.extend(free.take(remaining));
        }

        debug!("Suggested {} alternatives to {} {}", suggestions.len(), date, time);
        suggestions
    }

    fn score_day(
        &self,
        date: NaiveDate,
        preferred_time: Option<TimeOfDay>,
        duration_minutes: i32,
        appointments: &[Appointment],
        today: NaiveDate,
        (exact_score, other_score): (u8, u8),
    ) -> Vec<ScoredSlot> {
        self.bookable_starts(date, duration_minutes, appointments, today)
            .into_iter()
            .map(|start| ScoredSlot {
                date,
                time: start,
                score: if preferred_time == Some(start) { exact_score } else { other_score },
            })
            .collect()
    }

    fn bookable_starts(
        &self,
        date: NaiveDate,
        duration_minutes: i32,
        appointments: &[Appointment],
        today: NaiveDate,
    ) -> Vec<TimeOfDay> {
        self.availability_service
            .calculate(date, appointments, duration_minutes)
            .into_iter()
            .filter(|slot| slot.is_available)
            .map(|slot| slot.start_time)
            .filter(|start| self.rules_service.is_bookable(date, *start, duration_minutes, today))
            .collect()
    }
}
