// libs/scheduling-cell/src/services/recurrence.rs
use std::collections::HashSet;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use tracing::{debug, warn};

use crate::models::{RecurrencePattern, RecurrenceType};

/// Applied when a pattern names no occurrence cap. Kept even when an end
/// date is present, so every expansion is bounded.
pub const DEFAULT_MAX_OCCURRENCES: u32 = 52;

/// Ceiling on caller-supplied caps.
pub const HARD_OCCURRENCE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, Default)]
pub struct RecurrenceService;

impl RecurrenceService {
    pub fn new() -> Self {
        Self
    }

    /// Occurrence dates of a series beginning at `start`.
    ///
    /// `start` is the first occurrence, except for weekly series whose listed
    /// weekdays leave out the start's weekday: those begin at the next listed
    /// weekday found by the usual weekly walk. Excluded dates keep their
    /// position in the series (they count towards the cap) but are not
    /// returned. Monthly series are computed from the anchor month, and a
    /// pinned day past the end of a short month is clamped to its last day.
    /// Weeks begin on Sunday.
    pub fn expand(&self, start: NaiveDate, pattern: &RecurrencePattern) -> Vec<NaiveDate> {
        debug!(
            "Expanding {:?} recurrence every {} from {} (end {:?}, cap {:?})",
            pattern.recurrence_type, pattern.frequency, start, pattern.end_date, pattern.max_occurrences
        );

        if let Err(reason) = validate_pattern(start, pattern) {
            warn!("Rejecting recurrence pattern: {}", reason);
            return Vec::new();
        }

        let cap = pattern
            .max_occurrences
            .unwrap_or(DEFAULT_MAX_OCCURRENCES)
            .min(HARD_OCCURRENCE_LIMIT);
        let excluded: HashSet<NaiveDate> = pattern.excluded_dates.iter().copied().collect();
        let weekdays = sorted_weekdays(&pattern.days_of_week);

        let mut dates = Vec::new();
        let mut position: u32 = 0;
        let mut cursor = first_occurrence(start, pattern, &weekdays);

        while let Some(date) = cursor {
            if position >= cap {
                break;
            }
            if pattern.end_date.is_some_and(|end| date > end) {
                break;
            }

            position += 1;
            if !excluded.contains(&date) {
                dates.push(date);
            }

            cursor = next_occurrence(start, date, position, pattern, &weekdays);
        }

        debug!("Expanded recurrence into {} dates ({} positions)", dates.len(), position);
        dates
    }
}

fn first_occurrence(start: NaiveDate, pattern: &RecurrencePattern, weekdays: &[u32]) -> Option<NaiveDate> {
    let listed = weekdays.contains(&start.weekday().num_days_from_sunday());

    match pattern.recurrence_type {
        RecurrenceType::Weekly if !weekdays.is_empty() && !listed => {
            next_listed_weekday(start, weekdays, pattern.frequency as u64)
        }
        _ => Some(start),
    }
}

fn validate_pattern(start: NaiveDate, pattern: &RecurrencePattern) -> Result<(), String> {
    if pattern.frequency <= 0 {
        return Err(format!("frequency must be positive, got {}", pattern.frequency));
    }
    if let Some(day) = pattern.day_of_month {
        if !(1..=31).contains(&day) {
            return Err(format!("day of month {} is out of range", day));
        }
    }
    if let Some(end) = pattern.end_date {
        if end < start {
            return Err(format!("end date {} precedes start {}", end, start));
        }
    }
    Ok(())
}

/// Listed weekdays as Sunday-based offsets, ascending and deduplicated.
fn sorted_weekdays(days: &[Weekday]) -> Vec<u32> {
    let mut offsets: Vec<u32> = days.iter().map(|d| d.num_days_from_sunday()).collect();
    offsets.sort_unstable();
    offsets.dedup();
    offsets
}

/// The occurrence following `previous`, which was number `index` in the
/// series. `None` once dates leave chrono's range.
fn next_occurrence(
    anchor: NaiveDate,
    previous: NaiveDate,
    index: u32,
    pattern: &RecurrencePattern,
    weekdays: &[u32],
) -> Option<NaiveDate> {
    let steps = u64::from(index).checked_mul(pattern.frequency as u64)?;

    match pattern.recurrence_type {
        RecurrenceType::Daily => anchor.checked_add_days(Days::new(steps)),
        RecurrenceType::Weekly if weekdays.is_empty() => {
            anchor.checked_add_days(Days::new(steps.checked_mul(7)?))
        }
        RecurrenceType::Weekly => next_listed_weekday(previous, weekdays, pattern.frequency as u64),
        RecurrenceType::Monthly => {
            let day = pattern.day_of_month.unwrap_or_else(|| anchor.day());
            month_occurrence(anchor, u32::try_from(steps).ok()?, day)
        }
    }
}

/// Next listed weekday later in the same week, otherwise the first listed
/// weekday `frequency` weeks ahead.
fn next_listed_weekday(current: NaiveDate, weekdays: &[u32], frequency: u64) -> Option<NaiveDate> {
    let today = current.weekday().num_days_from_sunday();

    if let Some(&later) = weekdays.iter().find(|&&day| day > today) {
        return current.checked_add_days(Days::new(u64::from(later - today)));
    }

    let week_start = current.checked_sub_days(Days::new(u64::from(today)))?;
    let first = u64::from(*weekdays.first()?);
    week_start.checked_add_days(Days::new(frequency.checked_mul(7)? + first))
}

fn month_occurrence(anchor: NaiveDate, months_ahead: u32, day: u32) -> Option<NaiveDate> {
    let month_start = anchor.with_day(1)?.checked_add_months(Months::new(months_ahead))?;
    let day = day.min(last_day_of_month(month_start)?);
    month_start.with_day(day)
}

fn last_day_of_month(date: NaiveDate) -> Option<u32> {
    let next_month = date.with_day(1)?.checked_add_months(Months::new(1))?;
    Some(next_month.pred_opt()?.day())
}
