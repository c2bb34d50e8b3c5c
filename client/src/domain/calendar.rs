//! Calendar domain logic for the journal history view.
//!
//! This module contains the month arithmetic, the aggregation of journal
//! entries into calendar days and the construction of the display grid.
//! Renderers only lay out what is computed here.
//!
//! The grid shows at most one entry per day. When several entries share a
//! day the last one in input order wins; this is a presentation policy and
//! nothing below the domain layer relies on it.

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use shared::{CalendarDay, CalendarMonth, CalendarSlot, EntrySummary, NavigationDirection};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Day-of-month → entry shown on that day
pub type EntriesByDay = BTreeMap<u32, EntrySummary>;

/// Column headers, Sunday first to match `first_day_of_month`
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Get the number of days in a given month and year
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 => if is_leap_year(year) { 29 } else { 28 },
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Weekday of day 1 (0 = Sunday, 1 = Monday, etc.)
pub fn first_day_of_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// Get the human-readable name for a month number
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "Invalid Month",
    }
}

/// Buckets entries by day for the month of `reference`, reading
/// `created_at` in the process-local time zone.
pub fn aggregate_entries(entries: &[EntrySummary], reference: NaiveDate) -> EntriesByDay {
    aggregate_entries_in(entries, reference, &Local)
}

/// Same as [`aggregate_entries`] with an explicit time zone.
pub fn aggregate_entries_in<Tz: TimeZone>(
    entries: &[EntrySummary],
    reference: NaiveDate,
    tz: &Tz,
) -> EntriesByDay {
    let mut entries_by_day = EntriesByDay::new();

    for entry in entries {
        let local = entry.created_at.with_timezone(tz);
        if local.year() != reference.year() || local.month() != reference.month() {
            continue;
        }
        if let Some(previous) = entries_by_day.insert(local.day(), entry.clone()) {
            debug!(
                day = local.day(),
                replaced = previous.id,
                shown = entry.id,
                "several entries on one day, showing the later one"
            );
        }
    }

    entries_by_day
}

/// Leading `None` padding up to the first weekday, then one slot per day.
pub fn build_grid(reference: NaiveDate, entries_by_day: &EntriesByDay) -> Vec<CalendarSlot> {
    let days = days_in_month(reference.year(), reference.month());
    let first_day = first_day_of_month(reference.year(), reference.month());

    let mut slots: Vec<CalendarSlot> = Vec::with_capacity((first_day + days) as usize);
    slots.extend((0..first_day).map(|_| None));
    slots.extend((1..=days).map(|day| {
        Some(CalendarDay {
            day,
            entry: entries_by_day.get(&day).cloned(),
        })
    }));

    slots
}

/// Aggregates and lays out one month in a single call.
pub fn generate_calendar_month(reference: NaiveDate, entries_by_day: &EntriesByDay) -> CalendarMonth {
    CalendarMonth {
        month: reference.month(),
        year: reference.year(),
        days_in_month: days_in_month(reference.year(), reference.month()),
        first_day_of_week: first_day_of_month(reference.year(), reference.month()),
        slots: build_grid(reference, entries_by_day),
    }
}

/// Splits a grid into 7-column rows; the last row may be short.
pub fn rows(slots: &[CalendarSlot]) -> Vec<&[CalendarSlot]> {
    slots.chunks(7).collect()
}

/// Moves one month back or forward, keeping the day of month.
///
/// A day that does not exist in the target month rolls over into the
/// following month (Jan 31 → Mar 3 in a common year) rather than being
/// clamped to the month end.
pub fn advance_month(current: NaiveDate, direction: NavigationDirection) -> NaiveDate {
    let months = current.year() * 12 + current.month0() as i32 + direction.month_delta();
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;

    let advanced = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_days(chrono::Days::new(u64::from(current.day() - 1))));

    match advanced {
        Some(date) => date,
        None => {
            warn!(%current, ?direction, "month navigation outside the supported date range");
            current
        }
    }
}
