//! Daily, weekly and monthly statistics derived from entry snapshots.
//!
//! Everything here is a pure function of the entries passed in and the
//! clock; results are recomputed on every call.

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

use crate::clock::Clock;
use crate::models::{CalendarDay, DayStats, FoodEntry, Locale, WeekdaySummary};

/// Calories at which a calendar day shows full intensity.
pub const DEFAULT_CALORIE_TARGET: u32 = 2500;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AggregateError {
    #[error("Invalid month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Totals and entries for a single local calendar day.
pub fn stats_for_date(date: NaiveDate, entries: &[FoodEntry], clock: &dyn Clock) -> DayStats {
    let matching = entries
        .iter()
        .filter(|e| clock.local_date(e.timestamp) == Some(date))
        .cloned()
        .collect();
    DayStats::from_entries(date, matching)
}

/// Same as [`stats_for_date`] for the clock's current local date.
pub fn stats_for_today(entries: &[FoodEntry], clock: &dyn Clock) -> DayStats {
    stats_for_date(clock.today(), entries, clock)
}

/// Seven daily summaries ending today, oldest first.
pub fn weekly_stats(entries: &[FoodEntry], clock: &dyn Clock, locale: Locale) -> Vec<WeekdaySummary> {
    let today = clock.today();
    (0..7)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let stats = stats_for_date(date, entries, clock);
            WeekdaySummary {
                day: locale.weekday_label(date.weekday()).to_string(),
                date,
                total_calories: stats.total_calories,
                protein: stats.total_protein,
                carbs: stats.total_carbs,
                fats: stats.total_fats,
            }
        })
        .collect()
}

/// One cell per day of `year`-`month`.
///
/// `calorie_target` scales each day's intensity; a target of zero is
/// treated as 1.
pub fn month_calendar(
    year: i32,
    month: u32,
    entries: &[FoodEntry],
    clock: &dyn Clock,
    calorie_target: u32,
) -> Result<Vec<CalendarDay>, AggregateError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(AggregateError::InvalidMonth { year, month })?;
    let today = clock.today();
    let target = calorie_target.max(1) as f64;

    let days = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| {
            let stats = stats_for_date(date, entries, clock);
            CalendarDay {
                date,
                day: date.day(),
                is_today: date == today,
                intensity: (stats.total_calories as f64 / target).min(1.0),
                stats,
            }
        })
        .collect();

    Ok(days)
}
