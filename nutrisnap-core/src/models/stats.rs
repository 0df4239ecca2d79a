use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::food_entry::FoodEntry;
use super::nutrients::MacroNutrients;

/// Totals and entries for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub date: NaiveDate,
    pub total_calories: u32,
    pub total_protein: u32,
    pub total_carbs: u32,
    pub total_fats: u32,
    /// Matching entries in store order (most recent first)
    pub entries: Vec<FoodEntry>,
}

impl DayStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self::from_entries(date, Vec::new())
    }

    pub fn from_entries(date: NaiveDate, entries: Vec<FoodEntry>) -> Self {
        let totals: MacroNutrients = entries.iter().map(|e| e.food.nutrients).sum();
        Self {
            date,
            total_calories: totals.calories,
            total_protein: totals.protein,
            total_carbs: totals.carbs,
            total_fats: totals.fats,
            entries,
        }
    }

    pub fn totals(&self) -> MacroNutrients {
        MacroNutrients::new(
            self.total_calories,
            self.total_protein,
            self.total_carbs,
            self.total_fats,
        )
    }

    pub fn has_data(&self) -> bool {
        !self.entries.is_empty()
    }
}

impl fmt::Display for DayStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.date)?;
        writeln!(f, "{}", "-".repeat(60))?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        writeln!(f, "  {}", "-".repeat(56))?;
        writeln!(f, "  Daily Total: {}", self.totals())
    }
}

/// One bar of the weekly chart: a display label plus the day's sums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdaySummary {
    /// Short localized weekday name, e.g. "seg"
    pub day: String,
    pub date: NaiveDate,
    pub total_calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

/// A cell of the month calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Day of month, starting at 1
    pub day: u32,
    pub is_today: bool,
    /// Calories relative to the daily target, clamped to `0.0..=1.0`
    pub intensity: f64,
    pub stats: DayStats,
}

impl CalendarDay {
    pub fn has_data(&self) -> bool {
        self.stats.has_data()
    }
}
