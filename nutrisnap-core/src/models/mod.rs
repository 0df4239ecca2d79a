mod food_analysis;
mod food_entry;
mod nutrients;
mod preferences;
mod stats;

pub use food_analysis::FoodAnalysis;
pub use food_entry::FoodEntry;
pub use nutrients::{MacroNutrients, MacroSplit};
pub use preferences::{Locale, Theme};
pub use stats::{CalendarDay, DayStats, WeekdaySummary};
