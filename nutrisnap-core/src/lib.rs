//! NutriSnap Core Library
//!
//! Local meal history for a photo-based nutrition tracker: the entry store,
//! the statistics derived from it, and the capture session that turns a
//! photo into a recorded entry through an analysis gateway.

pub mod aggregate;
pub mod clock;
pub mod gateway;
pub mod models;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod store;

pub use aggregate::{
    month_calendar, stats_for_date, stats_for_today, weekly_stats, AggregateError,
    DEFAULT_CALORIE_TARGET,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use gateway::{AnalysisGateway, GatewayError, GeminiGateway};
pub use models::{
    CalendarDay, DayStats, FoodAnalysis, FoodEntry, Locale, MacroNutrients, MacroSplit, Theme,
    WeekdaySummary,
};
pub use preferences::PreferenceStore;
pub use session::{CapturedImage, SessionController, SessionError, SessionPhase};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{DecodeError, EntryStore, PersistenceError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
