mod config_cmd;
mod snap;
mod stats;
mod theme;

pub use config_cmd::ConfigCommand;
pub use snap::SnapCommand;
pub use stats::{CalendarCommand, DayCommand, RecentCommand, TodayCommand, WeekCommand};
pub use theme::ThemeCommand;

use chrono::{Local, TimeZone};
use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Local "HH:MM" of a millisecond timestamp.
pub(crate) fn format_time(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("curto", 40), "curto");
        assert_eq!(truncate("uma refeição bem equilibrada", 12), "uma refeição...");
    }

    #[test]
    fn test_format_time_shape() {
        let formatted = format_time(1_700_000_000_000);
        assert_eq!(formatted.len(), 5);
        assert_eq!(&formatted[2..3], ":");
    }
}
