use chrono::{Datelike, NaiveDate};
use clap::Args;
use nutrisnap_core::{
    month_calendar, stats_for_date, stats_for_today, weekly_stats, CalendarDay, DayStats,
    FoodEntry, Locale, WeekdaySummary,
};

use super::{format_time, truncate, OutputFormat};
use crate::context::AppContext;

const BAR_WIDTH: u32 = 30;

/// Show today's totals and meals
#[derive(Args)]
pub struct TodayCommand {
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl TodayCommand {
    pub fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let stats = stats_for_today(&ctx.entries.snapshot(), ctx.clock.as_ref());
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            OutputFormat::Text => print_day_summary("Today", &stats),
        }
        Ok(())
    }
}

/// Show the last seven days
#[derive(Args)]
pub struct WeekCommand {
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl WeekCommand {
    pub fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let week = weekly_stats(
            &ctx.entries.snapshot(),
            ctx.clock.as_ref(),
            ctx.config.locale.value,
        );
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&week)?),
            OutputFormat::Text => print_week(&week),
        }
        Ok(())
    }
}

/// Show totals and meals for one date
#[derive(Args)]
pub struct DayCommand {
    /// Date (YYYY-MM-DD)
    pub date: String,

    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl DayCommand {
    pub fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let date = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", self.date))?;
        let stats = stats_for_date(date, &ctx.entries.snapshot(), ctx.clock.as_ref());
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            OutputFormat::Text => {
                if stats.has_data() {
                    print!("{}", stats);
                } else {
                    println!("No meals recorded on {}", date);
                }
            }
        }
        Ok(())
    }
}

/// Show a month calendar of recorded days
#[derive(Args)]
pub struct CalendarCommand {
    /// Month (YYYY-MM), defaults to the current month
    #[arg(long, short)]
    pub month: Option<String>,

    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl CalendarCommand {
    pub fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let (year, month) = match &self.month {
            Some(m) => parse_month(m)?,
            None => {
                let today = ctx.clock.today();
                (today.year(), today.month())
            }
        };
        let days = month_calendar(
            year,
            month,
            &ctx.entries.snapshot(),
            ctx.clock.as_ref(),
            ctx.config.daily_calorie_target.value,
        )?;
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&days)?),
            OutputFormat::Text => {
                print!("{}", render_calendar(year, month, &days, ctx.config.locale.value))
            }
        }
        Ok(())
    }
}

/// Show the most recent meals
#[derive(Args)]
pub struct RecentCommand {
    /// Number of meals to show
    #[arg(long, short, default_value = "5")]
    pub limit: usize,

    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl RecentCommand {
    pub fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let recent = ctx.entries.recent(self.limit);
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recent)?),
            OutputFormat::Text => {
                if recent.is_empty() {
                    println!("No meals recorded yet. Use 'nutrisnap snap <photo>' to add one.");
                }
                for entry in &recent {
                    print_entry_line(entry);
                }
            }
        }
        Ok(())
    }
}

fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("Invalid month '{}'. Use YYYY-MM.", raw);
    let (y, m) = raw.split_once('-').ok_or_else(invalid)?;
    let year = y.parse::<i32>().map_err(|_| invalid())?;
    let month = m.parse::<u32>().map_err(|_| invalid())?;
    Ok((year, month))
}

fn print_day_summary(title: &str, stats: &DayStats) {
    println!("{} ({})", title, stats.date);
    println!("{}", "=".repeat(30));
    println!("{} kcal", stats.total_calories);
    println!(
        "Protein: {}g | Carbs: {}g | Fats: {}g",
        stats.total_protein, stats.total_carbs, stats.total_fats
    );
    if let Some(split) = stats.totals().split() {
        println!("Macro split: {}", split);
    }

    if stats.has_data() {
        println!("\nMeals:");
        for entry in &stats.entries {
            print_entry_line(entry);
        }
    } else {
        println!("\nNo meals recorded yet.");
    }
}

fn print_entry_line(entry: &FoodEntry) {
    println!(
        "  {}  {:<24} {:>5} kcal  {}",
        format_time(entry.timestamp),
        truncate(entry.name(), 24),
        entry.nutrients().calories,
        truncate(&entry.food.analysis, 40)
    );
}

fn print_week(week: &[WeekdaySummary]) {
    let max = week.iter().map(|d| d.total_calories).max().unwrap_or(0);
    for day in week {
        println!(
            "{:<4} {}  {:>5} kcal  P {:>3}g  C {:>3}g  F {:>3}g  {}",
            day.day,
            day.date,
            day.total_calories,
            day.protein,
            day.carbs,
            day.fats,
            bar(day.total_calories, max)
        );
    }
}

fn bar(value: u32, max: u32) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (value as u64 * BAR_WIDTH as u64 / max as u64) as usize;
    "#".repeat(width)
}

/// Calendar grid starting on Sunday; `*` marks recorded days, `[]` today.
fn render_calendar(year: i32, month: u32, days: &[CalendarDay], locale: Locale) -> String {
    let headers: [&str; 7] = match locale {
        Locale::PtBr => ["D", "S", "T", "Q", "Q", "S", "S"],
        Locale::EnUs => ["S", "M", "T", "W", "T", "F", "S"],
    };

    let mut out = format!("{}-{:02}\n", year, month);
    for h in headers {
        out.push_str(&format!("{:^5}", h));
    }
    out.push('\n');

    let lead = days
        .first()
        .map(|d| d.date.weekday().num_days_from_sunday() as usize)
        .unwrap_or(0);
    let mut column = 0;
    for _ in 0..lead {
        out.push_str("     ");
        column += 1;
    }

    for day in days {
        let marker = if day.has_data() { "*" } else { " " };
        let cell = if day.is_today {
            format!("[{:>2}{}]", day.day, marker)
        } else {
            format!(" {:>2}{} ", day.day, marker)
        };
        out.push_str(&cell);
        column += 1;
        if column % 7 == 0 {
            out.push('\n');
        }
    }
    if column % 7 != 0 {
        out.push('\n');
    }

    let recorded: Vec<&CalendarDay> = days.iter().filter(|d| d.has_data()).collect();
    if !recorded.is_empty() {
        out.push('\n');
        for day in recorded {
            out.push_str(&format!(
                "{}  {:>5} kcal  {:>3.0}%\n",
                day.date,
                day.stats.total_calories,
                day.intensity * 100.0
            ));
        }
    }
    out
}
