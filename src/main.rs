use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod context;

use commands::{
    CalendarCommand, ConfigCommand, DayCommand, RecentCommand, SnapCommand, ThemeCommand,
    TodayCommand, WeekCommand,
};
use config::Config;
use context::AppContext;

#[derive(Parser)]
#[command(name = "nutrisnap")]
#[command(version)]
#[command(about = "Photograph a meal, get its macros, track your day", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a meal photo and record it
    Snap(SnapCommand),

    /// Today's totals and meals
    Today(TodayCommand),

    /// Calories and macros for the last seven days
    Week(WeekCommand),

    /// Totals and meals for one date
    Day(DayCommand),

    /// Month calendar of recorded days
    Calendar(CalendarCommand),

    /// Most recent meals
    Recent(RecentCommand),

    /// Manage the display theme
    Theme(ThemeCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutrisnap=warn,nutrisnap_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;

    match cli.command {
        Some(Commands::Snap(cmd)) => cmd.run(&AppContext::open(config)).await?,
        Some(Commands::Today(cmd)) => cmd.run(&AppContext::open(config))?,
        Some(Commands::Week(cmd)) => cmd.run(&AppContext::open(config))?,
        Some(Commands::Day(cmd)) => cmd.run(&AppContext::open(config))?,
        Some(Commands::Calendar(cmd)) => cmd.run(&AppContext::open(config))?,
        Some(Commands::Recent(cmd)) => cmd.run(&AppContext::open(config))?,
        Some(Commands::Theme(cmd)) => cmd.run(&AppContext::open(config))?,
        Some(Commands::Config(cmd)) => cmd.run(&config, cli.config.as_deref())?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
