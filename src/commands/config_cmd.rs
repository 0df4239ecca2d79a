use clap::{Args, Subcommand};
use std::path::Path;

use super::OutputFormat;
use crate::config::{mask_key, Config};

const CONFIG_TEMPLATE: &str = "\
# nutrisnap configuration
#
# Environment variables (NUTRISNAP_*) take precedence over these values.

# Directory for the meal history and preferences
# data_dir: ~/.local/share/nutrisnap

# Gemini API key (or set NUTRISNAP_API_KEY / GEMINI_API_KEY)
# api_key: your-key-here

# model: gemini-3-flash-preview

# Weekday labels: pt-BR or en-US
locale: pt-BR

# Calories that fill a calendar day
daily_calorie_target: 2500
";

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<&Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => print_config(config),
                }
                Ok(())
            }
            ConfigSubcommand::Init { force } => {
                let path = config_path
                    .map(Path::to_path_buf)
                    .unwrap_or_else(Config::default_config_path);
                write_template(&path, *force)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        }
    }
}

fn print_config(config: &Config) {
    println!("Configuration");
    println!("=============\n");

    if let Some(path) = &config.config_file {
        println!("Config file: {}", path.display());
    } else {
        println!(
            "Config file: {} (not found)",
            Config::default_config_path().display()
        );
    }
    println!();

    println!("data_dir: {}", config.data_dir.value.display());
    println!("  source: {}", config.data_dir.source);
    println!();

    println!("api_key: {}", mask_key(&config.api_key.value));
    println!("  source: {}", config.api_key.source);
    println!();

    println!("model: {}", config.model.value);
    println!("  source: {}", config.model.source);
    println!();

    println!("locale: {}", config.locale.value);
    println!("  source: {}", config.locale.source);
    println!();

    println!("daily_calorie_target: {}", config.daily_calorie_target.value);
    println!("  source: {}", config.daily_calorie_target.source);
}

fn write_template(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    std::fs::write(path, CONFIG_TEMPLATE)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}
