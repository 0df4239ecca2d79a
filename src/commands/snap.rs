use clap::Args;
use nutrisnap_core::{CapturedImage, FoodEntry, SessionController, SessionError};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::OutputFormat;
use crate::context::AppContext;

#[derive(Args)]
pub struct SnapCommand {
    /// Path to the meal photo
    pub image: PathBuf,

    /// Image mime type (inferred from the file extension by default)
    #[arg(long)]
    pub mime: Option<String>,

    /// Save without asking for confirmation
    #[arg(long, short)]
    pub yes: bool,

    /// Output format for the analysis
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl SnapCommand {
    pub async fn run(&self, ctx: &AppContext) -> Result<(), Box<dyn std::error::Error>> {
        let mime_type = match &self.mime {
            Some(m) => m.clone(),
            None => mime_from_path(&self.image)
                .ok_or_else(|| {
                    format!(
                        "Cannot infer image type for '{}'. Use --mime.",
                        self.image.display()
                    )
                })?
                .to_string(),
        };
        let bytes = std::fs::read(&self.image)
            .map_err(|e| format!("Failed to read '{}': {}", self.image.display(), e))?;

        let session = SessionController::new(
            ctx.gateway(),
            Arc::clone(&ctx.entries),
            Arc::clone(&ctx.clock),
        );

        eprintln!("Analyzing {}...", self.image.display());
        let entry = session.capture(CapturedImage::new(bytes, mime_type)).await?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry.food)?),
            OutputFormat::Text => print_review(&entry),
        }

        if !(self.yes || confirm_prompt("Save this meal?")?) {
            session.cancel();
            println!("Discarded.");
            return Ok(());
        }

        match session.confirm() {
            Ok(saved) => {
                println!("Saved '{}' ({} kcal).", saved.name(), saved.nutrients().calories);
                Ok(())
            }
            Err(SessionError::Persistence(e)) => {
                tracing::warn!("Failed to persist entry: {}", e);
                eprintln!("Warning: the meal was recorded but could not be written to disk.");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Mime type for common photo extensions.
fn mime_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

fn print_review(entry: &FoodEntry) {
    println!();
    print!("{}", entry.food);
    if let Some(split) = entry.nutrients().split() {
        println!("Macro split: {}", split);
    }
    println!();
}

fn confirm_prompt(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    ))
}
