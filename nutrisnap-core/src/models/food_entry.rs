use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::food_analysis::FoodAnalysis;
use super::nutrients::MacroNutrients;

/// A recorded meal: the gateway's estimate plus identity and capture time.
///
/// Entries are never edited once created. The persisted JSON shape is flat
/// (`id`, `timestamp`, `imageUrl`, `name`, `calories`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    #[serde(
        rename = "imageUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub food: FoodAnalysis,
}

impl FoodEntry {
    /// Wrap an analysis into an entry with a fresh id.
    pub fn new(food: FoodAnalysis, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            image_url: None,
            food,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.food.name
    }

    pub fn nutrients(&self) -> &MacroNutrients {
        &self.food.nutrients
    }

    /// Capture time in UTC, `None` if the timestamp is out of range.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

impl fmt::Display for FoodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} kcal)", self.food.name, self.food.nutrients.calories)?;
        writeln!(
            f,
            "  P: {}g  C: {}g  F: {}g",
            self.food.nutrients.protein, self.food.nutrients.carbs, self.food.nutrients.fats
        )?;
        if !self.food.analysis.is_empty() {
            writeln!(f, "  \"{}\"", self.food.analysis)?;
        }
        Ok(())
    }
}
