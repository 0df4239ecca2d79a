use serde::{Deserialize, Serialize};
use std::fmt;

use super::nutrients::MacroNutrients;

/// Nutritional estimate for a single meal photo, as returned by an
/// [`AnalysisGateway`](crate::gateway::AnalysisGateway).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodAnalysis {
    pub name: String,
    #[serde(flatten)]
    pub nutrients: MacroNutrients,
    /// Short free-text comment on the meal
    pub analysis: String,
}

impl FoodAnalysis {
    pub fn new(
        name: impl Into<String>,
        nutrients: MacroNutrients,
        analysis: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            nutrients,
            analysis: analysis.into(),
        }
    }
}

impl fmt::Display for FoodAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;
        writeln!(f, "{}", self.nutrients)?;
        if !self.analysis.is_empty() {
            writeln!(f, "\n{}", self.analysis)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_serializes_flat() {
        let analysis = FoodAnalysis::new(
            "Salada",
            MacroNutrients::new(250, 10, 20, 12),
            "Leve e nutritiva",
        );
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["name"], "Salada");
        assert_eq!(value["calories"], 250);
        assert_eq!(value["fats"], 12);
        assert!(value.get("nutrients").is_none());
    }

    #[test]
    fn test_analysis_display() {
        let analysis = FoodAnalysis::new("Pizza", MacroNutrients::new(800, 30, 90, 35), "Pesada");
        let output = analysis.to_string();
        assert!(output.contains("Pizza"));
        assert!(output.contains("Calories: 800"));
        assert!(output.contains("Pesada"));
    }
}
