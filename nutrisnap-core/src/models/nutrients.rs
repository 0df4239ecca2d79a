use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Calories plus the three macro-nutrients, all in whole units.
///
/// Calories are kcal, the rest are grams. Zero is a legal value for every
/// field (e.g. a photo that is not food).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroNutrients {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

impl MacroNutrients {
    pub fn new(calories: u32, protein: u32, carbs: u32, fats: u32) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Percentage share of protein, carbs and fats by weight.
    ///
    /// Returns `None` when all three are zero.
    pub fn split(&self) -> Option<MacroSplit> {
        let total = self.protein as f64 + self.carbs as f64 + self.fats as f64;
        if total == 0.0 {
            return None;
        }
        Some(MacroSplit {
            protein: self.protein as f64 / total * 100.0,
            carbs: self.carbs as f64 / total * 100.0,
            fats: self.fats as f64 / total * 100.0,
        })
    }
}

impl Add for MacroNutrients {
    type Output = MacroNutrients;

    fn add(self, rhs: MacroNutrients) -> MacroNutrients {
        MacroNutrients {
            calories: self.calories.saturating_add(rhs.calories),
            protein: self.protein.saturating_add(rhs.protein),
            carbs: self.carbs.saturating_add(rhs.carbs),
            fats: self.fats.saturating_add(rhs.fats),
        }
    }
}

impl AddAssign for MacroNutrients {
    fn add_assign(&mut self, rhs: MacroNutrients) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for MacroNutrients {
    fn sum<I: Iterator<Item = MacroNutrients>>(iter: I) -> Self {
        iter.fold(MacroNutrients::default(), Add::add)
    }
}

/// Format as "Calories: 650 | Protein: 25g | Carbs: 80g | Fats: 28g"
impl fmt::Display for MacroNutrients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calories: {} | Protein: {}g | Carbs: {}g | Fats: {}g",
            self.calories, self.protein, self.carbs, self.fats
        )
    }
}

/// Share of each macro-nutrient in percent, summing to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl fmt::Display for MacroSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P {:.0}% / C {:.0}% / F {:.0}%",
            self.protein, self.carbs, self.fats
        )
    }
}
