use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Calories (kcal) plus the three macronutrients (grams).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrients {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Sum of everything logged for the active day.
pub type DailyTotals = Nutrients;

/// Daily targets derived from the user's goal.
pub type GoalTargets = Nutrients;

impl Nutrients {
    pub const ZERO: Nutrients = Nutrients {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };

    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// What is left of each target. Negative when a target was exceeded.
    pub fn remaining(&self, goals: &GoalTargets) -> Nutrients {
        Nutrients {
            calories: goals.calories - self.calories,
            protein: goals.protein - self.protein,
            carbs: goals.carbs - self.carbs,
            fat: goals.fat - self.fat,
        }
    }

    /// Fraction of each target consumed, clamped to `[0, 1]`.
    pub fn progress(&self, goals: &GoalTargets) -> Nutrients {
        fn ratio(current: f64, goal: f64) -> f64 {
            (current / goal.max(1.0)).clamp(0.0, 1.0)
        }

        Nutrients {
            calories: ratio(self.calories, goals.calories),
            protein: ratio(self.protein, goals.protein),
            carbs: ratio(self.carbs, goals.carbs),
            fat: ratio(self.fat, goals.fat),
        }
    }
}

impl Add for Nutrients {
    type Output = Nutrients;

    fn add(self, rhs: Nutrients) -> Nutrients {
        Nutrients {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fat: self.fat + rhs.fat,
        }
    }
}

impl Sum for Nutrients {
    fn sum<I: Iterator<Item = Nutrients>>(iter: I) -> Self {
        iter.fold(Nutrients::ZERO, Add::add)
    }
}

impl fmt::Display for Nutrients {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} kcal, protein {} g, carbs {} g, fat {} g",
            self.calories.round(),
            self.protein.round(),
            self.carbs.round(),
            self.fat.round()
        )
    }
}
