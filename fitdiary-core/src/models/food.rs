use serde::{Deserialize, Serialize};
use std::fmt;

use super::nutrients::Nutrients;
use crate::api::wire;

/// A catalog entry. Nutrient values are per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "wire::number")]
    pub calories: f64,
    #[serde(deserialize_with = "wire::number")]
    pub protein: f64,
    #[serde(deserialize_with = "wire::number")]
    pub carbs: f64,
    #[serde(deserialize_with = "wire::number")]
    pub fat: f64,
    #[serde(
        default,
        deserialize_with = "wire::optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub serving_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_unit: Option<String>,
}

impl FoodItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, nutrients: Nutrients) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calories: nutrients.calories,
            protein: nutrients.protein,
            carbs: nutrients.carbs,
            fat: nutrients.fat,
            serving_size: None,
            serving_unit: None,
        }
    }

    pub fn with_serving(mut self, size: f64, unit: impl Into<String>) -> Self {
        self.serving_size = Some(size);
        self.serving_unit = Some(unit.into());
        self
    }

    pub fn nutrients(&self) -> Nutrients {
        Nutrients::new(self.calories, self.protein, self.carbs, self.fat)
    }
}

impl fmt::Display for FoodItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let (Some(size), Some(unit)) = (self.serving_size, &self.serving_unit) {
            write!(f, " ({} {})", size, unit)?;
        }
        write!(f, " - {}", self.nutrients())
    }
}

/// A user-defined food to add to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomFood {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_size: f64,
    pub serving_unit: String,
}

impl CustomFood {
    /// Checks the fields the catalog insists on before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Food name is required".to_string());
        }
        if self.serving_unit.trim().is_empty() {
            return Err("Serving unit is required".to_string());
        }
        for (label, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number", label));
            }
        }
        if !self.serving_size.is_finite() || self.serving_size <= 0.0 {
            return Err("Serving size must be greater than zero".to_string());
        }
        Ok(())
    }
}
