use serde::{Deserialize, Serialize};

use super::food::FoodItem;
use super::meal_type::MealType;
use crate::api::wire;

/// One food logged under a meal type for the active day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedMealEntry {
    pub id: String,
    pub food: FoodItem,
    pub meal_type: MealType,
}

/// Flat diary row as returned by `GET /diary`.
#[derive(Debug, Deserialize)]
pub(crate) struct DiaryRecord {
    #[serde(deserialize_with = "wire::id")]
    id: String,
    #[serde(deserialize_with = "wire::id")]
    food_id: String,
    name: String,
    #[serde(deserialize_with = "wire::number")]
    calories: f64,
    #[serde(deserialize_with = "wire::number")]
    protein: f64,
    #[serde(deserialize_with = "wire::number")]
    carbs: f64,
    #[serde(deserialize_with = "wire::number")]
    fat: f64,
    #[serde(default, deserialize_with = "wire::optional_number")]
    serving_size: Option<f64>,
    #[serde(default)]
    serving_unit: Option<String>,
    meal_type: String,
}

impl DiaryRecord {
    /// Converts the flat row into a typed entry.
    pub(crate) fn into_entry(self) -> Result<LoggedMealEntry, String> {
        let meal_type = self.meal_type.parse::<MealType>()?;
        Ok(LoggedMealEntry {
            id: self.id,
            meal_type,
            food: FoodItem {
                id: self.food_id,
                name: self.name,
                calories: self.calories,
                protein: self.protein,
                carbs: self.carbs,
                fat: self.fat,
                serving_size: self.serving_size,
                serving_unit: self.serving_unit,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_normalizes_into_entry() {
        let json = r#"{
            "id": 3, "food_id": 19, "name": "Banana",
            "calories": "105.00", "protein": "1.30", "carbs": "27.00", "fat": "0.40",
            "serving_size": "118.00", "serving_unit": "g", "meal_type": "Breakfast"
        }"#;
        let record: DiaryRecord = serde_json::from_str(json).unwrap();
        let entry = record.into_entry().unwrap();
        assert_eq!(entry.id, "3");
        assert_eq!(entry.food.id, "19");
        assert_eq!(entry.meal_type, MealType::Breakfast);
        assert_eq!(entry.food.calories, 105.0);
        assert_eq!(entry.food.serving_size, Some(118.0));
    }

    #[test]
    fn test_record_with_unknown_meal_type_fails() {
        let json = r#"{
            "id": 3, "food_id": 19, "name": "Banana",
            "calories": 1, "protein": 1, "carbs": 1, "fat": 1, "meal_type": "Brunch"
        }"#;
        let record: DiaryRecord = serde_json::from_str(json).unwrap();
        assert!(record.into_entry().is_err());
    }
}
