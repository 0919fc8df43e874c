//! Scanned code resolution.
//!
//! A scanned payload is either a recipe QR code produced by the app or a
//! product barcode.

use serde::Deserialize;
use serde_json::json;

use crate::api::{wire, ApiClient, ApiError};
use crate::credential::Credential;
use crate::models::{FoodItem, MealType, Nutrients};

/// `type` tag carried by recipe QR payloads.
pub const RECIPE_QR_TYPE: &str = "myfitnessapp-recipe";

/// Calories assigned to a scanned recipe. Recipe QR codes carry no macros.
pub const RECIPE_CALORIES: f64 = 300.0;

/// Meal that scanned items are logged under.
pub const DEFAULT_SCAN_MEAL: MealType = MealType::Snacks;

#[derive(Deserialize)]
struct RecipeQr {
    #[serde(rename = "type")]
    kind: String,
    #[serde(rename = "recipeId", deserialize_with = "wire::id")]
    recipe_id: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScannedCode {
    Recipe { recipe_id: String, name: String },
    Barcode(String),
}

impl ScannedCode {
    /// Classifies a raw payload. Anything that is not a recipe QR code is
    /// treated as a barcode.
    pub fn parse(payload: &str) -> Self {
        match serde_json::from_str::<RecipeQr>(payload) {
            Ok(qr) if qr.kind == RECIPE_QR_TYPE => ScannedCode::Recipe {
                recipe_id: qr.recipe_id,
                name: qr.name,
            },
            _ => ScannedCode::Barcode(payload.trim().to_string()),
        }
    }
}

/// Builds the QR payload for a recipe.
pub fn recipe_payload(recipe_id: &str, name: &str) -> String {
    json!({ "type": RECIPE_QR_TYPE, "recipeId": recipe_id, "name": name }).to_string()
}

/// Result of resolving a scanned code.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Found(FoodItem),
    /// Barcode not in the catalog
    NotFound(String),
}

/// Turns a scanned code into a loggable food item.
///
/// Recipes resolve locally; barcodes are looked up on the server.
pub async fn resolve(
    api: &ApiClient,
    credential: &Credential,
    code: &ScannedCode,
) -> Result<ScanOutcome, ApiError> {
    match code {
        ScannedCode::Recipe { recipe_id, name } => Ok(ScanOutcome::Found(FoodItem::new(
            recipe_id.clone(),
            name.clone(),
            Nutrients::new(RECIPE_CALORIES, 0.0, 0.0, 0.0),
        ))),
        ScannedCode::Barcode(upc) => match api.barcode_lookup(credential, upc).await? {
            Some(food) => Ok(ScanOutcome::Found(food)),
            None => {
                tracing::debug!(%upc, "Barcode not found");
                Ok(ScanOutcome::NotFound(upc.clone()))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_TIMEOUT;

    #[test]
    fn test_parse_recipe_qr() {
        let code = ScannedCode::parse(
            r#"{"type": "myfitnessapp-recipe", "recipeId": 42, "name": "Overnight oats"}"#,
        );
        assert_eq!(
            code,
            ScannedCode::Recipe {
                recipe_id: "42".to_string(),
                name: "Overnight oats".to_string()
            }
        );
    }

    #[test]
    fn test_parse_barcode() {
        assert_eq!(
            ScannedCode::parse(" 0123456789012\n"),
            ScannedCode::Barcode("0123456789012".to_string())
        );
    }

    #[test]
    fn test_other_json_is_a_barcode() {
        let payload = r#"{"type": "something-else", "recipeId": "1", "name": "x"}"#;
        assert_eq!(
            ScannedCode::parse(payload),
            ScannedCode::Barcode(payload.to_string())
        );
    }

    #[test]
    fn test_recipe_payload_parses_back() {
        let payload = recipe_payload("r-7", "Chili");
        assert_eq!(
            ScannedCode::parse(&payload),
            ScannedCode::Recipe {
                recipe_id: "r-7".to_string(),
                name: "Chili".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_recipe_resolves_without_network() {
        let api = ApiClient::new("http://127.0.0.1:9/api", DEFAULT_TIMEOUT).unwrap();
        let code = ScannedCode::Recipe {
            recipe_id: "42".to_string(),
            name: "Oats".to_string(),
        };

        let outcome = resolve(&api, &Credential::new("t"), &code).await.unwrap();

        match outcome {
            ScanOutcome::Found(food) => {
                assert_eq!(food.id, "42");
                assert_eq!(food.nutrients(), Nutrients::new(300.0, 0.0, 0.0, 0.0));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
