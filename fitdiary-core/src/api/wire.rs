//! Wire-format helpers.
//!
//! The backend is loose about JSON types: nutrient values frequently arrive
//! as strings (`"250.00"`) and identifiers as either integers or strings.
//! These deserializers coerce both forms and reject anything else, so a bad
//! payload surfaces as a decode error instead of a zero in the totals.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// Required number: a JSON number or a numeric string.
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    coerce_number(&value).map_err(de::Error::custom)
}

/// Optional number: `null` or a missing field is `None`.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => coerce_number(&value).map(Some).map_err(de::Error::custom),
    }
}

/// Optional integer; accepts whole-valued numbers and numeric strings.
pub fn optional_integer<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => {
            let n = coerce_number(&value).map_err(de::Error::custom)?;
            if n.fract() != 0.0 || n < 0.0 || n > u32::MAX as f64 {
                return Err(de::Error::custom(format!("expected whole number, got {}", n)));
            }
            Ok(Some(n as u32))
        }
    }
}

/// Identifier: a JSON integer or string, normalized to a string.
pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected identifier, found {}",
            other
        ))),
    }
}

fn coerce_number(value: &Value) -> Result<f64, String> {
    let n = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("number out of range: {}", n))?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid numeric string '{}'", s))?,
        other => return Err(format!("expected number, found {}", other)),
    };

    if !n.is_finite() {
        return Err(format!("non-finite number: {}", value));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "id")]
        id: String,
        #[serde(deserialize_with = "number")]
        calories: f64,
        #[serde(default, deserialize_with = "optional_number")]
        serving_size: Option<f64>,
        #[serde(default, deserialize_with = "optional_integer")]
        age: Option<u32>,
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let s: Sample =
            serde_json::from_str(r#"{"id": 7, "calories": "250.50", "serving_size": "100"}"#)
                .unwrap();
        assert_eq!(s.id, "7");
        assert_eq!(s.calories, 250.5);
        assert_eq!(s.serving_size, Some(100.0));
        assert_eq!(s.age, None);
    }

    #[test]
    fn test_null_optional_is_none() {
        let s: Sample =
            serde_json::from_str(r#"{"id": "a1", "calories": 10, "serving_size": null}"#).unwrap();
        assert_eq!(s.serving_size, None);
    }

    #[test]
    fn test_missing_required_number_fails() {
        let err = serde_json::from_str::<Sample>(r#"{"id": 1}"#).unwrap_err();
        assert!(err.to_string().contains("calories"));
    }

    #[test]
    fn test_garbage_number_fails() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": 1, "calories": "lots"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"id": 1, "calories": "NaN"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"id": 1, "calories": true}"#).is_err());
    }

    #[test]
    fn test_integer_rejects_fraction() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": 1, "calories": 1, "age": 30.5}"#).is_err());
        let s: Sample = serde_json::from_str(r#"{"id": 1, "calories": 1, "age": "30"}"#).unwrap();
        assert_eq!(s.age, Some(30));
    }

    #[test]
    fn test_empty_id_fails() {
        assert!(serde_json::from_str::<Sample>(r#"{"id": "", "calories": 1}"#).is_err());
    }
}
