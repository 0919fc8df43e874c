use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::wire;

/// The weight goal a user picked at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    LoseWeight,
    MaintainWeight,
    GainWeight,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::LoseWeight => "lose_weight",
            GoalCategory::MaintainWeight => "maintain_weight",
            GoalCategory::GainWeight => "gain_weight",
        }
    }
}

impl fmt::Display for GoalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "lose_weight" | "lose" => Ok(GoalCategory::LoseWeight),
            "maintain_weight" | "maintain" => Ok(GoalCategory::MaintainWeight),
            "gain_weight" | "gain" => Ok(GoalCategory::GainWeight),
            _ => Err(format!(
                "Invalid goal '{}'. Valid options: lose_weight, maintain_weight, gain_weight",
                s
            )),
        }
    }
}

/// Server-held user attributes returned by `/user/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(deserialize_with = "wire::id")]
    pub id: String,
    pub name: String,
    pub email: String,
    /// Unknown goal strings are kept as `None` rather than failing the profile.
    #[serde(default, deserialize_with = "lenient_goal")]
    pub goal: Option<GoalCategory>,
    #[serde(default, deserialize_with = "wire::optional_integer")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "wire::optional_number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_number")]
    pub current_weight: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_number")]
    pub target_weight: Option<f64>,
}

fn lenient_goal<'de, D>(deserializer: D) -> Result<Option<GoalCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
