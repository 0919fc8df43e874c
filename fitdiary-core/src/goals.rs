//! Daily nutrient targets.
//!
//! Targets depend only on the goal category. Age, height and weights on the
//! profile are not taken into account yet.
//!
//! Losing and maintaining share one bundle. Some clients display
//! 1800 kcal for losing weight; these targets do not.

use crate::models::{GoalCategory, GoalTargets, Nutrients, Profile};

/// Targets for losing or maintaining weight, and the fallback for unknown goals.
pub const STANDARD_TARGETS: GoalTargets = Nutrients {
    calories: 2200.0,
    protein: 150.0,
    carbs: 250.0,
    fat: 70.0,
};

/// Targets for gaining weight.
pub const GAIN_TARGETS: GoalTargets = Nutrients {
    calories: 2500.0,
    protein: 180.0,
    carbs: 300.0,
    fat: 80.0,
};

pub fn targets_for_goal(goal: Option<GoalCategory>) -> GoalTargets {
    match goal {
        Some(GoalCategory::GainWeight) => GAIN_TARGETS,
        Some(GoalCategory::LoseWeight) | Some(GoalCategory::MaintainWeight) | None => {
            STANDARD_TARGETS
        }
    }
}

/// Targets for a profile; no profile gets the standard bundle.
pub fn goals_for(profile: Option<&Profile>) -> GoalTargets {
    targets_for_goal(profile.and_then(|p| p.goal))
}
