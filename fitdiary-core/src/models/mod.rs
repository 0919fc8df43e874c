mod chat;
mod diary_entry;
mod food;
mod meal_type;
mod nutrients;
mod profile;

pub use chat::ChatMessage;
pub(crate) use diary_entry::DiaryRecord;
pub use diary_entry::LoggedMealEntry;
pub use food::{CustomFood, FoodItem};
pub use meal_type::MealType;
pub use nutrients::{DailyTotals, GoalTargets, Nutrients};
pub use profile::{GoalCategory, Profile};
