//! FitDiary Core Library
//!
//! Session handling, today's diary and the HTTP client shared by FitDiary
//! front ends.

pub mod api;
pub mod chat;
pub mod credential;
pub mod diary;
pub mod goals;
pub mod models;
pub mod scan;
pub mod session;
pub mod signup;

pub use api::{ApiClient, ApiError, RecommendKind, DEFAULT_TIMEOUT};
pub use chat::{ChatError, ChatRelay, ChatWatch, DEFAULT_POLL_INTERVAL};
pub use credential::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, StoreError,
};
pub use diary::{DiaryAggregator, DiaryError, MealGroup};
pub use goals::goals_for;
pub use models::{
    ChatMessage, CustomFood, DailyTotals, FoodItem, GoalCategory, GoalTargets, LoggedMealEntry,
    MealType, Nutrients, Profile,
};
pub use scan::{ScanOutcome, ScannedCode};
pub use session::{SessionManager, SessionState};
pub use signup::{DraftError, Registration, SignupDraft, SignupFlow};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
