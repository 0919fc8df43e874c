//! Multi-step signup.
//!
//! A [`SignupDraft`] collects registration fields one wizard step at a time.
//! Nothing is validated or sent until [`SignupFlow::submit`], which converts
//! the draft into a complete [`Registration`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::models::GoalCategory;

/// Errors from submitting a signup draft.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("Missing information: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Partially entered registration data.
///
/// Also used as the partial update passed to [`SignupDraft::merge`]: only
/// fields that are `Some` are applied.
#[derive(Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
}

impl fmt::Debug for SignupDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupDraft")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("goal", &self.goal)
            .field("gender", &self.gender)
            .field("activity_level", &self.activity_level)
            .field("age", &self.age)
            .field("height", &self.height)
            .field("current_weight", &self.current_weight)
            .field("target_weight", &self.target_weight)
            .finish()
    }
}

/// Overwrites `slot` only when the update carries a value.
fn merge_field<T>(slot: &mut Option<T>, update: Option<T>) {
    if update.is_some() {
        *slot = update;
    }
}

impl SignupDraft {
    /// Applies every field set in `partial`, keeping all others.
    pub fn merge(&mut self, partial: SignupDraft) {
        merge_field(&mut self.name, partial.name);
        merge_field(&mut self.email, partial.email);
        merge_field(&mut self.password, partial.password);
        merge_field(&mut self.goal, partial.goal);
        merge_field(&mut self.gender, partial.gender);
        merge_field(&mut self.activity_level, partial.activity_level);
        merge_field(&mut self.age, partial.age);
        merge_field(&mut self.height, partial.height);
        merge_field(&mut self.current_weight, partial.current_weight);
        merge_field(&mut self.target_weight, partial.target_weight);
    }

    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.name) {
            missing.push("name");
        }
        if blank(&self.email) {
            missing.push("email");
        }
        if self.password.as_deref().map_or(true, str::is_empty) {
            missing.push("password");
        }
        if self.goal.is_none() {
            missing.push("goal");
        }
        if self.age.is_none() {
            missing.push("age");
        }
        if self.height.is_none() {
            missing.push("height");
        }
        if self.current_weight.is_none() {
            missing.push("current weight");
        }
        if self.target_weight.is_none() {
            missing.push("target weight");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A complete registration, ready to send.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub goal: GoalCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    pub age: u32,
    pub height: f64,
    pub current_weight: f64,
    pub target_weight: f64,
}

impl TryFrom<&SignupDraft> for Registration {
    type Error = DraftError;

    fn try_from(draft: &SignupDraft) -> Result<Self, Self::Error> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }

        // missing_fields() guarantees every required value below is present
        match draft.clone() {
            SignupDraft {
                name: Some(name),
                email: Some(email),
                password: Some(password),
                goal: Some(goal),
                gender,
                activity_level,
                age: Some(age),
                height: Some(height),
                current_weight: Some(current_weight),
                target_weight: Some(target_weight),
            } => Ok(Registration {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password,
                goal,
                gender,
                activity_level,
                age,
                height,
                current_weight,
                target_weight,
            }),
            _ => Err(DraftError::MissingFields(draft.missing_fields())),
        }
    }
}

/// Owns the draft for one pass through the signup wizard.
///
/// The draft lives in memory only and is discarded when the flow is
/// abandoned or completes.
#[derive(Debug, Default)]
pub struct SignupFlow {
    draft: SignupDraft,
}

impl SignupFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts over with an empty draft.
    pub fn begin(&mut self) {
        self.draft = SignupDraft::default();
    }

    pub fn update(&mut self, partial: SignupDraft) {
        self.draft.merge(partial);
    }

    pub fn draft(&self) -> &SignupDraft {
        &self.draft
    }

    pub fn abandon(&mut self) {
        self.begin();
    }

    /// Validates the draft and registers the account.
    ///
    /// On success the draft is discarded and the server's message is
    /// returned. On failure the draft is kept so the user can fix it and
    /// retry.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<Option<String>, DraftError> {
        let registration = Registration::try_from(&self.draft)?;
        let message = api.register(&registration).await?;
        tracing::info!("Account registered");
        self.begin();
        Ok(message)
    }
}
