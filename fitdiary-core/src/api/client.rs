//! HTTP client for the FitDiary backend.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::error::ApiError;
use super::wire;
use crate::credential::Credential;
use crate::models::{
    ChatMessage, CustomFood, DiaryRecord, FoodItem, LoggedMealEntry, MealType, Profile,
};
use crate::signup::Registration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What the recommendation endpoint should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendKind {
    Recipe,
    Plan,
    Challenge,
}

impl RecommendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendKind::Recipe => "recipe",
            RecommendKind::Plan => "plan",
            RecommendKind::Challenge => "challenge",
        }
    }
}

impl std::str::FromStr for RecommendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recipe" => Ok(RecommendKind::Recipe),
            "plan" => Ok(RecommendKind::Plan),
            "challenge" => Ok(RecommendKind::Challenge),
            _ => Err(format!(
                "Invalid recommendation kind '{}'. Valid options: recipe, plan, challenge",
                s
            )),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Deserialize)]
struct MeResponse {
    user: Profile,
}

#[derive(Deserialize)]
struct DiaryResponse {
    diary: Vec<DiaryRecord>,
}

#[derive(Deserialize)]
struct FoodsResponse {
    foods: Vec<FoodItem>,
}

#[derive(Deserialize)]
struct FoodResponse {
    food: FoodItem,
}

#[derive(Deserialize)]
struct CustomFoodResponse {
    #[serde(rename = "foodId", deserialize_with = "wire::id")]
    food_id: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct RecommendResponse {
    reply: String,
}

/// Client for the FitDiary REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:3000/api`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ==================== Auth ====================

    /// Creates an account. Returns the server's message, if any.
    pub async fn register(&self, registration: &Registration) -> Result<Option<String>, ApiError> {
        let request = self.http.post(self.url("/auth/register")).json(registration);
        let response = self.send(request).await?;
        Ok(Self::optional_message(response).await)
    }

    /// Exchanges email and password for a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credential, ApiError> {
        let request = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        let body: LoginResponse = self.fetch(request).await?;

        match body.token {
            Some(token) if !token.is_empty() => Ok(Credential::new(token)),
            _ => Err(ApiError::MalformedResponse(
                "No token received from server".to_string(),
            )),
        }
    }

    /// Fetches the profile of the user the credential belongs to.
    pub async fn me(&self, credential: &Credential) -> Result<Profile, ApiError> {
        let request = self.authed(self.http.get(self.url("/user/me")), credential);
        let body: MeResponse = self.fetch(request).await?;
        Ok(body.user)
    }

    // ==================== Diary ====================

    /// Fetches the entries logged on `date`.
    pub async fn diary(
        &self,
        credential: &Credential,
        date: NaiveDate,
    ) -> Result<Vec<LoggedMealEntry>, ApiError> {
        let request = self
            .authed(self.http.get(self.url("/diary")), credential)
            .query(&[("date", date.format("%Y-%m-%d").to_string())]);
        let body: DiaryResponse = self.fetch(request).await?;

        body.diary
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                record
                    .into_entry()
                    .map_err(|e| ApiError::MalformedResponse(format!("diary entry {}: {}", i, e)))
            })
            .collect()
    }

    /// Logs one serving of a food under a meal type for today.
    pub async fn log_meal(
        &self,
        credential: &Credential,
        food_id: &str,
        meal_type: MealType,
    ) -> Result<Option<String>, ApiError> {
        let request = self
            .authed(self.http.post(self.url("/diary")), credential)
            .json(&json!({ "food_id": food_id, "meal_type": meal_type }));
        let response = self.send(request).await?;
        Ok(Self::optional_message(response).await)
    }

    // ==================== Food catalog ====================

    pub async fn search_food(
        &self,
        credential: &Credential,
        query: &str,
    ) -> Result<Vec<FoodItem>, ApiError> {
        let request = self
            .authed(self.http.get(self.url("/food")), credential)
            .query(&[("search", query)]);
        let body: FoodsResponse = self.fetch(request).await?;
        Ok(body.foods)
    }

    /// Looks up a product by barcode. Unknown barcodes return `Ok(None)`.
    pub async fn barcode_lookup(
        &self,
        credential: &Credential,
        upc: &str,
    ) -> Result<Option<FoodItem>, ApiError> {
        let upc = upc.trim();
        if upc.is_empty() {
            return Err(ApiError::InvalidRequest("Barcode is empty".to_string()));
        }

        let path = format!("/food/barcode/{}", urlencoding::encode(upc));
        let request = self.authed(self.http.get(self.url(&path)), credential);

        match self.fetch::<FoodResponse>(request).await {
            Ok(body) => Ok(Some(body.food)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Adds a custom food to the catalog and returns its id.
    pub async fn add_custom_food(
        &self,
        credential: &Credential,
        food: &CustomFood,
    ) -> Result<String, ApiError> {
        food.validate().map_err(ApiError::InvalidRequest)?;

        let request = self
            .authed(self.http.post(self.url("/food/custom")), credential)
            .json(food);
        let body: CustomFoodResponse = self.fetch(request).await?;
        Ok(body.food_id)
    }

    // ==================== Coaching ====================

    pub async fn chat_messages(&self, credential: &Credential) -> Result<Vec<ChatMessage>, ApiError> {
        let request = self.authed(self.http.get(self.url("/chat")), credential);
        let body: ChatResponse = self.fetch(request).await?;
        Ok(body.messages)
    }

    pub async fn send_chat(&self, credential: &Credential, message: &str) -> Result<(), ApiError> {
        let request = self
            .authed(self.http.post(self.url("/chat")), credential)
            .json(&json!({ "message": message }));
        self.send(request).await?;
        Ok(())
    }

    /// Asks the coach for a recipe, plan or challenge suggestion.
    pub async fn recommend(
        &self,
        credential: &Credential,
        query: &str,
        kind: RecommendKind,
    ) -> Result<String, ApiError> {
        if query.trim().is_empty() {
            return Err(ApiError::InvalidRequest("Query is empty".to_string()));
        }

        let request = self
            .authed(self.http.post(self.url("/ai/recommend")), credential)
            .json(&json!({ "query": query, "type": kind.as_str() }));
        let body: RecommendResponse = self.fetch(request).await?;
        Ok(body.reply)
    }

    // ==================== Plumbing ====================

    /// Builds a full URL for a path under the base URL.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.bearer_auth(credential.as_str())
    }

    /// Sends a request, turning non-success statuses into [`ApiError::Status`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty());

        tracing::debug!(status = status.as_u16(), ?message, "API request failed");

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Sends a request and decodes a JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    /// Reads an optional `{message}` body; empty or non-JSON bodies yield `None`.
    async fn optional_message(response: Response) -> Option<String> {
        response
            .json::<MessageBody>()
            .await
            .ok()
            .and_then(|body| body.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/api/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.url("/user/me"), "http://localhost:3000/api/user/me");
    }

    #[test]
    fn test_recommend_kind_from_str() {
        assert_eq!(
            "Recipe".parse::<RecommendKind>().unwrap(),
            RecommendKind::Recipe
        );
        assert_eq!(
            "challenge".parse::<RecommendKind>().unwrap(),
            RecommendKind::Challenge
        );
        assert!("snack".parse::<RecommendKind>().is_err());
    }

    #[tokio::test]
    async fn test_blank_recommend_query_is_rejected_locally() {
        // Port 9 is discard; the request must fail before any connection attempt
        let client = ApiClient::new("http://127.0.0.1:9", DEFAULT_TIMEOUT).unwrap();
        let err = client
            .recommend(&Credential::new("t"), "   ", RecommendKind::Plan)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
