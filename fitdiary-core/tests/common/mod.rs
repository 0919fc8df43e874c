//! In-process fake of the FitDiary backend.
//!
//! Serves the REST endpoints the client uses on `127.0.0.1:0`. Tests reach
//! into [`Backend`] to seed data and to inject faults.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use fitdiary_core::{ApiClient, MemoryCredentialStore, SessionManager};

type Reply = (StatusCode, Json<Value>);
type Shared = Arc<Mutex<Backend>>;

#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub goal: String,
}

/// Server-side state.
#[derive(Debug, Default)]
pub struct Backend {
    pub users: Vec<User>,
    /// token -> user id
    pub tokens: HashMap<String, u64>,
    /// user id -> raw diary rows, exactly as served
    pub diary: HashMap<u64, Vec<Value>>,
    /// raw catalog rows; `barcode` is matched by the barcode route
    pub foods: Vec<Value>,
    pub chat: Vec<Value>,
    pub registrations: Vec<Value>,
    pub next_id: u64,
    /// `/user/me` answers 401 for every token
    pub reject_me: bool,
    /// `/diary` answers with an unparseable body
    pub malformed_diary: bool,
    /// `/chat` answers 500
    pub fail_chat: bool,
    /// `/diary` GET waits this long before answering
    pub diary_delay: Option<Duration>,
    /// `date` query of every diary GET, in order
    pub diary_dates: Vec<String>,
    pub diary_gets: usize,
    pub me_gets: usize,
}

impl Backend {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<User> {
        let token = headers
            .get("authorization")?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        let id = self.tokens.get(token)?;
        self.users.iter().find(|u| u.id == *id).cloned()
    }
}

pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    /// Starts the server on an ephemeral port.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend {
            next_id: 100,
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/user/me", get(me))
            .route("/api/diary", get(get_diary).post(post_diary))
            .route("/api/food", get(search_food))
            .route("/api/food/barcode/{upc}", get(barcode))
            .route("/api/food/custom", post(custom_food))
            .route("/api/chat", get(get_chat).post(post_chat))
            .route("/api/ai/recommend", post(recommend))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, Backend> {
        self.state.lock().unwrap()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    pub fn session(&self, store: Arc<MemoryCredentialStore>) -> SessionManager {
        SessionManager::new(self.client(), store)
    }

    /// Adds a user and returns its id.
    pub fn add_user(&self, email: &str, password: &str, goal: &str) -> u64 {
        let mut state = self.state();
        let id = state.next_id();
        state.users.push(User {
            id,
            name: "Test User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            goal: goal.to_string(),
        });
        id
    }

    /// Adds a user with a ready-made token.
    pub fn add_user_with_token(&self, token: &str, goal: &str) -> u64 {
        let id = self.add_user(&format!("{}@example.com", token), "pw", goal);
        self.state().tokens.insert(token.to_string(), id);
        id
    }

    pub fn add_food(&self, food: Value) {
        self.state().foods.push(food);
    }
}

/// Polls `check` until it holds, failing the test after two seconds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2s");
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn unauthorized() -> Reply {
    reply(
        StatusCode::UNAUTHORIZED,
        json!({ "message": "Invalid or expired token" }),
    )
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.users.iter().any(|u| u.email == email) {
        return reply(
            StatusCode::CONFLICT,
            json!({ "message": "Email already registered" }),
        );
    }

    let id = state.next_id();
    state.users.push(User {
        id,
        name: body["name"].as_str().unwrap_or_default().to_string(),
        email,
        password: body["password"].as_str().unwrap_or_default().to_string(),
        goal: body["goal"].as_str().unwrap_or_default().to_string(),
    });
    state.registrations.push(body);
    reply(
        StatusCode::CREATED,
        json!({ "message": "User registered successfully" }),
    )
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    let user = state
        .users
        .iter()
        .find(|u| body["email"] == u.email.as_str() && body["password"] == u.password.as_str())
        .cloned();

    match user {
        Some(user) => {
            let token = format!("token-{}-{}", user.id, state.tokens.len());
            state.tokens.insert(token.clone(), user.id);
            reply(StatusCode::OK, json!({ "token": token }))
        }
        None => reply(
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Invalid credentials" }),
        ),
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut state = state.lock().unwrap();
    state.me_gets += 1;
    if state.reject_me {
        return unauthorized();
    }
    match state.user_for(&headers) {
        Some(user) => reply(
            StatusCode::OK,
            json!({ "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email,
                "goal": user.goal,
                "age": 30,
                "height": "175.00",
                "current_weight": "80.00",
                "target_weight": "75.00"
            }}),
        ),
        None => unauthorized(),
    }
}

async fn get_diary(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let delay = state.lock().unwrap().diary_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = state.lock().unwrap();
    state.diary_gets += 1;
    if let Some(date) = query.get("date") {
        state.diary_dates.push(date.clone());
    }
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };
    if !query.contains_key("date") {
        return reply(StatusCode::BAD_REQUEST, json!({ "message": "date is required" }));
    }
    if state.malformed_diary {
        return reply(StatusCode::OK, json!({ "diary": "not a list" }));
    }
    let rows = state.diary.get(&user.id).cloned().unwrap_or_default();
    reply(StatusCode::OK, json!({ "diary": rows }))
}

async fn post_diary(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().unwrap();
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };

    let food_id = match &body["food_id"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let Some(food) = state
        .foods
        .iter()
        .find(|f| match &f["id"] {
            Value::String(s) => *s == food_id,
            other => other.to_string() == food_id,
        })
        .cloned()
    else {
        return reply(StatusCode::NOT_FOUND, json!({ "message": "Food not found" }));
    };

    let id = state.next_id();
    state.diary.entry(user.id).or_default().push(json!({
        "id": id,
        "food_id": food["id"],
        "name": food["name"],
        "calories": food["calories"],
        "protein": food["protein"],
        "carbs": food["carbs"],
        "fat": food["fat"],
        "serving_size": food["serving_size"],
        "serving_unit": food["serving_unit"],
        "meal_type": body["meal_type"],
    }));
    reply(StatusCode::CREATED, json!({ "message": "Meal logged" }))
}

async fn search_food(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Reply {
    let state = state.lock().unwrap();
    if state.user_for(&headers).is_none() {
        return unauthorized();
    }
    let needle = query.get("search").cloned().unwrap_or_default().to_lowercase();
    let foods: Vec<Value> = state
        .foods
        .iter()
        .filter(|f| {
            f["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();
    reply(StatusCode::OK, json!({ "foods": foods }))
}

async fn barcode(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(upc): Path<String>,
) -> Reply {
    let state = state.lock().unwrap();
    if state.user_for(&headers).is_none() {
        return unauthorized();
    }
    match state.foods.iter().find(|f| f["barcode"] == upc.as_str()) {
        Some(food) => reply(StatusCode::OK, json!({ "food": food })),
        None => reply(StatusCode::NOT_FOUND, json!({ "message": "Food not found" })),
    }
}

async fn custom_food(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Reply {
    let mut state = state.lock().unwrap();
    if state.user_for(&headers).is_none() {
        return unauthorized();
    }
    let id = state.next_id();
    body["id"] = json!(id);
    state.foods.push(body);
    reply(
        StatusCode::CREATED,
        json!({ "message": "Food added", "foodId": id }),
    )
}

async fn get_chat(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let state = state.lock().unwrap();
    if state.user_for(&headers).is_none() {
        return unauthorized();
    }
    if state.fail_chat {
        return reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "Chat unavailable" }),
        );
    }
    reply(StatusCode::OK, json!({ "messages": state.chat }))
}

async fn post_chat(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().unwrap();
    let Some(user) = state.user_for(&headers) else {
        return unauthorized();
    };
    let id = state.next_id();
    state.chat.push(json!({
        "id": id,
        "sender_id": user.id,
        "message": body["message"],
        "created_at": "2025-01-01T10:00:00Z",
    }));
    reply(StatusCode::CREATED, json!({ "message": "Sent" }))
}

async fn recommend(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let state = state.lock().unwrap();
    if state.user_for(&headers).is_none() {
        return unauthorized();
    }
    let kind = body["type"].as_str().unwrap_or_default();
    let query = body["query"].as_str().unwrap_or_default();
    reply(
        StatusCode::OK,
        json!({ "reply": format!("{} for {}", kind, query) }),
    )
}
