#![allow(dead_code)]

//! In-process fixtures for integration tests: a fake hosted backend (data
//! API + auth API) and the BabyZoom router pointed at it, each on its own
//! `portpicker` port.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use babyzoom::app::{router, AppState};
use babyzoom::config::AppConfig;
use babyzoom::database::models::Table;

pub const ANON_KEY: &str = "anon-test-key";
pub const PASSWORD: &str = "correct horse";

#[derive(Default)]
struct Accounts {
    users: HashMap<String, (String, Uuid)>,
    tokens: HashMap<String, (Uuid, String)>,
    recoveries: Vec<String>,
}

#[derive(Default)]
pub struct FakeState {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    accounts: Mutex<Accounts>,
    confirm_signups: Mutex<bool>,
}

/// Fake of the hosted backend: PostgREST-style tables with row ownership,
/// plus the password auth endpoints.
pub struct FakeBackend {
    pub url: String,
    state: Arc<FakeState>,
}

impl FakeBackend {
    pub async fn start() -> Result<Self> {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/rest/v1/:table", get(rest_select).post(rest_insert).patch(rest_update))
            .route("/auth/v1/user", get(auth_user))
            .route("/auth/v1/token", post(auth_token))
            .route("/auth/v1/signup", post(auth_signup))
            .route("/auth/v1/recover", post(auth_recover))
            .route("/auth/v1/logout", post(auth_logout))
            .with_state(state.clone());

        let url = serve(app).await?;
        Ok(Self { url, state })
    }

    pub fn create_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        let mut accounts = self.state.accounts.lock().unwrap();
        accounts.users.insert(email.to_string(), (PASSWORD.to_string(), id));
        id
    }

    /// Issue a token directly, as a completed sign-in would
    pub fn issue_token(&self, email: &str) -> String {
        let mut accounts = self.state.accounts.lock().unwrap();
        let (_, id) = accounts.users.get(email).cloned().expect("unknown test user");
        let token = format!("fake-token-{}", Uuid::new_v4());
        accounts.tokens.insert(token.clone(), (id, email.to_string()));
        token
    }

    pub fn require_confirmation(&self) {
        *self.state.confirm_signups.lock().unwrap() = true;
    }

    pub fn is_live(&self, token: &str) -> bool {
        self.state.accounts.lock().unwrap().tokens.contains_key(token)
    }

    pub fn recoveries(&self) -> Vec<String> {
        self.state.accounts.lock().unwrap().recoveries.clone()
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.state.tables.lock().unwrap().get(&table).cloned().unwrap_or_default()
    }

    pub fn insert_row(&self, table: Table, row: Value) {
        let row = with_defaults(table, row);
        self.state.tables.lock().unwrap().entry(table).or_default().push(row);
    }

    pub fn user_exists(&self, email: &str) -> bool {
        self.state.accounts.lock().unwrap().users.contains_key(email)
    }
}

/// The application router on its own port, wired to a [`FakeBackend`]
pub struct TestApp {
    pub base_url: String,
    pub fake: FakeBackend,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn start() -> Result<Self> {
        let fake = FakeBackend::start().await?;
        let backend_url = fake.url.clone();
        let config = AppConfig::from_lookup(move |key| match key {
            "SUPABASE_URL" => Some(backend_url.clone()),
            "SUPABASE_ANON_KEY" => Some(ANON_KEY.to_string()),
            "API_ENABLE_REQUEST_LOGGING" => Some("false".to_string()),
            _ => None,
        })?;
        let state = AppState::from_config(config)?;
        let base_url = serve(router(state)).await?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { base_url, fake, client })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create an account and return a live access token for it
    pub fn signed_up(&self, email: &str) -> String {
        self.fake.create_user(email);
        self.fake.issue_token(email)
    }

    pub fn get_page(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        with_cookie(self.client.get(self.url(path)), token)
    }

    pub fn post_form(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        with_cookie(self.client.post(self.url(path)), token)
    }

    pub fn api_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn api_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }
}

fn with_cookie(builder: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => builder.header(COOKIE, format!("sb-access-token={}", token)),
        None => builder,
    }
}

pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The raw `Set-Cookie` line for the session cookie, if any
pub fn session_set_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("sb-access-token="))
        .map(str::to_string)
}

pub fn cookie_value(set_cookie: &str) -> &str {
    set_cookie
        .trim_start_matches("sb-access-token=")
        .split(';')
        .next()
        .unwrap_or_default()
}

pub fn owned_by(rows: &[Value], table: Table, user_id: Uuid) -> usize {
    let id = user_id.to_string();
    rows.iter()
        .filter(|row| row.get(table.owner_column()).and_then(Value::as_str) == Some(id.as_str()))
        .count()
}

async fn serve(app: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

// --- data API -------------------------------------------------------------

fn rest_error(status: StatusCode, message: &str, code: &str) -> Response {
    (status, Json(json!({ "message": message, "code": code, "hint": null, "details": null }))).into_response()
}

fn caller(state: &FakeState, headers: &HeaderMap) -> Option<Uuid> {
    if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some(ANON_KEY) {
        return None;
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;
    state.accounts.lock().unwrap().tokens.get(token).map(|(id, _)| *id)
}

fn table_named(name: &str) -> Result<Table, Response> {
    Table::from_name(name).ok_or_else(|| {
        rest_error(
            StatusCode::NOT_FOUND,
            &format!("relation \"public.{}\" does not exist", name),
            "42P01",
        )
    })
}

fn owns(table: Table, row: &Value, user: Uuid) -> bool {
    row.get(table.owner_column()).and_then(Value::as_str) == Some(user.to_string().as_str())
}

fn with_defaults(table: Table, row: Value) -> Value {
    let mut row = match row {
        Value::Object(map) => map,
        other => return other,
    };
    let now = json!(Utc::now().to_rfc3339());
    row.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
    row.entry("created_at").or_insert_with(|| now.clone());
    match table {
        Table::Profiles => {
            row.entry("updated_at").or_insert(now);
        }
        Table::Routines | Table::Vaccines => {
            row.entry("completed").or_insert(json!(false));
        }
        Table::Achievements => {
            row.entry("unlocked").or_insert(json!(false));
        }
        Table::Naps => {}
    }
    Value::Object(row)
}

async fn rest_select(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let Some(user) = caller(&state, &headers) else {
        return rest_error(StatusCode::UNAUTHORIZED, "JWT expired", "PGRST301");
    };
    let table = match table_named(&table) {
        Ok(table) => table,
        Err(response) => return response,
    };
    let query = match RowQuery::parse(&pairs) {
        Ok(query) => query,
        Err(message) => return rest_error(StatusCode::BAD_REQUEST, &message, "PGRST100"),
    };

    let visible: Vec<Value> = state
        .tables
        .lock()
        .unwrap()
        .get(&table)
        .map(|rows| rows.iter().filter(|row| owns(table, row, user)).cloned().collect())
        .unwrap_or_default();
    Json(query.apply(visible)).into_response()
}

async fn rest_insert(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> Response {
    let Some(user) = caller(&state, &headers) else {
        return rest_error(StatusCode::UNAUTHORIZED, "JWT expired", "PGRST301");
    };
    let table = match table_named(&table) {
        Ok(table) => table,
        Err(response) => return response,
    };
    let key: Vec<String> = pairs
        .iter()
        .find(|(k, _)| k == "on_conflict")
        .map(|(_, v)| v.split(',').map(str::to_string).collect())
        .unwrap_or_else(|| vec!["id".to_string()]);
    let ignore_duplicates = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("resolution=ignore-duplicates"))
        .unwrap_or(false);

    let rows = match body {
        Value::Array(rows) => rows,
        row => vec![row],
    };
    if rows.iter().any(|row| !owns(table, row, user)) {
        return rest_error(
            StatusCode::FORBIDDEN,
            &format!("new row violates row-level security policy for table \"{}\"", table),
            "42501",
        );
    }

    let mut tables = state.tables.lock().unwrap();
    let existing = tables.entry(table).or_default();
    let mut created = Vec::new();
    for row in rows {
        let row = with_defaults(table, row);
        let duplicate = existing
            .iter()
            .any(|other| key.iter().all(|c| other.get(c) == row.get(c)));
        if duplicate {
            if ignore_duplicates {
                continue;
            }
            return rest_error(
                StatusCode::CONFLICT,
                "duplicate key value violates unique constraint",
                "23505",
            );
        }
        existing.push(row.clone());
        created.push(row);
    }
    (StatusCode::CREATED, Json(Value::Array(created))).into_response()
}

async fn rest_update(
    State(state): State<Arc<FakeState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
    Json(patch): Json<Value>,
) -> Response {
    let Some(user) = caller(&state, &headers) else {
        return rest_error(StatusCode::UNAUTHORIZED, "JWT expired", "PGRST301");
    };
    let table = match table_named(&table) {
        Ok(table) => table,
        Err(response) => return response,
    };
    let query = match RowQuery::parse(&pairs) {
        Ok(query) => query,
        Err(message) => return rest_error(StatusCode::BAD_REQUEST, &message, "PGRST100"),
    };
    let Value::Object(changes) = patch else {
        return rest_error(StatusCode::BAD_REQUEST, "patch body must be an object", "PGRST102");
    };

    let mut tables = state.tables.lock().unwrap();
    let mut updated = Vec::new();
    for row in tables.entry(table).or_default().iter_mut() {
        if !owns(table, row, user) || !query.matches(row) {
            continue;
        }
        if let Value::Object(target) = row {
            for (k, v) in &changes {
                target.insert(k.clone(), v.clone());
            }
        }
        updated.push(row.clone());
    }
    Json(Value::Array(updated)).into_response()
}

/// The slice of the data API query syntax the app sends: `select`,
/// `col=eq.v`, `order=col.dir` and `limit`.
#[derive(Default)]
struct RowQuery {
    columns: Vec<String>,
    equals: Vec<(String, String)>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
}

impl RowQuery {
    fn parse(pairs: &[(String, String)]) -> Result<Self, String> {
        let mut query = RowQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "select" => {
                    query.columns = value
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty() && *c != "*")
                        .map(str::to_string)
                        .collect();
                }
                "order" => {
                    query.order = value
                        .split(',')
                        .map(|part| match part.split_once('.') {
                            Some((column, dir)) => (column.to_string(), dir == "desc"),
                            None => (part.to_string(), false),
                        })
                        .collect();
                }
                "limit" => {
                    query.limit = Some(value.parse().map_err(|_| format!("invalid limit {}", value))?);
                }
                column => {
                    let wanted = value
                        .strip_prefix("eq.")
                        .ok_or_else(|| format!("unsupported condition {}={}", column, value))?;
                    query.equals.push((column.to_string(), wanted.to_string()));
                }
            }
        }
        Ok(query)
    }

    fn matches(&self, row: &Value) -> bool {
        self.equals
            .iter()
            .all(|(column, wanted)| row.get(column).map(|v| scalar(v) == *wanted).unwrap_or(false))
    }

    fn apply(&self, rows: Vec<Value>) -> Vec<Value> {
        let mut matched: Vec<Value> = rows.into_iter().filter(|row| self.matches(row)).collect();
        matched.sort_by(|a, b| {
            for (column, descending) in &self.order {
                let ordering = compare(a.get(column), b.get(column));
                let ordering = if *descending { ordering.reverse() } else { ordering };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        if let Some(limit) = self.limit {
            matched.truncate(limit);
        }
        if self.columns.is_empty() {
            return matched;
        }
        matched
            .into_iter()
            .map(|row| {
                let picked = self
                    .columns
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect();
                Value::Object(picked)
            })
            .collect()
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(x), Some(y)) => scalar(x).cmp(&scalar(y)),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

// --- auth API -------------------------------------------------------------

#[derive(Deserialize)]
struct Credentials {
    email: String,
    #[serde(default)]
    password: String,
}

fn auth_error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn session_body(token: &str, id: Uuid, email: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": format!("refresh-{}", token),
        "user": { "id": id, "email": email, "aud": "authenticated" }
    })
}

async fn auth_user(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    let accounts = state.accounts.lock().unwrap();
    match bearer(&headers).and_then(|t| accounts.tokens.get(&t).cloned()) {
        Some((id, email)) => Json(json!({ "id": id, "email": email, "aud": "authenticated" })).into_response(),
        None => auth_error(StatusCode::UNAUTHORIZED, json!({ "code": 401, "msg": "invalid JWT" })),
    }
}

async fn auth_token(
    State(state): State<Arc<FakeState>>,
    Query(params): Query<HashMap<String, String>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    if params.get("grant_type").map(String::as_str) != Some("password") {
        return auth_error(
            StatusCode::BAD_REQUEST,
            json!({ "error": "unsupported_grant_type", "error_description": "unsupported grant type" }),
        );
    }
    let mut accounts = state.accounts.lock().unwrap();
    let id = match accounts.users.get(&credentials.email) {
        Some((password, id)) if *password == credentials.password => *id,
        _ => {
            return auth_error(
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
            )
        }
    };
    let token = format!("fake-token-{}", Uuid::new_v4());
    accounts.tokens.insert(token.clone(), (id, credentials.email.clone()));
    Json(session_body(&token, id, &credentials.email)).into_response()
}

async fn auth_signup(State(state): State<Arc<FakeState>>, Json(credentials): Json<Credentials>) -> Response {
    let confirm = *state.confirm_signups.lock().unwrap();
    let mut accounts = state.accounts.lock().unwrap();
    if accounts.users.contains_key(&credentials.email) {
        return auth_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "code": 422, "msg": "User already registered" }),
        );
    }
    if credentials.password.len() < 6 {
        return auth_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "code": 422, "msg": "Password should be at least 6 characters" }),
        );
    }

    let id = Uuid::new_v4();
    accounts.users.insert(credentials.email.clone(), (credentials.password, id));
    if confirm {
        return Json(json!({ "id": id, "email": credentials.email, "confirmation_sent_at": Utc::now() })).into_response();
    }
    let token = format!("fake-token-{}", Uuid::new_v4());
    accounts.tokens.insert(token.clone(), (id, credentials.email.clone()));
    Json(session_body(&token, id, &credentials.email)).into_response()
}

async fn auth_recover(State(state): State<Arc<FakeState>>, Json(credentials): Json<Credentials>) -> Response {
    state.accounts.lock().unwrap().recoveries.push(credentials.email);
    Json(json!({})).into_response()
}

async fn auth_logout(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    let mut accounts = state.accounts.lock().unwrap();
    match bearer(&headers).and_then(|t| accounts.tokens.remove(&t)) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => auth_error(StatusCode::UNAUTHORIZED, json!({ "code": 401, "msg": "invalid JWT" })),
    }
}
