//! In-memory stand-ins for the hosted backend used by unit tests.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{
    AccessToken, AuthError, AuthService, AuthUser, Authenticated, Session, SignUpOutcome,
};
use crate::backend::Backend;
use crate::database::models::Table;
use crate::database::{OnConflict, RemoteStore, StoreError};
use crate::filter::Filter;
use crate::types::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Select,
    Insert,
    Update,
}

#[derive(Default)]
struct MemoryTables {
    rows: HashMap<Table, Vec<Value>>,
    failures: HashSet<(StoreOp, Table)>,
    calls: HashMap<(StoreOp, Table), usize>,
    sequence: i64,
}

/// Table store with the data API's defaults and conflict handling
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryTables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: Table) -> Vec<Value> {
        self.lock().rows.get(&table).cloned().unwrap_or_default()
    }

    pub fn rows_for(&self, table: Table, user_id: Uuid) -> Vec<Value> {
        let owner = table.owner_column();
        self.rows(table)
            .into_iter()
            .filter(|row| row.get(owner).and_then(Value::as_str) == Some(user_id.to_string().as_str()))
            .collect()
    }

    /// Make every `op` against `table` fail with a 500 until healed
    pub fn fail(&self, op: StoreOp, table: Table) {
        self.lock().failures.insert((op, table));
    }

    pub fn heal(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self, op: StoreOp, table: Table) -> usize {
        self.lock().calls.get(&(op, table)).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryTables> {
        self.inner.lock().unwrap()
    }

    fn enter(&self, op: StoreOp, table: Table) -> Result<(), StoreError> {
        let mut inner = self.lock();
        *inner.calls.entry((op, table)).or_default() += 1;
        if inner.failures.contains(&(op, table)) {
            return Err(StoreError::Api {
                status: 500,
                message: format!("injected {:?} failure on {}", op, table),
                code: None,
            });
        }
        Ok(())
    }

    fn with_defaults(table: Table, row: Value, created_at: DateTime<Utc>) -> Value {
        let mut row = match row {
            Value::Object(map) => map,
            _ => return row,
        };
        let stamp = json!(created_at.to_rfc3339());
        row.entry("id").or_insert_with(|| json!(Uuid::new_v4()));
        row.entry("created_at").or_insert_with(|| stamp.clone());
        match table {
            Table::Profiles => {
                row.entry("updated_at").or_insert(stamp);
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

    fn conflicts(columns: &[&str], a: &Value, b: &Value) -> bool {
        columns.iter().all(|c| a.get(*c) == b.get(*c))
    }
}

/// Evaluates the query pairs a [`Filter`] encodes to: `select`,
/// `col=eq.v`, `order=col.dir` and `limit`.
#[derive(Debug, Default)]
pub struct RowQuery {
    columns: Vec<String>,
    equals: Vec<(String, String)>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
}

impl RowQuery {
    pub fn parse(pairs: &[(String, String)]) -> Self {
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
                "limit" => query.limit = value.parse().ok(),
                column => {
                    if let Some(wanted) = value.strip_prefix("eq.") {
                        query.equals.push((column.to_string(), wanted.to_string()));
                    }
                }
            }
        }
        query
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.equals
            .iter()
            .all(|(column, wanted)| row.get(column).map(|v| scalar(v) == *wanted).unwrap_or(false))
    }

    pub fn apply(&self, rows: Vec<Value>) -> Vec<Value> {
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

// Missing columns sort last
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

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, _token: &AccessToken, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        self.enter(StoreOp::Select, filter.table())?;
        let query = RowQuery::parse(&filter.to_query_pairs()?);
        Ok(query.apply(self.rows(filter.table())))
    }

    async fn insert(
        &self,
        _token: &AccessToken,
        table: Table,
        rows: Vec<Value>,
        on_conflict: Option<&OnConflict>,
    ) -> Result<Vec<Value>, StoreError> {
        self.enter(StoreOp::Insert, table)?;
        let mut inner = self.lock();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut created = Vec::new();
        for row in rows {
            inner.sequence += 1;
            let row = Self::with_defaults(table, row, base + Duration::seconds(inner.sequence));
            let existing = inner.rows.entry(table).or_default();

            let key: Vec<&str> = match on_conflict {
                Some(conflict) => conflict.columns.clone(),
                None => vec!["id"],
            };
            if existing.iter().any(|other| Self::conflicts(&key, other, &row)) {
                if on_conflict.map(|c| c.ignore_duplicates).unwrap_or(false) {
                    continue;
                }
                return Err(StoreError::Api {
                    status: 409,
                    message: "duplicate key value violates unique constraint".to_string(),
                    code: Some("23505".to_string()),
                });
            }
            existing.push(row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn update(
        &self,
        _token: &AccessToken,
        table: Table,
        id: Uuid,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        self.enter(StoreOp::Update, table)?;
        let mut inner = self.lock();
        let id = id.to_string();
        let mut updated = Vec::new();
        for row in inner.rows.entry(table).or_default().iter_mut() {
            if row.get("id").and_then(Value::as_str) != Some(id.as_str()) {
                continue;
            }
            if let (Value::Object(target), Value::Object(changes)) = (&mut *row, &patch) {
                for (k, v) in changes {
                    target.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }
}

#[derive(Default)]
struct MemoryAccounts {
    accounts: HashMap<String, (String, AuthUser)>,
    tokens: HashMap<String, AuthUser>,
    fail_validation: bool,
    require_confirmation: bool,
    recoveries: Vec<String>,
}

/// Auth service keeping accounts and issued tokens in memory
#[derive(Clone, Default)]
pub struct MemoryAuth {
    inner: Arc<Mutex<MemoryAccounts>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account and return a live session for it
    pub fn create_account(&self, email: &str, password: &str) -> Session {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        self.lock()
            .accounts
            .insert(email.to_string(), (password.to_string(), user.clone()));
        self.issue(user)
    }

    pub fn authenticated(&self, email: &str) -> Authenticated {
        let session = self.create_account(email, "secret");
        Authenticated {
            user: session.user,
            token: session.access_token,
        }
    }

    pub fn fail_validation(&self, fail: bool) {
        self.lock().fail_validation = fail;
    }

    pub fn require_confirmation(&self, required: bool) {
        self.lock().require_confirmation = required;
    }

    pub fn is_live(&self, token: &AccessToken) -> bool {
        self.lock().tokens.contains_key(token.as_str())
    }

    pub fn recoveries(&self) -> Vec<String> {
        self.lock().recoveries.clone()
    }

    fn issue(&self, user: AuthUser) -> Session {
        let now = Utc::now();
        let claims = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "session_id": Uuid::new_v4(),
            "exp": (now + Duration::hours(1)).timestamp(),
            "iat": now.timestamp(),
        });
        let raw = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"memory-auth")).unwrap();
        self.lock().tokens.insert(raw.clone(), user.clone());
        Session {
            access_token: AccessToken::new(raw),
            refresh_token: None,
            expires_in: Some(3600),
            user,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryAccounts> {
        self.inner.lock().unwrap()
    }
}

#[async_trait]
impl AuthService for MemoryAuth {
    async fn get_user(&self, token: &AccessToken) -> Result<Option<AuthUser>, AuthError> {
        let inner = self.lock();
        if inner.fail_validation {
            return Err(AuthError::InvalidResponse("auth service unavailable".to_string()));
        }
        Ok(inner.tokens.get(token.as_str()).cloned())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = match self.lock().accounts.get(email) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => {
                return Err(AuthError::Rejected {
                    status: 400,
                    message: "Invalid login credentials".to_string(),
                })
            }
        };
        Ok(self.issue(user))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        if self.lock().accounts.contains_key(email) {
            return Err(AuthError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let session = self.create_account(email, password);
        if self.lock().require_confirmation {
            self.lock().tokens.remove(session.access_token.as_str());
            return Ok(SignUpOutcome::ConfirmationRequired);
        }
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn recover_password(&self, email: &str) -> Result<(), AuthError> {
        self.lock().recoveries.push(email.to_string());
        Ok(())
    }

    async fn sign_out(&self, token: &AccessToken) -> Result<(), AuthError> {
        self.lock().tokens.remove(token.as_str());
        Ok(())
    }
}

/// Clock stuck at a settable instant
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Backend over the in-memory fakes, with the clock pinned at `now`
pub fn memory_backend(now: DateTime<Utc>) -> (Backend, MemoryStore, MemoryAuth, Arc<FixedClock>) {
    let store = MemoryStore::new();
    let auth = MemoryAuth::new();
    let clock = Arc::new(FixedClock::at(now));
    let backend = Backend::new(Arc::new(store.clone()), Arc::new(auth.clone()), clock.clone());
    (backend, store, auth, clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;

    #[tokio::test]
    async fn memory_store_honours_filter_order_limit_and_projection() {
        let store = MemoryStore::new();
        let token = AccessToken::new("t");
        let rows = vec![
            json!({ "id": 1, "user_id": "a", "time": "19:00" }),
            json!({ "id": 2, "user_id": "b", "time": "08:00" }),
            json!({ "id": 3, "user_id": "a", "time": "08:00" }),
            json!({ "id": 4, "user_id": "a", "time": "10:30" }),
        ];
        store.insert(&token, Table::Routines, rows, None).await.unwrap();

        let filter = Filter::new(Table::Routines)
            .select(&["id"])
            .eq("user_id", "a")
            .order("time", SortDirection::Asc)
            .limit(2);
        let out = store.select(&token, &filter).await.unwrap();
        assert_eq!(out, vec![json!({ "id": 3 }), json!({ "id": 4 })]);
    }
}
