//! In-process stand-ins for the hosted data and auth APIs.
//!
//! They follow the same contracts as [`crate::supabase::SupabaseHttpClient`]: ids and
//! `created_at` are assigned on insert, `courses(...)` style embeds resolve through the
//! `<singular>_id` column, and auth requires email confirmation unless built with
//! [`MemoryAuth::auto_confirming`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{AuthChange, AuthEvent, Session, SignUpOutcome, User};
use crate::store::{AuthProvider, Filter, RemoteStore, Select, TASKS};

type Row = Map<String, Value>;

const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_TTL_SECS: i64 = 3600;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    defaults: HashMap<String, Row>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut task_defaults = Row::new();
        task_defaults.insert("completed".to_string(), Value::Bool(false));

        Self {
            tables: Mutex::new(HashMap::new()),
            defaults: HashMap::from([(TASKS.to_string(), task_defaults)]),
        }
    }

    /// Number of rows currently held in `table`.
    pub fn len(&self, table: &str) -> usize {
        lock(&self.tables).get(table).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    row.get(&filter.column)
        .and_then(text)
        .is_some_and(|v| v == filter.value)
}

/// Nulls sort after every value.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => text(x).cmp(&text(y)),
    }
}

enum Column {
    All,
    Named(String),
    Embed { table: String, columns: Vec<Column> },
}

/// Parses a select list such as `*,courses(name,course_code)`.
fn parse_columns(spec: &str) -> Vec<Column> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in spec.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&spec[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&spec[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|part| {
            if part == "*" {
                Column::All
            } else if let (Some(open), true) = (part.find('('), part.ends_with(')')) {
                Column::Embed {
                    table: part[..open].trim().to_string(),
                    columns: parse_columns(&part[open + 1..part.len() - 1]),
                }
            } else {
                Column::Named(part.to_string())
            }
        })
        .collect()
}

fn project(row: &Row, columns: &[Column], tables: &HashMap<String, Vec<Row>>) -> Row {
    let mut out = Row::new();
    for column in columns {
        match column {
            Column::All => out.extend(row.iter().map(|(k, v)| (k.clone(), v.clone()))),
            Column::Named(name) => {
                out.insert(name.clone(), row.get(name).cloned().unwrap_or(Value::Null));
            }
            Column::Embed { table, columns } => {
                let foreign_key = format!("{}_id", table.trim_end_matches('s'));
                let parent = row.get(&foreign_key).and_then(text).and_then(|id| {
                    tables
                        .get(table)?
                        .iter()
                        .find(|r| r.get("id").and_then(text).as_deref() == Some(id.as_str()))
                });
                let embedded = parent
                    .map(|p| Value::Object(project(p, columns, tables)))
                    .unwrap_or(Value::Null);
                out.insert(table.clone(), embedded);
            }
        }
    }
    out
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, AppError> {
        let tables = lock(&self.tables);
        let mut rows: Vec<&Row> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                if order.ascending { ord } else { ord.reverse() }
            });
        }

        let columns = parse_columns(&query.columns);
        Ok(rows
            .into_iter()
            .map(|row| Value::Object(project(row, &columns, &tables)))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, AppError> {
        let rows = match rows {
            Value::Array(rows) => rows,
            row => vec![row],
        };

        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let Value::Object(mut row) = row else {
                return Err(AppError::BadRequest(format!("insert into {} expects objects", table)));
            };
            row.entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            row.entry("created_at")
                .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
            if let Some(defaults) = self.defaults.get(table) {
                for (column, value) in defaults {
                    row.entry(column.clone()).or_insert_with(|| value.clone());
                }
            }
            created.push(row);
        }

        let mut tables = lock(&self.tables);
        tables
            .entry(table.to_string())
            .or_default()
            .extend(created.iter().cloned());
        debug!("inserted {} row(s) into {}", created.len(), table);

        Ok(created.into_iter().map(Value::Object).collect())
    }

    async fn update(&self, table: &str, filter: &Filter, changes: Value) -> Result<Vec<Value>, AppError> {
        let Value::Object(changes) = changes else {
            return Err(AppError::BadRequest(format!("update of {} expects an object", table)));
        };

        let mut tables = lock(&self.tables);
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| matches(row, filter)) {
            for (column, value) in &changes {
                row.insert(column.clone(), value.clone());
            }
            updated.push(Value::Object(row.clone()));
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), AppError> {
        if let Some(rows) = lock(&self.tables).get_mut(table) {
            rows.retain(|row| !matches(row, filter));
        }
        Ok(())
    }
}

struct Account {
    user: User,
    password: String,
    confirmed: bool,
}

pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
    auto_confirm: bool,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            events,
            auto_confirm: false,
        }
    }

    /// Sign-ups are confirmed and signed in immediately.
    pub fn auto_confirming() -> Self {
        Self {
            auto_confirm: true,
            ..Self::new()
        }
    }

    /// Registers an already confirmed account.
    pub fn with_account(self, email: &str, password: &str) -> Self {
        lock(&self.accounts).insert(
            email.to_lowercase(),
            Account {
                user: new_user(email, true),
                password: password.to_string(),
                confirmed: true,
            },
        );
        self
    }

    /// Plays the part of the user clicking the emailed link.
    pub fn confirm_email(&self, email: &str) -> bool {
        match lock(&self.accounts).get_mut(&email.to_lowercase()) {
            Some(account) => {
                account.confirmed = true;
                account.user.email_confirmed_at = Some(Utc::now().to_rfc3339());
                true
            }
            None => false,
        }
    }

    fn issue(&self, user: User, event: AuthEvent) -> Session {
        let now = Utc::now();
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: Some(Uuid::new_v4().to_string()),
            token_type: "bearer".to_string(),
            expires_in: Some(TOKEN_TTL_SECS),
            expires_at: Some(now.timestamp() + TOKEN_TTL_SECS),
            user,
        };
        *lock(&self.session) = Some(session.clone());
        let _ = self.events.send(AuthChange {
            event,
            session: Some(session.clone()),
        });
        session
    }
}

fn new_user(email: &str, confirmed: bool) -> User {
    User {
        id: Uuid::new_v4().to_string(),
        email: Some(email.to_string()),
        email_confirmed_at: confirmed.then(|| Utc::now().to_rfc3339()),
        user_metadata: Value::Object(Map::new()),
    }
}

fn rejected(status: u16, message: &str) -> AppError {
    AppError::Auth {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, AppError> {
        if !email.contains('@') {
            return Err(rejected(400, "Unable to validate email address: invalid format"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(rejected(422, "Password should be at least 6 characters."));
        }

        let user = {
            let mut accounts = lock(&self.accounts);
            let key = email.to_lowercase();
            if accounts.contains_key(&key) {
                return Err(rejected(422, "User already registered"));
            }
            let user = new_user(email, self.auto_confirm);
            accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password: password.to_string(),
                    confirmed: self.auto_confirm,
                },
            );
            user
        };

        if self.auto_confirm {
            Ok(SignUpOutcome::SignedIn(self.issue(user, AuthEvent::SignedIn)))
        } else {
            Ok(SignUpOutcome::ConfirmationSent(user))
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let user = {
            let accounts = lock(&self.accounts);
            let account = accounts
                .get(&email.to_lowercase())
                .filter(|a| a.password == password)
                .ok_or_else(|| rejected(400, "Invalid login credentials"))?;
            if !account.confirmed {
                return Err(rejected(400, "Email not confirmed"));
            }
            account.user.clone()
        };
        Ok(self.issue(user, AuthEvent::SignedIn))
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        *lock(&self.session) = None;
        let _ = self.events.send(AuthChange {
            event: AuthEvent::SignedOut,
            session: None,
        });
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, AppError> {
        Ok(lock(&self.session).clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}
