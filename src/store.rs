use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::AppError;
use crate::models::{AuthChange, Session, SignUpOutcome};

pub const COURSES: &str = "courses";
pub const TASKS: &str = "tasks";

/// `column = value` row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    /// Column list, e.g. `*` or `*,courses(name)`.
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Select {
    pub fn columns(columns: impl Into<String>) -> Self {
        Self {
            columns: columns.into(),
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending: true,
        });
        self
    }
}

/// Table-level access to the hosted data API. Row ownership is the store's concern.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, AppError>;
    /// Inserts `rows` (object or array) and returns the created rows.
    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, AppError>;
    /// Applies `changes` to every matching row and returns the updated rows.
    async fn update(&self, table: &str, filter: &Filter, changes: Value) -> Result<Vec<Value>, AppError>;
    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, AppError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;
    async fn sign_out(&self) -> Result<(), AppError>;
    async fn get_session(&self) -> Result<Option<Session>, AppError>;
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}
