pub mod dto;

use std::env;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{AuthChange, AuthEvent, Session, SignUpOutcome, User};
use crate::store::{AuthProvider, Filter, RemoteStore, Select};

const DEFAULT_APP_ORIGIN: &str = "http://localhost:3000";
/// Stored sessions this close to expiry are refreshed before being handed out.
const EXPIRY_MARGIN_SECS: i64 = 10;
const EVENT_CAPACITY: usize = 16;

#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    /// Origin of the web app; email confirmation links land on `<origin>/auth`.
    pub app_origin: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            app_origin: DEFAULT_APP_ORIGIN.to_string(),
        }
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let url = env::var("SUPABASE_URL")
            .map_err(|_| AppError::Config("SUPABASE_URL".to_string()))?;
        let anon_key = env::var("SUPABASE_ANON_KEY")
            .map_err(|_| AppError::Config("SUPABASE_ANON_KEY".to_string()))?;

        let mut config = Self::new(url, anon_key);
        if let Ok(origin) = env::var("APP_ORIGIN") {
            config.app_origin = origin.trim_end_matches('/').to_string();
        }
        Ok(config)
    }

    pub fn redirect_url(&self) -> String {
        format!("{}/auth", self.app_origin)
    }
}

/// Talks to the hosted PostgREST and GoTrue APIs and keeps the signed-in session,
/// which authorizes every data request made afterwards.
pub struct SupabaseHttpClient {
    client: Client,
    config: SupabaseConfig,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
}

impl SupabaseHttpClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            client,
            config,
            session: RwLock::new(None),
            events,
        })
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, AppError> {
        let base = format!("{}{}", self.config.url, path);
        let parsed = if params.is_empty() {
            Url::parse(&base)
        } else {
            Url::parse_with_params(&base, params)
        };
        parsed.map_err(|_| AppError::InvalidConfig {
            key: "SUPABASE_URL",
            value: base,
        })
    }

    fn stored_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_session(&self, session: Option<Session>, event: AuthEvent) {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session.clone();
        // Nobody listening is fine.
        let _ = self.events.send(AuthChange { event, session });
    }

    /// Data request authorized by the signed-in user, or by the anon key when signed out.
    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, AppError> {
        let token = self
            .fresh_session()
            .await?
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.config.anon_key.clone());

        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", token)))
    }

    /// Stored session, refreshed first when it expires within the margin.
    async fn fresh_session(&self) -> Result<Option<Session>, AppError> {
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };

        if !session.expires_within(Utc::now(), Duration::seconds(EXPIRY_MARGIN_SECS)) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            self.replace_session(None, AuthEvent::SignedOut);
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(fresh) => {
                debug!("refreshed session for {}", fresh.user.id);
                self.replace_session(Some(fresh.clone()), AuthEvent::TokenRefreshed);
                Ok(Some(fresh))
            }
            Err(err) => {
                self.replace_session(None, AuthEvent::SignedOut);
                Err(err)
            }
        }
    }

    async fn rows(response: Response) -> Result<Vec<Value>, AppError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let parsed: Option<dto::RestError> = serde_json::from_str(&body).ok();
            let (code, message) = match parsed {
                Some(err) => {
                    let mut message = err.message.unwrap_or_else(|| body.clone());
                    if let Some(details) = err.details.filter(|d| !d.is_empty()) {
                        message = format!("{} ({})", message, details);
                    }
                    if let Some(hint) = err.hint {
                        debug!("store hint: {}", hint);
                    }
                    (err.code, message)
                }
                None => (None, body),
            };
            return Err(AppError::Store {
                status: status.as_u16(),
                code,
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&body).map_err(AppError::decode("response"))? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }

    async fn auth_failure(response: Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<dto::AuthErrorBody>(&body)
            .ok()
            .and_then(dto::AuthErrorBody::into_message)
            .unwrap_or_else(|| format!("Auth request failed with status {}", status));

        AppError::Auth {
            status: status.as_u16(),
            message,
        }
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<Session, AppError> {
        let url = self.endpoint("/auth/v1/token", &[("grant_type", grant_type.to_string())])?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.config.anon_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_failure(response).await);
        }

        let value: Value = response.json().await?;
        let session = serde_json::from_value::<Session>(value).map_err(AppError::decode("session"))?;

        Ok(session.stamp_expiry(Utc::now()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AppError> {
        let body = serde_json::to_value(dto::RefreshTokenRequest { refresh_token })
            .map_err(AppError::decode("refresh request"))?;
        self.token_grant("refresh_token", body).await
    }
}

#[async_trait]
impl RemoteStore for SupabaseHttpClient {
    async fn select(&self, table: &str, query: &Select) -> Result<Vec<Value>, AppError> {
        let mut params = vec![("select", query.columns.clone())];
        for filter in &query.filters {
            params.push((filter.column.as_str(), format!("eq.{}", filter.value)));
        }
        if let Some(order) = &query.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order", format!("{}.{}", order.column, direction)));
        }

        let url = self.endpoint(&format!("/rest/v1/{}", table), &params)?;
        debug!("select {}", url);
        let response = self.request(Method::GET, url).await?.send().await?;
        Self::rows(response).await
    }

    async fn insert(&self, table: &str, rows: Value) -> Result<Vec<Value>, AppError> {
        let rows = match rows {
            Value::Array(_) => rows,
            row => Value::Array(vec![row]),
        };

        let url = self.endpoint(&format!("/rest/v1/{}", table), &[("select", "*".to_string())])?;
        let response = self
            .request(Method::POST, url)
            .await?
            .header("Prefer", "return=representation")
            .json(&rows)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn update(&self, table: &str, filter: &Filter, changes: Value) -> Result<Vec<Value>, AppError> {
        let url = self.endpoint(
            &format!("/rest/v1/{}", table),
            &[
                (filter.column.as_str(), format!("eq.{}", filter.value)),
                ("select", "*".to_string()),
            ],
        )?;
        let response = self
            .request(Method::PATCH, url)
            .await?
            .header("Prefer", "return=representation")
            .json(&changes)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<(), AppError> {
        let url = self.endpoint(
            &format!("/rest/v1/{}", table),
            &[(filter.column.as_str(), format!("eq.{}", filter.value))],
        )?;
        let response = self.request(Method::DELETE, url).await?.send().await?;
        Self::rows(response).await.map(|_| ())
    }
}

#[async_trait]
impl AuthProvider for SupabaseHttpClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> Result<SignUpOutcome, AppError> {
        let redirect = redirect_to
            .map(str::to_string)
            .unwrap_or_else(|| self.config.redirect_url());
        let url = self.endpoint("/auth/v1/signup", &[("redirect_to", redirect)])?;

        let response = self
            .client
            .post(url)
            .header("apikey", &self.config.anon_key)
            .json(&dto::PasswordCredentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::auth_failure(response).await);
        }

        let body: Value = response.json().await?;
        if body.get("access_token").is_some() {
            let session = serde_json::from_value::<Session>(body)
                .map_err(AppError::decode("session"))?
                .stamp_expiry(Utc::now());
            info!("signed up and signed in {}", email);
            self.replace_session(Some(session.clone()), AuthEvent::SignedIn);
            return Ok(SignUpOutcome::SignedIn(session));
        }

        let user_value = body.get("user").cloned().unwrap_or(body);
        let user = serde_json::from_value::<User>(user_value).map_err(AppError::decode("user"))?;
        info!("sign up pending email confirmation for {}", email);
        Ok(SignUpOutcome::ConfirmationSent(user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let body = serde_json::to_value(dto::PasswordCredentials { email, password })
            .map_err(AppError::decode("credentials"))?;
        let session = self.token_grant("password", body).await?;

        info!("signed in {}", email);
        self.replace_session(Some(session.clone()), AuthEvent::SignedIn);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        let Some(session) = self.stored_session() else {
            self.replace_session(None, AuthEvent::SignedOut);
            return Ok(());
        };

        let url = self.endpoint("/auth/v1/logout", &[])?;
        let result = self
            .client
            .post(url)
            .header("apikey", &self.config.anon_key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await;

        // The local session is dropped whatever the server says.
        self.replace_session(None, AuthEvent::SignedOut);

        let response = result?;
        if !response.status().is_success() {
            let err = Self::auth_failure(response).await;
            warn!("remote sign out failed: {}", err);
            return Err(err);
        }
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Session>, AppError> {
        self.fresh_session().await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }
}
