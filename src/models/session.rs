use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::de_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl User {
    /// Name shown in greetings: profile name if the user set one, else the email.
    pub fn display_name(&self) -> String {
        ["full_name", "name"]
            .iter()
            .find_map(|key| self.user_metadata.get(key).and_then(|v| v.as_str()))
            .filter(|name| !name.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "there".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }

    /// True when the token expires within `margin` of `now`.
    pub fn expires_within(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at()
            .is_some_and(|at| at <= now + margin)
    }

    /// Fills `expires_at` from `expires_in` when the provider only sent the latter.
    pub(crate) fn stamp_expiry(mut self, now: DateTime<Utc>) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = self.expires_in.map(|secs| now.timestamp() + secs);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Pushed by an auth provider whenever its session changes.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account exists but must be confirmed from the emailed link.
    ConfirmationSent(User),
    /// The project auto-confirms accounts; the user is signed in already.
    SignedIn(Session),
}
