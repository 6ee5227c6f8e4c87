pub mod course;
pub mod session;
pub mod task;

pub use course::{Course, NewCourse, UpdateCourse};
pub use session::{AuthChange, AuthEvent, Session, SignUpOutcome, User};
pub use task::{NewTask, Task, TaskCourse, TaskTag, UpdateTask};

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Row ids come back as strings (uuid) or numbers (identity columns).
pub(crate) fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    })
}

/// Accepts `date` columns (`2025-08-20`) as well as timestamps, keeping the day.
pub(crate) fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_day(s).map(Some).map_err(serde::de::Error::custom),
    }
}

pub(crate) fn parse_day(s: &str) -> Result<NaiveDate, String> {
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(day);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .or_else(|_| {
            s.get(..10)
                .ok_or(())
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").map_err(|_| ()))
        })
        .map_err(|_| format!("invalid date: {s}"))
}
