use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de_id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub professor: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update. `Some(None)` on a nullable column clears it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCourse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professor: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semester: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl Course {
    pub fn code(&self) -> Option<&str> {
        self.course_code.as_deref().filter(|c| !c.trim().is_empty())
    }
}
