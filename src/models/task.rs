use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{de_id, de_opt_date};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub course_id: String,
    pub title: String,
    /// Stored as free text; only the task form restricts it to [`TaskTag`].
    #[serde(default)]
    pub tag: String,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    /// Parent course embedded by the `courses(...)` join.
    #[serde(default, rename = "courses", skip_serializing_if = "Option::is_none")]
    pub course: Option<TaskCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCourse {
    pub name: String,
    #[serde(default)]
    pub course_code: Option<String>,
}

impl Task {
    pub fn course_name(&self) -> Option<&str> {
        self.course.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub course_id: String,
    pub title: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTask {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskTag {
    Assignment,
    Homework,
    Lab,
    Quiz,
    Test,
    Midterm,
    #[serde(rename = "Final Exam")]
    FinalExam,
    Reading,
}

impl TaskTag {
    /// Options offered by the task form, in display order.
    pub const ALL: [TaskTag; 8] = [
        TaskTag::Assignment,
        TaskTag::Homework,
        TaskTag::Lab,
        TaskTag::Quiz,
        TaskTag::Test,
        TaskTag::Midterm,
        TaskTag::FinalExam,
        TaskTag::Reading,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskTag::Assignment => "Assignment",
            TaskTag::Homework => "Homework",
            TaskTag::Lab => "Lab",
            TaskTag::Quiz => "Quiz",
            TaskTag::Test => "Test",
            TaskTag::Midterm => "Midterm",
            TaskTag::FinalExam => "Final Exam",
            TaskTag::Reading => "Reading",
        }
    }
}

impl fmt::Display for TaskTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| format!("unknown task tag: {s}"))
    }
}
