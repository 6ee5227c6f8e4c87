use chrono::NaiveDate;

use crate::models::{NewTask, Task, TaskTag, UpdateTask};

use super::Draft;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    /// `None` until a tag is picked.
    pub tag: Option<TaskTag>,
    pub due_date: Option<NaiveDate>,
}

impl TaskDraft {
    /// Takes the value of a date input; anything but `YYYY-MM-DD` unsets the date.
    pub fn set_due_date(&mut self, value: &str) {
        self.due_date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok();
    }

    /// Takes the value of the tag select; unknown values unset the tag.
    pub fn set_tag(&mut self, value: &str) {
        self.tag = value.parse().ok();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskPayload {
    /// Set when editing an existing task.
    pub id: Option<String>,
    pub title: String,
    pub tag: TaskTag,
    pub due_date: NaiveDate,
}

impl Draft for TaskDraft {
    type Initial = Task;
    type Payload = TaskPayload;

    fn from_initial(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            tag: task.tag.parse().ok(),
            due_date: task.due_date,
        }
    }

    fn initial_id(task: &Task) -> String {
        task.id.clone()
    }

    fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && self.tag.is_some() && self.due_date.is_some()
    }

    fn to_payload(&self, id: Option<String>) -> Option<TaskPayload> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(TaskPayload {
            id,
            title: title.to_string(),
            tag: self.tag?,
            due_date: self.due_date?,
        })
    }
}

impl TaskPayload {
    pub fn into_new_task(self, course_id: impl Into<String>) -> NewTask {
        NewTask {
            course_id: course_id.into(),
            title: self.title,
            tag: self.tag.to_string(),
            due_date: Some(self.due_date),
        }
    }
}

impl From<TaskPayload> for UpdateTask {
    fn from(p: TaskPayload) -> Self {
        UpdateTask {
            title: Some(p.title),
            tag: Some(p.tag.to_string()),
            due_date: Some(p.due_date),
            completed: None,
        }
    }
}
