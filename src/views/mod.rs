//! View models for the pages of the app.
//!
//! Views fetch through [`crate::repository`], keep the last confirmed lists, and build
//! render models on demand. A failed request leaves the lists untouched and parks a
//! message in the view's alert slot.

pub mod auth;
pub mod calendar;
pub mod course;
pub mod dashboard;
pub mod derive;
pub mod nav;
pub mod tasks;

pub use auth::{AuthForm, AuthMode, AuthScreen};
pub use calendar::{CalendarPage, CalendarView, LegendEntry, MonthView};
pub use course::{CoursePage, CoursePageView};
pub use dashboard::{CourseCard, Dashboard, DashboardPage};
pub use nav::{NavItem, Route, Section, sidebar};
pub use tasks::{TaskFilter, TaskList, TaskListPage};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::error;

use crate::error::AppError;
use crate::models::{Task, UpdateTask, User};
use crate::repository;
use crate::session::SessionContext;
use crate::store::RemoteStore;
use derive::{EventKind, format_due_date};

/// What a page shows for the current session and route.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<T> {
    /// The initial session lookup is still running.
    Loading,
    /// Signed out; the app should navigate here.
    Redirect(Route),
    /// Required route parameters are missing.
    NotFound,
    Ready(T),
}

impl<T> Screen<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Screen::Ready(page) => Some(page),
            _ => None,
        }
    }
}

/// Signed-in user, or the screen to show instead.
pub(crate) fn signed_in<T>(session: &SessionContext) -> Result<User, Screen<T>> {
    if session.is_loading() {
        return Err(Screen::Loading);
    }
    session.user().ok_or(Screen::Redirect(Route::Auth))
}

/// Logs a failed call and stores the message shown to the user.
pub(crate) fn report(alert: &mut Option<String>, action: &str, err: &AppError) {
    error!("error trying to {}: {}", action, err);
    *alert = Some(format!("Failed to {}. {}", action, err));
}

/// Flips the completion flag of the task with `id`.
pub(crate) async fn toggle_completion(
    store: &dyn RemoteStore,
    tasks: &[Task],
    id: &str,
) -> Result<(), AppError> {
    let task = tasks.iter().find(|t| t.id == id).ok_or(AppError::NotFound)?;
    repository::update_task(store, id, UpdateTask::completed(!task.completed)).await?;
    Ok(())
}

/// One task row as listed on the dashboard, course and task pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskItem {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub tag: String,
    pub course_name: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_label: String,
    pub completed: bool,
    pub kind: EventKind,
    pub color: &'static str,
}

impl TaskItem {
    pub fn new(task: &Task, now: DateTime<Utc>) -> Self {
        let kind = EventKind::for_tag(&task.tag);
        Self {
            id: task.id.clone(),
            course_id: task.course_id.clone(),
            title: task.title.clone(),
            tag: task.tag.clone(),
            course_name: task.course_name().map(str::to_string),
            due_date: task.due_date,
            due_label: format_due_date(task.due_date, now),
            completed: task.completed,
            kind,
            color: kind.color(),
        }
    }
}
