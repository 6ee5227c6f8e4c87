use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::forms::{Modal, SubmitOutcome, TaskDraft, TaskPayload};
use crate::models::{Task, UpdateTask};
use crate::repository;
use crate::session::SessionContext;
use crate::store::RemoteStore;

use super::derive::{TaskSummary, sort_by_due, summarize};
use super::{Route, Screen, TaskItem, report, signed_in, toggle_completion};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePageView {
    pub id: String,
    pub name: String,
    pub tasks: Vec<TaskItem>,
    pub summary: TaskSummary,
    pub loading: bool,
}

/// Task list of a single course, reached through `/courses?id=..&name=..`.
pub struct CoursePage {
    store: Arc<dyn RemoteStore>,
    session: SessionContext,
    /// `(id, name)` from the route; `None` when either is missing.
    course: Option<(String, String)>,
    tasks: Vec<Task>,
    loading: bool,
    alert: Option<String>,
    pub task_modal: Modal<TaskDraft>,
}

async fn save_task(store: &dyn RemoteStore, course_id: &str, payload: TaskPayload) -> Result<(), AppError> {
    match payload.id.clone() {
        Some(id) => {
            repository::update_task(store, &id, UpdateTask::from(payload)).await?;
        }
        None => {
            repository::add_task(store, payload.into_new_task(course_id)).await?;
        }
    }
    Ok(())
}

impl CoursePage {
    pub fn new(store: Arc<dyn RemoteStore>, session: SessionContext, route: &Route) -> Self {
        let course = match route {
            Route::Courses {
                id: Some(id),
                name: Some(name),
            } => Some((id.clone(), name.clone())),
            _ => None,
        };

        Self {
            store,
            session,
            course,
            tasks: Vec::new(),
            loading: true,
            alert: None,
            task_modal: Modal::new(),
        }
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub async fn load(&mut self) {
        let Some((id, _)) = self.course.clone() else {
            self.loading = false;
            return;
        };

        self.loading = true;
        match repository::get_course_tasks(self.store.as_ref(), &id).await {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => report(&mut self.alert, "load tasks", &err),
        }
        self.loading = false;
    }

    async fn refresh(&mut self) {
        let Some((id, _)) = self.course.clone() else {
            return;
        };
        match repository::get_course_tasks(self.store.as_ref(), &id).await {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => report(&mut self.alert, "load tasks", &err),
        }
    }

    pub fn open_add_task(&mut self) {
        self.task_modal.open_new();
    }

    pub fn open_edit_task(&mut self, id: &str) -> bool {
        match self.tasks.iter().find(|t| t.id == id) {
            Some(task) => {
                self.task_modal.open_edit(task);
                true
            }
            None => false,
        }
    }

    pub async fn submit_task(&mut self) -> SubmitOutcome {
        let Some(course_id) = self.course_id().map(str::to_string) else {
            return SubmitOutcome::NotOpen;
        };

        let store = Arc::clone(&self.store);
        let outcome = self
            .task_modal
            .submit(move |payload| async move { save_task(store.as_ref(), &course_id, payload).await })
            .await;

        match &outcome {
            SubmitOutcome::Saved => self.refresh().await,
            SubmitOutcome::Failed(message) => {
                self.alert = Some(format!("Failed to save task. {}", message));
            }
            SubmitOutcome::Blocked | SubmitOutcome::NotOpen => {}
        }
        outcome
    }

    pub async fn toggle_task(&mut self, id: &str) {
        match toggle_completion(self.store.as_ref(), &self.tasks, id).await {
            Ok(()) => self.refresh().await,
            Err(err) => report(&mut self.alert, "update the task", &err),
        }
    }

    pub async fn delete_task(&mut self, id: &str) {
        match repository::delete_task(self.store.as_ref(), id).await {
            Ok(()) => self.refresh().await,
            Err(err) => report(&mut self.alert, "delete the task", &err),
        }
    }

    pub fn render(&self, now: DateTime<Utc>) -> Screen<CoursePageView> {
        if let Err(screen) = signed_in(&self.session) {
            return screen;
        }
        let Some((id, name)) = &self.course else {
            return Screen::NotFound;
        };

        let mut tasks = self.tasks.clone();
        sort_by_due(&mut tasks);

        Screen::Ready(CoursePageView {
            id: id.clone(),
            name: name.clone(),
            tasks: tasks.iter().map(|t| TaskItem::new(t, now)).collect(),
            summary: summarize(&self.tasks),
            loading: self.loading,
        })
    }
}
