use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Task;
use crate::repository;
use crate::session::SessionContext;
use crate::store::RemoteStore;

use super::derive::{TaskSummary, sort_by_due, summarize};
use super::{Screen, TaskItem, report, signed_in, toggle_completion};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn keeps(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskListPage {
    pub filter: TaskFilter,
    pub items: Vec<TaskItem>,
    pub summary: TaskSummary,
    pub loading: bool,
}

/// Every task across courses.
pub struct TaskList {
    store: Arc<dyn RemoteStore>,
    session: SessionContext,
    tasks: Vec<Task>,
    filter: TaskFilter,
    loading: bool,
    alert: Option<String>,
}

impl TaskList {
    pub fn new(store: Arc<dyn RemoteStore>, session: SessionContext) -> Self {
        Self {
            store,
            session,
            tasks: Vec::new(),
            filter: TaskFilter::default(),
            loading: true,
            alert: None,
        }
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    pub async fn load(&mut self) {
        self.loading = true;
        match repository::get_tasks(self.store.as_ref()).await {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => report(&mut self.alert, "load tasks", &err),
        }
        self.loading = false;
    }

    pub async fn toggle_task(&mut self, id: &str) {
        match toggle_completion(self.store.as_ref(), &self.tasks, id).await {
            Ok(()) => self.load().await,
            Err(err) => report(&mut self.alert, "update the task", &err),
        }
    }

    pub async fn delete_task(&mut self, id: &str) {
        match repository::delete_task(self.store.as_ref(), id).await {
            Ok(()) => self.load().await,
            Err(err) => report(&mut self.alert, "delete the task", &err),
        }
    }

    pub fn render(&self, now: DateTime<Utc>) -> Screen<TaskListPage> {
        if let Err(screen) = signed_in(&self.session) {
            return screen;
        }

        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| self.filter.keeps(t))
            .cloned()
            .collect();
        sort_by_due(&mut tasks);

        Screen::Ready(TaskListPage {
            filter: self.filter,
            items: tasks.iter().map(|t| TaskItem::new(t, now)).collect(),
            summary: summarize(&self.tasks),
            loading: self.loading,
        })
    }
}
