use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::AppError;
use crate::forms::{CourseDraft, CoursePayload, Modal, SubmitOutcome};
use crate::models::{Course, NewCourse, Task, UpdateCourse};
use crate::repository;
use crate::session::SessionContext;
use crate::store::RemoteStore;

use super::calendar::MonthView;
use super::derive::{self, TaskSummary, UPCOMING_LIMIT, calendar_events, summarize, upcoming_deadlines};
use super::{Route, Screen, TaskItem, report, signed_in, toggle_completion};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCard {
    pub id: String,
    pub name: String,
    pub course_code: Option<String>,
    pub professor: Option<String>,
    pub semester: Option<String>,
    pub notes: Option<String>,
    /// Path of the course page.
    pub href: String,
    pub open_tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardPage {
    pub greeting: String,
    pub courses: Vec<CourseCard>,
    pub upcoming: Vec<TaskItem>,
    pub summary: TaskSummary,
    pub calendar: MonthView,
    pub loading: bool,
}

/// Landing page: courses, nearest deadlines, counts and this month's calendar.
pub struct Dashboard {
    store: Arc<dyn RemoteStore>,
    session: SessionContext,
    courses: Vec<Course>,
    tasks: Vec<Task>,
    loading: bool,
    alert: Option<String>,
    month: Option<NaiveDate>,
    pub course_modal: Modal<CourseDraft>,
}

async fn save_course(store: &dyn RemoteStore, payload: CoursePayload) -> Result<(), AppError> {
    match payload.id.clone() {
        Some(id) => {
            repository::update_course(store, &id, UpdateCourse::from(payload)).await?;
        }
        None => {
            let course = repository::add_course(store, NewCourse::from(payload)).await?;
            info!("added course {}", course.id);
        }
    }
    Ok(())
}

impl Dashboard {
    pub fn new(store: Arc<dyn RemoteStore>, session: SessionContext) -> Self {
        Self {
            store,
            session,
            courses: Vec::new(),
            tasks: Vec::new(),
            loading: true,
            alert: None,
            month: None,
            course_modal: Modal::new(),
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }

    /// Fetches tasks and courses concurrently.
    pub async fn load(&mut self) {
        self.loading = true;
        let store = self.store.as_ref();
        match tokio::try_join!(repository::get_tasks(store), repository::get_courses(store)) {
            Ok((tasks, courses)) => {
                self.tasks = tasks;
                self.courses = courses;
            }
            Err(err) => report(&mut self.alert, "load your courses and tasks", &err),
        }
        self.loading = false;
    }

    async fn refresh_tasks(&mut self) {
        match repository::get_tasks(self.store.as_ref()).await {
            Ok(tasks) => self.tasks = tasks,
            Err(err) => report(&mut self.alert, "load tasks", &err),
        }
    }

    pub fn open_add_course(&mut self) {
        self.course_modal.open_new();
    }

    /// Opens the edit form for a listed course; false if it is not listed.
    pub fn open_edit_course(&mut self, id: &str) -> bool {
        match self.courses.iter().find(|c| c.id == id) {
            Some(course) => {
                self.course_modal.open_edit(course);
                true
            }
            None => false,
        }
    }

    pub async fn submit_course(&mut self) -> SubmitOutcome {
        let store = Arc::clone(&self.store);
        let outcome = self
            .course_modal
            .submit(move |payload| async move { save_course(store.as_ref(), payload).await })
            .await;

        match &outcome {
            // Course names are embedded in task rows too.
            SubmitOutcome::Saved => self.load().await,
            SubmitOutcome::Failed(message) => {
                self.alert = Some(format!("Failed to save course. {}", message));
            }
            SubmitOutcome::Blocked | SubmitOutcome::NotOpen => {}
        }
        outcome
    }

    /// Removes the course only; its tasks stay behind without a course.
    pub async fn delete_course(&mut self, id: &str) {
        match repository::delete_course(self.store.as_ref(), id).await {
            Ok(()) => self.load().await,
            Err(err) => report(&mut self.alert, "delete the course", &err),
        }
    }

    pub async fn toggle_task(&mut self, id: &str) {
        match toggle_completion(self.store.as_ref(), &self.tasks, id).await {
            Ok(()) => self.refresh_tasks().await,
            Err(err) => report(&mut self.alert, "update the task", &err),
        }
    }

    pub async fn delete_task(&mut self, id: &str) {
        match repository::delete_task(self.store.as_ref(), id).await {
            Ok(()) => self.refresh_tasks().await,
            Err(err) => report(&mut self.alert, "delete the task", &err),
        }
    }

    /// Month shown by the calendar widget; defaults to the current one.
    pub fn show_month(&mut self, month: NaiveDate) {
        self.month = Some(derive::first_of_month(month));
    }

    pub fn render(&self, now: DateTime<Utc>) -> Screen<DashboardPage> {
        let user = match signed_in(&self.session) {
            Ok(user) => user,
            Err(screen) => return screen,
        };

        let courses = self
            .courses
            .iter()
            .map(|course| CourseCard {
                id: course.id.clone(),
                name: course.name.clone(),
                course_code: course.code().map(str::to_string),
                professor: course.professor.clone(),
                semester: course.semester.clone(),
                notes: course.notes.clone(),
                href: Route::course(course.id.clone(), course.name.clone()).to_path(),
                open_tasks: self
                    .tasks
                    .iter()
                    .filter(|t| t.course_id == course.id && !t.completed)
                    .count(),
            })
            .collect();

        let today = now.date_naive();
        let month = self.month.unwrap_or_else(|| derive::first_of_month(today));
        let events = calendar_events(&self.tasks, &self.courses);

        Screen::Ready(DashboardPage {
            greeting: format!("Welcome, {}!", user.display_name()),
            courses,
            upcoming: upcoming_deadlines(&self.tasks, UPCOMING_LIMIT)
                .into_iter()
                .map(|task| TaskItem::new(task, now))
                .collect(),
            summary: summarize(&self.tasks),
            calendar: MonthView::build(month, today, &events),
            loading: self.loading,
        })
    }
}
