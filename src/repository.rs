//! Typed requests against the `courses` and `tasks` tables.
//!
//! Every function issues exactly one remote request and hands store failures back
//! unchanged; rows that do not match the expected shape fail with [`AppError::Decode`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::models::{Course, NewCourse, NewTask, Task, UpdateCourse, UpdateTask};
use crate::store::{COURSES, Filter, RemoteStore, Select, TASKS};

/// Tasks always come back with their parent course attached.
const TASK_COLUMNS: &str = "*,courses(name,course_code)";

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, entity: &'static str) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::decode(entity)))
        .collect()
}

fn first_row<T: DeserializeOwned>(rows: Vec<Value>, entity: &'static str) -> Result<T, AppError> {
    decode_rows(rows, entity)?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound)
}

fn to_json<T: serde::Serialize>(value: &T, entity: &'static str) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(AppError::decode(entity))
}

pub async fn add_course(store: &dyn RemoteStore, req: NewCourse) -> Result<Course, AppError> {
    let rows = store.insert(COURSES, to_json(&req, "course")?).await?;
    first_row(rows, "course")
}

pub async fn get_courses(store: &dyn RemoteStore) -> Result<Vec<Course>, AppError> {
    let query = Select::columns("*").order_asc("created_at");
    let rows = store.select(COURSES, &query).await?;
    decode_rows(rows, "course")
}

pub async fn update_course(
    store: &dyn RemoteStore,
    id: &str,
    req: UpdateCourse,
) -> Result<Course, AppError> {
    let rows = store
        .update(COURSES, &Filter::eq("id", id), to_json(&req, "course")?)
        .await?;
    first_row(rows, "course")
}

/// Tasks that point at the course are left in place.
pub async fn delete_course(store: &dyn RemoteStore, id: &str) -> Result<(), AppError> {
    store.delete(COURSES, &Filter::eq("id", id)).await
}

pub async fn add_task(store: &dyn RemoteStore, req: NewTask) -> Result<Task, AppError> {
    let rows = store.insert(TASKS, to_json(&req, "task")?).await?;
    first_row(rows, "task")
}

pub async fn get_tasks(store: &dyn RemoteStore) -> Result<Vec<Task>, AppError> {
    let query = Select::columns(TASK_COLUMNS).order_asc("due_date");
    let rows = store.select(TASKS, &query).await?;
    decode_rows(rows, "task")
}

pub async fn get_course_tasks(store: &dyn RemoteStore, course_id: &str) -> Result<Vec<Task>, AppError> {
    let query = Select::columns(TASK_COLUMNS)
        .filter(Filter::eq("course_id", course_id))
        .order_asc("due_date");
    let rows = store.select(TASKS, &query).await?;
    decode_rows(rows, "task")
}

pub async fn update_task(store: &dyn RemoteStore, id: &str, req: UpdateTask) -> Result<Task, AppError> {
    let rows = store
        .update(TASKS, &Filter::eq("id", id), to_json(&req, "task")?)
        .await?;
    first_row(rows, "task")
}

pub async fn delete_task(store: &dyn RemoteStore, id: &str) -> Result<(), AppError> {
    store.delete(TASKS, &Filter::eq("id", id)).await
}
