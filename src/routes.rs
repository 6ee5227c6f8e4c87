use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ServerTime {
    pub now: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDbResponse {
    pub server_time: ServerTime,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/test-db", get(test_db))
        .with_state(state)
}

async fn test_db(State(state): State<AppState>) -> Result<Json<TestDbResponse>, AppError> {
    let now = state.db.now().await?;
    Ok(Json(TestDbResponse {
        server_time: ServerTime { now },
    }))
}
