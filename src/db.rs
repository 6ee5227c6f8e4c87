use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;

/// Source of the database clock, probed by the health route.
#[async_trait]
pub trait DbClock: Send + Sync {
    async fn now(&self) -> Result<DateTime<Utc>, AppError>;
}

#[async_trait]
impl DbClock for PgPool {
    async fn now(&self) -> Result<DateTime<Utc>, AppError> {
        let now = sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW()")
            .fetch_one(self)
            .await?;
        Ok(now)
    }
}
