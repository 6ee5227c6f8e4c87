use std::sync::Arc;

use crate::db::DbClock;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DbClock>,
}
