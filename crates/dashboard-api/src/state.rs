use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use dashboard_db::Database;

use crate::config::Config;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: Config,
}

impl AppStateInner {
    pub fn new(db: Database, config: Config) -> AppState {
        Arc::new(Self { db, config })
    }

    /// The managed user id if `target` is that number (`12` and `12.0` both
    /// count). Strings, other numbers and missing ids all mean the request
    /// should be acknowledged without touching the store.
    pub fn managed_target(&self, target: Option<&Value>) -> Option<u32> {
        let managed = self.config.user_id;
        if target.and_then(Value::as_f64) == Some(f64::from(managed)) {
            Some(managed)
        } else {
            debug!("Ignoring request for user {:?}", target);
            None
        }
    }
}

/// Run blocking DB work off the async runtime.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&state.db)).await??;
    Ok(result)
}
