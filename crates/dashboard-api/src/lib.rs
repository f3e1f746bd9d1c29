pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod notifications;
pub mod page;
pub mod rating;
pub mod secret;
pub mod state;
pub mod tasks;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::middleware::require_secret;
use crate::state::AppState;

pub mod paths {
    pub const CLEAR: &str = "/api/clear";
    pub const RATING: &str = "/api/rating";
    pub const NOTIFICATIONS: &str = "/api/notifications";
    pub const TASKS_ASSIGN: &str = "/api/tasks/assign";
    pub const TASKS_UNASSIGN: &str = "/api/tasks/unassign";
    pub const TASKS_CHANGE_STATUS: &str = "/api/tasks/change-status";
}

/// The dashboard page, the secret-gated API, and static files for every other path.
pub fn router(state: AppState) -> Router {
    let gated_routes = Router::new()
        .route(paths::CLEAR, post(notifications::clear))
        .route(paths::RATING, post(rating::set_rating))
        .route(paths::NOTIFICATIONS, post(notifications::create_notification))
        .route(paths::TASKS_ASSIGN, post(tasks::assign))
        .route(paths::TASKS_UNASSIGN, post(tasks::unassign))
        .route(paths::TASKS_CHANGE_STATUS, post(tasks::change_status))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_secret,
        ));

    Router::new()
        .route("/", get(page::index))
        .merge(gated_routes)
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .with_state(state)
}
