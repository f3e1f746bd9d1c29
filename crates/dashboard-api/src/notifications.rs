use axum::{Json, extract::State};
use tracing::info;

use dashboard_types::api::{CreateNotificationRequest, OkResponse};

use crate::error::ApiError;
use crate::extract::Scoped;
use crate::state::{AppState, run_blocking};

/// POST /api/notifications — append a notification for the managed user.
pub async fn create_notification(
    State(state): State<AppState>,
    scoped: Scoped<CreateNotificationRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let Scoped::Managed { user_id, body: req } = scoped else {
        return Ok(Json(OkResponse::ok()));
    };

    let created = chrono::Utc::now();
    run_blocking(&state, move |db| {
        db.insert_notification(user_id, &req.subject, &req.body, created)
    })
    .await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /api/clear — drop the managed user's rating, notifications and tasks.
/// The body only needs the secret.
pub async fn clear(State(state): State<AppState>) -> Result<Json<OkResponse>, ApiError> {
    let user_id = state.config.user_id;
    let summary = run_blocking(&state, move |db| db.clear_user(user_id)).await?;

    info!(
        "Cleared dashboard: {} rating(s), {} notification(s), {} task(s)",
        summary.ratings, summary.notifications, summary.tasks
    );
    Ok(Json(OkResponse::ok()))
}
