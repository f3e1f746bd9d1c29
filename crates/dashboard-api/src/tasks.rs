use axum::{Json, extract::State};

use dashboard_db::models::NewTask;
use dashboard_types::api::{
    AssignTaskRequest, ChangeTaskStatusRequest, OkResponse, UnassignTaskRequest,
};
use dashboard_types::models::DEFAULT_TASK_STATUS;

use crate::error::ApiError;
use crate::extract::Scoped;
use crate::state::{AppState, run_blocking};

/// POST /api/tasks/assign — start tracking a task. Assigning a task that is
/// already tracked changes nothing, including its title and url.
pub async fn assign(
    State(state): State<AppState>,
    scoped: Scoped<AssignTaskRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let Scoped::Managed { user_id, body: req } = scoped else {
        return Ok(Json(OkResponse::ok()));
    };

    let created = chrono::Utc::now();
    run_blocking(&state, move |db| {
        let status = req
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TASK_STATUS);
        db.assign_task(&NewTask {
            user_id,
            task_id: req.task_id,
            title: &req.title,
            url: &req.url,
            status,
            created,
        })
    })
    .await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /api/tasks/unassign
pub async fn unassign(
    State(state): State<AppState>,
    scoped: Scoped<UnassignTaskRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let Scoped::Managed { user_id, body: req } = scoped else {
        return Ok(Json(OkResponse::ok()));
    };

    let task_id = req.task_id;
    run_blocking(&state, move |db| db.unassign_task(user_id, task_id)).await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /api/tasks/change-status
pub async fn change_status(
    State(state): State<AppState>,
    scoped: Scoped<ChangeTaskStatusRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let Scoped::Managed { user_id, body: req } = scoped else {
        return Ok(Json(OkResponse::ok()));
    };

    run_blocking(&state, move |db| {
        db.set_task_status(user_id, req.task_id, &req.status)
    })
    .await?;

    Ok(Json(OkResponse::ok()))
}
