use axum::{Json, extract::State};

use dashboard_types::api::{OkResponse, RatingRequest};

use crate::error::ApiError;
use crate::extract::Scoped;
use crate::state::{AppState, run_blocking};

/// POST /api/rating — store the managed user's rating, replacing any earlier one.
pub async fn set_rating(
    State(state): State<AppState>,
    scoped: Scoped<RatingRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let Scoped::Managed { user_id, body: req } = scoped else {
        return Ok(Json(OkResponse::ok()));
    };

    let value = req.rating;
    run_blocking(&state, move |db| db.set_rating(user_id, value)).await?;

    Ok(Json(OkResponse::ok()))
}
