use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use dashboard_types::api::UserScoped;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body of a request aimed at a user. The target is checked against the
/// managed user first; only a managed request has its body deserialized into
/// `T`, so a foreign request never fails on fields it doesn't need.
pub enum Scoped<T> {
    Managed { user_id: u32, body: T },
    Ignored,
}

impl<T> FromRequest<AppState> for Scoped<T>
where
    T: DeserializeOwned + UserScoped + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;

        let Some(user_id) = state.managed_target(value.pointer(T::USER_POINTER)) else {
            return Ok(Scoped::Ignored);
        };

        let body = serde_json::from_value(value)?;
        Ok(Scoped::Managed { user_id, body })
    }
}
