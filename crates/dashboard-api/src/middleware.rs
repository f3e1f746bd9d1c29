use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Same ceiling as axum's `Json` extractor, so the gate never refuses a body
/// the handler would accept.
pub const MAX_GATED_BODY: usize = 2 * 1024 * 1024;

/// Check the body's `secret` field against the secret configured for the
/// request path. The body is buffered and handed on unchanged.
pub async fn require_secret(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_owned();
    let (parts, body) = req.into_parts();

    let bytes = axum::body::to_bytes(body, MAX_GATED_BODY)
        .await
        .map_err(|e| {
            if is_length_limit(&e) {
                warn!("Body on {} exceeds {} bytes", path, MAX_GATED_BODY);
                ApiError::PayloadTooLarge
            } else {
                warn!("Unreadable body on {}: {}", path, e);
                ApiError::UnreadableBody(e)
            }
        })?;

    let supplied = supplied_secret(&bytes);
    if !state.config.secrets.allows(&path, supplied.as_deref().unwrap_or_default()) {
        warn!("Permission denied for {}", path);
        return Err(ApiError::PermissionDenied);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// Top-level `secret` string, if the body is a JSON object that has one.
fn supplied_secret(body: &Bytes) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("secret")?.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_top_level_secret() {
        let body = Bytes::from_static(br#"{"secret":"S","user_id":12}"#);
        assert_eq!(supplied_secret(&body).as_deref(), Some("S"));
    }

    #[test]
    fn test_non_string_or_missing_secret() {
        assert_eq!(supplied_secret(&Bytes::from_static(br#"{"secret":42}"#)), None);
        assert_eq!(supplied_secret(&Bytes::from_static(br#"{"user_id":12}"#)), None);
        assert_eq!(
            supplied_secret(&Bytes::from_static(br#"{"user":{"secret":"S"}}"#)),
            None
        );
    }

    #[test]
    fn test_non_json_body() {
        assert_eq!(supplied_secret(&Bytes::from_static(b"secret=S")), None);
        assert_eq!(supplied_secret(&Bytes::new()), None);
    }
}
