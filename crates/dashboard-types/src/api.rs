use serde::{Deserialize, Serialize};

// Request bodies don't carry `secret` or the target user: the secret gate
// consumes the former and the scoped extractor the latter, both before the
// typed body is read. Unknown fields are tolerated because the senders post
// their own payload shapes (the notification hook sends a whole user object).

/// Requests that name the user they target. Anything other than the managed
/// user is acknowledged and dropped without the rest of the body being read.
pub trait UserScoped {
    /// JSON pointer to the target user id in the raw body.
    const USER_POINTER: &'static str = "/user_id";
}

// -- Rating --

#[derive(Debug, Deserialize)]
pub struct RatingRequest {
    pub rating: f64,
}

impl UserScoped for RatingRequest {}

// -- Notifications --

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl UserScoped for CreateNotificationRequest {
    const USER_POINTER: &'static str = "/user/id";
}

// -- Tasks --

#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    pub task_id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnassignTaskRequest {
    pub task_id: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChangeTaskStatusRequest {
    pub task_id: u32,
    pub status: String,
}

impl UserScoped for AssignTaskRequest {}

impl UserScoped for UnassignTaskRequest {}

impl UserScoped for ChangeTaskStatusRequest {}

// -- Responses --

/// `{"OK": true}`, the acknowledgement every mutating endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OkResponse {
    #[serde(rename = "OK")]
    pub ok: bool,
}

impl OkResponse {
    pub const fn ok() -> Self {
        Self { ok: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
