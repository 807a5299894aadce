//! JobTrack API client

use reqwest::StatusCode;

use crate::error::ApiError;

pub mod api;
pub mod auth;
pub mod jobtrack;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use api::{AccountApi, ApplicationApi, AuthApi, JobOfferApi, TaskApi, UserApi};
pub use auth::AuthClient;
pub use jobtrack::JobTrackClient;

/// Message used when the server gives no usable `detail`
pub const GENERIC_ERROR: &str = "Server communication error";

/// Extract the `detail` field of an error body.
///
/// FastAPI sends either a string or a list of validation errors with `msg`
/// fields; the latter are joined.
pub fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

/// Map a non-success status to an API error carrying `message`
pub fn status_error(status: StatusCode, message: String) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::BadRequest(message)
        }
        status if status.is_server_error() => ApiError::ServerError(message),
        status => ApiError::InvalidResponse(format!("{} ({})", message, status)),
    }
}
