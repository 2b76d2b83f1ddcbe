use axum::Json;
use axum::http::{HeaderMap, StatusCode};
use uuid::Uuid;

use crate::domain::UserId;

use super::responses::{ErrorResponse, error_body};

/// Session handling lives in front of this service; the authenticated user
/// id arrives pre-resolved in this header.
pub const USER_ID_HEADER: &str = "x-user-id";

pub fn require_user(headers: &HeaderMap) -> Result<UserId, (StatusCode, Json<ErrorResponse>)> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
        .map(UserId::from_uuid)
        .ok_or((StatusCode::UNAUTHORIZED, error_body("Unauthorized")))
}
