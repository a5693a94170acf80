//! Caller identification middleware

use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity stored in request extensions
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

/// Identity middleware - reads the user id from the `x-user-id` header.
///
/// Session handling lives in front of this service; the header is trusted as is.
pub async fn identify_user(mut request: Request, next: Next) -> Result<Response> {
    let header = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing x-user-id header".to_string()))?;

    let user_id = Uuid::parse_str(header.trim())
        .map_err(|_| ApiError::Unauthorized("Invalid user id".to_string()))?;

    request.extensions_mut().insert(CurrentUser { user_id });

    Ok(next.run(request).await)
}
