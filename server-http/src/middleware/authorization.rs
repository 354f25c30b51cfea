use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bazaar::auth::models::User;

use crate::api::responses::ApiError;

use super::authentication::CurrentUser;

/// Require an authenticated session: 401 otherwise.
pub fn require_session(current: &CurrentUser) -> Result<&User, Response> {
    current.0.as_ref().ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new("Authentication required")),
        )
            .into_response()
    })
}

/// Require a seller or admin session: 401 unauthenticated, 403 otherwise.
pub fn require_staff(current: &CurrentUser) -> Result<&User, Response> {
    let user = require_session(current)?;
    if user.role.is_staff() {
        Ok(user)
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ApiError::new("Insufficient role")),
        )
            .into_response())
    }
}

/// Require an admin session: 401 unauthenticated, 403 otherwise.
pub fn require_admin(current: &CurrentUser) -> Result<&User, Response> {
    let user = require_session(current)?;
    if user.role.is_admin() {
        Ok(user)
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ApiError::new("Insufficient role")),
        )
            .into_response())
    }
}
