use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::api::requests::LoginRequest;
use crate::api::responses::{ApiMessage, LoginResponse};
use crate::state::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ApiMessage>)> {
    let user = state
        .auth
        .authenticate(&req.username, &req.password)
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ApiMessage::failure("Invalid credentials")),
            )
        })?;

    info!(username = %user.username, "login");
    let token = state.sessions.issue(user.clone()).await;

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: user.into(),
    }))
}
