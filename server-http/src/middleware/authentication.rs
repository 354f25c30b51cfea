use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use bazaar::auth::models::User;

use crate::api::responses::ApiError;
use crate::state::AppState;

/// The authenticated user for this request, if any. Inserted by
/// [`authenticate`] on every request so handlers can extract it
/// unconditionally.
#[derive(Clone)]
pub struct CurrentUser(pub Option<User>);

/// Extract a bearer token from an Authorization header value.
fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let mut parts = auth_header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("Bearer") => Some(token),
        _ => None,
    }
}

/// Session-resolution middleware. A request without an Authorization header
/// passes through anonymous; a header that does not resolve to a live
/// session is rejected here so handlers never see a half-authenticated
/// request.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    let user = match auth_header {
        None => None,
        Some(value) => {
            let token = extract_bearer_token(&value).ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiError::new("Invalid Authorization header format")),
                )
                    .into_response()
            })?;

            match state.sessions.resolve(token).await {
                Some(user) => Some(user),
                None => {
                    return Err((
                        StatusCode::UNAUTHORIZED,
                        Json(ApiError::new("Session expired or unknown")),
                    )
                        .into_response())
                }
            }
        }
    };

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
