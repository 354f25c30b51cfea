use axum::{extract::State, Json};

use crate::api::responses::HealthResponse;
use crate::state::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "OK".into(),
        connection: state.connection.status(),
    })
}
