use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use bazaar::domain::Category;
use shared::Error;
use tracing::{error, info};

use crate::api::requests::{CategoryActionRequest, CreateCategoryRequest};
use crate::api::responses::{ApiMessage, CategoryListResponse, CategoryResponse};
use crate::middleware::{require_admin, CurrentUser};
use crate::state::AppState;

/// GET /category/list
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, (StatusCode, Json<ApiMessage>)> {
    match state.categories.list(false).await {
        Ok(listing) => Ok(Json(CategoryListResponse {
            success: true,
            data: listing.categories,
            cached: listing.served_from_cache,
        })),
        Err(err) => {
            error!(%err, "category listing failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure("Failed to load categories")),
            ))
        }
    }
}

/// POST /category/list
///
/// Maintenance entry point; `{"action": "clearCache"}` invalidates the
/// cached category listing so edits made through the console show up
/// without waiting out the freshness window.
pub async fn category_action(
    State(state): State<AppState>,
    Json(req): Json<CategoryActionRequest>,
) -> Response {
    match req.action.as_str() {
        "clearCache" => {
            state.categories.invalidate().await;
            info!("category cache cleared");
            Json(ApiMessage::success("Category cache cleared")).into_response()
        }
        other => (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage::failure(format!("Unknown action '{other}'"))),
        )
            .into_response(),
    }
}

/// GET /category/{id}
///
/// The one place a missing category is the direct subject of the request,
/// so it surfaces as a 404 instead of a placeholder.
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.category_store.find_by_id(&id).await {
        Ok(Some(category)) => Json(CategoryResponse {
            success: true,
            data: category,
        })
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiMessage::failure("Category not found")),
        )
            .into_response(),
        Err(err) => {
            error!(%err, "category lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure("Failed to load category")),
            )
                .into_response()
        }
    }
}

/// POST /category/create
pub async fn create_category(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> Response {
    if let Err(rejection) = require_admin(&current) {
        return rejection;
    }

    if req.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage::failure("Category name must not be empty")),
        )
            .into_response();
    }

    match state.category_store.create(Category::new(req.name)).await {
        Ok(category) => {
            // New category must show up on the next listing.
            state.categories.invalidate().await;
            Json(CategoryResponse {
                success: true,
                data: category,
            })
            .into_response()
        }
        Err(Error::Validation(msg)) => {
            (StatusCode::BAD_REQUEST, Json(ApiMessage::failure(msg))).into_response()
        }
        Err(err) => {
            error!(%err, "category creation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::failure("Failed to create category")),
            )
                .into_response()
        }
    }
}
