use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use shared::Error;
use tracing::error;

use crate::api::requests::{CartAddRequest, CartUpdateRequest, RemoveDeletedProductRequest};
use crate::api::responses::{ApiError, CartPurgeResponse, CartResponse};
use crate::middleware::{require_session, CurrentUser};
use crate::state::AppState;

fn cart_response(cart: BTreeMap<String, u32>) -> Json<CartResponse> {
    let count = cart.values().map(|&q| q as u64).sum();
    Json(CartResponse {
        success: true,
        cart_items: cart,
        count,
    })
}

fn cart_error(err: Error) -> Response {
    match err {
        Error::Validation(msg) => {
            (StatusCode::BAD_REQUEST, Json(ApiError::new(msg))).into_response()
        }
        Error::NotFound(msg) => (StatusCode::NOT_FOUND, Json(ApiError::new(msg))).into_response(),
        err => {
            error!(%err, "cart operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Cart operation failed")),
            )
                .into_response()
        }
    }
}

/// GET /cart/get
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    let user = match require_session(&current) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    match state.cart.get(&user.id).await {
        Ok(cart) => cart_response(cart).into_response(),
        Err(err) => cart_error(err),
    }
}

/// POST /cart/add
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CartAddRequest>,
) -> Response {
    let user = match require_session(&current) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let delta = req.quantity.unwrap_or(1);
    match state.cart.add(&user.id, &req.product_id, delta).await {
        Ok(cart) => cart_response(cart).into_response(),
        Err(err) => cart_error(err),
    }
}

/// POST /cart/update
///
/// Absolute set; quantity zero removes the entry.
pub async fn update_cart(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CartUpdateRequest>,
) -> Response {
    let user = match require_session(&current) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    match state
        .cart
        .set_quantity(&user.id, &req.product_id, req.quantity)
        .await
    {
        Ok(cart) => cart_response(cart).into_response(),
        Err(err) => cart_error(err),
    }
}

/// POST /cart/remove-deleted-product
///
/// Bulk purge across every user's cart, invoked by catalog tooling when a
/// product is deleted.
pub async fn remove_deleted_product(
    State(state): State<AppState>,
    Json(req): Json<RemoveDeletedProductRequest>,
) -> Response {
    match state.cart.remove_product_everywhere(&req.product_id).await {
        Ok(modified_count) => Json(CartPurgeResponse {
            success: true,
            modified_count,
        })
        .into_response(),
        Err(err) => cart_error(err),
    }
}
