use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use bazaar::orders::{OrderItemRequest, Requester};
use shared::Error;
use tracing::{error, warn};

use crate::api::requests::CreateOrderRequest;
use crate::api::responses::{ApiError, OrderCreateResponse, OrdersResponse};
use crate::middleware::{require_session, require_staff, CurrentUser};
use crate::state::AppState;

/// POST /order/create
///
/// Assembles and persists the order, then clears the user's cart. The two
/// steps are deliberately separate: a failed cart clear leaves a placed
/// order intact and is retried by the next cart write, never by rolling the
/// order back.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateOrderRequest>,
) -> Response {
    let user = match require_session(&current) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let items: Vec<OrderItemRequest> = req
        .items
        .into_iter()
        .map(|item| OrderItemRequest {
            product: item.product_id,
            quantity: item.quantity,
        })
        .collect();

    let order = match state
        .orders
        .create_order(&user.id, &req.address_id, &items)
        .await
    {
        Ok(order) => order,
        Err(Error::Validation(msg)) => {
            return (StatusCode::BAD_REQUEST, Json(ApiError::new(msg))).into_response()
        }
        Err(err) => {
            error!(%err, "order creation failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Order creation failed, please try again")),
            )
                .into_response();
        }
    };

    if let Err(err) = state.cart.clear(&user.id).await {
        warn!(order_id = %order.id, %err, "order placed but cart clear failed");
    }

    Json(OrderCreateResponse {
        success: true,
        order,
    })
    .into_response()
}

/// GET /order/get-orders
///
/// Session-scoped listing: customers see their own orders, sellers and
/// admins see all of them.
pub async fn get_orders(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    let user = match require_session(&current) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let requester = Requester {
        user_id: user.id.clone(),
        role: user.role,
    };

    match state.orders.list_orders(&requester).await {
        Ok(orders) => Json(OrdersResponse {
            success: true,
            orders,
        })
        .into_response(),
        Err(err) => {
            error!(%err, "order listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Failed to load orders")),
            )
                .into_response()
        }
    }
}

/// GET /seller/orders
pub async fn seller_orders(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    let user = match require_staff(&current) {
        Ok(user) => user,
        Err(rejection) => return rejection,
    };

    let requester = Requester {
        user_id: user.id.clone(),
        role: user.role,
    };

    match state.orders.list_orders(&requester).await {
        Ok(orders) => Json(OrdersResponse {
            success: true,
            orders,
        })
        .into_response(),
        Err(err) => {
            error!(%err, "seller order listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Failed to load orders")),
            )
                .into_response()
        }
    }
}
